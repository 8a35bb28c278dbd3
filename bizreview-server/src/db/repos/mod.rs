//! Repository interfaces and implementations
//!
//! Handlers depend on [`BusinessRepo`] and [`ReviewRepo`] only. Two backends:
//! - `Pg*Repo`: PostgreSQL via sqlx
//! - [`MemoryStore`]: in-process, same constraints, used by tests and `--in-memory`

pub mod businesses;
pub mod memory;
pub mod reviews;

use async_trait::async_trait;

use crate::models::{
    Business, BusinessChanges, NewBusiness, NewReview, Page, Pagination, Review, ReviewChanges,
};

pub use businesses::PgBusinessRepo;
pub use memory::MemoryStore;
pub use reviews::PgReviewRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },

    #[error("conflict: {reason}")]
    Conflict { reason: String },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: i64) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }

    pub(crate) fn duplicate_review() -> Self {
        Self::Conflict {
            reason: "You have already submitted a review for this business. \
                     You can update your previous review, or delete it and submit a new review"
                .to_owned(),
        }
    }
}

/// Business storage
#[async_trait]
pub trait BusinessRepo: Send + Sync {
    async fn create(&self, business: NewBusiness) -> Result<Business, DbError>;

    async fn get(&self, id: i64) -> Result<Business, DbError>;

    /// One page ordered by id.
    async fn list(&self, page: Pagination) -> Result<Page<Business>, DbError>;

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Business>, DbError>;

    async fn update(&self, id: i64, changes: BusinessChanges) -> Result<Business, DbError>;

    /// Removes the business and every review that references it.
    async fn delete(&self, id: i64) -> Result<(), DbError>;
}

/// Review storage
#[async_trait]
pub trait ReviewRepo: Send + Sync {
    /// Fails with `NotFound` if the business is absent and `Conflict` if the
    /// reviewer already reviewed it.
    async fn create(&self, review: NewReview) -> Result<Review, DbError>;

    async fn get(&self, id: i64) -> Result<Review, DbError>;

    async fn list(&self, page: Pagination) -> Result<Page<Review>, DbError>;

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Review>, DbError>;

    async fn update(&self, id: i64, changes: ReviewChanges) -> Result<Review, DbError>;

    async fn delete(&self, id: i64) -> Result<(), DbError>;
}
