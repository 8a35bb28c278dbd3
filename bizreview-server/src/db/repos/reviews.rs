//! Review repository (PostgreSQL)
//!
//! Inserts rely on the foreign key and the (user_id, business_id) unique
//! constraint; violations are translated into `NotFound` / `Conflict`.

use async_trait::async_trait;
use sqlx::PgPool;

use super::{DbError, ReviewRepo};
use crate::models::{NewReview, Page, Pagination, Review, ReviewChanges};

const COLUMNS: &str = "id, user_id, business_id, stars, review_text, created_at";

/// Review repository backed by a connection pool
#[derive(Clone)]
pub struct PgReviewRepo {
    pool: PgPool,
}

impl PgReviewRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map constraint violations from an insert to domain errors.
fn translate_insert_error(err: sqlx::Error, review: &NewReview) -> DbError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_foreign_key_violation() {
            return DbError::not_found("business", review.business_id);
        }
        if db_err.is_unique_violation() {
            return DbError::duplicate_review();
        }
    }
    DbError::Sqlx(err)
}

#[async_trait]
impl ReviewRepo for PgReviewRepo {
    async fn create(&self, review: NewReview) -> Result<Review, DbError> {
        let created: Review = sqlx::query_as(&format!(
            r#"
            INSERT INTO reviews (user_id, business_id, stars, review_text)
            VALUES ($1, $2, $3, $4)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(review.user_id)
        .bind(review.business_id)
        .bind(review.stars)
        .bind(&review.review_text)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| translate_insert_error(e, &review))?;

        tracing::debug!(
            review_id = created.id,
            business_id = created.business_id,
            "inserted review"
        );
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Review, DbError> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM reviews WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("review", id))
    }

    async fn list(&self, page: Pagination) -> Result<Page<Review>, DbError> {
        let rows: Vec<Review> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM reviews ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.fetch_limit()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::from_overfetch(rows, page))
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Review>, DbError> {
        let rows = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM reviews WHERE user_id = $1 ORDER BY id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn update(&self, id: i64, changes: ReviewChanges) -> Result<Review, DbError> {
        let updated: Option<Review> = sqlx::query_as(&format!(
            r#"
            UPDATE reviews SET
                stars = COALESCE($2, stars),
                review_text = COALESCE($3, review_text)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.stars)
        .bind(changes.review_text)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::not_found("review", id))
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("review", id));
        }
        Ok(())
    }
}
