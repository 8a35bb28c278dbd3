//! Domain models with validation at construction
//!
//! All user input is validated when creating these types.
//! Invalid input returns ValidationError, not panic.

pub mod validation;
pub mod business;
pub mod review;
pub mod pagination;

pub use validation::ValidationError;
pub use business::{Business, BusinessChanges, BusinessPayload, NewBusiness};
pub use review::{CreateReviewPayload, EditReviewPayload, NewReview, Review, ReviewChanges};
pub use pagination::{Page, Pagination, PAGE_SIZE};
