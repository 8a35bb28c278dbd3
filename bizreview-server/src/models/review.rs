//! Review records and their validated request payloads

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::FromRow;

use super::validation::{reject_nul, required};
use super::ValidationError;

pub const MIN_STARS: i32 = 0;
pub const MAX_STARS: i32 = 5;
const MAX_REVIEW_TEXT_LEN: usize = 1000;

/// Review record from storage
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Review {
    pub id: i64,
    pub user_id: i64,
    pub business_id: i64,
    pub stars: i32,
    pub review_text: String,
    pub created_at: DateTime<Utc>,
}

/// Validated attributes for a new review
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub user_id: i64,
    pub business_id: i64,
    pub stars: i32,
    pub review_text: String,
}

/// Validated review update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewChanges {
    pub stars: Option<i32>,
    pub review_text: Option<String>,
}

impl ReviewChanges {
    pub fn is_empty(&self) -> bool {
        self.stars.is_none() && self.review_text.is_none()
    }

    pub fn apply(self, review: &mut Review) {
        if let Some(stars) = self.stars {
            review.stars = stars;
        }
        if let Some(review_text) = self.review_text {
            review.review_text = review_text;
        }
    }
}

/// POST /reviews body
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateReviewPayload {
    pub user_id: Option<i64>,
    pub business_id: Option<i64>,
    pub stars: Option<i32>,
    pub review_text: Option<String>,
}

impl CreateReviewPayload {
    pub fn into_new(self) -> Result<NewReview, ValidationError> {
        Ok(NewReview {
            user_id: required(self.user_id, "user_id")?,
            business_id: required(self.business_id, "business_id")?,
            stars: validate_stars(required(self.stars, "stars")?)?,
            review_text: validate_review_text(self.review_text.unwrap_or_default())?,
        })
    }
}

/// PUT/PATCH /reviews/{id} body. Reviewer and business are fixed once written.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EditReviewPayload {
    pub stars: Option<i32>,
    pub review_text: Option<String>,
}

impl EditReviewPayload {
    /// PUT semantics: `stars` is required, `review_text` optional.
    pub fn into_replacement(self) -> Result<ReviewChanges, ValidationError> {
        Ok(ReviewChanges {
            stars: Some(validate_stars(required(self.stars, "stars")?)?),
            review_text: self.review_text.map(validate_review_text).transpose()?,
        })
    }

    /// PATCH semantics: any subset, but not nothing.
    pub fn into_changes(self) -> Result<ReviewChanges, ValidationError> {
        let changes = ReviewChanges {
            stars: self.stars.map(validate_stars).transpose()?,
            review_text: self.review_text.map(validate_review_text).transpose()?,
        };
        if changes.is_empty() {
            return Err(ValidationError::NoChanges);
        }
        Ok(changes)
    }
}

fn validate_stars(stars: i32) -> Result<i32, ValidationError> {
    if !(MIN_STARS..=MAX_STARS).contains(&stars) {
        return Err(ValidationError::OutOfRange {
            field: "stars",
            min: MIN_STARS.into(),
            max: MAX_STARS.into(),
        });
    }
    Ok(stars)
}

/// Review text may be empty; only the upper bound applies.
fn validate_review_text(text: String) -> Result<String, ValidationError> {
    if text.chars().count() > MAX_REVIEW_TEXT_LEN {
        return Err(ValidationError::TooLong {
            field: "review_text",
            max: MAX_REVIEW_TEXT_LEN,
        });
    }
    reject_nul(&text, "review_text")?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> CreateReviewPayload {
        CreateReviewPayload {
            user_id: Some(2),
            business_id: Some(1),
            stars: Some(5),
            review_text: None,
        }
    }

    #[test]
    fn review_text_defaults_to_empty() {
        let new = payload().into_new().unwrap();
        assert_eq!(new.review_text, "");
        assert_eq!(new.stars, 5);
    }

    #[test]
    fn stars_bounds() {
        for stars in [0, 5] {
            let p = CreateReviewPayload {
                stars: Some(stars),
                ..payload()
            };
            assert!(p.into_new().is_ok());
        }
        for stars in [-1, 6] {
            let p = CreateReviewPayload {
                stars: Some(stars),
                ..payload()
            };
            assert!(matches!(
                p.into_new().unwrap_err(),
                ValidationError::OutOfRange { field: "stars", .. }
            ));
        }
    }

    #[test]
    fn business_id_required() {
        let p = CreateReviewPayload {
            business_id: None,
            ..payload()
        };
        assert_eq!(
            p.into_new().unwrap_err(),
            ValidationError::Missing { field: "business_id" }
        );
    }

    #[test]
    fn review_text_rejects_nul() {
        let p = CreateReviewPayload {
            review_text: Some("great\0coffee".into()),
            ..payload()
        };
        assert!(matches!(
            p.into_new().unwrap_err(),
            ValidationError::InvalidFormat { field: "review_text", .. }
        ));
    }

    #[test]
    fn review_text_limit() {
        let p = CreateReviewPayload {
            review_text: Some("a".repeat(1001)),
            ..payload()
        };
        assert!(matches!(
            p.into_new().unwrap_err(),
            ValidationError::TooLong { field: "review_text", .. }
        ));
    }

    #[test]
    fn replacement_requires_stars() {
        let edit = EditReviewPayload {
            stars: None,
            review_text: Some("better now".into()),
        };
        assert_eq!(
            edit.into_replacement().unwrap_err(),
            ValidationError::Missing { field: "stars" }
        );
    }

    #[test]
    fn patch_requires_some_field() {
        assert_eq!(
            EditReviewPayload::default().into_changes().unwrap_err(),
            ValidationError::NoChanges
        );
    }

    #[test]
    fn edit_cannot_move_review() {
        let result: Result<EditReviewPayload, _> =
            serde_json::from_str(r#"{"stars": 4, "business_id": 9}"#);
        assert!(result.is_err());
    }
}
