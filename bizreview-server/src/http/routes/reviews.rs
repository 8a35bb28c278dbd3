//! Review endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::PageResponse;
use crate::http::error::ApiError;
use crate::http::extractors::{ResourceId, ValidJson, ValidQuery};
use crate::http::links::{BaseUrl, ResourceKind};
use crate::http::server::AppState;
use crate::models::{CreateReviewPayload, EditReviewPayload, Pagination, Review};

/// Review response with links to itself and its business
#[derive(Debug, Serialize)]
pub struct ReviewResponse {
    pub id: i64,
    pub user_id: i64,
    pub business_id: i64,
    pub stars: i32,
    pub review_text: String,
    pub created_at: String,
    #[serde(rename = "self")]
    pub self_url: String,
    pub business: String,
}

impl ReviewResponse {
    pub fn new(r: Review, base: &BaseUrl) -> Self {
        Self {
            self_url: base.review(r.id),
            business: base.business(r.business_id),
            id: r.id,
            user_id: r.user_id,
            business_id: r.business_id,
            stars: r.stars,
            review_text: r.review_text,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Query for GET /reviews: `user` selects the unpaginated reviewer listing
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewListParams {
    pub page: Option<u32>,
    pub user: Option<i64>,
}

/// GET /reviews - one page of reviews, or all of one user's
async fn list_reviews(
    State(state): State<Arc<AppState>>,
    base: BaseUrl,
    ValidQuery(params): ValidQuery<ReviewListParams>,
) -> Result<Response, ApiError> {
    if let Some(user_id) = params.user {
        let Json(items) = user_reviews(&state, &base, user_id).await?;
        return Ok(Json(items).into_response());
    }

    let page = Pagination::from(params.page);
    let result = state.reviews.list(page).await?;
    let next = base.next_page(ResourceKind::Review, result.next_page());

    Ok(Json(PageResponse {
        entries: result.map(|r| ReviewResponse::new(r, &base)).items,
        next,
    })
    .into_response())
}

/// GET /users/{id}/reviews
async fn list_user_reviews(
    State(state): State<Arc<AppState>>,
    base: BaseUrl,
    ResourceId(user_id): ResourceId,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    user_reviews(&state, &base, user_id).await
}

async fn user_reviews(
    state: &AppState,
    base: &BaseUrl,
    user_id: i64,
) -> Result<Json<Vec<ReviewResponse>>, ApiError> {
    let reviews = state.reviews.list_by_user(user_id).await?;
    Ok(Json(
        reviews
            .into_iter()
            .map(|r| ReviewResponse::new(r, base))
            .collect(),
    ))
}

/// POST /reviews - create a review of an existing business
async fn create_review(
    State(state): State<Arc<AppState>>,
    base: BaseUrl,
    ValidJson(req): ValidJson<CreateReviewPayload>,
) -> Result<(StatusCode, Json<ReviewResponse>), ApiError> {
    let new = req.into_new()?;
    let review = state.reviews.create(new).await?;
    tracing::info!(
        review_id = review.id,
        business_id = review.business_id,
        user_id = review.user_id,
        "review created"
    );

    Ok((StatusCode::CREATED, Json(ReviewResponse::new(review, &base))))
}

/// GET /reviews/{id} - get a single review
async fn get_review(
    State(state): State<Arc<AppState>>,
    base: BaseUrl,
    ResourceId(id): ResourceId,
) -> Result<Json<ReviewResponse>, ApiError> {
    let review = state.reviews.get(id).await?;
    Ok(Json(ReviewResponse::new(review, &base)))
}

/// PUT /reviews/{id} - set stars, and text if given
async fn replace_review(
    State(state): State<Arc<AppState>>,
    base: BaseUrl,
    ResourceId(id): ResourceId,
    ValidJson(req): ValidJson<EditReviewPayload>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let changes = req.into_replacement()?;
    let review = state.reviews.update(id, changes).await?;
    tracing::info!(review_id = id, "review replaced");
    Ok(Json(ReviewResponse::new(review, &base)))
}

/// PATCH /reviews/{id} - update the given fields
async fn patch_review(
    State(state): State<Arc<AppState>>,
    base: BaseUrl,
    ResourceId(id): ResourceId,
    ValidJson(req): ValidJson<EditReviewPayload>,
) -> Result<Json<ReviewResponse>, ApiError> {
    let changes = req.into_changes()?;
    let review = state.reviews.update(id, changes).await?;
    tracing::info!(review_id = id, "review updated");
    Ok(Json(ReviewResponse::new(review, &base)))
}

/// DELETE /reviews/{id}
async fn delete_review(
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, ApiError> {
    state.reviews.delete(id).await?;
    tracing::info!(review_id = id, "review deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Review routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/reviews", get(list_reviews).post(create_review))
        .route(
            "/reviews/{id}",
            get(get_review)
                .put(replace_review)
                .patch(patch_review)
                .delete(delete_review),
        )
        .route("/users/{id}/reviews", get(list_user_reviews))
}
