//! Business endpoints

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
use crate::models::{Business, BusinessPayload, Pagination};

/// Business response
#[derive(Debug, Serialize)]
pub struct BusinessResponse {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub created_at: String,
    #[serde(rename = "self")]
    pub self_url: String,
}

impl BusinessResponse {
    pub fn new(b: Business, base: &BaseUrl) -> Self {
        Self {
            self_url: base.business(b.id),
            id: b.id,
            owner_id: b.owner_id,
            name: b.name,
            street_address: b.street_address,
            city: b.city,
            state: b.state,
            zip_code: b.zip_code,
            created_at: b.created_at.to_rfc3339(),
        }
    }
}

/// Query for GET /businesses: `owner` selects the unpaginated owner listing
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusinessListParams {
    pub page: Option<u32>,
    pub owner: Option<i64>,
}

/// GET /businesses - one page of businesses, or all of one owner's
async fn list_businesses(
    State(state): State<Arc<AppState>>,
    base: BaseUrl,
    ValidQuery(params): ValidQuery<BusinessListParams>,
) -> Result<Response, ApiError> {
    if let Some(owner_id) = params.owner {
        let Json(items) = owner_businesses(&state, &base, owner_id).await?;
        return Ok(Json(items).into_response());
    }

    let page = Pagination::from(params.page);
    let result = state.businesses.list(page).await?;
    let next = base.next_page(ResourceKind::Business, result.next_page());

    Ok(Json(PageResponse {
        entries: result
            .map(|b| BusinessResponse::new(b, &base))
            .items,
        next,
    })
    .into_response())
}

/// GET /owners/{id}/businesses
async fn list_owner_businesses(
    State(state): State<Arc<AppState>>,
    base: BaseUrl,
    ResourceId(owner_id): ResourceId,
) -> Result<Json<Vec<BusinessResponse>>, ApiError> {
    owner_businesses(&state, &base, owner_id).await
}

async fn owner_businesses(
    state: &AppState,
    base: &BaseUrl,
    owner_id: i64,
) -> Result<Json<Vec<BusinessResponse>>, ApiError> {
    let businesses = state.businesses.list_by_owner(owner_id).await?;
    Ok(Json(
        businesses
            .into_iter()
            .map(|b| BusinessResponse::new(b, base))
            .collect(),
    ))
}

/// POST /businesses - create a new business
async fn create_business(
    State(state): State<Arc<AppState>>,
    base: BaseUrl,
    ValidJson(req): ValidJson<BusinessPayload>,
) -> Result<(StatusCode, Json<BusinessResponse>), ApiError> {
    let new = req.into_new()?;
    let business = state.businesses.create(new).await?;
    tracing::info!(business_id = business.id, owner_id = business.owner_id, "business created");

    Ok((StatusCode::CREATED, Json(BusinessResponse::new(business, &base))))
}

/// GET /businesses/{id} - get a single business
async fn get_business(
    State(state): State<Arc<AppState>>,
    base: BaseUrl,
    ResourceId(id): ResourceId,
) -> Result<Json<BusinessResponse>, ApiError> {
    let business = state.businesses.get(id).await?;
    Ok(Json(BusinessResponse::new(business, &base)))
}

/// PUT /businesses/{id} - replace every attribute
async fn replace_business(
    State(state): State<Arc<AppState>>,
    base: BaseUrl,
    ResourceId(id): ResourceId,
    ValidJson(req): ValidJson<BusinessPayload>,
) -> Result<Json<BusinessResponse>, ApiError> {
    let replacement = req.into_new()?;
    let business = state.businesses.update(id, replacement.into()).await?;
    tracing::info!(business_id = id, "business replaced");
    Ok(Json(BusinessResponse::new(business, &base)))
}

/// PATCH /businesses/{id} - update the given attributes
async fn patch_business(
    State(state): State<Arc<AppState>>,
    base: BaseUrl,
    ResourceId(id): ResourceId,
    ValidJson(req): ValidJson<BusinessPayload>,
) -> Result<Json<BusinessResponse>, ApiError> {
    let changes = req.into_changes()?;
    let business = state.businesses.update(id, changes).await?;
    tracing::info!(business_id = id, "business updated");
    Ok(Json(BusinessResponse::new(business, &base)))
}

/// DELETE /businesses/{id} - delete a business and its reviews
async fn delete_business(
    State(state): State<Arc<AppState>>,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, ApiError> {
    state.businesses.delete(id).await?;
    tracing::info!(business_id = id, "business deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Business routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/businesses", get(list_businesses).post(create_business))
        .route(
            "/businesses/{id}",
            get(get_business)
                .put(replace_business)
                .patch(patch_business)
                .delete(delete_business),
        )
        .route("/owners/{id}/businesses", get(list_owner_businesses))
}
