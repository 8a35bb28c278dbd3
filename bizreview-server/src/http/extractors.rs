//! Custom Axum extractors
//!
//! All rejections become [`ApiError::Validation`] so clients always get the
//! JSON error shape, never axum's plain-text rejections.

use std::sync::Arc;

use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::header::HOST;
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;

use super::error::ApiError;
use super::links::BaseUrl;
use super::server::AppState;
use crate::models::ValidationError;

/// Extract and validate a numeric id from the path
pub struct ResourceId(pub i64);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id): Path<String> = Path::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(ValidationError::Empty { field: "id" }))?;

        let id = id.parse::<i64>().map_err(|_| {
            ApiError::Validation(ValidationError::InvalidFormat {
                field: "id",
                reason: "must be an integer",
            })
        })?;

        Ok(Self(id))
    }
}

/// JSON body with decode failures reported as validation errors
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ApiError::Validation(ValidationError::Malformed {
                reason: rejection.body_text(),
            })
        })?;
        Ok(Self(value))
    }
}

/// Query string with decode failures reported as validation errors
pub struct ValidQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| {
                ApiError::Validation(ValidationError::Malformed {
                    reason: rejection.body_text(),
                })
            })?;
        Ok(Self(value))
    }
}

/// Base URL for links: the configured public URL, else the request's own
/// scheme and host.
impl FromRequestParts<Arc<AppState>> for BaseUrl {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        if let Some(public_url) = &state.public_url {
            return Ok(public_url.clone());
        }
        Ok(base_url_from_parts(parts))
    }
}

fn base_url_from_parts(parts: &Parts) -> BaseUrl {
    let scheme = parts
        .headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| parts.uri.scheme_str())
        .unwrap_or("http");

    let authority = parts
        .uri
        .authority()
        .map(|a| a.as_str())
        .or_else(|| parts.headers.get(HOST).and_then(|v| v.to_str().ok()))
        .unwrap_or_else(|| {
            tracing::debug!("request carries no host, linking to localhost");
            "localhost"
        });

    BaseUrl::from_parts(scheme, authority)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request as HttpRequest;

    fn parts(builder: axum::http::request::Builder) -> Parts {
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn base_url_from_host_header() {
        let p = parts(HttpRequest::builder().uri("/businesses").header(HOST, "api.test:8080"));
        assert_eq!(base_url_from_parts(&p).as_str(), "http://api.test:8080");
    }

    #[test]
    fn forwarded_proto_wins() {
        let p = parts(
            HttpRequest::builder()
                .uri("/businesses")
                .header(HOST, "api.test")
                .header("x-forwarded-proto", "https, http"),
        );
        assert_eq!(base_url_from_parts(&p).as_str(), "https://api.test");
    }

    #[test]
    fn absolute_uri_authority() {
        let p = parts(HttpRequest::builder().uri("http://h2.test/reviews"));
        assert_eq!(base_url_from_parts(&p).as_str(), "http://h2.test");
    }

    #[test]
    fn no_host_falls_back_to_localhost() {
        let p = parts(HttpRequest::builder().uri("/"));
        assert_eq!(base_url_from_parts(&p).as_str(), "http://localhost");
    }
}
