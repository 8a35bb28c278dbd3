//! Route handlers organized by resource

pub mod health;
pub mod businesses;
pub mod reviews;

use serde::Serialize;

/// Paginated list body: `{"entries": [...], "next": "..."}`, with `next`
/// omitted on the last page.
#[derive(Debug, Serialize)]
pub struct PageResponse<T> {
    pub entries: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}
