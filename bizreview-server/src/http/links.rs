//! Hypermedia links
//!
//! The only place that knows URL templates. Everything is derived from
//! `(base URL, resource kind, id)`; nothing here is persisted.

use std::fmt;

/// Addressable resource collections
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Business,
    Review,
}

impl ResourceKind {
    /// Collection path segment
    pub fn collection(self) -> &'static str {
        match self {
            Self::Business => "businesses",
            Self::Review => "reviews",
        }
    }
}

/// Absolute URL for a single resource.
pub fn resource_url(base: &str, kind: ResourceKind, id: i64) -> String {
    format!("{}/{}/{}", base.trim_end_matches('/'), kind.collection(), id)
}

/// Absolute URL for a page of a collection.
pub fn page_url(base: &str, kind: ResourceKind, page: u32) -> String {
    format!(
        "{}/{}?page={}",
        base.trim_end_matches('/'),
        kind.collection(),
        page
    )
}

/// Scheme and authority that links are built on, without a trailing slash
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    pub fn new(url: impl Into<String>) -> Self {
        let mut url = url.into();
        while url.ends_with('/') {
            url.pop();
        }
        Self(url)
    }

    /// Base URL from request metadata, e.g. `("https", "api.example.com")`.
    pub fn from_parts(scheme: &str, authority: &str) -> Self {
        Self::new(format!("{}://{}", scheme, authority))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn business(&self, id: i64) -> String {
        resource_url(&self.0, ResourceKind::Business, id)
    }

    pub fn review(&self, id: i64) -> String {
        resource_url(&self.0, ResourceKind::Review, id)
    }

    /// `next` link, present only when there is a following page.
    pub fn next_page(&self, kind: ResourceKind, next: Option<u32>) -> Option<String> {
        next.map(|page| page_url(&self.0, kind, page))
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn resource_urls() {
        let base = BaseUrl::new("http://localhost:8080");
        assert_eq!(base.business(1), "http://localhost:8080/businesses/1");
        assert_eq!(base.review(7), "http://localhost:8080/reviews/7");
    }

    #[test]
    fn trailing_slashes_trimmed() {
        let base = BaseUrl::new("https://api.example.com//");
        assert_eq!(base.as_str(), "https://api.example.com");
        assert_eq!(base.business(3), "https://api.example.com/businesses/3");
        assert_eq!(
            resource_url("https://api.example.com/", ResourceKind::Review, 3),
            "https://api.example.com/reviews/3"
        );
    }

    #[test]
    fn next_link_only_when_next_page() {
        let base = BaseUrl::from_parts("http", "localhost");
        assert_eq!(
            base.next_page(ResourceKind::Business, Some(2)).as_deref(),
            Some("http://localhost/businesses?page=2")
        );
        assert_eq!(base.next_page(ResourceKind::Review, None), None);
    }

    proptest! {
        #[test]
        fn same_id_same_url(id in any::<i64>(), slashes in 0usize..4) {
            let plain = BaseUrl::new("http://h");
            let slashed = BaseUrl::new(format!("http://h{}", "/".repeat(slashes)));
            prop_assert_eq!(plain.business(id), slashed.business(id));
            let suffix = format!("/reviews/{}", id);
            prop_assert!(plain.review(id).ends_with(&suffix));
        }
    }
}
