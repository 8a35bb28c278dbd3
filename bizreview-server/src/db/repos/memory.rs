//! In-memory repository
//!
//! Enforces the same constraints as the PostgreSQL schema: review foreign key,
//! one review per (user_id, business_id), cascade on business delete. Ids start
//! at 1 and are never reused.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::{BusinessRepo, DbError, ReviewRepo};
use crate::models::{
    Business, BusinessChanges, NewBusiness, NewReview, Page, Pagination, Review, ReviewChanges,
};

#[derive(Debug, Default)]
struct Tables {
    businesses: BTreeMap<i64, Business>,
    reviews: BTreeMap<i64, Review>,
    business_seq: i64,
    review_seq: i64,
}

/// Shared in-memory store; clones see the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // Every mutation completes before the guard drops, so a poisoned
        // lock still holds consistent tables.
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn page_of<T: Clone>(rows: &BTreeMap<i64, T>, page: Pagination) -> Page<T> {
    let window = rows
        .values()
        .skip(page.offset() as usize)
        .take(page.fetch_limit() as usize)
        .cloned()
        .collect();
    Page::from_overfetch(window, page)
}

#[async_trait]
impl BusinessRepo for MemoryStore {
    async fn create(&self, business: NewBusiness) -> Result<Business, DbError> {
        let mut tables = self.lock();
        tables.business_seq += 1;
        let created = Business {
            id: tables.business_seq,
            owner_id: business.owner_id,
            name: business.name,
            street_address: business.street_address,
            city: business.city,
            state: business.state,
            zip_code: business.zip_code,
            created_at: Utc::now(),
        };
        tables.businesses.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Business, DbError> {
        self.lock()
            .businesses
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found("business", id))
    }

    async fn list(&self, page: Pagination) -> Result<Page<Business>, DbError> {
        Ok(page_of(&self.lock().businesses, page))
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Business>, DbError> {
        Ok(self
            .lock()
            .businesses
            .values()
            .filter(|b| b.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, changes: BusinessChanges) -> Result<Business, DbError> {
        let mut tables = self.lock();
        let business = tables
            .businesses
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("business", id))?;
        changes.apply(business);
        Ok(business.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        let mut tables = self.lock();
        if tables.businesses.remove(&id).is_none() {
            return Err(DbError::not_found("business", id));
        }
        tables.reviews.retain(|_, r| r.business_id != id);
        Ok(())
    }
}

#[async_trait]
impl ReviewRepo for MemoryStore {
    async fn create(&self, review: NewReview) -> Result<Review, DbError> {
        let mut tables = self.lock();
        if !tables.businesses.contains_key(&review.business_id) {
            return Err(DbError::not_found("business", review.business_id));
        }
        let duplicate = tables
            .reviews
            .values()
            .any(|r| r.user_id == review.user_id && r.business_id == review.business_id);
        if duplicate {
            return Err(DbError::duplicate_review());
        }

        tables.review_seq += 1;
        let created = Review {
            id: tables.review_seq,
            user_id: review.user_id,
            business_id: review.business_id,
            stars: review.stars,
            review_text: review.review_text,
            created_at: Utc::now(),
        };
        tables.reviews.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Review, DbError> {
        self.lock()
            .reviews
            .get(&id)
            .cloned()
            .ok_or_else(|| DbError::not_found("review", id))
    }

    async fn list(&self, page: Pagination) -> Result<Page<Review>, DbError> {
        Ok(page_of(&self.lock().reviews, page))
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Review>, DbError> {
        Ok(self
            .lock()
            .reviews
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update(&self, id: i64, changes: ReviewChanges) -> Result<Review, DbError> {
        let mut tables = self.lock();
        let review = tables
            .reviews
            .get_mut(&id)
            .ok_or_else(|| DbError::not_found("review", id))?;
        changes.apply(review);
        Ok(review.clone())
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        match self.lock().reviews.remove(&id) {
            Some(_) => Ok(()),
            None => Err(DbError::not_found("review", id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cafe(owner_id: i64) -> NewBusiness {
        NewBusiness {
            owner_id,
            name: "Cafe X".into(),
            street_address: "1 Main St".into(),
            city: "Corvallis".into(),
            state: "OR".into(),
            zip_code: "97330".into(),
        }
    }

    fn five_stars(user_id: i64, business_id: i64) -> NewReview {
        NewReview {
            user_id,
            business_id,
            stars: 5,
            review_text: String::new(),
        }
    }

    #[tokio::test]
    async fn ids_start_at_one() {
        let store = MemoryStore::new();
        let b = BusinessRepo::create(&store, cafe(1)).await.unwrap();
        assert_eq!(b.id, 1);
        let r = ReviewRepo::create(&store, five_stars(2, b.id)).await.unwrap();
        assert_eq!(r.id, 1);
    }

    #[tokio::test]
    async fn review_needs_existing_business() {
        let store = MemoryStore::new();
        let err = ReviewRepo::create(&store, five_stars(2, 42)).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { resource: "business", .. }));
        assert!(ReviewRepo::list_by_user(&store, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_review_conflicts() {
        let store = MemoryStore::new();
        let b = BusinessRepo::create(&store, cafe(1)).await.unwrap();
        let first = ReviewRepo::create(&store, five_stars(2, b.id)).await.unwrap();

        let err = ReviewRepo::create(&store, NewReview { stars: 1, ..five_stars(2, b.id) })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Conflict { .. }));

        let unchanged = ReviewRepo::get(&store, first.id).await.unwrap();
        assert_eq!(unchanged, first);
    }

    #[tokio::test]
    async fn delete_business_cascades() {
        let store = MemoryStore::new();
        let keep = BusinessRepo::create(&store, cafe(1)).await.unwrap();
        let doomed = BusinessRepo::create(&store, cafe(1)).await.unwrap();
        let kept_review = ReviewRepo::create(&store, five_stars(2, keep.id)).await.unwrap();
        let doomed_review = ReviewRepo::create(&store, five_stars(2, doomed.id)).await.unwrap();

        BusinessRepo::delete(&store, doomed.id).await.unwrap();

        assert!(ReviewRepo::get(&store, doomed_review.id).await.is_err());
        assert!(ReviewRepo::get(&store, kept_review.id).await.is_ok());
    }

    #[tokio::test]
    async fn ids_not_reused_after_delete() {
        let store = MemoryStore::new();
        let first = BusinessRepo::create(&store, cafe(1)).await.unwrap();
        BusinessRepo::delete(&store, first.id).await.unwrap();
        let second = BusinessRepo::create(&store, cafe(1)).await.unwrap();
        assert_eq!(second.id, 2);
    }

    #[tokio::test]
    async fn list_pages_in_id_order() {
        let store = MemoryStore::new();
        for _ in 0..4 {
            BusinessRepo::create(&store, cafe(1)).await.unwrap();
        }

        let first = BusinessRepo::list(&store, Pagination::new(1)).await.unwrap();
        let ids: Vec<i64> = first.items.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert!(first.has_next);

        let second = BusinessRepo::list(&store, Pagination::new(2)).await.unwrap();
        assert_eq!(second.items.len(), 1);
        assert!(!second.has_next);
    }

    #[tokio::test]
    async fn missing_rows_are_not_found() {
        let store = MemoryStore::new();
        assert!(matches!(
            BusinessRepo::update(&store, 9, BusinessChanges::default()).await,
            Err(DbError::NotFound { .. })
        ));
        assert!(matches!(
            ReviewRepo::delete(&store, 9).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
