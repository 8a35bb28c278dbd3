//! Repository tests against a real PostgreSQL
//!
//! Run with: DATABASE_URL=postgres://... cargo test -p bizreview-server -- --ignored
//!
//! Tests share one database, so they work with the ids they create and use
//! distinct owner/user ids per run instead of assuming an empty table.

use bizreview_server::db::{create_pool, migrations, PgBusinessRepo, PgReviewRepo};
use bizreview_server::models::{BusinessChanges, NewBusiness, NewReview, ReviewChanges};
use bizreview_server::{BusinessRepo, DbError, ReviewRepo};
use chrono::Utc;
use sqlx::PgPool;

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
    let pool = create_pool(&url).await.expect("pool creation failed");
    migrations::run(&pool).await.expect("migrations failed");
    pool
}

/// Owner/user id unlikely to collide with earlier runs
fn fresh_id() -> i64 {
    Utc::now().timestamp_micros()
}

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

#[tokio::test]
#[ignore = "requires database"]
async fn migrations_are_idempotent() {
    let pool = pool().await;
    migrations::run(&pool).await.expect("second run failed");
}

#[tokio::test]
#[ignore = "requires database"]
async fn business_round_trip() {
    let pool = pool().await;
    let repo = PgBusinessRepo::new(pool);
    let owner = fresh_id();

    let created = repo.create(cafe(owner)).await.unwrap();
    let fetched = repo.get(created.id).await.unwrap();
    assert_eq!(fetched.name, "Cafe X");
    assert_eq!(fetched.owner_id, owner);

    let changes = BusinessChanges {
        city: Some("Albany".into()),
        ..Default::default()
    };
    let once = repo.update(created.id, changes.clone()).await.unwrap();
    let twice = repo.update(created.id, changes).await.unwrap();
    assert_eq!(once, twice);

    let owned = repo.list_by_owner(owner).await.unwrap();
    assert_eq!(owned.len(), 1);

    repo.delete(created.id).await.unwrap();
    assert!(matches!(
        repo.get(created.id).await,
        Err(DbError::NotFound { .. })
    ));
}

#[tokio::test]
#[ignore = "requires database"]
async fn review_constraints_are_translated() {
    let pool = pool().await;
    let businesses = PgBusinessRepo::new(pool.clone());
    let reviews = PgReviewRepo::new(pool);
    let user = fresh_id();

    let business = businesses.create(cafe(user)).await.unwrap();
    let review = NewReview {
        user_id: user,
        business_id: business.id,
        stars: 5,
        review_text: String::new(),
    };

    let first = reviews.create(review.clone()).await.unwrap();
    let duplicate = reviews.create(review.clone()).await;
    assert!(matches!(duplicate, Err(DbError::Conflict { .. })));

    let orphan = reviews
        .create(NewReview {
            business_id: -1,
            ..review
        })
        .await;
    assert!(matches!(
        orphan,
        Err(DbError::NotFound { resource: "business", .. })
    ));

    let edited = reviews
        .update(
            first.id,
            ReviewChanges {
                stars: Some(2),
                review_text: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.stars, 2);
    assert_eq!(edited.review_text, "");

    // cascade
    businesses.delete(business.id).await.unwrap();
    assert!(matches!(
        reviews.get(first.id).await,
        Err(DbError::NotFound { .. })
    ));
    assert!(reviews.list_by_user(user).await.unwrap().is_empty());
}
