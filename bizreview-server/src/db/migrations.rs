//! Schema for businesses and reviews
//!
//! Idempotent: every statement is `IF NOT EXISTS`, so this runs on each start.

use sqlx::PgPool;

/// Run all migrations
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS businesses (
            id BIGSERIAL PRIMARY KEY,
            owner_id BIGINT NOT NULL,
            name VARCHAR(50) NOT NULL,
            street_address VARCHAR(100) NOT NULL,
            city VARCHAR(50) NOT NULL,
            state VARCHAR(2) NOT NULL,
            zip_code VARCHAR(5) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Deleting a business removes its reviews in the same statement.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS reviews (
            id BIGSERIAL PRIMARY KEY,
            user_id BIGINT NOT NULL,
            business_id BIGINT NOT NULL REFERENCES businesses(id) ON DELETE CASCADE,
            stars INTEGER NOT NULL CHECK (stars BETWEEN 0 AND 5),
            review_text VARCHAR(1000) NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            CONSTRAINT reviews_user_business_key UNIQUE (user_id, business_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_businesses_owner ON businesses(owner_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_reviews_business ON reviews(business_id)")
        .execute(pool)
        .await?;

    tracing::info!("Migrations complete");
    Ok(())
}
