//! Business repository (PostgreSQL)
//!
//! - update: single UPDATE with COALESCE, so PUT and PATCH share one statement
//! - delete: reviews go with it through ON DELETE CASCADE

use async_trait::async_trait;
use sqlx::PgPool;

use super::{BusinessRepo, DbError};
use crate::models::{Business, BusinessChanges, NewBusiness, Page, Pagination};

const COLUMNS: &str = "id, owner_id, name, street_address, city, state, zip_code, created_at";

/// Business repository backed by a connection pool
#[derive(Clone)]
pub struct PgBusinessRepo {
    pool: PgPool,
}

impl PgBusinessRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BusinessRepo for PgBusinessRepo {
    async fn create(&self, business: NewBusiness) -> Result<Business, DbError> {
        let created: Business = sqlx::query_as(&format!(
            r#"
            INSERT INTO businesses (owner_id, name, street_address, city, state, zip_code)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {COLUMNS}
            "#
        ))
        .bind(business.owner_id)
        .bind(&business.name)
        .bind(&business.street_address)
        .bind(&business.city)
        .bind(&business.state)
        .bind(&business.zip_code)
        .fetch_one(&self.pool)
        .await?;

        tracing::debug!(business_id = created.id, "inserted business");
        Ok(created)
    }

    async fn get(&self, id: i64) -> Result<Business, DbError> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM businesses WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("business", id))
    }

    async fn list(&self, page: Pagination) -> Result<Page<Business>, DbError> {
        let rows: Vec<Business> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM businesses ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(page.fetch_limit()))
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::from_overfetch(rows, page))
    }

    async fn list_by_owner(&self, owner_id: i64) -> Result<Vec<Business>, DbError> {
        let rows = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM businesses WHERE owner_id = $1 ORDER BY id"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn update(&self, id: i64, changes: BusinessChanges) -> Result<Business, DbError> {
        let updated: Option<Business> = sqlx::query_as(&format!(
            r#"
            UPDATE businesses SET
                owner_id = COALESCE($2, owner_id),
                name = COALESCE($3, name),
                street_address = COALESCE($4, street_address),
                city = COALESCE($5, city),
                state = COALESCE($6, state),
                zip_code = COALESCE($7, zip_code)
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(changes.owner_id)
        .bind(changes.name)
        .bind(changes.street_address)
        .bind(changes.city)
        .bind(changes.state)
        .bind(changes.zip_code)
        .fetch_optional(&self.pool)
        .await?;

        updated.ok_or_else(|| DbError::not_found("business", id))
    }

    async fn delete(&self, id: i64) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM businesses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("business", id));
        }
        tracing::debug!(business_id = id, "deleted business and its reviews");
        Ok(())
    }
}
