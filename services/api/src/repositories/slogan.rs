//! PostgreSQL slogan repository

use async_trait::async_trait;
use sqlx::PgPool;

use super::SloganRepository;
use crate::{error::StoreResult, models::Slogan};

/// Slogan repository
#[derive(Clone)]
pub struct PgSloganRepository {
    pool: PgPool,
}

impl PgSloganRepository {
    /// Create a new slogan repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SloganRepository for PgSloganRepository {
    async fn create_slogan(&self, user_id: i32, text: &str) -> StoreResult<Slogan> {
        let mut tx = self.pool.begin().await?;

        let slogan = sqlx::query_as::<_, Slogan>(
            r#"
            INSERT INTO slogans (user_id, slogan)
            VALUES ($1, $2)
            RETURNING id, user_id, slogan, created_at
            "#,
        )
        .bind(user_id)
        .bind(text)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(slogan)
    }

    async fn list_slogans_by_user(&self, user_id: i32) -> StoreResult<Vec<Slogan>> {
        let slogans = sqlx::query_as::<_, Slogan>(
            r#"
            SELECT id, user_id, slogan, created_at
            FROM slogans
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(slogans)
    }

    async fn list_all_slogans(&self) -> StoreResult<Vec<Slogan>> {
        let slogans =
            sqlx::query_as::<_, Slogan>("SELECT id, user_id, slogan, created_at FROM slogans")
                .fetch_all(&self.pool)
                .await?;

        Ok(slogans)
    }
}
