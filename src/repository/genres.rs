//! Genres repository for database operations

use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::genre::Genre};

#[derive(Clone)]
pub struct GenresRepository {
    pool: Pool<Postgres>,
}

impl GenresRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// List all genres
    pub async fn list(&self) -> AppResult<Vec<Genre>> {
        let genres = sqlx::query_as::<_, Genre>("SELECT * FROM genres ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(genres)
    }
}
