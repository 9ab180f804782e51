//! Fine settings repository

use chrono::Utc;
use sqlx::{Pool, Postgres};

use crate::{error::AppResult, models::loan::FineSettings};

#[derive(Clone)]
pub struct SettingsRepository {
    pool: Pool<Postgres>,
}

impl SettingsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Read the fine/duration policy row, if seeded
    pub async fn get_fine_settings(&self) -> AppResult<Option<FineSettings>> {
        let settings = sqlx::query_as::<_, FineSettings>(
            "SELECT fine_per_day, default_loan_days, max_loan_days, lost_book_fine \
             FROM fine_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(settings)
    }

    /// Update the fine/duration policy, creating the row if missing
    pub async fn update_fine_settings(&self, settings: &FineSettings) -> AppResult<FineSettings> {
        let now = Utc::now();

        // Try to update existing record first
        let rows_affected = sqlx::query(
            r#"
            UPDATE fine_settings
            SET fine_per_day = $1, default_loan_days = $2,
                max_loan_days = $3, lost_book_fine = $4, updated_at = $5
            WHERE id = 1
            "#,
        )
        .bind(settings.fine_per_day)
        .bind(settings.default_loan_days)
        .bind(settings.max_loan_days)
        .bind(settings.lost_book_fine)
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        // If no row was updated, insert a new one
        if rows_affected == 0 {
            sqlx::query(
                r#"
                INSERT INTO fine_settings
                    (id, fine_per_day, default_loan_days, max_loan_days, lost_book_fine, updated_at)
                VALUES (1, $1, $2, $3, $4, $5)
                "#,
            )
            .bind(settings.fine_per_day)
            .bind(settings.default_loan_days)
            .bind(settings.max_loan_days)
            .bind(settings.lost_book_fine)
            .bind(now)
            .execute(&self.pool)
            .await?;
        }

        Ok(settings.clone())
    }
}
