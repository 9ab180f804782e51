//! Fine settings service

use validator::Validate;

use crate::{
    config::LoansConfig,
    error::{AppError, AppResult},
    models::loan::FineSettings,
    repository::Repository,
};

#[derive(Clone)]
pub struct SettingsService {
    repository: Repository,
    defaults: LoansConfig,
}

impl SettingsService {
    pub fn new(repository: Repository, defaults: LoansConfig) -> Self {
        Self {
            repository,
            defaults,
        }
    }

    /// Get the current fine/duration policy
    pub async fn get_fine_settings(&self) -> AppResult<FineSettings> {
        Ok(self
            .repository
            .settings
            .get_fine_settings()
            .await?
            .unwrap_or_else(|| FineSettings::from(&self.defaults)))
    }

    /// Update the fine/duration policy
    pub async fn update_fine_settings(&self, settings: FineSettings) -> AppResult<FineSettings> {
        settings.validate()?;
        if settings.default_loan_days > settings.max_loan_days {
            return Err(AppError::Validation(
                "Default loan duration cannot exceed the maximum".to_string(),
            ));
        }
        self.repository.settings.update_fine_settings(&settings).await
    }
}
