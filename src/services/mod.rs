//! Business logic services

pub mod approvals;
pub mod catalog;
pub mod loans;
pub mod settings;

use crate::{
    config::{ApprovalConfig, LoansConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub approvals: approvals::ApprovalsService,
    pub loans: loans::LoansService,
    pub settings: settings::SettingsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        loans_config: LoansConfig,
        approval_config: ApprovalConfig,
    ) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone()),
            approvals: approvals::ApprovalsService::new(repository.clone(), approval_config),
            loans: loans::LoansService::new(repository.clone(), loans_config.clone()),
            settings: settings::SettingsService::new(repository, loans_config),
        }
    }
}
