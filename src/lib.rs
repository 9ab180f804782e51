//! Pustaka Library Management System
//!
//! A Rust REST API server for a digital library: role-gated catalog
//! browsing, a staff-to-admin book approval pipeline, and a transactional
//! borrow/return engine with fine calculation.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
