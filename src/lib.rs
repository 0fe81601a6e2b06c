//! Boat Budget Server
//!
//! REST JSON API for boat records, their equipment checklists and the
//! projected cost of putting each boat back in shape.

use std::sync::Arc;

pub mod access;
pub mod api;
pub mod config;
pub mod error;
pub mod ledger;
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
