//! Fluxo de Caixa
//!
//! Cash-flow aggregation, projection and alerting engine. Merges bank ledger
//! entries, payables and sales into one timeline, derives indicators and
//! multi-horizon projections, and raises aggregate alerts for the dashboard.

pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod money;
pub mod repositories;
pub mod services;
pub mod state_manager;

// Re-export commonly used types
pub use config::{AppConfig, CashFlowConfig};
pub use error::{AppError, AppResult};
pub use services::{CashFlowService, RefreshOutcome};

use database::Database;
use repositories::PgTransactionSource;
use services::AlertJournal;
use std::sync::Arc;

/// Application state: the database handle and the service built on it
pub struct AppState {
    pub database: Database,
    pub source: Arc<PgTransactionSource>,
    pub cash_flow: Arc<CashFlowService>,
}

impl AppState {
    /// Wire the PostgreSQL source into a cash-flow service
    pub fn new(pool: sqlx::PgPool, config: &AppConfig) -> AppResult<Self> {
        let database = Database::new(pool.clone());
        let source = Arc::new(PgTransactionSource::new(pool));

        let mut service = CashFlowService::new(source.clone(), config.cash_flow.clone())?;
        if let Some(dir) = &config.audit_log_dir {
            service = service.with_journal(Arc::new(AlertJournal::new(dir.clone())?));
        }

        Ok(Self {
            database,
            source,
            cash_flow: Arc::new(service),
        })
    }
}
