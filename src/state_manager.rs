use crate::error::{option_to_result, AppError, AppResult};
use crate::models::{
    Alert, AlertStatus, CategoryTotal, DailyFlow, IndicatorSnapshot, Projection, SourceKind,
};
use crate::repositories::DateWindow;
use crate::services::unifier::DroppedRecord;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A source read that failed during a refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFailure {
    pub source: SourceKind,
    pub message: String,
}

/// What a refresh could not use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshDiagnostics {
    pub window: DateWindow,
    pub source_failures: Vec<SourceFailure>,
    pub dropped: Vec<DroppedRecord>,
}

impl RefreshDiagnostics {
    pub fn is_partial(&self) -> bool {
        !self.source_failures.is_empty() || !self.dropped.is_empty()
    }

    pub fn failed(&self, source: SourceKind) -> bool {
        self.source_failures.iter().any(|f| f.source == source)
    }
}

/// Everything one refresh produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub generation: u64,
    pub movement_count: usize,
    pub snapshot: IndicatorSnapshot,
    pub projections: Vec<Projection>,
    /// All alerts of the refresh, whatever their status
    pub alerts: Vec<Alert>,
    pub daily_flow: Vec<DailyFlow>,
    pub category_summary: Vec<CategoryTotal>,
    pub diagnostics: RefreshDiagnostics,
}

impl Dashboard {
    pub fn active_alerts(&self) -> Vec<Alert> {
        self.alerts.iter().filter(|a| a.is_active()).cloned().collect()
    }
}

/// Most recent committed dashboard, versioned by refresh generation.
///
/// A refresh takes a generation when it starts and may only commit while that
/// generation is still the latest requested, so a slow refresh never
/// overwrites the result of one started after it.
pub struct SnapshotCache {
    requested: AtomicU64,
    committed: RwLock<Option<Dashboard>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self {
            requested: AtomicU64::new(0),
            committed: RwLock::new(None),
        }
    }

    /// Claim the next generation
    pub fn begin_refresh(&self) -> u64 {
        self.requested.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn latest_requested(&self) -> u64 {
        self.requested.load(Ordering::SeqCst)
    }

    /// Store `dashboard` if its generation is still the latest requested.
    /// Returns whether it was committed.
    pub async fn commit(&self, dashboard: Dashboard) -> bool {
        let mut slot = self.committed.write().await;

        let latest = self.latest_requested();
        if dashboard.generation != latest {
            debug!(
                "Discarding stale refresh generation {} (latest {})",
                dashboard.generation, latest
            );
            return false;
        }

        if let Some(current) = slot.as_ref() {
            if current.generation >= dashboard.generation {
                return false;
            }
        }

        info!("Committed refresh generation {}", dashboard.generation);
        *slot = Some(dashboard);
        true
    }

    /// Copy of the committed dashboard, if any
    pub async fn current(&self) -> Option<Dashboard> {
        self.committed.read().await.clone()
    }

    pub async fn committed_generation(&self) -> Option<u64> {
        self.committed.read().await.as_ref().map(|d| d.generation)
    }

    /// Move an active alert of the committed dashboard to `target`
    pub async fn transition_alert(&self, alert_id: &str, target: AlertStatus) -> AppResult<Alert> {
        let mut slot = self.committed.write().await;
        let dashboard = slot
            .as_mut()
            .ok_or_else(|| AppError::NotFound(format!("Alert {} (no dashboard loaded)", alert_id)))?;

        let alert = option_to_result(
            dashboard.alerts.iter_mut().find(|a| a.id == alert_id),
            &format!("Alert {}", alert_id),
        )?;

        if !alert.transition(target) {
            return Err(AppError::BusinessLogic(format!(
                "Alert {} is already {}",
                alert_id,
                alert.status.as_str()
            )));
        }

        Ok(alert.clone())
    }
}

impl Default for SnapshotCache {
    fn default() -> Self {
        Self::new()
    }
}
