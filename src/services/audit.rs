use crate::error::{AppError, AppResult};
use crate::models::{Alert, AlertStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::info;

/// One line of the alert journal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub timestamp: i64,
    pub entry_type: String, // "alert_resolved", "alert_dismissed", "refresh_committed"
    pub alert_id: Option<String>,
    pub details: serde_json::Value,
}

/// Append-only JSON-lines journal of alert transitions and refreshes, one
/// file per day.
///
/// Alert status flips are in-memory only; callers that want them to outlive a
/// refresh read them back from here.
pub struct AlertJournal {
    log_directory: PathBuf,
    // file for the day of the last write
    current: Mutex<Option<(NaiveDate, File)>>,
}

impl AlertJournal {
    /// Journal writing under `log_directory`, created if missing
    pub fn new(log_directory: PathBuf) -> AppResult<Self> {
        std::fs::create_dir_all(&log_directory)
            .map_err(|e| AppError::Message(format!("Failed to create journal directory: {}", e)))?;

        info!("Alert journal initialized in {:?}", log_directory);

        Ok(Self {
            log_directory,
            current: Mutex::new(None),
        })
    }

    /// File holding the entries written on `date`
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.log_directory
            .join(format!("alertas_{}.log", date.format("%Y-%m-%d")))
    }

    /// Append an entry to the file of the day it was written
    pub async fn log(&self, entry: JournalEntry, now: DateTime<Utc>) -> AppResult<()> {
        let json = serde_json::to_string(&entry)?;
        let today = now.date_naive();

        let mut current = self.current.lock().await;
        if current.as_ref().map_or(true, |(day, _)| *day != today) {
            let path = self.path_for(today);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| AppError::Message(format!("Failed to open journal file: {}", e)))?;
            info!("Alert journal rolled over to {:?}", path);
            *current = Some((today, file));
        }

        let file = match current.as_mut() {
            Some((_, file)) => file,
            None => return Err(AppError::Message("Journal file not open".to_string())),
        };

        writeln!(file, "{}", json)
            .map_err(|e| AppError::Message(format!("Failed to write journal: {}", e)))?;
        file.flush()
            .map_err(|e| AppError::Message(format!("Failed to flush journal: {}", e)))?;

        Ok(())
    }

    /// Log an alert leaving the active state
    pub async fn log_transition(&self, alert: &Alert, now: DateTime<Utc>) -> AppResult<()> {
        let entry_type = match alert.status {
            AlertStatus::Resolved => "alert_resolved",
            AlertStatus::Dismissed => "alert_dismissed",
            AlertStatus::Active => "alert_active",
        };

        let entry = JournalEntry {
            timestamp: now.timestamp(),
            entry_type: entry_type.to_string(),
            alert_id: Some(alert.id.clone()),
            details: serde_json::json!({
                "kind": alert.kind.as_str(),
                "status": alert.status.as_str(),
                "title": alert.title,
                "impact": alert.impact.map(|i| i.to_string()),
            }),
        };

        self.log(entry, now).await
    }

    /// Log a committed refresh
    pub async fn log_refresh(
        &self,
        generation: u64,
        movements: usize,
        dropped: usize,
        failed_sources: &[&str],
        active_alerts: usize,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let entry = JournalEntry {
            timestamp: now.timestamp(),
            entry_type: "refresh_committed".to_string(),
            alert_id: None,
            details: serde_json::json!({
                "generation": generation,
                "movements": movements,
                "dropped_records": dropped,
                "failed_sources": failed_sources,
                "active_alerts": active_alerts,
            }),
        };

        self.log(entry, now).await
    }
}
