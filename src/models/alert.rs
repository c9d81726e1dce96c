use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Rule that produced an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    LowBalance,
    OverduePayables,
    UpcomingPayables,
    NegativeProjection,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::LowBalance => "low_balance",
            AlertKind::OverduePayables => "overdue_payables",
            AlertKind::UpcomingPayables => "upcoming_payables",
            AlertKind::NegativeProjection => "negative_projection",
        }
    }

    /// Alert ids are stable within a day so the UI can address them
    pub fn alert_id(&self, today: NaiveDate) -> String {
        format!("{}_{}", self.as_str(), today.format("%Y-%m-%d"))
    }
}

/// Ordered from most to least severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

/// Ordered from most to least urgent
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    Active,
    Resolved,
    Dismissed,
}

impl AlertStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertStatus::Active => "active",
            AlertStatus::Resolved => "resolved",
            AlertStatus::Dismissed => "dismissed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub title: String,
    pub description: String,
    pub impact: Option<Decimal>,
    /// Number of underlying records for aggregate alerts
    pub count: Option<usize>,
    pub priority: AlertPriority,
    pub actions: Vec<String>,
    pub status: AlertStatus,
    pub created_at: DateTime<Utc>,
}

impl Alert {
    pub fn is_active(&self) -> bool {
        self.status == AlertStatus::Active
    }

    /// Move an active alert to `target`. Returns false if the alert was not active.
    pub fn transition(&mut self, target: AlertStatus) -> bool {
        if !self.is_active() || target == AlertStatus::Active {
            return false;
        }
        self.status = target;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Alert {
        Alert {
            id: "low_balance_2024-05-10".to_string(),
            kind: AlertKind::LowBalance,
            severity: AlertSeverity::Warning,
            title: "Saldo baixo".to_string(),
            description: String::new(),
            impact: None,
            count: None,
            priority: AlertPriority::Medium,
            actions: vec![],
            status: AlertStatus::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_transition_only_from_active() {
        let mut alert = sample();
        assert!(alert.transition(AlertStatus::Dismissed));
        assert_eq!(alert.status, AlertStatus::Dismissed);
        assert!(!alert.transition(AlertStatus::Resolved));
        assert_eq!(alert.status, AlertStatus::Dismissed);
    }

    #[test]
    fn test_severity_ordering() {
        assert!(AlertSeverity::Critical < AlertSeverity::Warning);
        assert!(AlertSeverity::Warning < AlertSeverity::Info);
        assert!(AlertPriority::High < AlertPriority::Low);
    }

    #[test]
    fn test_alert_id_is_stable_per_day() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        assert_eq!(
            AlertKind::OverduePayables.alert_id(today),
            "overdue_payables_2024-05-10"
        );
    }
}
