use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionStatus {
    Positive,
    Negative,
    Stable,
    Critical,
}

impl ProjectionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectionStatus::Positive => "positive",
            ProjectionStatus::Negative => "negative",
            ProjectionStatus::Stable => "stable",
            ProjectionStatus::Critical => "critical",
        }
    }
}

/// Share of a projected total attributed to one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownBucket {
    pub category: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub inflow: Vec<BreakdownBucket>,
    pub outflow: Vec<BreakdownBucket>,
}

impl CategoryBreakdown {
    pub fn inflow_total(&self) -> Decimal {
        self.inflow.iter().map(|b| b.amount).sum()
    }

    pub fn outflow_total(&self) -> Decimal {
        self.outflow.iter().map(|b| b.amount).sum()
    }
}

/// Balance trajectory over one forward horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// e.g. "30 dias"
    pub label: String,
    pub horizon_days: u32,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub opening_balance: Decimal,
    pub projected_inflow: Decimal,
    pub projected_outflow: Decimal,
    pub closing_balance: Decimal,
    pub variation: Decimal,
    /// `None` when the opening balance is zero
    pub variation_pct: Option<Decimal>,
    /// Percentage, 0..=100
    pub confidence: f64,
    pub status: ProjectionStatus,
    pub breakdown: CategoryBreakdown,
}
