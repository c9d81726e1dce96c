use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::MovementKind;

/// Realized flow of one calendar day, for the chart adapters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyFlow {
    pub date: NaiveDate,
    pub inflow: Decimal,
    pub outflow: Decimal,
    pub net: Decimal,
    /// Net accumulated from the first day of the series
    pub cumulative_net: Decimal,
}

/// Realized total of one category over the current month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub kind: MovementKind,
    pub category: String,
    pub color: String,
    pub amount: Decimal,
    pub count: usize,
    /// Share of the kind's monthly total, in percent
    pub share_pct: Decimal,
}
