use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Coarse health classification of the current balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiquidityStatus {
    Healthy,
    Caution,
    Critical,
}

impl LiquidityStatus {
    /// Fixed threshold ladder: above `healthy_threshold` is healthy, above zero
    /// is caution, anything else is critical.
    pub fn classify(balance: Decimal, healthy_threshold: Decimal) -> Self {
        if balance > healthy_threshold {
            LiquidityStatus::Healthy
        } else if balance > Decimal::ZERO {
            LiquidityStatus::Caution
        } else {
            LiquidityStatus::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LiquidityStatus::Healthy => "healthy",
            LiquidityStatus::Caution => "caution",
            LiquidityStatus::Critical => "critical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Positive,
    Negative,
}

/// Point-in-time and current-month metrics, recomputed on every refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Last ledger running balance; `None` when no ledger entry carries one
    pub current_balance: Option<Decimal>,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub period_inflow: Decimal,
    pub period_outflow: Decimal,
    pub inflow_count: usize,
    pub outflow_count: usize,
    pub net_result: Decimal,
    /// Average daily outflow over the month (monthly outflow / 30)
    pub burn_rate: Decimal,
    pub projected_balance_30d: Decimal,
    pub liquidity: LiquidityStatus,
    /// `None` when there is no outflow to divide by
    pub days_of_cash: Option<Decimal>,
    pub trend: Trend,
    pub computed_at: DateTime<Utc>,
}

impl IndicatorSnapshot {
    /// Balance used for classification; unknown counts as zero
    pub fn balance_or_zero(&self) -> Decimal {
        self.current_balance.unwrap_or(Decimal::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_liquidity_ladder() {
        let threshold = Decimal::new(50_000, 0);
        assert_eq!(
            LiquidityStatus::classify(Decimal::new(50_001, 0), threshold),
            LiquidityStatus::Healthy
        );
        assert_eq!(
            LiquidityStatus::classify(Decimal::new(50_000, 0), threshold),
            LiquidityStatus::Caution
        );
        assert_eq!(
            LiquidityStatus::classify(Decimal::new(1, 2), threshold),
            LiquidityStatus::Caution
        );
        assert_eq!(
            LiquidityStatus::classify(Decimal::ZERO, threshold),
            LiquidityStatus::Critical
        );
    }
}
