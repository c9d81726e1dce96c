use crate::config::CashFlowConfig;
use crate::models::{IndicatorSnapshot, LiquidityStatus, Movement, Trend};
use crate::money::{checked_ratio, round_money, round_ratio};
use crate::services::projector::Velocity;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Days the monthly outflow is spread over to get a daily burn rate
const DAYS_PER_MONTH: i64 = 30;

/// First and last day of the calendar month containing `today`
pub fn month_bounds(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = today.with_day(1).unwrap_or(today);
    let next_month = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    let end = next_month
        .map(|d| d - Duration::days(1))
        .unwrap_or(today);
    (start, end)
}

/// Running balance of the most recent ledger movement up to `today` that
/// carries one. Future-dated ledger rows are ignored.
///
/// Expects the unifier's ordering: among same-day entries the last one in
/// source order wins.
pub fn latest_ledger_balance(movements: &[Movement], today: NaiveDate) -> Option<Decimal> {
    movements
        .iter()
        .filter(|m| m.origin.is_ledger() && m.running_balance.is_some() && m.date <= today)
        .max_by_key(|m| m.date)
        .and_then(|m| m.running_balance)
}

pub struct IndicatorCalculator {
    healthy_threshold: Decimal,
}

impl IndicatorCalculator {
    pub fn new(config: &CashFlowConfig) -> Self {
        Self {
            healthy_threshold: config.healthy_threshold,
        }
    }

    /// Compute the snapshot for `now` from a unified movement set and the
    /// trailing velocity the projections use
    pub fn calculate(
        &self,
        movements: &[Movement],
        velocity: &Velocity,
        now: DateTime<Utc>,
    ) -> IndicatorSnapshot {
        let today = now.date_naive();
        let (period_start, period_end) = month_bounds(today);

        // month to date: realized rows dated after today are not cash yet
        let in_period: Vec<&Movement> = movements
            .iter()
            .filter(|m| m.is_realized() && m.date >= period_start && m.date <= today)
            .collect();

        let inflows: Vec<&&Movement> = in_period.iter().filter(|m| m.is_inflow()).collect();
        let outflows: Vec<&&Movement> = in_period.iter().filter(|m| m.is_outflow()).collect();
        let period_inflow: Decimal = inflows.iter().map(|m| m.amount).sum();
        let period_outflow: Decimal = outflows.iter().map(|m| m.amount).sum();

        let current_balance = latest_ledger_balance(movements, today);
        let balance = current_balance.unwrap_or(Decimal::ZERO);

        let days = Decimal::from(DAYS_PER_MONTH);
        let burn_rate = period_outflow / days;

        // balance / (outflow / 30), not applicable without outflow
        let days_of_cash = checked_ratio(balance * days, period_outflow)
            .map(|d| round_ratio(d.max(Decimal::ZERO)));

        let projected_balance_30d = round_money(balance + velocity.daily_net() * days);

        IndicatorSnapshot {
            current_balance,
            period_start,
            period_end,
            period_inflow,
            period_outflow,
            inflow_count: inflows.len(),
            outflow_count: outflows.len(),
            net_result: period_inflow - period_outflow,
            burn_rate: round_money(burn_rate),
            projected_balance_30d,
            liquidity: LiquidityStatus::classify(balance, self.healthy_threshold),
            days_of_cash,
            trend: if period_inflow > period_outflow {
                Trend::Positive
            } else {
                Trend::Negative
            },
            computed_at: now,
        }
    }
}
