//! Forward balance projections from recent realized velocity.

use crate::config::{CashFlowConfig, ConfidenceAnchor};
use crate::error::{AppError, AppResult};
use crate::models::{
    BreakdownBucket, CategoryBreakdown, IndicatorSnapshot, Movement, MovementKind, Projection,
    ProjectionStatus,
};
use crate::money::{checked_ratio, round_money, round_ratio};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;

const NO_HISTORY_BUCKET: &str = "Sem histórico";
const OTHERS_BUCKET: &str = "Outros";

/// Average realized flow per day over a trailing window
#[derive(Debug, Clone, PartialEq)]
pub struct Velocity {
    pub daily_inflow: Decimal,
    pub daily_outflow: Decimal,
    /// Days the averages were taken over (0 when there is no history)
    pub days_observed: u32,
    /// Historical totals per category, largest first
    pub inflow_weights: Vec<(String, Decimal)>,
    pub outflow_weights: Vec<(String, Decimal)>,
}

impl Velocity {
    /// No realized history at all
    pub fn none() -> Self {
        Self {
            daily_inflow: Decimal::ZERO,
            daily_outflow: Decimal::ZERO,
            days_observed: 0,
            inflow_weights: Vec::new(),
            outflow_weights: Vec::new(),
        }
    }

    /// Estimate velocity from realized movements dated in
    /// `[today - window_days + 1, today]`.
    ///
    /// The averages run over the whole window unless the business is younger
    /// than it. Its age comes from `history_start` (earliest activity the
    /// sources know of) and from any realized movement dated before the
    /// window; a quiet stretch inside the window does not shorten the span.
    pub fn trailing(
        movements: &[Movement],
        today: NaiveDate,
        window_days: u32,
        history_start: Option<NaiveDate>,
    ) -> Self {
        let window_days = window_days.max(1);
        let window_start = today - Duration::days(i64::from(window_days) - 1);

        let realized: Vec<&Movement> = movements
            .iter()
            .filter(|m| m.is_realized() && m.date >= window_start && m.date <= today)
            .collect();
        if realized.is_empty() {
            return Self::none();
        }

        let first_activity = movements
            .iter()
            .filter(|m| m.is_realized() && m.date <= today)
            .map(|m| m.date)
            .chain(history_start)
            .min()
            .unwrap_or(window_start);

        let span = ((today - first_activity.max(window_start)).num_days() + 1)
            .clamp(1, i64::from(window_days));
        let days = Decimal::from(span);

        let inflow: Decimal = realized.iter().filter(|m| m.is_inflow()).map(|m| m.amount).sum();
        let outflow: Decimal = realized.iter().filter(|m| m.is_outflow()).map(|m| m.amount).sum();

        Self {
            daily_inflow: inflow / days,
            daily_outflow: outflow / days,
            days_observed: span as u32,
            inflow_weights: category_weights(&realized, MovementKind::Inflow),
            outflow_weights: category_weights(&realized, MovementKind::Outflow),
        }
    }

    pub fn daily_net(&self) -> Decimal {
        self.daily_inflow - self.daily_outflow
    }
}

/// Totals per category for one kind, largest first; ties keep first-seen order
fn category_weights(movements: &[&Movement], kind: MovementKind) -> Vec<(String, Decimal)> {
    let mut weights: Vec<(String, Decimal)> = Vec::new();
    for movement in movements.iter().filter(|m| m.kind == kind) {
        match weights.iter_mut().find(|(name, _)| *name == movement.category.name) {
            Some((_, total)) => *total += movement.amount,
            None => weights.push((movement.category.name.clone(), movement.amount)),
        }
    }
    weights.sort_by(|a, b| b.1.cmp(&a.1));
    weights
}

/// Monotonic non-increasing horizon -> confidence mapping.
///
/// Piecewise linear between anchors, flat beyond the first and last anchor.
#[derive(Debug, Clone)]
pub struct ConfidenceCurve {
    anchors: Vec<ConfidenceAnchor>,
}

impl ConfidenceCurve {
    pub fn new(anchors: Vec<ConfidenceAnchor>) -> AppResult<Self> {
        if anchors.is_empty() {
            return Err(AppError::Config("confidence curve needs at least one anchor".into()));
        }
        for pair in anchors.windows(2) {
            if pair[0].horizon_days >= pair[1].horizon_days {
                return Err(AppError::Config(
                    "confidence anchors must have strictly ascending horizons".into(),
                ));
            }
            if pair[0].confidence < pair[1].confidence {
                return Err(AppError::Config(
                    "confidence must not increase with the horizon".into(),
                ));
            }
        }
        Ok(Self { anchors })
    }

    /// Confidence in percent, rounded to one decimal place
    pub fn confidence(&self, horizon_days: u32) -> f64 {
        let first = self.anchors[0];
        let last = self.anchors[self.anchors.len() - 1];

        let raw = if horizon_days <= first.horizon_days {
            first.confidence
        } else if horizon_days >= last.horizon_days {
            last.confidence
        } else {
            self.anchors
                .windows(2)
                .find(|pair| horizon_days <= pair[1].horizon_days)
                .map(|pair| {
                    let (lo, hi) = (pair[0], pair[1]);
                    let span = f64::from(hi.horizon_days - lo.horizon_days);
                    let offset = f64::from(horizon_days - lo.horizon_days);
                    lo.confidence + (hi.confidence - lo.confidence) * offset / span
                })
                .unwrap_or(last.confidence)
        };

        (raw * 10.0).round() / 10.0
    }
}

impl Default for ConfidenceCurve {
    fn default() -> Self {
        Self {
            anchors: CashFlowConfig::default().confidence_anchors,
        }
    }
}

/// Split `total` across weighted categories.
///
/// Buckets are rounded to cents and the rounding remainder goes to the
/// largest bucket, so the buckets always add up to `total` exactly.
pub fn allocate(total: Decimal, weights: &[(String, Decimal)], max_buckets: usize) -> Vec<BreakdownBucket> {
    let total = round_money(total);
    if total.is_zero() {
        return Vec::new();
    }

    let mut weighted: Vec<(String, Decimal)> = weights
        .iter()
        .filter(|(_, w)| *w > Decimal::ZERO)
        .cloned()
        .collect();

    if weighted.is_empty() {
        return vec![BreakdownBucket {
            category: NO_HISTORY_BUCKET.to_string(),
            amount: total,
        }];
    }

    weighted.sort_by(|a, b| b.1.cmp(&a.1));
    let max_buckets = max_buckets.max(1);
    if weighted.len() > max_buckets {
        let rest: Decimal = weighted[max_buckets - 1..].iter().map(|(_, w)| *w).sum();
        weighted.truncate(max_buckets - 1);
        weighted.push((OTHERS_BUCKET.to_string(), rest));
    }

    let weight_total: Decimal = weighted.iter().map(|(_, w)| *w).sum();
    let mut buckets: Vec<BreakdownBucket> = weighted
        .iter()
        .map(|(category, weight)| BreakdownBucket {
            category: category.clone(),
            amount: round_money(total * *weight / weight_total),
        })
        .collect();

    let allocated: Decimal = buckets.iter().map(|b| b.amount).sum();
    let remainder = total - allocated;
    if !remainder.is_zero() {
        // first index of the largest weight
        let largest = weighted
            .iter()
            .enumerate()
            .fold(0, |best, (i, (_, w))| if *w > weighted[best].1 { i } else { best });
        buckets[largest].amount += remainder;
    }

    buckets
}

/// Classify a projection from its opening and closing balance
pub fn classify_projection(
    opening: Decimal,
    closing: Decimal,
    positive_variation_pct: Decimal,
) -> ProjectionStatus {
    let variation = closing - opening;
    if closing < Decimal::ZERO {
        ProjectionStatus::Critical
    } else if variation > opening * positive_variation_pct / Decimal::ONE_HUNDRED {
        ProjectionStatus::Positive
    } else if variation < Decimal::ZERO {
        ProjectionStatus::Negative
    } else {
        ProjectionStatus::Stable
    }
}

pub struct Projector {
    horizons: Vec<u32>,
    positive_variation_pct: Decimal,
    max_breakdown_buckets: usize,
    curve: ConfidenceCurve,
}

impl Projector {
    pub fn new(config: &CashFlowConfig) -> AppResult<Self> {
        Ok(Self {
            horizons: config.horizons.clone(),
            positive_variation_pct: config.positive_variation_pct,
            max_breakdown_buckets: config.max_breakdown_buckets,
            curve: ConfidenceCurve::new(config.confidence_anchors.clone())?,
        })
    }

    pub fn curve(&self) -> &ConfidenceCurve {
        &self.curve
    }

    /// One projection per configured horizon
    pub fn project(
        &self,
        velocity: &Velocity,
        snapshot: &IndicatorSnapshot,
        now: DateTime<Utc>,
    ) -> Vec<Projection> {
        let today = now.date_naive();
        debug!(
            "Projecting from velocity in={} out={} over {} days",
            velocity.daily_inflow, velocity.daily_outflow, velocity.days_observed
        );

        self.horizons
            .iter()
            .map(|horizon| self.project_horizon(velocity, snapshot.balance_or_zero(), *horizon, today))
            .collect()
    }

    /// Projection for a single horizon
    pub fn project_horizon(
        &self,
        velocity: &Velocity,
        opening_balance: Decimal,
        horizon_days: u32,
        today: NaiveDate,
    ) -> Projection {
        let days = Decimal::from(horizon_days);
        let projected_inflow = round_money(velocity.daily_inflow * days);
        let projected_outflow = round_money(velocity.daily_outflow * days);
        let closing_balance = opening_balance + projected_inflow - projected_outflow;
        let variation = closing_balance - opening_balance;

        Projection {
            label: format!("{} dias", horizon_days),
            horizon_days,
            window_start: today,
            window_end: today + Duration::days(i64::from(horizon_days)),
            opening_balance,
            projected_inflow,
            projected_outflow,
            closing_balance,
            variation,
            variation_pct: checked_ratio(variation * Decimal::ONE_HUNDRED, opening_balance)
                .map(round_ratio),
            confidence: self.curve.confidence(horizon_days),
            status: classify_projection(opening_balance, closing_balance, self.positive_variation_pct),
            breakdown: CategoryBreakdown {
                inflow: allocate(projected_inflow, &velocity.inflow_weights, self.max_breakdown_buckets),
                outflow: allocate(projected_outflow, &velocity.outflow_weights, self.max_breakdown_buckets),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, MovementStatus, Origin};
    use uuid::Uuid;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
    }

    fn realized(days_ago: i64, kind: MovementKind, amount: i64) -> Movement {
        Movement {
            id: format!("venda_{}", days_ago),
            date: today() - Duration::days(days_ago),
            kind,
            amount: Decimal::new(amount, 0),
            status: MovementStatus::Realized,
            category: Category::default_sale(),
            origin: Origin::Sale,
            source_id: Uuid::new_v4(),
            description: String::new(),
            running_balance: None,
        }
    }

    #[test]
    fn test_velocity_without_history_is_zero() {
        let velocity = Velocity::trailing(&[], today(), 30, None);
        assert_eq!(velocity, Velocity::none());
        assert_eq!(velocity.daily_net(), Decimal::ZERO);

        // only movements outside the window count as no recent history
        let old = vec![realized(45, MovementKind::Inflow, 900)];
        let velocity = Velocity::trailing(&old, today(), 30, None);
        assert_eq!(velocity.days_observed, 0);
    }

    #[test]
    fn test_velocity_over_partial_history() {
        // a business that started yesterday averages over two days
        let movements = vec![realized(1, MovementKind::Inflow, 3000)];
        let velocity = Velocity::trailing(&movements, today(), 30, None);
        assert_eq!(velocity.days_observed, 2);
        assert_eq!(velocity.daily_inflow, Decimal::new(1500, 0));

        let velocity = Velocity::trailing(&movements, today(), 30, Some(today() - Duration::days(9)));
        assert_eq!(velocity.days_observed, 10);
        assert_eq!(velocity.daily_inflow, Decimal::new(300, 0));
    }

    #[test]
    fn test_quiet_window_with_older_history_uses_full_window() {
        let movements = vec![realized(1, MovementKind::Inflow, 3000)];
        let velocity = Velocity::trailing(&movements, today(), 30, Some(today() - Duration::days(200)));
        assert_eq!(velocity.days_observed, 30);
        assert_eq!(velocity.daily_inflow, Decimal::new(100, 0));

        let movements = vec![
            realized(1, MovementKind::Inflow, 3000),
            realized(45, MovementKind::Outflow, 10),
        ];
        let velocity = Velocity::trailing(&movements, today(), 30, None);
        assert_eq!(velocity.days_observed, 30);
        assert_eq!(velocity.daily_outflow, Decimal::ZERO);
    }

    #[test]
    fn test_velocity_at_window_boundary() {
        let movements = vec![
            realized(29, MovementKind::Inflow, 600),
            realized(0, MovementKind::Outflow, 300),
        ];
        let velocity = Velocity::trailing(&movements, today(), 30, None);
        assert_eq!(velocity.days_observed, 30);
        assert_eq!(velocity.daily_inflow, Decimal::new(20, 0));
        assert_eq!(velocity.daily_outflow, Decimal::new(10, 0));

        // one day older falls out of the sums but still proves the history
        let movements = vec![
            realized(30, MovementKind::Inflow, 600),
            realized(0, MovementKind::Outflow, 300),
        ];
        let velocity = Velocity::trailing(&movements, today(), 30, None);
        assert_eq!(velocity.days_observed, 30);
        assert_eq!(velocity.daily_inflow, Decimal::ZERO);
    }

    fn weights(pairs: &[(&str, i64)]) -> Vec<(String, Decimal)> {
        pairs
            .iter()
            .map(|(n, w)| (n.to_string(), Decimal::new(*w, 0)))
            .collect()
    }

    #[test]
    fn test_default_curve_matches_anchors() {
        let curve = ConfidenceCurve::default();
        assert_eq!(curve.confidence(1), 85.0);
        assert_eq!(curve.confidence(7), 85.0);
        assert_eq!(curve.confidence(30), 75.0);
        assert_eq!(curve.confidence(90), 60.0);
        assert_eq!(curve.confidence(365), 60.0);
    }

    #[test]
    fn test_curve_is_monotonic() {
        let curve = ConfidenceCurve::default();
        let mut previous = curve.confidence(0);
        for h in 1..=400 {
            let current = curve.confidence(h);
            assert!(current <= previous, "confidence rose at {} days", h);
            previous = current;
        }
    }

    #[test]
    fn test_curve_rejects_rising_anchors() {
        let anchors = vec![
            ConfidenceAnchor { horizon_days: 7, confidence: 50.0 },
            ConfidenceAnchor { horizon_days: 30, confidence: 70.0 },
        ];
        assert!(ConfidenceCurve::new(anchors).is_err());
    }

    #[test]
    fn test_allocate_assigns_remainder_to_largest() {
        let buckets = allocate(Decimal::new(100, 0), &weights(&[("A", 1), ("B", 1), ("C", 1)]), 5);
        let sum: Decimal = buckets.iter().map(|b| b.amount).sum();
        assert_eq!(sum, Decimal::new(100, 0));
        // 33.33 each, one cent goes to the first of the tied largest buckets
        assert_eq!(buckets[0].amount, Decimal::new(3334, 2));
        assert_eq!(buckets[1].amount, Decimal::new(3333, 2));
    }

    #[test]
    fn test_allocate_merges_tail_into_others() {
        let buckets = allocate(
            Decimal::new(1000, 0),
            &weights(&[("A", 50), ("B", 20), ("C", 15), ("D", 10), ("E", 5)]),
            3,
        );
        assert_eq!(buckets.len(), 3);
        assert_eq!(buckets[2].category, OTHERS_BUCKET);
        assert_eq!(buckets[2].amount, Decimal::new(300, 0));
    }

    #[test]
    fn test_allocate_without_history() {
        let buckets = allocate(Decimal::new(10, 0), &[], 5);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].category, NO_HISTORY_BUCKET);
        assert!(allocate(Decimal::ZERO, &weights(&[("A", 1)]), 5).is_empty());
    }

    #[test]
    fn test_classification() {
        let pct = Decimal::new(10, 0);
        let opening = Decimal::new(1000, 0);
        assert_eq!(classify_projection(opening, Decimal::new(-1, 0), pct), ProjectionStatus::Critical);
        assert_eq!(classify_projection(opening, Decimal::new(1101, 0), pct), ProjectionStatus::Positive);
        assert_eq!(classify_projection(opening, Decimal::new(1100, 0), pct), ProjectionStatus::Stable);
        assert_eq!(classify_projection(opening, Decimal::new(999, 0), pct), ProjectionStatus::Negative);
    }
}
