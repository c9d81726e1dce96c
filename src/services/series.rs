//! Chart feeds: daily realized flow and the monthly category summary.

use crate::models::{CategoryTotal, DailyFlow, Movement, MovementKind};
use crate::money::{checked_ratio, round_ratio};
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// One entry per day in `[today - window_days + 1, today]`, oldest first,
/// including days without movements.
pub fn daily_flow(movements: &[Movement], today: NaiveDate, window_days: u32) -> Vec<DailyFlow> {
    let window_days = i64::from(window_days.max(1));
    let start = today - Duration::days(window_days - 1);

    let mut per_day: BTreeMap<NaiveDate, (Decimal, Decimal)> = (0..window_days)
        .map(|offset| (start + Duration::days(offset), (Decimal::ZERO, Decimal::ZERO)))
        .collect();

    for movement in movements.iter().filter(|m| m.is_realized()) {
        if let Some((inflow, outflow)) = per_day.get_mut(&movement.date) {
            match movement.kind {
                MovementKind::Inflow => *inflow += movement.amount,
                MovementKind::Outflow => *outflow += movement.amount,
            }
        }
    }

    let mut cumulative = Decimal::ZERO;
    per_day
        .into_iter()
        .map(|(date, (inflow, outflow))| {
            let net = inflow - outflow;
            cumulative += net;
            DailyFlow {
                date,
                inflow,
                outflow,
                net,
                cumulative_net: cumulative,
            }
        })
        .collect()
}

/// Realized totals per (kind, category) between `start` and `end`, largest first
pub fn category_summary(movements: &[Movement], start: NaiveDate, end: NaiveDate) -> Vec<CategoryTotal> {
    let mut totals: Vec<CategoryTotal> = Vec::new();

    for movement in movements
        .iter()
        .filter(|m| m.is_realized() && m.date >= start && m.date <= end)
    {
        match totals
            .iter_mut()
            .find(|t| t.kind == movement.kind && t.category == movement.category.name)
        {
            Some(total) => {
                total.amount += movement.amount;
                total.count += 1;
            }
            None => totals.push(CategoryTotal {
                kind: movement.kind,
                category: movement.category.name.clone(),
                color: movement.category.color.clone(),
                amount: movement.amount,
                count: 1,
                share_pct: Decimal::ZERO,
            }),
        }
    }

    let kind_total = |kind: MovementKind, totals: &[CategoryTotal]| -> Decimal {
        totals.iter().filter(|t| t.kind == kind).map(|t| t.amount).sum()
    };
    let inflow_total = kind_total(MovementKind::Inflow, &totals);
    let outflow_total = kind_total(MovementKind::Outflow, &totals);

    for total in totals.iter_mut() {
        let denominator = match total.kind {
            MovementKind::Inflow => inflow_total,
            MovementKind::Outflow => outflow_total,
        };
        total.share_pct = checked_ratio(total.amount * Decimal::ONE_HUNDRED, denominator)
            .map(round_ratio)
            .unwrap_or(Decimal::ZERO);
    }

    totals.sort_by(|a, b| b.amount.cmp(&a.amount));
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, MovementStatus, Origin};
    use uuid::Uuid;

    fn movement(date: NaiveDate, kind: MovementKind, amount: i64, category: &str) -> Movement {
        Movement {
            id: format!("bank_{}", Uuid::new_v4()),
            date,
            kind,
            amount: Decimal::new(amount, 0),
            status: MovementStatus::Realized,
            category: Category::new(category, "#000000"),
            origin: Origin::Ledger,
            source_id: Uuid::new_v4(),
            description: String::new(),
            running_balance: None,
        }
    }

    #[test]
    fn test_daily_flow_accumulates_in_date_order() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let movements = vec![
            movement(today, MovementKind::Outflow, 30, "Aluguel"),
            movement(today - Duration::days(2), MovementKind::Inflow, 100, "Vendas"),
        ];
        let series = daily_flow(&movements, today, 3);

        assert_eq!(series.len(), 3);
        assert_eq!(series[0].cumulative_net, Decimal::new(100, 0));
        assert_eq!(series[1].net, Decimal::ZERO);
        assert_eq!(series[2].cumulative_net, Decimal::new(70, 0));
    }

    #[test]
    fn test_category_summary_shares() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let movements = vec![
            movement(day, MovementKind::Inflow, 75, "Vendas"),
            movement(day, MovementKind::Inflow, 25, "Serviços"),
            movement(day, MovementKind::Outflow, 40, "Aluguel"),
        ];
        let summary = category_summary(&movements, day, day);

        assert_eq!(summary[0].category, "Vendas");
        assert_eq!(summary[0].share_pct, Decimal::new(75, 0));
        let rent = summary.iter().find(|t| t.category == "Aluguel").unwrap();
        assert_eq!(rent.share_pct, Decimal::new(100, 0));
    }
}
