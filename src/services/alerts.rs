use crate::config::CashFlowConfig;
use crate::models::{
    Alert, AlertKind, AlertPriority, AlertSeverity, AlertStatus, IndicatorSnapshot, Movement,
    MovementStatus, Projection, ProjectionStatus,
};
use crate::money::format_brl;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tracing::debug;

/// Evaluates thresholds and emits aggregate, ranked alerts
pub struct AlertGenerator {
    low_balance_floor: Decimal,
    upcoming_window_days: u32,
}

impl AlertGenerator {
    pub fn new(config: &CashFlowConfig) -> Self {
        Self {
            low_balance_floor: config.low_balance_floor,
            upcoming_window_days: config.upcoming_window_days,
        }
    }

    /// Evaluate every rule and return the alerts ordered by severity, then priority.
    /// Rules are independent; ties keep rule order.
    pub fn generate(
        &self,
        snapshot: &IndicatorSnapshot,
        projections: &[Projection],
        movements: &[Movement],
        now: DateTime<Utc>,
    ) -> Vec<Alert> {
        let today = now.date_naive();

        let mut alerts: Vec<Alert> = [
            self.low_balance(snapshot, now),
            self.overdue_payables(snapshot, movements, now),
            self.upcoming_payables(snapshot, movements, now),
            self.negative_projection(projections, now),
        ]
        .into_iter()
        .flatten()
        .collect();

        alerts.sort_by(|a, b| a.severity.cmp(&b.severity).then(a.priority.cmp(&b.priority)));

        debug!("Generated {} alerts for {}", alerts.len(), today);
        alerts
    }

    fn low_balance(&self, snapshot: &IndicatorSnapshot, now: DateTime<Utc>) -> Option<Alert> {
        let balance = snapshot.current_balance?;
        if balance >= self.low_balance_floor {
            return None;
        }

        let severity = if balance <= Decimal::ZERO {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        };

        let description = if severity == AlertSeverity::Critical {
            format!("O saldo atual está em {}. Não há caixa disponível.", format_brl(balance))
        } else {
            format!(
                "O saldo atual de {} está abaixo do mínimo de {}.",
                format_brl(balance),
                format_brl(self.low_balance_floor)
            )
        };

        Some(build_alert(
            AlertKind::LowBalance,
            severity,
            AlertPriority::High,
            "Saldo baixo",
            description,
            Some(balance),
            None,
            &[
                "Antecipar recebimentos de clientes",
                "Renegociar prazos com fornecedores",
                "Reduzir despesas não essenciais",
            ],
            now,
        ))
    }

    fn overdue_payables(
        &self,
        snapshot: &IndicatorSnapshot,
        movements: &[Movement],
        now: DateTime<Utc>,
    ) -> Option<Alert> {
        let today = now.date_naive();
        let overdue: Vec<&Movement> = movements
            .iter()
            .filter(|m| m.is_outflow() && m.status_at(today) == MovementStatus::Overdue)
            .collect();
        if overdue.is_empty() {
            return None;
        }

        let total: Decimal = overdue.iter().map(|m| m.amount).sum();
        let uncovered = snapshot.current_balance.map_or(false, |balance| total > balance);
        let severity = if uncovered {
            AlertSeverity::Critical
        } else {
            AlertSeverity::Warning
        };

        Some(build_alert(
            AlertKind::OverduePayables,
            severity,
            AlertPriority::High,
            "Contas vencidas",
            format!(
                "{} conta(s) vencida(s) somando {}.",
                overdue.len(),
                format_brl(total)
            ),
            Some(total),
            Some(overdue.len()),
            &[
                "Quitar as contas vencidas para evitar juros e multas",
                "Negociar novas datas com os fornecedores",
            ],
            now,
        ))
    }

    fn upcoming_payables(
        &self,
        snapshot: &IndicatorSnapshot,
        movements: &[Movement],
        now: DateTime<Utc>,
    ) -> Option<Alert> {
        let today = now.date_naive();
        let horizon: NaiveDate = today + Duration::days(i64::from(self.upcoming_window_days));
        let upcoming: Vec<&Movement> = movements
            .iter()
            .filter(|m| {
                m.is_outflow()
                    && m.status_at(today) == MovementStatus::Expected
                    && m.date <= horizon
            })
            .collect();
        if upcoming.is_empty() {
            return None;
        }

        let total: Decimal = upcoming.iter().map(|m| m.amount).sum();
        let uncovered = snapshot.current_balance.map_or(false, |balance| total > balance);
        let (severity, priority) = if uncovered {
            (AlertSeverity::Warning, AlertPriority::Medium)
        } else {
            (AlertSeverity::Info, AlertPriority::Low)
        };

        Some(build_alert(
            AlertKind::UpcomingPayables,
            severity,
            priority,
            "Contas a vencer",
            format!(
                "{} conta(s) vencem nos próximos {} dias, totalizando {}.",
                upcoming.len(),
                self.upcoming_window_days,
                format_brl(total)
            ),
            Some(total),
            Some(upcoming.len()),
            &[
                "Reservar saldo para os pagamentos da semana",
                "Programar os pagamentos no banco",
            ],
            now,
        ))
    }

    fn negative_projection(&self, projections: &[Projection], now: DateTime<Utc>) -> Option<Alert> {
        let first_critical = projections
            .iter()
            .filter(|p| p.status == ProjectionStatus::Critical)
            .min_by_key(|p| p.horizon_days)?;

        Some(build_alert(
            AlertKind::NegativeProjection,
            AlertSeverity::Critical,
            AlertPriority::High,
            "Saldo projetado negativo",
            format!(
                "Mantido o ritmo atual, o saldo chega a {} em {}.",
                format_brl(first_critical.closing_balance),
                first_critical.label
            ),
            Some(first_critical.closing_balance),
            None,
            &[
                "Revisar o cronograma de pagamentos",
                "Buscar novas fontes de receita ou capital de giro",
            ],
            now,
        ))
    }
}

#[allow(clippy::too_many_arguments)]
fn build_alert(
    kind: AlertKind,
    severity: AlertSeverity,
    priority: AlertPriority,
    title: &str,
    description: String,
    impact: Option<Decimal>,
    count: Option<usize>,
    actions: &[&str],
    now: DateTime<Utc>,
) -> Alert {
    Alert {
        id: kind.alert_id(now.date_naive()),
        kind,
        severity,
        title: title.to_string(),
        description,
        impact,
        count,
        priority,
        actions: actions.iter().map(|a| a.to_string()).collect(),
        status: AlertStatus::Active,
        created_at: now,
    }
}
