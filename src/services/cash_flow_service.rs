use crate::clock::{Clock, SystemClock};
use crate::config::CashFlowConfig;
use crate::error::{AppError, AppResult, RepositoryError};
use crate::models::{Alert, AlertStatus, IndicatorSnapshot, LedgerEntry, Payable, Projection, Sale, SourceKind};
use crate::repositories::{DateWindow, TransactionSource};
use crate::services::alerts::AlertGenerator;
use crate::services::audit::AlertJournal;
use crate::services::indicators::{month_bounds, IndicatorCalculator};
use crate::services::projector::{Projector, Velocity};
use crate::services::series::{category_summary, daily_flow};
use crate::services::unifier::unify;
use crate::state_manager::{Dashboard, RefreshDiagnostics, SnapshotCache, SourceFailure};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Result of one `refresh()` call
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub generation: u64,
    /// False when a newer refresh started before this one finished
    pub committed: bool,
    pub diagnostics: RefreshDiagnostics,
}

/// Runs the read -> unify -> indicators -> projections -> alerts pipeline and
/// serves the last committed result to the presentation layer.
pub struct CashFlowService {
    source: Arc<dyn TransactionSource>,
    clock: Arc<dyn Clock>,
    config: CashFlowConfig,
    calculator: IndicatorCalculator,
    projector: Projector,
    alert_generator: AlertGenerator,
    cache: SnapshotCache,
    journal: Option<Arc<AlertJournal>>,
}

impl CashFlowService {
    /// Create a new cash-flow service reading from `source`
    pub fn new(source: Arc<dyn TransactionSource>, config: CashFlowConfig) -> AppResult<Self> {
        config.validate().map_err(AppError::Config)?;

        Ok(Self {
            source,
            clock: Arc::new(SystemClock),
            calculator: IndicatorCalculator::new(&config),
            projector: Projector::new(&config)?,
            alert_generator: AlertGenerator::new(&config),
            config,
            cache: SnapshotCache::new(),
            journal: None,
        })
    }

    /// Set the clock
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Record alert transitions and refreshes in a journal
    pub fn with_journal(mut self, journal: Arc<AlertJournal>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn config(&self) -> &CashFlowConfig {
        &self.config
    }

    /// Window the sources are read for: from the earlier of the month start and
    /// the trailing window start, up to the end of the upcoming-payables window.
    pub fn fetch_window(&self, today: NaiveDate) -> DateWindow {
        let (month_start, _) = month_bounds(today);
        let trailing_start =
            today - Duration::days(i64::from(self.config.trailing_window_days.max(1)) - 1);
        DateWindow {
            start: month_start.min(trailing_start),
            end: today + Duration::days(i64::from(self.config.upcoming_window_days)),
        }
    }

    /// Re-read all sources and recompute everything.
    ///
    /// Never fails: a source that errors contributes nothing and is reported in
    /// the diagnostics. The result is committed only if no newer refresh has
    /// started in the meantime.
    pub async fn refresh(&self) -> RefreshOutcome {
        let generation = self.cache.begin_refresh();
        let now = self.clock.now();
        let window = self.fetch_window(now.date_naive());

        info!(
            "Refresh {} started for window {} .. {}",
            generation, window.start, window.end
        );

        let (ledger, payables, sales, earliest) = tokio::join!(
            self.source.list_ledger_movements(window),
            self.source.list_payables(window),
            self.source.list_sales(window),
            self.source.earliest_activity(),
        );

        let history_start = earliest.unwrap_or_else(|e| {
            warn!("Could not read earliest activity, using fetched history only: {}", e);
            None
        });

        let mut failures = Vec::new();
        let ledger = recover(SourceKind::Ledger, ledger, &mut failures);
        let payables = recover(SourceKind::Payables, payables, &mut failures);
        let sales = recover(SourceKind::Sales, sales, &mut failures);

        let dashboard = self.compute(
            generation,
            window,
            &ledger,
            &payables,
            &sales,
            history_start,
            failures,
            now,
        );
        let diagnostics = dashboard.diagnostics.clone();
        let movement_count = dashboard.movement_count;
        let active_alerts = dashboard.alerts.iter().filter(|a| a.is_active()).count();

        let committed = self.cache.commit(dashboard).await;
        if committed {
            self.journal_refresh(generation, movement_count, &diagnostics, active_alerts)
                .await;
        } else {
            warn!("Refresh {} superseded by a newer refresh, result discarded", generation);
        }

        RefreshOutcome {
            generation,
            committed,
            diagnostics,
        }
    }

    /// Pure pipeline over already-fetched records
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        &self,
        generation: u64,
        window: DateWindow,
        ledger: &[LedgerEntry],
        payables: &[Payable],
        sales: &[Sale],
        history_start: Option<NaiveDate>,
        source_failures: Vec<SourceFailure>,
        now: DateTime<Utc>,
    ) -> Dashboard {
        let today = now.date_naive();
        let timeline = unify(ledger, payables, sales, now);
        let movements = &timeline.movements;

        let velocity = Velocity::trailing(
            movements,
            today,
            self.config.trailing_window_days,
            history_start,
        );
        let snapshot = self.calculator.calculate(movements, &velocity, now);
        let projections = self.projector.project(&velocity, &snapshot, now);
        let alerts = self
            .alert_generator
            .generate(&snapshot, &projections, movements, now);
        let daily_flow = daily_flow(movements, today, self.config.trailing_window_days);
        let category_summary = category_summary(movements, snapshot.period_start, today);

        Dashboard {
            generation,
            movement_count: movements.len(),
            snapshot,
            projections,
            alerts,
            daily_flow,
            category_summary,
            diagnostics: RefreshDiagnostics {
                window,
                source_failures,
                dropped: timeline.diagnostics.dropped,
            },
        }
    }

    /// Last committed dashboard
    pub async fn dashboard(&self) -> Option<Dashboard> {
        self.cache.current().await
    }

    pub async fn indicators(&self) -> Option<IndicatorSnapshot> {
        self.cache.current().await.map(|d| d.snapshot)
    }

    pub async fn projections(&self) -> Vec<Projection> {
        self.cache
            .current()
            .await
            .map(|d| d.projections)
            .unwrap_or_default()
    }

    /// Active alerts of the last committed refresh
    pub async fn alerts(&self) -> Vec<Alert> {
        self.cache
            .current()
            .await
            .map(|d| d.active_alerts())
            .unwrap_or_default()
    }

    /// Mark an alert resolved. In memory only: the next refresh regenerates it.
    pub async fn resolve_alert(&self, alert_id: &str) -> AppResult<Alert> {
        self.transition_alert(alert_id, AlertStatus::Resolved).await
    }

    /// Dismiss an alert. In memory only: the next refresh regenerates it.
    pub async fn dismiss_alert(&self, alert_id: &str) -> AppResult<Alert> {
        self.transition_alert(alert_id, AlertStatus::Dismissed).await
    }

    async fn transition_alert(&self, alert_id: &str, target: AlertStatus) -> AppResult<Alert> {
        let alert = self.cache.transition_alert(alert_id, target).await?;
        info!("Alert {} marked {}", alert.id, alert.status.as_str());

        if let Some(journal) = &self.journal {
            if let Err(e) = journal.log_transition(&alert, self.clock.now()).await {
                error!("Failed to journal alert transition {}: {}", alert.id, e);
            }
        }

        Ok(alert)
    }

    async fn journal_refresh(
        &self,
        generation: u64,
        movements: usize,
        diagnostics: &RefreshDiagnostics,
        active_alerts: usize,
    ) {
        let Some(journal) = &self.journal else {
            return;
        };
        let failed: Vec<&str> = diagnostics
            .source_failures
            .iter()
            .map(|f| f.source.as_str())
            .collect();
        if let Err(e) = journal
            .log_refresh(
                generation,
                movements,
                diagnostics.dropped.len(),
                &failed,
                active_alerts,
                self.clock.now(),
            )
            .await
        {
            error!("Failed to journal refresh {}: {}", generation, e);
        }
    }
}

/// Turn a failed read into an empty set plus a recorded failure
fn recover<T>(
    source: SourceKind,
    result: Result<Vec<T>, RepositoryError>,
    failures: &mut Vec<SourceFailure>,
) -> Vec<T> {
    match result {
        Ok(records) => records,
        Err(e) => {
            warn!("Source {} failed, continuing without it: {}", source.as_str(), e);
            failures.push(SourceFailure {
                source,
                message: e.to_string(),
            });
            Vec::new()
        }
    }
}
