#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use fluxo_caixa::clock::FixedClock;
use fluxo_caixa::config::CashFlowConfig;
use fluxo_caixa::error::RepositoryError;
use fluxo_caixa::models::{LedgerEntry, Payable, Sale};
use fluxo_caixa::repositories::{DateWindow, TransactionSource};
use fluxo_caixa::services::CashFlowService;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{oneshot, Notify};
use uuid::Uuid;

/// Instant every test runs at unless it says otherwise
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap()
}

pub fn today() -> NaiveDate {
    fixed_now().date_naive()
}

pub fn days_ago(days: i64) -> NaiveDate {
    today() - Duration::days(days)
}

pub fn days_ahead(days: i64) -> NaiveDate {
    today() + Duration::days(days)
}

pub fn ledger_entry(date: NaiveDate, amount: Decimal, direction: &str) -> LedgerEntry {
    LedgerEntry {
        id: Uuid::new_v4(),
        date: Some(date),
        amount: Some(amount),
        direction: Some(direction.to_string()),
        description: Some("Movimentação".to_string()),
        category: None,
        category_color: None,
        running_balance: None,
        manual: false,
    }
}

/// Ledger entry that reports the post-transaction balance
pub fn ledger_with_balance(date: NaiveDate, amount: Decimal, balance: Decimal) -> LedgerEntry {
    LedgerEntry {
        running_balance: Some(balance),
        ..ledger_entry(date, amount, "entrada")
    }
}

pub fn payable(due: NaiveDate, amount: Decimal, paid: bool) -> Payable {
    Payable {
        id: Uuid::new_v4(),
        due_date: Some(due),
        amount: Some(amount),
        paid,
        paid_date: None,
        description: Some("Fornecedor".to_string()),
        category: None,
        category_color: None,
    }
}

pub fn sale(date: NaiveDate, amount: Decimal) -> Sale {
    Sale {
        id: Uuid::new_v4(),
        date: Some(date),
        amount: Some(amount),
        customer: Some("Cliente".to_string()),
        category: None,
        category_color: None,
    }
}

/// 30 days of ledger history: `inflow` and `outflow` every day, ending today,
/// with the final entry reporting `balance`.
pub fn steady_history(inflow: Decimal, outflow: Decimal, balance: Decimal) -> Vec<LedgerEntry> {
    let mut entries = Vec::new();
    for offset in (0..30).rev() {
        entries.push(ledger_entry(days_ago(offset), inflow, "entrada"));
        entries.push(ledger_entry(days_ago(offset), outflow, "saida"));
    }
    if let Some(last) = entries.last_mut() {
        last.running_balance = Some(balance);
    }
    entries
}

/// In-memory source returning fixed records, optionally failing per source
#[derive(Default, Clone)]
pub struct StaticSource {
    pub ledger: Vec<LedgerEntry>,
    pub payables: Vec<Payable>,
    pub sales: Vec<Sale>,
    pub fail_ledger: bool,
    pub fail_payables: bool,
    pub fail_sales: bool,
    /// Oldest activity the source reports, older than anything it returns
    pub history_start: Option<NaiveDate>,
}

impl StaticSource {
    pub fn new(ledger: Vec<LedgerEntry>, payables: Vec<Payable>, sales: Vec<Sale>) -> Self {
        Self {
            ledger,
            payables,
            sales,
            ..Default::default()
        }
    }

    pub fn with_history_since(mut self, date: NaiveDate) -> Self {
        self.history_start = Some(date);
        self
    }

    pub fn failing_payables(mut self) -> Self {
        self.fail_payables = true;
        self
    }

    pub fn failing_everything(mut self) -> Self {
        self.fail_ledger = true;
        self.fail_payables = true;
        self.fail_sales = true;
        self
    }
}

fn unavailable(what: &str) -> RepositoryError {
    RepositoryError::Unavailable(format!("{} table unreachable", what))
}

#[async_trait]
impl TransactionSource for StaticSource {
    async fn list_ledger_movements(
        &self,
        _window: DateWindow,
    ) -> Result<Vec<LedgerEntry>, RepositoryError> {
        if self.fail_ledger {
            return Err(unavailable("movimentacoes_bancarias"));
        }
        Ok(self.ledger.clone())
    }

    async fn list_payables(&self, _window: DateWindow) -> Result<Vec<Payable>, RepositoryError> {
        if self.fail_payables {
            return Err(unavailable("contas_pagar"));
        }
        Ok(self.payables.clone())
    }

    async fn list_sales(&self, _window: DateWindow) -> Result<Vec<Sale>, RepositoryError> {
        if self.fail_sales {
            return Err(unavailable("vendas"));
        }
        Ok(self.sales.clone())
    }

    async fn earliest_activity(&self) -> Result<Option<NaiveDate>, RepositoryError> {
        Ok(self.history_start)
    }
}

/// Source whose first ledger read blocks until the test opens the gate
pub struct GatedSource {
    inner: StaticSource,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub started: Arc<Notify>,
    pub ledger_reads: AtomicUsize,
}

impl GatedSource {
    pub fn new(inner: StaticSource) -> (Self, oneshot::Sender<()>) {
        let (tx, rx) = oneshot::channel();
        let source = Self {
            inner,
            gate: Mutex::new(Some(rx)),
            started: Arc::new(Notify::new()),
            ledger_reads: AtomicUsize::new(0),
        };
        (source, tx)
    }
}

#[async_trait]
impl TransactionSource for GatedSource {
    async fn list_ledger_movements(
        &self,
        window: DateWindow,
    ) -> Result<Vec<LedgerEntry>, RepositoryError> {
        self.ledger_reads.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().unwrap().take();
        if let Some(rx) = gate {
            self.started.notify_one();
            let _ = rx.await;
        }
        self.inner.list_ledger_movements(window).await
    }

    async fn list_payables(&self, window: DateWindow) -> Result<Vec<Payable>, RepositoryError> {
        self.inner.list_payables(window).await
    }

    async fn list_sales(&self, window: DateWindow) -> Result<Vec<Sale>, RepositoryError> {
        self.inner.list_sales(window).await
    }
}

/// Service over `source` pinned to `fixed_now()`
pub fn service_for(source: Arc<dyn TransactionSource>) -> CashFlowService {
    service_with_config(source, CashFlowConfig::default())
}

pub fn service_with_config(source: Arc<dyn TransactionSource>, config: CashFlowConfig) -> CashFlowService {
    CashFlowService::new(source, config)
        .expect("default config is valid")
        .with_clock(Arc::new(FixedClock(fixed_now())))
}
