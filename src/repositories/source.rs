//! Read interface the cash-flow pipeline consumes.

use crate::error::RepositoryError;
use crate::models::{LedgerEntry, Payable, Sale};
use crate::repositories::{LedgerRepository, PayableRepository, SaleRepository};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Inclusive calendar-date window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, RepositoryError> {
        if end < start {
            return Err(RepositoryError::InvalidInput(format!(
                "window end {} is before start {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Number of days covered, both ends included
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// The three collaborators a refresh reads from.
///
/// Implementations return raw records; normalization happens in the unifier.
#[async_trait]
pub trait TransactionSource: Send + Sync {
    /// Bank ledger entries dated inside the window
    async fn list_ledger_movements(
        &self,
        window: DateWindow,
    ) -> Result<Vec<LedgerEntry>, RepositoryError>;

    /// Payables due inside the window, plus any still unpaid before it
    async fn list_payables(&self, window: DateWindow) -> Result<Vec<Payable>, RepositoryError>;

    /// Sales dated inside the window
    async fn list_sales(&self, window: DateWindow) -> Result<Vec<Sale>, RepositoryError>;

    /// Date of the oldest settled activity across all sources, used to tell a
    /// young business from a quiet one. `None` when unknown.
    async fn earliest_activity(&self) -> Result<Option<NaiveDate>, RepositoryError> {
        Ok(None)
    }
}

/// PostgreSQL-backed source, one repository per table
pub struct PgTransactionSource {
    ledger_repo: LedgerRepository,
    payable_repo: PayableRepository,
    sale_repo: SaleRepository,
}

impl PgTransactionSource {
    pub fn new(pool: PgPool) -> Self {
        Self {
            ledger_repo: LedgerRepository::new(pool.clone()),
            payable_repo: PayableRepository::new(pool.clone()),
            sale_repo: SaleRepository::new(pool),
        }
    }
}

#[async_trait]
impl TransactionSource for PgTransactionSource {
    async fn list_ledger_movements(
        &self,
        window: DateWindow,
    ) -> Result<Vec<LedgerEntry>, RepositoryError> {
        self.ledger_repo.find_in_window(window).await
    }

    async fn list_payables(&self, window: DateWindow) -> Result<Vec<Payable>, RepositoryError> {
        self.payable_repo.find_in_window(window).await
    }

    async fn list_sales(&self, window: DateWindow) -> Result<Vec<Sale>, RepositoryError> {
        self.sale_repo.find_in_window(window).await
    }

    async fn earliest_activity(&self) -> Result<Option<NaiveDate>, RepositoryError> {
        let (ledger, payables, sales) = tokio::try_join!(
            self.ledger_repo.earliest_date(),
            self.payable_repo.earliest_date(),
            self.sale_repo.earliest_date(),
        )?;
        Ok([ledger, payables, sales].into_iter().flatten().min())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_rejects_inverted_dates() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert!(DateWindow::new(start, end).is_err());
    }

    #[test]
    fn test_window_days_and_contains() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let window = DateWindow::new(start, end).unwrap();
        assert_eq!(window.days(), 31);
        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()));
    }
}
