use crate::error::RepositoryError;
use crate::models::LedgerEntry;
use crate::repositories::DateWindow;
use chrono::NaiveDate;
use sqlx::PgPool;

/// Repository for bank ledger entries (`movimentacoes_bancarias`)
pub struct LedgerRepository {
    pool: PgPool,
}

impl LedgerRepository {
    /// Create a new LedgerRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find all ledger entries dated inside the window.
    ///
    /// Ordered oldest first so that, among entries of the same day, the last
    /// one carries the latest running balance.
    pub async fn find_in_window(
        &self,
        window: DateWindow,
    ) -> Result<Vec<LedgerEntry>, RepositoryError> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT
                id,
                data,
                valor,
                tipo,
                descricao,
                categoria,
                cor_categoria,
                saldo_apos,
                COALESCE(manual, false) AS manual
            FROM movimentacoes_bancarias
            WHERE data BETWEEN $1 AND $2
            ORDER BY data ASC, created_at ASC
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Date of the oldest settled row, if any
    pub async fn earliest_date(&self) -> Result<Option<NaiveDate>, RepositoryError> {
        let earliest = sqlx::query_scalar::<_, Option<NaiveDate>>(
            r#"
            SELECT MIN(data)
            FROM movimentacoes_bancarias
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(earliest)
    }
}
