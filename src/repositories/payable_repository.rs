use crate::error::RepositoryError;
use crate::models::Payable;
use crate::repositories::DateWindow;
use chrono::NaiveDate;
use sqlx::PgPool;

/// Repository for accounts payable (`contas_pagar`)
pub struct PayableRepository {
    pool: PgPool,
}

impl PayableRepository {
    /// Create a new PayableRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find payables due inside the window, plus unpaid ones due before it
    /// (those are overdue and must not fall out of the dashboard).
    pub async fn find_in_window(&self, window: DateWindow) -> Result<Vec<Payable>, RepositoryError> {
        let payables = sqlx::query_as::<_, Payable>(
            r#"
            SELECT
                id,
                vencimento,
                valor,
                COALESCE(pago, false) AS pago,
                data_pagamento,
                descricao,
                categoria,
                cor_categoria
            FROM contas_pagar
            WHERE vencimento BETWEEN $1 AND $2
               OR (COALESCE(pago, false) = false AND vencimento < $1)
            ORDER BY vencimento ASC, created_at ASC
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(payables)
    }

    /// Date of the oldest settled row, if any
    pub async fn earliest_date(&self) -> Result<Option<NaiveDate>, RepositoryError> {
        let earliest = sqlx::query_scalar::<_, Option<NaiveDate>>(
            r#"
            SELECT MIN(COALESCE(data_pagamento, vencimento))
            FROM contas_pagar
            WHERE COALESCE(pago, false) = true
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(earliest)
    }
}
