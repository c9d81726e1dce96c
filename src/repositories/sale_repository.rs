use crate::error::RepositoryError;
use crate::models::Sale;
use crate::repositories::DateWindow;
use chrono::NaiveDate;
use sqlx::PgPool;

/// Repository for completed sales (`vendas`)
pub struct SaleRepository {
    pool: PgPool,
}

impl SaleRepository {
    /// Create a new SaleRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find all sales dated inside the window
    pub async fn find_in_window(&self, window: DateWindow) -> Result<Vec<Sale>, RepositoryError> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT
                id,
                data_venda,
                valor_total,
                cliente,
                categoria,
                cor_categoria
            FROM vendas
            WHERE data_venda BETWEEN $1 AND $2
            ORDER BY data_venda ASC, created_at ASC
            "#,
        )
        .bind(window.start)
        .bind(window.end)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Date of the oldest settled row, if any
    pub async fn earliest_date(&self) -> Result<Option<NaiveDate>, RepositoryError> {
        let earliest = sqlx::query_scalar::<_, Option<NaiveDate>>(
            r#"
            SELECT MIN(data_venda)
            FROM vendas
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(earliest)
    }
}
