use crate::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Failed to connect to PostgreSQL: {0}")]
    PoolCreation(sqlx::Error),

    #[error("Timed out waiting for a PostgreSQL connection")]
    ConnectionTimeout,

    #[error("Configuration error: {0}")]
    Config(String),
}

fn connect_error(err: sqlx::Error) -> DatabaseError {
    match err {
        sqlx::Error::PoolTimedOut => DatabaseError::ConnectionTimeout,
        other => DatabaseError::PoolCreation(other),
    }
}

/// Handle on the pool the source readers share
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Open the read pool and check it answers.
///
/// The engine only reads `movimentacoes_bancarias`, `contas_pagar` and
/// `vendas`; it runs no migrations.
pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
    if config.url.trim().is_empty() {
        return Err(DatabaseError::Config("database url is empty".to_string()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .test_before_acquire(config.test_before_acquire)
        .connect(&config.url)
        .await
        .map_err(connect_error)?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .map_err(connect_error)?;

    Ok(pool)
}
