//! Repository tests against a live PostgreSQL.
//!
//! Run with `TEST_DATABASE_URL=postgres://... cargo test -- --ignored`.
//! Tables are created as TEMP tables on a single-connection pool, so nothing
//! persists after the test.

mod helpers;

use fluxo_caixa::repositories::*;
use helpers::*;
use rust_decimal_macros::dec;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::sync::Arc;

async fn test_pool() -> PgPool {
    let url = std::env::var("TEST_DATABASE_URL").expect("TEST_DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .expect("Failed to connect to test database");

    for ddl in [
        r#"CREATE TEMP TABLE movimentacoes_bancarias (
            id UUID PRIMARY KEY,
            data DATE,
            valor NUMERIC(14, 2),
            tipo TEXT,
            descricao TEXT,
            categoria TEXT,
            cor_categoria TEXT,
            saldo_apos NUMERIC(14, 2),
            manual BOOLEAN,
            created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
        )"#,
        r#"CREATE TEMP TABLE contas_pagar (
            id UUID PRIMARY KEY,
            vencimento DATE,
            valor NUMERIC(14, 2),
            pago BOOLEAN,
            data_pagamento DATE,
            descricao TEXT,
            categoria TEXT,
            cor_categoria TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
        )"#,
        r#"CREATE TEMP TABLE vendas (
            id UUID PRIMARY KEY,
            data_venda DATE,
            valor_total NUMERIC(14, 2),
            cliente TEXT,
            categoria TEXT,
            cor_categoria TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()
        )"#,
    ] {
        sqlx::query(ddl)
            .execute(&pool)
            .await
            .expect("Failed to create temp table");
    }

    pool
}

fn window() -> DateWindow {
    DateWindow::new(days_ago(29), days_ahead(7)).unwrap()
}

// ============================================================================
// Connection Tests
// ============================================================================

#[tokio::test]
#[ignore]
async fn test_connection_pool_creation() {
    let pool = test_pool().await;
    let row = sqlx::query("SELECT 1 AS test")
        .fetch_one(&pool)
        .await
        .expect("query failed");
    let value: i32 = row.get("test");
    assert_eq!(value, 1);
}

// ============================================================================
// Repository Tests
// ============================================================================

#[tokio::test]
#[ignore]
async fn test_ledger_repository_filters_by_window() {
    let pool = test_pool().await;
    for (id, offset, amount, tipo, balance) in [
        (uuid::Uuid::new_v4(), 1, dec!(500), Some("entrada"), Some(dec!(10500))),
        (uuid::Uuid::new_v4(), 0, dec!(200), Some("saida"), Some(dec!(10300))),
        (uuid::Uuid::new_v4(), 60, dec!(999), None, None),
    ] {
        sqlx::query(
            "INSERT INTO movimentacoes_bancarias (id, data, valor, tipo, saldo_apos) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(id)
        .bind(days_ago(offset))
        .bind(amount)
        .bind(tipo)
        .bind(balance)
        .execute(&pool)
        .await
        .expect("insert failed");
    }

    let entries = LedgerRepository::new(pool).find_in_window(window()).await.unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].date, Some(days_ago(1)));
    assert_eq!(entries[1].running_balance, Some(dec!(10300)));
    assert!(!entries[1].manual);
}

#[tokio::test]
#[ignore]
async fn test_payable_repository_keeps_old_unpaid() {
    let pool = test_pool().await;
    for (offset, paid) in [(90, false), (90, true), (-3, false)] {
        sqlx::query("INSERT INTO contas_pagar (id, vencimento, valor, pago) VALUES ($1, $2, $3, $4)")
            .bind(uuid::Uuid::new_v4())
            .bind(days_ago(offset))
            .bind(dec!(150))
            .bind(paid)
            .execute(&pool)
            .await
            .expect("insert failed");
    }

    let payables = PayableRepository::new(pool).find_in_window(window()).await.unwrap();

    assert_eq!(payables.len(), 2);
    assert!(payables.iter().all(|p| !p.paid));
    assert_eq!(payables[0].due_date, Some(days_ago(90)));
}

#[tokio::test]
#[ignore]
async fn test_pg_source_feeds_a_refresh() {
    let pool = test_pool().await;
    sqlx::query("INSERT INTO movimentacoes_bancarias (id, data, valor, tipo, saldo_apos) VALUES ($1, $2, $3, 'entrada', $4)")
        .bind(uuid::Uuid::new_v4())
        .bind(today())
        .bind(dec!(100))
        .bind(dec!(3000))
        .execute(&pool)
        .await
        .expect("insert failed");
    sqlx::query("INSERT INTO vendas (id, data_venda, valor_total, cliente) VALUES ($1, $2, $3, 'Maria')")
        .bind(uuid::Uuid::new_v4())
        .bind(days_ago(2))
        .bind(dec!(80))
        .execute(&pool)
        .await
        .expect("insert failed");

    let service = service_for(Arc::new(PgTransactionSource::new(pool)));
    let outcome = service.refresh().await;

    assert!(outcome.committed);
    assert!(!outcome.diagnostics.is_partial());
    let dashboard = service.dashboard().await.unwrap();
    assert_eq!(dashboard.movement_count, 2);
    assert_eq!(dashboard.snapshot.current_balance, Some(dec!(3000)));
}

#[tokio::test]
#[ignore]
async fn test_earliest_activity_spans_all_tables() {
    let pool = test_pool().await;
    let source = PgTransactionSource::new(pool.clone());
    assert_eq!(source.earliest_activity().await.unwrap(), None);

    sqlx::query("INSERT INTO vendas (id, data_venda, valor_total) VALUES ($1, $2, 10)")
        .bind(uuid::Uuid::new_v4())
        .bind(days_ago(40))
        .execute(&pool)
        .await
        .expect("insert failed");
    // unpaid payables are not activity yet
    sqlx::query("INSERT INTO contas_pagar (id, vencimento, valor, pago) VALUES ($1, $2, 10, false)")
        .bind(uuid::Uuid::new_v4())
        .bind(days_ago(300))
        .execute(&pool)
        .await
        .expect("insert failed");

    assert_eq!(source.earliest_activity().await.unwrap(), Some(days_ago(40)));
}
