//! Raw records as the transaction sources deliver them.
//!
//! Every field a row may lack is optional here; the unifier decides what is
//! usable and reports the rest.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Bank ledger entry (movimentação bancária)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    #[sqlx(rename = "data")]
    pub date: Option<NaiveDate>,
    #[sqlx(rename = "valor")]
    pub amount: Option<Decimal>,
    /// "entrada"/"saida" or an equivalent tag; absent means "use the sign"
    #[sqlx(rename = "tipo")]
    pub direction: Option<String>,
    #[sqlx(rename = "descricao")]
    pub description: Option<String>,
    #[sqlx(rename = "categoria")]
    pub category: Option<String>,
    #[sqlx(rename = "cor_categoria")]
    pub category_color: Option<String>,
    /// Post-transaction balance when the bank supplies one
    #[sqlx(rename = "saldo_apos")]
    pub running_balance: Option<Decimal>,
    #[sqlx(rename = "manual")]
    pub manual: bool,
}

/// Account payable (conta a pagar)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Payable {
    pub id: Uuid,
    #[sqlx(rename = "vencimento")]
    pub due_date: Option<NaiveDate>,
    #[sqlx(rename = "valor")]
    pub amount: Option<Decimal>,
    #[sqlx(rename = "pago")]
    pub paid: bool,
    #[sqlx(rename = "data_pagamento")]
    pub paid_date: Option<NaiveDate>,
    #[sqlx(rename = "descricao")]
    pub description: Option<String>,
    #[sqlx(rename = "categoria")]
    pub category: Option<String>,
    #[sqlx(rename = "cor_categoria")]
    pub category_color: Option<String>,
}

/// Completed sale (venda)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Sale {
    pub id: Uuid,
    #[sqlx(rename = "data_venda")]
    pub date: Option<NaiveDate>,
    #[sqlx(rename = "valor_total")]
    pub amount: Option<Decimal>,
    #[sqlx(rename = "cliente")]
    pub customer: Option<String>,
    #[sqlx(rename = "categoria")]
    pub category: Option<String>,
    #[sqlx(rename = "cor_categoria")]
    pub category_color: Option<String>,
}

/// Which reader a record (or a failure) came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Ledger,
    Payables,
    Sales,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Ledger => "ledger",
            SourceKind::Payables => "payables",
            SourceKind::Sales => "sales",
        }
    }
}

/// One record from any source
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecord {
    Ledger(LedgerEntry),
    Payable(Payable),
    Sale(Sale),
}

impl RawRecord {
    pub fn source(&self) -> SourceKind {
        match self {
            RawRecord::Ledger(_) => SourceKind::Ledger,
            RawRecord::Payable(_) => SourceKind::Payables,
            RawRecord::Sale(_) => SourceKind::Sales,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            RawRecord::Ledger(entry) => entry.id,
            RawRecord::Payable(payable) => payable.id,
            RawRecord::Sale(sale) => sale.id,
        }
    }
}

impl From<LedgerEntry> for RawRecord {
    fn from(entry: LedgerEntry) -> Self {
        RawRecord::Ledger(entry)
    }
}

impl From<Payable> for RawRecord {
    fn from(payable: Payable) -> Self {
        RawRecord::Payable(payable)
    }
}

impl From<Sale> for RawRecord {
    fn from(sale: Sale) -> Self {
        RawRecord::Sale(sale)
    }
}
