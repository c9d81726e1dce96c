//! Normalizes ledger entries, payables and sales into one `Movement` timeline.

use crate::models::{
    Category, LedgerEntry, Movement, MovementKind, MovementStatus, Origin, Payable, RawRecord,
    Sale, SourceKind,
};
use crate::money::round_money;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Why a raw record was left out of the timeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum DropReason {
    MissingDate,
    MissingAmount,
    UnknownDirection(String),
    NegativeAmount,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropReason::MissingDate => write!(f, "missing date"),
            DropReason::MissingAmount => write!(f, "missing amount"),
            DropReason::UnknownDirection(tag) => write!(f, "unknown direction tag '{}'", tag),
            DropReason::NegativeAmount => write!(f, "negative amount"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedRecord {
    pub source: SourceKind,
    pub record_id: Uuid,
    pub reason: DropReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnificationDiagnostics {
    pub dropped: Vec<DroppedRecord>,
}

impl UnificationDiagnostics {
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }

    pub fn dropped_from(&self, source: SourceKind) -> usize {
        self.dropped.iter().filter(|d| d.source == source).count()
    }
}

/// Unified movements, newest first, plus what was dropped on the way
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnifiedTimeline {
    pub movements: Vec<Movement>,
    pub diagnostics: UnificationDiagnostics,
}

/// Map a bank ledger entry. Ledger entries are always realized.
pub fn map_ledger(entry: &LedgerEntry) -> Result<Movement, DropReason> {
    let date = entry.date.ok_or(DropReason::MissingDate)?;
    let raw_amount = entry.amount.ok_or(DropReason::MissingAmount)?;

    let kind = match entry.direction.as_deref().map(str::trim) {
        Some(tag) if !tag.is_empty() => MovementKind::from_tag(tag)
            .ok_or_else(|| DropReason::UnknownDirection(tag.to_string()))?,
        _ if raw_amount.is_sign_negative() => MovementKind::Outflow,
        _ => MovementKind::Inflow,
    };

    let origin = if entry.manual {
        Origin::Manual
    } else {
        Origin::Ledger
    };

    let default_category = match kind {
        MovementKind::Inflow => Category::default_ledger_inflow(),
        MovementKind::Outflow => Category::default_ledger_outflow(),
    };

    Ok(Movement {
        id: format!("{}{}", origin.id_prefix(), entry.id),
        date,
        kind,
        amount: round_money(raw_amount.abs()),
        status: MovementStatus::Realized,
        category: Category::or_default(
            entry.category.as_deref(),
            entry.category_color.as_deref(),
            default_category,
        ),
        origin,
        source_id: entry.id,
        description: entry.description.clone().unwrap_or_default(),
        running_balance: entry.running_balance.map(round_money),
    })
}

/// Map a payable. Paid payables are realized on their payment date when known;
/// open ones are expected or overdue relative to `today`.
pub fn map_payable(payable: &Payable, today: NaiveDate) -> Result<Movement, DropReason> {
    let date = if payable.paid {
        payable.paid_date.or(payable.due_date)
    } else {
        payable.due_date
    }
    .ok_or(DropReason::MissingDate)?;

    let amount = payable.amount.ok_or(DropReason::MissingAmount)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DropReason::NegativeAmount);
    }

    Ok(Movement {
        id: format!("{}{}", Origin::Payable.id_prefix(), payable.id),
        date,
        kind: MovementKind::Outflow,
        amount: round_money(amount),
        status: MovementStatus::derive(payable.paid, date, today),
        category: Category::or_default(
            payable.category.as_deref(),
            payable.category_color.as_deref(),
            Category::default_payable(),
        ),
        origin: Origin::Payable,
        source_id: payable.id,
        description: payable
            .description
            .clone()
            .unwrap_or_else(|| "Conta a pagar".to_string()),
        running_balance: None,
    })
}

/// Map a sale. A completed sale is treated as settled when it happens.
pub fn map_sale(sale: &Sale) -> Result<Movement, DropReason> {
    let date = sale.date.ok_or(DropReason::MissingDate)?;
    let amount = sale.amount.ok_or(DropReason::MissingAmount)?;
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(DropReason::NegativeAmount);
    }

    let description = match sale.customer.as_deref().map(str::trim) {
        Some(customer) if !customer.is_empty() => format!("Venda - {}", customer),
        _ => "Venda".to_string(),
    };

    Ok(Movement {
        id: format!("{}{}", Origin::Sale.id_prefix(), sale.id),
        date,
        kind: MovementKind::Inflow,
        amount: round_money(amount),
        status: MovementStatus::Realized,
        category: Category::or_default(
            sale.category.as_deref(),
            sale.category_color.as_deref(),
            Category::default_sale(),
        ),
        origin: Origin::Sale,
        source_id: sale.id,
        description,
        running_balance: None,
    })
}

/// Map any raw record
pub fn map_record(record: &RawRecord, today: NaiveDate) -> Result<Movement, DropReason> {
    match record {
        RawRecord::Ledger(entry) => map_ledger(entry),
        RawRecord::Payable(payable) => map_payable(payable, today),
        RawRecord::Sale(sale) => map_sale(sale),
    }
}

/// Map a list of records in order, then stable-sort newest first.
/// Unusable records are dropped and reported.
pub fn unify_records(records: &[RawRecord], now: DateTime<Utc>) -> UnifiedTimeline {
    let today = now.date_naive();
    let mut movements = Vec::with_capacity(records.len());
    let mut diagnostics = UnificationDiagnostics::default();

    for record in records {
        match map_record(record, today) {
            Ok(movement) => movements.push(movement),
            Err(reason) => {
                warn!(
                    "Dropping {} record {}: {}",
                    record.source().as_str(),
                    record.id(),
                    reason
                );
                diagnostics.dropped.push(DroppedRecord {
                    source: record.source(),
                    record_id: record.id(),
                    reason,
                });
            }
        }
    }

    // sort_by is stable: same-day movements keep ledger, payables, sales order
    movements.sort_by(|a, b| b.date.cmp(&a.date));

    debug!(
        "Unified {} movements ({} dropped)",
        movements.len(),
        diagnostics.dropped_count()
    );

    UnifiedTimeline {
        movements,
        diagnostics,
    }
}

/// Merge the three source collections: ledger, then payables, then sales.
pub fn unify(
    ledger: &[LedgerEntry],
    payables: &[Payable],
    sales: &[Sale],
    now: DateTime<Utc>,
) -> UnifiedTimeline {
    let records: Vec<RawRecord> = ledger
        .iter()
        .cloned()
        .map(RawRecord::from)
        .chain(payables.iter().cloned().map(RawRecord::from))
        .chain(sales.iter().cloned().map(RawRecord::from))
        .collect();

    unify_records(&records, now)
}
