use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a movement. The sign lives here, never in the amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementKind {
    Inflow,
    Outflow,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::Inflow => "inflow",
            MovementKind::Outflow => "outflow",
        }
    }

    /// Interpret a source direction tag. Bank exports and manual entries use
    /// several spellings, Portuguese and English.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_lowercase().as_str() {
            "entrada" | "credito" | "crédito" | "receita" | "inflow" | "credit" => {
                Some(MovementKind::Inflow)
            }
            "saida" | "saída" | "debito" | "débito" | "despesa" | "outflow" | "debit" => {
                Some(MovementKind::Outflow)
            }
            _ => None,
        }
    }
}

/// Settlement state of a movement at evaluation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovementStatus {
    Realized,
    Expected,
    Overdue,
}

impl MovementStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementStatus::Realized => "realized",
            MovementStatus::Expected => "expected",
            MovementStatus::Overdue => "overdue",
        }
    }

    /// Derive the status of a record from its settlement flag and date.
    ///
    /// An unsettled record dated strictly before `today` is overdue; one dated
    /// today or later is still expected.
    pub fn derive(settled: bool, date: NaiveDate, today: NaiveDate) -> Self {
        if settled {
            MovementStatus::Realized
        } else if date < today {
            MovementStatus::Overdue
        } else {
            MovementStatus::Expected
        }
    }
}

/// Which collaborator produced a movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Ledger,
    Payable,
    Sale,
    Manual,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Ledger => "ledger",
            Origin::Payable => "payable",
            Origin::Sale => "sale",
            Origin::Manual => "manual",
        }
    }

    /// Prefix that keeps ids unique across sources
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Origin::Ledger | Origin::Manual => "bank_",
            Origin::Payable => "conta_",
            Origin::Sale => "venda_",
        }
    }

    /// Manual entries are typed into the bank ledger, so both count as ledger
    pub fn is_ledger(&self) -> bool {
        matches!(self, Origin::Ledger | Origin::Manual)
    }
}

/// Display category of a movement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub color: String,
}

impl Category {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }

    /// Use the supplied label/color where present, otherwise the default
    pub fn or_default(name: Option<&str>, color: Option<&str>, default: Category) -> Self {
        let name = name
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or(default.name);
        let color = color
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .unwrap_or(default.color);
        Self { name, color }
    }

    pub fn default_ledger_inflow() -> Self {
        Self::new("Receitas", "#10b981")
    }

    pub fn default_ledger_outflow() -> Self {
        Self::new("Despesas", "#ef4444")
    }

    pub fn default_payable() -> Self {
        Self::new("Contas a pagar", "#f97316")
    }

    pub fn default_sale() -> Self {
        Self::new("Vendas", "#3b82f6")
    }
}

/// A single normalized financial event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
    pub id: String,
    pub date: NaiveDate,
    pub kind: MovementKind,
    pub amount: Decimal,
    pub status: MovementStatus,
    pub category: Category,
    pub origin: Origin,
    /// Back-reference to the originating record, for traceability only
    pub source_id: Uuid,
    pub description: String,
    pub running_balance: Option<Decimal>,
}

impl Movement {
    pub fn is_realized(&self) -> bool {
        self.status == MovementStatus::Realized
    }

    pub fn is_inflow(&self) -> bool {
        self.kind == MovementKind::Inflow
    }

    pub fn is_outflow(&self) -> bool {
        self.kind == MovementKind::Outflow
    }

    /// Status re-evaluated against another day without touching the movement.
    /// Realized stays realized; anything pending is re-derived from the date.
    pub fn status_at(&self, today: NaiveDate) -> MovementStatus {
        match self.status {
            MovementStatus::Realized => MovementStatus::Realized,
            MovementStatus::Expected | MovementStatus::Overdue => {
                MovementStatus::derive(false, self.date, today)
            }
        }
    }
}
