//! Domain models for the cash-flow engine.
//!
//! Raw source records, the unified `Movement`, and the derived snapshot,
//! projection and alert types handed to the presentation layer.

pub mod alert;
pub mod indicators;
pub mod movement;
pub mod projection;
pub mod raw;
pub mod series;

// Re-export all models for convenient access
pub use alert::{Alert, AlertKind, AlertPriority, AlertSeverity, AlertStatus};
pub use indicators::{IndicatorSnapshot, LiquidityStatus, Trend};
pub use movement::{Category, Movement, MovementKind, MovementStatus, Origin};
pub use projection::{BreakdownBucket, CategoryBreakdown, Projection, ProjectionStatus};
pub use raw::{LedgerEntry, Payable, RawRecord, Sale, SourceKind};
pub use series::{CategoryTotal, DailyFlow};
