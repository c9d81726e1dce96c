pub mod alerts;
pub mod audit;
pub mod cash_flow_service;
pub mod indicators;
pub mod projector;
pub mod series;
pub mod unifier;

pub use alerts::AlertGenerator;
pub use audit::AlertJournal;
pub use cash_flow_service::{CashFlowService, RefreshOutcome};
pub use indicators::IndicatorCalculator;
pub use projector::{ConfidenceCurve, Projector, Velocity};
pub use unifier::{unify, unify_records, DropReason, DroppedRecord, UnificationDiagnostics, UnifiedTimeline};
