pub mod ledger_repository;
pub mod payable_repository;
pub mod sale_repository;
pub mod source;

// Re-export all repositories for convenient access
pub use ledger_repository::LedgerRepository;
pub use payable_repository::PayableRepository;
pub use sale_repository::SaleRepository;
pub use source::{DateWindow, PgTransactionSource, TransactionSource};
