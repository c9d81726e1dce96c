//! PostgreSQL connection handling for the source readers.

pub mod pool;

pub use pool::{create_pool, Database, DatabaseError};
