//! Keyed storage abstractions for Tickbook
//!
//! This crate defines the generic keyed store the market data core persists
//! through. It never assumes multi-key atomicity: every call stands alone.
//!
//! - [`KeyedStore`] - CRUD trait implemented by storage adapters
//! - [`InMemoryStore`] - default implementation for tests and single-process runs

pub mod error;
pub mod store;

pub use error::StorageError;
pub use store::{InMemoryStore, KeyedStore};

/// Result type for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
