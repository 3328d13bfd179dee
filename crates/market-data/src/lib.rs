//! Market data state for option universes
//!
//! This crate keeps derived market values in sync with their sources and
//! answers point-in-time questions over per-security tick histories.
//!
//! # Core Components
//!
//! - [`quote`] - Source quotes and their observer fan-out
//! - [`handle`] - Cached views bound to one quote
//! - [`types`] - Ticks, tick fields and security kinds
//! - [`security`] - Securities with ordered tick histories
//! - [`universe`] - Named security collections and snapshot reports
//! - [`coordinator`] - Snapshot date selection across a universe
//! - [`surface`] - Expiry x strike grids built from current ticks
//! - [`symbol`] - OCC option symbology
//! - [`loader`] - Tick-source rows grouped into a universe
//! - [`persist`] - Quote values through a keyed store
//!
//! # Key Invariants
//!
//! - After `Quote::set_value` returns, every live handle on it holds the new value
//! - Quotes and their dependents reference each other weakly
//! - Tick histories are strictly increasing by observation date
//! - A snapshot matches exact dates only; a miss means no current data

pub mod coordinator;
pub mod error;
pub mod handle;
pub mod loader;
pub mod persist;
pub mod quote;
pub mod security;
pub mod surface;
pub mod symbol;
pub mod types;
pub mod universe;

pub use coordinator::{SelectionSummary, SnapshotCoordinator, SnapshotState};
pub use error::MarketDataError;
pub use handle::Handle;
pub use loader::TickRow;
pub use persist::{restore_prices, restore_quote, save_prices, save_quote};
pub use quote::{Observer, ObserverRegistry, Quote, QuoteLink};
pub use security::{OptionTerms, Security};
pub use surface::{Surface, SurfaceBuilder};
pub use symbol::occ_symbol;
pub use types::{MarketTick, MarketTickBuilder, OptionRight, SecurityKind, TickField};
pub use universe::{SnapshotRow, Universe};

pub type Result<T> = std::result::Result<T, MarketDataError>;
