//! Logging setup shared by Tickbook binaries
//!
//! # Quick Start
//!
//! ```ignore
//! use observability::{init_logging, LogFormat};
//!
//! init_logging("tickbook", LogFormat::Compact)?;
//! ```

pub mod logging;

pub use logging::{init_logging, LogFormat, DEFAULT_FILTER};
