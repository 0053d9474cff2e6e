//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! config, health, lifecycle
//!     → tracing events with structured fields (target, attempts, elapsed_ms)
//!     → logging.rs (fmt layer, stderr, EnvFilter)
//! ```

pub mod logging;

pub use logging::init_logging;
