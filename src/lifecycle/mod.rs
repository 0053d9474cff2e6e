//! Process lifecycle.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → ReadinessGate → Outcome (logged, never fatal)
//!
//! Hand-off (handoff.rs):
//!     Outcome → exec trailing command (Unix)
//!            → or spawn, wait, propagate exit code
//!     No command → exit 0 (1 on timeout in strict mode)
//! ```
//!
//! # Design Decisions
//! - The gate is best-effort: the command runs on timeout too
//! - Arguments are handed over untouched, as `OsString`
//! - A command that cannot start exits 127/126 like a shell would

pub mod handoff;
pub mod startup;

pub use handoff::{CommandSpec, HandoffMode, LaunchError};
