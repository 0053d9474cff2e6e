//! Broker readiness gate.
//!
//! Waits until an MQTT broker's TCP port accepts connections (or a timeout
//! elapses), then hands the process over to a dependent command.

pub mod cli;
pub mod config;
pub mod health;
pub mod lifecycle;
pub mod observability;

pub use config::{Config, GateConfig};
pub use health::{await_reachable, Outcome, ReadinessGate};
pub use lifecycle::{CommandSpec, HandoffMode};
