//! Broker readiness checking.
//!
//! # Data Flow
//! ```text
//! gate.rs (ReadinessGate):
//!     deadline = start + timeout
//!     → probe.rs (one attempt: TCP connect, or MQTT CONNECT/CONNACK)
//!     → success: Reachable
//!     → failure: past deadline? TimedOut : sleep interval, try again
//! ```
//!
//! # Design Decisions
//! - All probe failures look the same to the gate; causes are debug logs
//! - At least one attempt, even with a zero budget
//! - Strictly sequential: one socket open at a time, dropped after each attempt

pub mod gate;
pub mod probe;

pub use gate::{await_reachable, Outcome, ReadinessGate};
pub use probe::{MqttProbe, Probe, ProbeError, TcpProbe};
