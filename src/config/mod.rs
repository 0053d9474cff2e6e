//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! schema.rs defaults
//!     → loader.rs (optional TOML file)
//!     → loader.rs (MQTT_BROKER_HOST, MQTT_BROKER_PORT, WAIT_TIMEOUT, SLEEP, ...)
//!     → loader.rs (command-line flags)
//!     → validation.rs (semantic checks)
//!     → Config (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is built once at startup and never mutated afterwards
//! - All fields have defaults to allow an empty environment
//! - Validation separates syntactic (serde, parse) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{build_config, ConfigError, Overrides};
pub use schema::{Config, GateConfig, MqttProbeConfig, ObservabilityConfig, ProbeKind};
pub use validation::ValidationError;
