//! Configuration schema definitions.
//!
//! All types derive Serde traits so the same structure can be read from a
//! TOML file. Every field has a default, so an empty file is a valid config.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

/// Default broker host (the compose service name).
pub const DEFAULT_HOST: &str = "mosquitto";
/// Default MQTT port.
pub const DEFAULT_PORT: u16 = 1883;
/// Default total polling budget in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Default delay between attempts in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 1;
/// Default upper bound on a single attempt in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Root configuration for the gate process.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Readiness gate settings.
    pub gate: GateConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Settings for one readiness check.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct GateConfig {
    /// Target hostname or IP literal.
    pub host: String,

    /// Target port.
    pub port: u16,

    /// Total budget for polling, in seconds. Zero still allows one attempt.
    pub timeout_secs: u64,

    /// Delay between attempts, in seconds.
    pub poll_interval_secs: u64,

    /// Upper bound on a single attempt, in seconds.
    pub connect_timeout_secs: u64,

    /// How reachability is established.
    pub probe: ProbeKind,

    /// Exit non-zero on timeout when there is no command to hand off to.
    pub strict: bool,

    /// Session parameters for the MQTT probe.
    pub mqtt: MqttProbeConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            probe: ProbeKind::default(),
            strict: false,
            mqtt: MqttProbeConfig::default(),
        }
    }
}

impl GateConfig {
    /// Total polling budget.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Delay between attempts.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Per-attempt bound.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    /// `host:port` for log lines.
    pub fn target(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Which probe the gate repeats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// Plain TCP connect.
    #[default]
    Tcp,
    /// TCP connect followed by an MQTT CONNECT/CONNACK exchange.
    Mqtt,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeKind::Tcp => write!(f, "tcp"),
            ProbeKind::Mqtt => write!(f, "mqtt"),
        }
    }
}

impl FromStr for ProbeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tcp" => Ok(ProbeKind::Tcp),
            "mqtt" => Ok(ProbeKind::Mqtt),
            other => Err(format!("unknown probe kind '{}', expected tcp or mqtt", other)),
        }
    }
}

/// MQTT session parameters for the handshake probe.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct MqttProbeConfig {
    /// Client identifier sent in CONNECT.
    pub client_id: String,

    /// Optional username.
    pub username: Option<String>,

    /// Optional password, only sent together with a username.
    pub password: Option<String>,
}

impl Default for MqttProbeConfig {
    fn default() -> Self {
        Self {
            client_id: format!("broker-gate-{}", std::process::id()),
            username: None,
            password: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
