//! Configuration loading: defaults, TOML file, environment, then flags.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use thiserror::Error;

use crate::config::schema::{Config, ProbeKind};
use crate::config::validation::{validate_config, ValidationError};

pub const ENV_HOST: &str = "MQTT_BROKER_HOST";
pub const ENV_PORT: &str = "MQTT_BROKER_PORT";
pub const ENV_TIMEOUT: &str = "WAIT_TIMEOUT";
pub const ENV_SLEEP: &str = "SLEEP";
/// Older name for `SLEEP`; `SLEEP` wins when both are set.
pub const ENV_WAIT_SLEEP: &str = "WAIT_SLEEP";
pub const ENV_CONNECT_TIMEOUT: &str = "CONNECT_TIMEOUT";
pub const ENV_PROBE: &str = "WAIT_PROBE";
pub const ENV_CLIENT_ID: &str = "MQTT_CLIENT_ID";
pub const ENV_USERNAME: &str = "MQTT_USERNAME";
pub const ENV_PASSWORD: &str = "MQTT_PASSWORD";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid value {value:?} for {var}: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values given explicitly on the command line. `None` leaves the lower
/// layers untouched.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub connect_timeout_secs: Option<u64>,
    pub probe: Option<ProbeKind>,
    pub strict: bool,
    pub log_level: Option<String>,
}

/// Read a TOML config file. Missing fields take their defaults.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Layer environment variables over `config`.
///
/// `lookup` stands in for `std::env::var` so callers can supply a fixed map.
/// Empty values are treated as unset.
pub fn apply_env<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
    let gate = &mut config.gate;

    if let Some(host) = get(ENV_HOST) {
        gate.host = host.trim().to_string();
    }
    if let Some(raw) = get(ENV_PORT) {
        gate.port = parse_var(ENV_PORT, &raw)?;
    }
    if let Some(raw) = get(ENV_TIMEOUT) {
        gate.timeout_secs = parse_var(ENV_TIMEOUT, &raw)?;
    }
    if let Some(raw) = get(ENV_SLEEP) {
        gate.poll_interval_secs = parse_var(ENV_SLEEP, &raw)?;
    } else if let Some(raw) = get(ENV_WAIT_SLEEP) {
        gate.poll_interval_secs = parse_var(ENV_WAIT_SLEEP, &raw)?;
    }
    if let Some(raw) = get(ENV_CONNECT_TIMEOUT) {
        gate.connect_timeout_secs = parse_var(ENV_CONNECT_TIMEOUT, &raw)?;
    }
    if let Some(raw) = get(ENV_PROBE) {
        gate.probe = parse_var(ENV_PROBE, &raw)?;
    }
    if let Some(client_id) = get(ENV_CLIENT_ID) {
        gate.mqtt.client_id = client_id;
    }
    if let Some(username) = get(ENV_USERNAME) {
        gate.mqtt.username = Some(username);
    }
    if let Some(password) = get(ENV_PASSWORD) {
        gate.mqtt.password = Some(password);
    }

    Ok(())
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Env {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Layer command-line overrides over `config`.
pub fn apply_overrides(config: &mut Config, overrides: &Overrides) {
    let gate = &mut config.gate;
    if let Some(host) = &overrides.host {
        gate.host = host.clone();
    }
    if let Some(port) = overrides.port {
        gate.port = port;
    }
    if let Some(timeout) = overrides.timeout_secs {
        gate.timeout_secs = timeout;
    }
    if let Some(interval) = overrides.poll_interval_secs {
        gate.poll_interval_secs = interval;
    }
    if let Some(connect_timeout) = overrides.connect_timeout_secs {
        gate.connect_timeout_secs = connect_timeout;
    }
    if let Some(probe) = overrides.probe {
        gate.probe = probe;
    }
    if overrides.strict {
        gate.strict = true;
    }
    if let Some(level) = &overrides.log_level {
        config.observability.log_level = level.clone();
    }
}

/// Build the final, validated configuration from every layer.
pub fn build_config<F>(
    file: Option<&Path>,
    lookup: F,
    overrides: &Overrides,
) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match file {
        Some(path) => load_file(path)?,
        None => Config::default(),
    };
    apply_env(&mut config, lookup)?;
    apply_overrides(&mut config, overrides);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn no_layers_gives_defaults() {
        let config = build_config(None, env(&[]), &Overrides::default()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = build_config(
            None,
            env(&[
                (ENV_HOST, "localhost"),
                (ENV_PORT, "9999"),
                (ENV_TIMEOUT, "2"),
                (ENV_SLEEP, "1"),
                (ENV_PROBE, "mqtt"),
            ]),
            &Overrides::default(),
        )
        .unwrap();

        assert_eq!(config.gate.host, "localhost");
        assert_eq!(config.gate.port, 9999);
        assert_eq!(config.gate.timeout_secs, 2);
        assert_eq!(config.gate.poll_interval_secs, 1);
        assert_eq!(config.gate.probe, ProbeKind::Mqtt);
    }

    #[test]
    fn empty_environment_values_are_unset() {
        let config = build_config(
            None,
            env(&[(ENV_HOST, ""), (ENV_PORT, "  ")]),
            &Overrides::default(),
        )
        .unwrap();
        assert_eq!(config.gate.host, "mosquitto");
        assert_eq!(config.gate.port, 1883);
    }

    #[test]
    fn flags_override_environment() {
        let overrides = Overrides {
            port: Some(1884),
            strict: true,
            ..Default::default()
        };
        let config =
            build_config(None, env(&[(ENV_PORT, "9999"), (ENV_HOST, "envhost")]), &overrides)
                .unwrap();
        assert_eq!(config.gate.port, 1884);
        assert_eq!(config.gate.host, "envhost");
        assert!(config.gate.strict);
    }

    #[test]
    fn unparseable_port_names_the_variable() {
        let err = build_config(None, env(&[(ENV_PORT, "abc")]), &Overrides::default())
            .unwrap_err();
        match err {
            ConfigError::Env { var, value, .. } => {
                assert_eq!(var, ENV_PORT);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn out_of_range_port_is_rejected() {
        let err = build_config(None, env(&[(ENV_PORT, "70000")]), &Overrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Env { var: ENV_PORT, .. }));
    }

    #[test]
    fn wait_sleep_is_accepted_when_sleep_is_unset() {
        let config =
            build_config(None, env(&[(ENV_WAIT_SLEEP, "3")]), &Overrides::default()).unwrap();
        assert_eq!(config.gate.poll_interval_secs, 3);

        let config = build_config(
            None,
            env(&[(ENV_WAIT_SLEEP, "3"), (ENV_SLEEP, "2")]),
            &Overrides::default(),
        )
        .unwrap();
        assert_eq!(config.gate.poll_interval_secs, 2);
    }

    #[test]
    fn zero_interval_fails_validation() {
        let err =
            build_config(None, env(&[(ENV_SLEEP, "0")]), &Overrides::default()).unwrap_err();
        match err {
            ConfigError::Validation(errors) => {
                assert_eq!(errors, vec![ValidationError::PollIntervalZero]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn file_sits_between_defaults_and_environment() {
        let path = std::env::temp_dir().join(format!(
            "broker-gate-loader-{}.toml",
            std::process::id()
        ));
        fs::write(
            &path,
            "[gate]\nhost = \"filehost\"\ntimeout_secs = 5\n\n[observability]\nlog_level = \"debug\"\n",
        )
        .unwrap();

        let config =
            build_config(Some(&path), env(&[(ENV_TIMEOUT, "7")]), &Overrides::default())
                .unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(config.gate.host, "filehost");
        assert_eq!(config.gate.timeout_secs, 7);
        assert_eq!(config.observability.log_level, "debug");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = build_config(
            Some(Path::new("/nonexistent/broker-gate.toml")),
            env(&[]),
            &Overrides::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
