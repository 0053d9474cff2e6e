//! Configuration validation.
//!
//! Serde handles syntax; this module checks value ranges. Every violation is
//! collected so an operator sees them all at once.

use thiserror::Error;

use crate::config::schema::Config;

/// A single semantic violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("gate.host must not be empty")]
    EmptyHost,

    #[error("gate.port must be in 1..=65535")]
    PortZero,

    #[error("gate.poll_interval_secs must be at least 1")]
    PollIntervalZero,

    #[error("gate.connect_timeout_secs must be at least 1")]
    ConnectTimeoutZero,

    #[error("gate.mqtt.client_id must not be empty")]
    EmptyClientId,

    #[error("gate.mqtt.password requires gate.mqtt.username")]
    PasswordWithoutUsername,
}

/// Check a fully layered config.
pub fn validate_config(config: &Config) -> Result<(), Vec<ValidationError>> {
    let gate = &config.gate;
    let mut errors = Vec::new();

    if gate.host.trim().is_empty() {
        errors.push(ValidationError::EmptyHost);
    }
    if gate.port == 0 {
        errors.push(ValidationError::PortZero);
    }
    if gate.poll_interval_secs == 0 {
        errors.push(ValidationError::PollIntervalZero);
    }
    if gate.connect_timeout_secs == 0 {
        errors.push(ValidationError::ConnectTimeoutZero);
    }
    if gate.mqtt.client_id.is_empty() {
        errors.push(ValidationError::EmptyClientId);
    }
    if gate.mqtt.password.is_some() && gate.mqtt.username.is_none() {
        errors.push(ValidationError::PasswordWithoutUsername);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
