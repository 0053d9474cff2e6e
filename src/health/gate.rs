//! Readiness gate.
//!
//! Repeats a [`Probe`] against the broker until it succeeds or the polling
//! budget is spent. The result only tells the caller what happened; a
//! timeout is not an error and the caller is expected to carry on.

use std::fmt;
use std::time::Duration;

use tokio::time::{self, Instant};

use crate::config::{GateConfig, ProbeKind};
use crate::health::probe::{MqttProbe, Probe, TcpProbe};

/// Deadline used when `timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// How the gate resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The target accepted a connection.
    Reachable,
    /// The budget elapsed without a successful attempt.
    TimedOut,
}

impl Outcome {
    pub fn is_reachable(self) -> bool {
        matches!(self, Outcome::Reachable)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Reachable => write!(f, "reachable"),
            Outcome::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Polls one endpoint with a fixed interval until it answers or time runs out.
pub struct ReadinessGate<P> {
    probe: P,
    host: String,
    port: u16,
    timeout: Duration,
    poll_interval: Duration,
    connect_timeout: Duration,
}

impl<P: Probe> ReadinessGate<P> {
    pub fn new(config: &GateConfig, probe: P) -> Self {
        Self {
            probe,
            host: config.host.clone(),
            port: config.port,
            timeout: config.timeout(),
            poll_interval: config.poll_interval(),
            connect_timeout: config.connect_timeout(),
        }
    }

    /// Block until the target is reachable or the deadline passes.
    ///
    /// At least one attempt is always made, even with a zero budget. Total
    /// wall time stays below `timeout + poll_interval` plus the duration of
    /// the attempt that straddles the deadline.
    pub async fn await_reachable(&self) -> Outcome {
        let started = Instant::now();
        let deadline = started
            .checked_add(self.timeout)
            .unwrap_or_else(|| started + FAR_FUTURE);
        let mut attempts: u32 = 0;

        tracing::info!(
            host = %self.host,
            port = self.port,
            timeout_secs = self.timeout.as_secs(),
            poll_interval_secs = self.poll_interval.as_secs(),
            "Waiting for broker"
        );

        loop {
            attempts += 1;
            let remaining = deadline.saturating_duration_since(Instant::now());
            let attempt_timeout = if remaining.is_zero() {
                self.connect_timeout.min(self.poll_interval)
            } else {
                self.connect_timeout.min(remaining)
            };

            match self.probe.probe(&self.host, self.port, attempt_timeout).await {
                Ok(()) => {
                    tracing::info!(
                        attempts,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Broker reachable"
                    );
                    return Outcome::Reachable;
                }
                Err(e) => {
                    tracing::debug!(attempt = attempts, error = %e, "Broker not yet reachable");
                }
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            time::sleep(self.poll_interval.min(deadline - now)).await;
            if Instant::now() >= deadline {
                break;
            }
        }

        tracing::warn!(
            host = %self.host,
            port = self.port,
            attempts,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Timed out waiting for broker"
        );
        Outcome::TimedOut
    }
}

/// Run the gate with the probe selected by `config.probe`.
pub async fn await_reachable(config: &GateConfig) -> Outcome {
    match config.probe {
        ProbeKind::Tcp => ReadinessGate::new(config, TcpProbe).await_reachable().await,
        ProbeKind::Mqtt => {
            ReadinessGate::new(config, MqttProbe::new(config.mqtt.clone()))
                .await_reachable()
                .await
        }
    }
}
