//! Reachability probes.
//!
//! A probe is one attempt to reach the broker. The gate repeats it until it
//! succeeds or the budget runs out, so a probe never retries on its own.
//! Each probe owns its socket for the duration of the attempt and drops it
//! before returning.

use std::future::Future;
use std::time::Duration;

use rumqttc::{AsyncClient, ConnectReturnCode, ConnectionError, Event, MqttOptions, Packet};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::time;

use crate::config::MqttProbeConfig;

/// Keep-alive advertised in the probe's CONNECT. The session never lives
/// long enough to send a PINGREQ.
const MQTT_KEEP_ALIVE: Duration = Duration::from_secs(5);

/// Why a single attempt failed. The gate treats every variant the same.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("connect failed: {0}")]
    Connect(#[from] std::io::Error),

    #[error("no answer within {0:?}")]
    Timeout(Duration),

    #[error("mqtt handshake failed: {0}")]
    Handshake(String),
}

/// One reachability attempt against `host:port`, bounded by `timeout`.
pub trait Probe {
    fn probe(
        &self,
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> impl Future<Output = Result<(), ProbeError>>;
}

/// Plain TCP connect. No bytes are exchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpProbe;

impl Probe for TcpProbe {
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> Result<(), ProbeError> {
        match time::timeout(timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(stream)) => {
                tracing::trace!(peer = ?stream.peer_addr().ok(), "TCP probe connected");
                drop(stream);
                Ok(())
            }
            Ok(Err(e)) => Err(ProbeError::Connect(e)),
            Err(_) => Err(ProbeError::Timeout(timeout)),
        }
    }
}

/// TCP connect followed by an MQTT 3.1.1 CONNECT, waiting for CONNACK.
///
/// Any CONNACK counts as reachable: a refusal code (bad credentials, unknown
/// client id) still proves the broker is up and speaking MQTT. Refusals are
/// logged so the operator can see the publisher is about to fail.
#[derive(Debug, Clone)]
pub struct MqttProbe {
    session: MqttProbeConfig,
}

impl MqttProbe {
    pub fn new(session: MqttProbeConfig) -> Self {
        Self { session }
    }

    fn options(&self, host: &str, port: u16) -> MqttOptions {
        let mut options = MqttOptions::new(self.session.client_id.clone(), host, port);
        options.set_clean_session(true);
        options.set_keep_alive(MQTT_KEEP_ALIVE);
        if let Some(username) = &self.session.username {
            options.set_credentials(
                username.clone(),
                self.session.password.clone().unwrap_or_default(),
            );
        }
        options
    }
}

impl Probe for MqttProbe {
    async fn probe(&self, host: &str, port: u16, timeout: Duration) -> Result<(), ProbeError> {
        let (_client, mut eventloop) = AsyncClient::new(self.options(host, port), 1);

        let handshake = async {
            loop {
                match eventloop.poll().await {
                    Ok(Event::Incoming(Packet::ConnAck(ack))) => return Ok(ack.code),
                    Ok(_) => continue,
                    Err(ConnectionError::ConnectionRefused(code)) => return Ok(code),
                    Err(ConnectionError::Io(e)) => return Err(ProbeError::Connect(e)),
                    Err(e) => return Err(ProbeError::Handshake(e.to_string())),
                }
            }
        };

        let code = match time::timeout(timeout, handshake).await {
            Ok(result) => result?,
            Err(_) => return Err(ProbeError::Timeout(timeout)),
        };

        if code != ConnectReturnCode::Success {
            tracing::warn!(
                client_id = %self.session.client_id,
                code = ?code,
                "Broker answered CONNECT with a refusal"
            );
        }
        Ok(())
    }
}
