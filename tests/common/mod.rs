//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

static SCRATCH_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Bind an ephemeral port and keep accepting (and dropping) connections.
pub async fn start_listener() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            drop(socket);
        }
    });
    port
}

/// A port that was free a moment ago and has nothing listening on it.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// Reserve a port now, start listening on it after `delay`.
pub async fn start_listener_after(delay: Duration) -> u16 {
    let port = closed_port().await;

    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let listener = TcpListener::bind(("127.0.0.1", port)).await.unwrap();
        while let Ok((socket, _)) = listener.accept().await {
            drop(socket);
        }
    });
    port
}

/// Minimal MQTT broker: reads CONNECT, answers CONNACK (accepted).
pub async fn start_fake_broker() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                let mut buf = [0u8; 256];
                if socket.read(&mut buf).await.unwrap_or(0) == 0 {
                    return;
                }
                let _ = socket.write_all(&[0x20, 0x02, 0x00, 0x00]).await;
                let _ = socket.read(&mut buf).await;
            });
        }
    });
    port
}

/// A unique path under the temp dir. The file is not created.
pub fn scratch_file(name: &str) -> PathBuf {
    let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!(
        "broker-gate-{}-{}-{}",
        name,
        std::process::id(),
        n
    ))
}
