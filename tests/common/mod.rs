//! Mock Electrum servers for integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use electrum_health::electrum_probe::prelude::*;
use electrum_health::electrum_probe::transport::{Resolution, setup_tls_connector};

/// A mock server plus a counter of accepted connections.
pub struct MockServer {
    pub port: u16,
    connections: Arc<AtomicUsize>,
}

impl MockServer {
    pub fn url(&self) -> String {
        format!("tcp://127.0.0.1:{}", self.port)
    }

    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

/// Start a mock server that reads the request and answers with `reply` after `delay`.
pub async fn start_mock_electrum(reply: &'static [u8], delay: Duration) -> MockServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let connections = Arc::new(AtomicUsize::new(0));

    let counter = connections.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            counter.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                tokio::time::sleep(delay).await;
                let _ = socket.write_all(reply).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    MockServer { port, connections }
}

/// A port nothing listens on.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

pub fn prober(timeout: Duration) -> Arc<Prober> {
    Arc::new(Prober::new(
        timeout,
        setup_tls_connector().expect("tls connector"),
        Resolution::System,
    ))
}
