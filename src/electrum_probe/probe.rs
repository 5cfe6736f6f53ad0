use std::future::Future;
use std::io;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio_native_tls::TlsConnector as TokioTlsConnector;

use super::prelude::*;
use super::transport::{self, Resolution};
use crate::endpoint::{Endpoint, Transport};

/// The one request every server receives.
pub const REQUEST: &[u8] = b"{\"id\":1,\"method\":\"blockchain.headers.subscribe\",\"params\":[]}\n";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);

const READ_CHUNK: usize = 4096;
const MAX_RESPONSE_BYTES: usize = 1024 * 1024;

/// Failure classification for one probe. `Display` yields the reported detail.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("Timeout")]
    Timeout,

    #[error("Connection refused")]
    ConnectionRefused,

    #[error("SSL error: {0}")]
    Tls(native_tls::Error),

    #[error("No valid response")]
    NoValidResponse,

    #[error("{0}")]
    Resolve(String),

    #[error("{0}")]
    Io(io::Error),
}

impl From<io::Error> for ProbeError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::TimedOut => ProbeError::Timeout,
            io::ErrorKind::ConnectionRefused => ProbeError::ConnectionRefused,
            _ => ProbeError::Io(err),
        }
    }
}

/// Checks Electrum servers, one connection and one request per call.
pub struct Prober {
    timeout: Duration,
    connector: TokioTlsConnector,
    resolution: Resolution,
}

impl Prober {
    pub fn new(timeout: Duration, connector: TokioTlsConnector, resolution: Resolution) -> Self {
        Self {
            timeout,
            connector,
            resolution,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Probe a single endpoint. Never fails: every error becomes a failed outcome.
    pub async fn probe(&self, endpoint: Endpoint) -> ProbeOutcome {
        let start = Instant::now();
        let result = self.exchange_with(&endpoint).await;
        let elapsed = start.elapsed();

        match result {
            Ok(()) => {
                log::debug!("{}: OK in {:.2}ms", endpoint, elapsed.as_secs_f64() * 1000.0);
                ProbeOutcome::ok(endpoint, elapsed)
            }
            Err(e) => {
                log::debug!("{}: {}", endpoint, e);
                ProbeOutcome::failed(endpoint, e.to_string(), elapsed)
            }
        }
    }

    async fn exchange_with(&self, endpoint: &Endpoint) -> Result<(), ProbeError> {
        let stream = deadline(
            self.timeout,
            transport::connect_tcp(&self.resolution, endpoint),
        )
        .await?;

        match endpoint.transport() {
            Transport::Plaintext => exchange(stream, self.timeout).await,
            Transport::Encrypted => {
                let tls = deadline(
                    self.timeout,
                    transport::handshake(&self.connector, endpoint, stream),
                )
                .await?;
                exchange(tls, self.timeout).await
            }
        }
    }
}

async fn deadline<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, ProbeError>>,
) -> Result<T, ProbeError> {
    tokio::time::timeout(limit, fut)
        .await
        .map_err(|_| ProbeError::Timeout)?
}

/// Send the request and judge the first reply line. The stream is dropped,
/// and the connection closed, on every return path.
///
/// The whole reply, not each read, has to arrive within `limit`; a peer
/// trickling bytes cannot hold the connection open past it.
async fn exchange<S>(mut stream: S, limit: Duration) -> Result<(), ProbeError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    deadline(limit, async {
        stream.write_all(REQUEST).await?;
        stream.flush().await?;
        Ok::<(), ProbeError>(())
    })
    .await?;

    let response = deadline(limit, read_reply(&mut stream)).await?;

    if is_valid_reply(&response) {
        Ok(())
    } else {
        Err(ProbeError::NoValidResponse)
    }
}

/// Read until the first newline, end of stream, or the size cap.
async fn read_reply<S>(stream: &mut S) -> Result<Vec<u8>, ProbeError>
where
    S: AsyncRead + Unpin,
{
    let mut response = Vec::new();
    let mut chunk = [0u8; READ_CHUNK];
    loop {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        response.extend_from_slice(&chunk[..n]);
        if chunk[..n].contains(&b'\n') || response.len() >= MAX_RESPONSE_BYTES {
            break;
        }
    }
    Ok(response)
}

/// A reply counts when it is a JSON object carrying `result` or `error`.
fn is_valid_reply(response: &[u8]) -> bool {
    let trimmed = response.trim_ascii_end();
    if trimmed.is_empty() {
        return false;
    }

    match serde_json::from_slice::<serde_json::Value>(trimmed) {
        Ok(serde_json::Value::Object(reply)) => {
            reply.contains_key("result") || reply.contains_key("error")
        }
        _ => false,
    }
}
