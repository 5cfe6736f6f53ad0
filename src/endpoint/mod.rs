use std::fmt;

use thiserror::Error;
use url::{Host, Url};

/// The byte-stream flavour an Electrum server is reached over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
    /// `tcp://` servers, plain JSON lines over TCP.
    Plaintext,
    /// `ssl://` servers, the same JSON lines inside a TLS session.
    Encrypted,
}

impl Transport {
    fn from_scheme(scheme: &str) -> Option<Self> {
        match scheme {
            "tcp" => Some(Transport::Plaintext),
            "ssl" => Some(Transport::Encrypted),
            _ => None,
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            Transport::Plaintext => "tcp",
            Transport::Encrypted => "ssl",
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.scheme())
    }
}

/// A parsed server address. Identity is the raw URL it was parsed from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    raw_url: String,
    transport: Transport,
    host: String,
    port: u16,
}

impl Endpoint {
    pub fn raw_url(&self) -> &str {
        &self.raw_url
    }

    pub fn transport(&self) -> Transport {
        self.transport
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw_url)
    }
}

/// Why a raw URL could not be turned into an [`Endpoint`].
///
/// The `Display` output is the detail string reported for the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Invalid URL format")]
    InvalidFormat,

    #[error("Unknown protocol: {0}")]
    UnknownProtocol(String),
}

/// Whether the authority of `raw_url` spells out a `:<port>`.
///
/// The url crate drops an explicit port equal to the scheme's default
/// (`ftp://host:21`), so the raw text is the only place left to look.
fn has_explicit_port(raw_url: &str) -> bool {
    let Some((_, rest)) = raw_url.split_once("://") else {
        return false;
    };
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit('@').next().unwrap_or_default();
    let after_host = match host_port.strip_prefix('[') {
        Some(bracketed) => bracketed.split_once(']').map_or("", |(_, tail)| tail),
        None => host_port,
    };

    match after_host.rsplit_once(':') {
        Some((_, port)) => !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()),
        None => false,
    }
}

/// Parse `<scheme>://<host>:<port>` into an [`Endpoint`].
///
/// Host and port are checked before the scheme, so `ftp://` without a host
/// or port is an invalid format rather than an unknown protocol.
pub fn parse_endpoint(raw_url: &str) -> Result<Endpoint, ParseError> {
    let url = Url::parse(raw_url).map_err(|_| ParseError::InvalidFormat)?;

    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => String::new(),
    };
    let port = match url.port() {
        Some(port) => port,
        None if has_explicit_port(raw_url) => url.port_or_known_default().unwrap_or(0),
        None => 0,
    };

    if host.is_empty() || port == 0 {
        return Err(ParseError::InvalidFormat);
    }

    let transport = Transport::from_scheme(url.scheme())
        .ok_or_else(|| ParseError::UnknownProtocol(url.scheme().to_string()))?;

    Ok(Endpoint {
        raw_url: raw_url.to_string(),
        transport,
        host,
        port,
    })
}
