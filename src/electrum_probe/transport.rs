use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use tokio::net::TcpStream;
use tokio_native_tls::{TlsConnector as TokioTlsConnector, TlsStream};
use trust_dns_resolver::{
    TokioAsyncResolver,
    config::{NameServerConfig, NameServerConfigGroup, Protocol, ResolverConfig, ResolverOpts},
};

use crate::endpoint::Endpoint;
use crate::error::ConfigError;

use super::probe::ProbeError;

/// Setup a TLS connector for liveness checks.
///
/// Certificate chain and hostname validation are both switched off on purpose:
/// Electrum servers commonly run self-signed certificates, and the probe only
/// answers "does this server speak the protocol", never "should it be trusted".
pub fn setup_tls_connector() -> Result<TokioTlsConnector, ConfigError> {
    let mut builder = native_tls::TlsConnector::builder();
    builder.danger_accept_invalid_certs(true);
    builder.danger_accept_invalid_hostnames(true);
    let connector = builder.build()?;
    Ok(TokioTlsConnector::from(connector))
}

/// Setup a DNS resolver using the provided DNS hosts
/// This function creates a `TokioAsyncResolver` that queries the given name servers over TCP.
/// It sets the resolver options to have 2 attempts, a timeout of 100 milliseconds, and a cache size of 1024 for quick DNS lookups.
/// # Arguments
/// * `dns_hosts` - A slice of strings representing DNS host IPs (e.g., "1.1.1.1")
/// # Returns
/// A `Result` containing a `TokioAsyncResolver` if successful, or a `ConfigError` if a host is not an IP address.
pub fn setup_resolver(dns_hosts: &[String]) -> Result<TokioAsyncResolver, ConfigError> {
    let mut opts = ResolverOpts::default();
    opts.attempts = 2;
    opts.timeout = Duration::from_millis(100);
    opts.cache_size = 1024;

    let mut name_servers = NameServerConfigGroup::new();

    for host in dns_hosts {
        let ip: IpAddr = host.parse().map_err(|source| ConfigError::Resolver {
            host: host.clone(),
            source,
        })?;
        name_servers.push(NameServerConfig {
            socket_addr: (ip, 53).into(),
            protocol: Protocol::Tcp,
            tls_dns_name: None,
            trust_negative_responses: false,
            bind_addr: None,
        });
    }

    let resolver_config = ResolverConfig::from_parts(None, vec![], name_servers);
    Ok(TokioAsyncResolver::tokio(resolver_config, opts))
}

/// How hostnames are turned into socket addresses.
pub enum Resolution {
    /// The operating system resolver, through `tokio::net::lookup_host`.
    System,
    /// A dedicated resolver bound to explicit name servers.
    Custom(TokioAsyncResolver),
}

impl Resolution {
    pub fn from_dns_hosts(dns_hosts: &[String]) -> Result<Self, ConfigError> {
        if dns_hosts.is_empty() {
            Ok(Resolution::System)
        } else {
            Ok(Resolution::Custom(setup_resolver(dns_hosts)?))
        }
    }

    async fn resolve(&self, host: &str, port: u16) -> Result<Vec<SocketAddr>, ProbeError> {
        match self {
            Resolution::System => Ok(tokio::net::lookup_host((host, port)).await?.collect()),
            Resolution::Custom(resolver) => {
                let lookup = resolver
                    .lookup_ip(host)
                    .await
                    .map_err(|e| ProbeError::Resolve(e.to_string()))?;
                Ok(lookup.iter().map(|ip| SocketAddr::new(ip, port)).collect())
            }
        }
    }
}

/// Resolve the endpoint's host and open a TCP connection to the first address that accepts.
pub(super) async fn connect_tcp(
    resolution: &Resolution,
    endpoint: &Endpoint,
) -> Result<TcpStream, ProbeError> {
    let addrs = resolution.resolve(endpoint.host(), endpoint.port()).await?;
    if addrs.is_empty() {
        return Err(ProbeError::Resolve(format!(
            "no addresses found for {}",
            endpoint.host()
        )));
    }
    log::debug!("{}: connecting to {:?}", endpoint, addrs);
    Ok(TcpStream::connect(&addrs[..]).await?)
}

/// Wrap an established connection in a TLS session, using the host as SNI name.
pub(super) async fn handshake(
    connector: &TokioTlsConnector,
    endpoint: &Endpoint,
    stream: TcpStream,
) -> Result<TlsStream<TcpStream>, ProbeError> {
    connector
        .connect(endpoint.host(), stream)
        .await
        .map_err(ProbeError::Tls)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dns_hosts_use_system_resolver() {
        let resolution = Resolution::from_dns_hosts(&[]).expect("system resolution");
        assert!(matches!(resolution, Resolution::System));
    }

    #[tokio::test]
    async fn custom_dns_hosts_must_be_ip_addresses() {
        let Err(err) = setup_resolver(&["dns.google".to_string()]) else {
            panic!("a hostname is not a valid DNS host");
        };
        assert!(matches!(err, ConfigError::Resolver { ref host, .. } if host == "dns.google"));
    }

    #[tokio::test]
    async fn custom_resolver_accepts_ip_hosts() {
        let resolution = Resolution::from_dns_hosts(&["1.1.1.1".to_string(), "8.8.8.8".to_string()])
            .expect("valid dns hosts");
        assert!(matches!(resolution, Resolution::Custom(_)));
    }

    #[test]
    fn tls_connector_builds() {
        assert!(setup_tls_connector().is_ok());
    }
}
