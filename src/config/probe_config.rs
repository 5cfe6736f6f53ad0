use std::path::PathBuf;

use serde::Deserialize;

use crate::extract::SourceFormat;

/// The checker configuration as written in `config.yml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Maximum number of servers probed at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Deadline for each network step of a probe (connect, TLS handshake, write, read).
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Name servers to resolve hosts with.
    /// Empty means the operating system resolver is used.
    #[serde(default)]
    pub dns_hosts: Vec<String>,

    /// A server whose status is called out separately in the summary.
    #[serde(default)]
    pub watch: Option<String>,

    /// Servers listed directly.
    #[serde(default)]
    pub servers: Vec<String>,

    /// Defaults files to extract servers from.
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

/// A file that lists servers, and the syntax it is written in.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Relative paths are resolved against the config file's directory.
    pub path: PathBuf,
    pub format: SourceFormat,
}

fn default_concurrency() -> usize {
    crate::coordinator::DEFAULT_CONCURRENCY
}

fn default_timeout_ms() -> u64 {
    crate::electrum_probe::probe::DEFAULT_TIMEOUT.as_millis() as u64
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            timeout_ms: default_timeout_ms(),
            dns_hosts: Vec::new(),
            watch: None,
            servers: Vec::new(),
            sources: Vec::new(),
        }
    }
}
