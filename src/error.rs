use std::fmt::Write;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop the checker before any server is probed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },

    #[error("defaults file not found: {}", .0.display())]
    MissingSource(PathBuf),

    #[error("failed to build TLS connector")]
    Tls(#[from] native_tls::Error),

    #[error("invalid DNS host {host}")]
    Resolver {
        host: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Render an error together with its chain of causes.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, "\n\nCaused by: {}", src);
        err = src;
    }
    s
}
