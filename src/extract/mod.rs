//! Pull Electrum server URLs out of the wallet's defaults files.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::ConfigError;

static RUST_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Url::parse\("([^"]+)"\)"#).expect("rust url pattern is valid")
});

static TYPESCRIPT_URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""((?:tcp|ssl)://[^"]+)""#).expect("typescript url pattern is valid")
});

/// Which syntax a defaults file is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// `Url::parse("...")` calls.
    Rust,
    /// Quoted `tcp://` / `ssl://` strings.
    Typescript,
}

pub fn extract_servers(content: &str, format: SourceFormat) -> Vec<String> {
    let pattern = match format {
        SourceFormat::Rust => &*RUST_URL_PATTERN,
        SourceFormat::Typescript => &*TYPESCRIPT_URL_PATTERN,
    };

    pattern
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Read a defaults file and extract its servers. A missing file is an error.
pub fn extract_servers_from_file(
    path: &Path,
    format: SourceFormat,
) -> Result<Vec<String>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingSource(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let servers = extract_servers(&content, format);
    log::info!("Found {} servers in {}", servers.len(), path.display());
    Ok(servers)
}
