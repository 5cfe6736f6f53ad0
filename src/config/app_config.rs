use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::extract::extract_servers_from_file;

use super::probe_config::ProbeConfig;

pub struct AppConfig {
    pub config: ProbeConfig,
    pub config_path: PathBuf,
}

impl AppConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.config.timeout_ms)
    }

    pub fn concurrency(&self) -> usize {
        self.config.concurrency
    }

    /// All configured servers: the explicit list followed by every source file's servers.
    /// Duplicates are kept; the report deduplicates.
    pub fn collect_servers(&self) -> Result<Vec<String>, ConfigError> {
        let base = self.config_path.parent().unwrap_or_else(|| Path::new("."));

        let mut servers = self.config.servers.clone();
        for source in &self.config.sources {
            let path = if source.path.is_relative() {
                base.join(&source.path)
            } else {
                source.path.clone()
            };
            servers.extend(extract_servers_from_file(&path, source.format)?);
        }
        Ok(servers)
    }
}

/// Load the application configuration from a YAML file and environment variables
/// This function reads the configuration file specified by the `CONFIG_FILE` environment variable
/// (after loading a `.env` file, if present), parses it into a `ProbeConfig` struct,
/// and overrides certain values with environment variables.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let _ = dotenvy::dotenv();

    let config_path =
        PathBuf::from(env::var("CONFIG_FILE").unwrap_or_else(|_| "config.yml".to_string()));
    let config_str = std::fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
        path: config_path.clone(),
        source,
    })?;

    let config: ProbeConfig =
        serde_yaml::from_str(&config_str).map_err(|source| ConfigError::Yaml {
            path: config_path.clone(),
            source,
        })?;
    let config = apply_overrides(config, |key| env::var(key).ok())?;

    log::info!(
        "Using concurrency {}, timeout {}ms, DNS hosts: {:?}",
        config.concurrency,
        config.timeout_ms,
        config.dns_hosts
    );

    Ok(AppConfig {
        config,
        config_path,
    })
}

/// Apply `PROBE_CONCURRENCY`, `PROBE_TIMEOUT_MS`, `DNS_HOSTS` and `WATCH_SERVER`
/// on top of the file configuration, then validate the result.
pub fn apply_overrides(
    mut config: ProbeConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ProbeConfig, ConfigError> {
    if let Some(value) = lookup("PROBE_CONCURRENCY") {
        config.concurrency = parse_number("PROBE_CONCURRENCY", &value)?;
    }
    if let Some(value) = lookup("PROBE_TIMEOUT_MS") {
        config.timeout_ms = parse_number("PROBE_TIMEOUT_MS", &value)?;
    }
    if let Some(value) = lookup("DNS_HOSTS") {
        config.dns_hosts = value
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(value) = lookup("WATCH_SERVER") {
        config.watch = Some(value).filter(|v| !v.is_empty());
    }

    if config.concurrency == 0 {
        return Err(ConfigError::InvalidValue {
            key: "concurrency",
            reason: "must be at least 1".to_string(),
        });
    }
    if config.timeout_ms == 0 {
        return Err(ConfigError::InvalidValue {
            key: "timeout_ms",
            reason: "must be at least 1".to_string(),
        });
    }

    Ok(config)
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            key,
            reason: format!("{value:?}: {e}"),
        })
}
