use std::time::Duration;

use crate::endpoint::{Endpoint, ParseError};

/// Classification of a single server check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub url: String,
    /// `None` when the URL never made it past the parser.
    pub endpoint: Option<Endpoint>,
    pub success: bool,
    pub detail: String,
    pub elapsed: Duration,
}

impl ProbeOutcome {
    pub fn ok(endpoint: Endpoint, elapsed: Duration) -> Self {
        Self {
            url: endpoint.raw_url().to_string(),
            endpoint: Some(endpoint),
            success: true,
            detail: "OK".to_string(),
            elapsed,
        }
    }

    pub fn failed(endpoint: Endpoint, detail: impl Into<String>, elapsed: Duration) -> Self {
        Self {
            url: endpoint.raw_url().to_string(),
            endpoint: Some(endpoint),
            success: false,
            detail: detail.into(),
            elapsed,
        }
    }

    pub fn unparsable(url: &str, error: &ParseError) -> Self {
        Self {
            url: url.to_string(),
            endpoint: None,
            success: false,
            detail: error.to_string(),
            elapsed: Duration::ZERO,
        }
    }
}
