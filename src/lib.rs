//! Liveness checks for Electrum servers.
//!
//! Each server gets one connection and one `blockchain.headers.subscribe`
//! request, over plain TCP or TLS depending on its URL scheme. Probes run
//! with bounded concurrency and are folded into a [`report::Report`].

use std::sync::Arc;

pub mod config;
pub mod coordinator;
pub mod electrum_probe;
pub mod endpoint;
pub mod error;
pub mod extract;
pub mod report;

use electrum_probe::prelude::*;
use report::{Report, ReportBuilder, deduplicate};

/// Deduplicate and sort `urls`, probe them with at most `limit` in flight,
/// and build the report. `on_outcome` sees every outcome as it arrives.
pub async fn check_servers<I, S>(
    urls: I,
    prober: Arc<Prober>,
    limit: usize,
    mut on_outcome: impl FnMut(&ProbeOutcome),
) -> Report
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let urls = deduplicate(urls);
    let mut builder = ReportBuilder::new(&urls);

    let mut outcomes = coordinator::dispatch(urls, prober, limit);
    while let Some(outcome) = outcomes.recv().await {
        on_outcome(&outcome);
        builder.record(outcome);
    }

    let report = builder.finish();
    log::info!(
        "Checked {} servers: {} working, {} broken",
        report.total(),
        report.working().len(),
        report.broken().len()
    );
    report
}
