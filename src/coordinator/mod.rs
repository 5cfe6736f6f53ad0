//! Bounded concurrent probing.
//!
//! A dispatcher task walks the prepared URL list in order. It takes a permit
//! from a semaphore of width `limit` before spawning each probe, so at most
//! `limit` probes are in flight and the next one starts as soon as any slot
//! frees. Finished probes hand their outcome to the caller over a channel,
//! in completion order.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};

use crate::electrum_probe::prelude::*;
use crate::endpoint::parse_endpoint;

pub const DEFAULT_CONCURRENCY: usize = 10;

/// Start probing `urls` with at most `limit` probes in flight.
///
/// Every URL yields exactly one outcome on the returned channel, which closes
/// once all of them have been delivered. URLs that fail to parse are reported
/// immediately without taking a slot.
pub fn dispatch(
    urls: Vec<String>,
    prober: Arc<Prober>,
    limit: usize,
) -> mpsc::UnboundedReceiver<ProbeOutcome> {
    let (tx, rx) = mpsc::unbounded_channel();
    let slots = Arc::new(Semaphore::new(limit.max(1)));

    tokio::spawn(async move {
        log::info!(
            "Dispatching {} servers, {} at a time, {:?} per step",
            urls.len(),
            limit.max(1),
            prober.timeout()
        );

        for url in urls {
            let endpoint = match parse_endpoint(&url) {
                Ok(endpoint) => endpoint,
                Err(e) => {
                    let _ = tx.send(ProbeOutcome::unparsable(&url, &e));
                    continue;
                }
            };

            let permit = match slots.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    log::error!("Probe slots closed, {} not dispatched", url);
                    break;
                }
            };

            let prober = prober.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let _permit = permit;
                let fallback = endpoint.clone();
                // A panicking probe still has to produce its outcome.
                let outcome = match tokio::spawn(async move { prober.probe(endpoint).await }).await
                {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        log::error!("Probe for {} aborted: {}", fallback, e);
                        ProbeOutcome::failed(fallback, e.to_string(), Default::default())
                    }
                };
                let _ = tx.send(outcome);
            });
        }
    });

    rx
}
