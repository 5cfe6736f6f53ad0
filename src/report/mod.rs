use std::collections::{BTreeSet, HashSet};

use crate::electrum_probe::result::ProbeOutcome;

/// Collapse duplicate URLs and sort the rest, so dispatch order is stable.
pub fn deduplicate<I, S>(urls: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    urls.into_iter()
        .map(Into::into)
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect()
}

/// What the report knows about one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointStatus<'a> {
    /// The URL was never part of the input.
    Absent,
    /// Part of the input, but no outcome was recorded for it.
    Pending,
    Working,
    Broken(&'a str),
}

/// Accumulates outcomes as they arrive, in whatever order that is.
pub struct ReportBuilder {
    inputs: BTreeSet<String>,
    recorded: HashSet<String>,
    working: Vec<ProbeOutcome>,
    broken: Vec<ProbeOutcome>,
}

impl ReportBuilder {
    pub fn new(inputs: &[String]) -> Self {
        Self {
            inputs: inputs.iter().cloned().collect(),
            recorded: HashSet::new(),
            working: Vec::new(),
            broken: Vec::new(),
        }
    }

    /// Record one outcome. Returns `false` if it was ignored because the URL is
    /// unknown or already has an outcome.
    pub fn record(&mut self, outcome: ProbeOutcome) -> bool {
        if !self.inputs.contains(&outcome.url) {
            log::warn!("Ignoring outcome for unknown server {}", outcome.url);
            return false;
        }
        if !self.recorded.insert(outcome.url.clone()) {
            log::warn!("Ignoring second outcome for {}", outcome.url);
            return false;
        }

        if outcome.success {
            self.working.push(outcome);
        } else {
            self.broken.push(outcome);
        }
        true
    }

    pub fn finish(self) -> Report {
        Report {
            inputs: self.inputs,
            working: self.working,
            broken: self.broken,
        }
    }
}

/// Working/broken partition over one run, in collection order.
#[derive(Debug, Clone)]
pub struct Report {
    inputs: BTreeSet<String>,
    working: Vec<ProbeOutcome>,
    broken: Vec<ProbeOutcome>,
}

impl Report {
    pub fn total(&self) -> usize {
        self.inputs.len()
    }

    pub fn working(&self) -> &[ProbeOutcome] {
        &self.working
    }

    pub fn broken(&self) -> &[ProbeOutcome] {
        &self.broken
    }

    /// Healthy means nothing is broken. A caller maps this onto an exit status.
    pub fn is_healthy(&self) -> bool {
        self.broken.is_empty()
    }

    /// Point lookup for a single server of interest.
    pub fn status(&self, url: &str) -> EndpointStatus<'_> {
        if !self.inputs.contains(url) {
            return EndpointStatus::Absent;
        }
        if self.working.iter().any(|o| o.url == url) {
            return EndpointStatus::Working;
        }
        match self.broken.iter().find(|o| o.url == url) {
            Some(outcome) => EndpointStatus::Broken(&outcome.detail),
            None => EndpointStatus::Pending,
        }
    }
}
