//! Collects per-host reports into the final run result.
use crate::host::HostKey;
use crate::scanner::liveness::ProbeOutcome;
use crate::scanner::ports::PortSet;
use log::warn;
use serde_derive::Serialize;
use std::collections::{btree_map::Entry, BTreeMap};

/// Everything a single host task produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostReport {
    pub host: HostKey,
    pub outcome: ProbeOutcome,
    /// Only set for accessible hosts when port checking was requested.
    pub open_ports: Option<PortSet>,
}

/// Outcome of a whole run, keyed by host.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunResult {
    outcomes: BTreeMap<HostKey, ProbeOutcome>,
    open_ports: BTreeMap<HostKey, PortSet>,
}

/// Per-category host counts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub accessible: usize,
    pub http_errors: usize,
    pub unreachable: usize,
}

impl RunResult {
    /// Every probed host with its outcome, sorted by host.
    pub fn outcomes(&self) -> impl Iterator<Item = (&HostKey, &ProbeOutcome)> {
        self.outcomes.iter()
    }

    pub fn outcome(&self, host: &HostKey) -> Option<&ProbeOutcome> {
        self.outcomes.get(host)
    }

    /// Hosts that answered 200.
    pub fn accessible(&self) -> impl Iterator<Item = &HostKey> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| outcome.is_accessible())
            .map(|(host, _)| host)
    }

    /// Port sets of the hosts that were port-scanned. Empty sets included.
    pub fn open_ports(&self) -> impl Iterator<Item = (&HostKey, &PortSet)> {
        self.open_ports.iter()
    }

    pub fn ports_for(&self, host: &HostKey) -> Option<&PortSet> {
        self.open_ports.get(host)
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn summary(&self) -> Summary {
        self.outcomes
            .values()
            .fold(Summary::default(), |mut summary, outcome| {
                summary.total += 1;
                match outcome {
                    ProbeOutcome::Accessible => summary.accessible += 1,
                    ProbeOutcome::HttpError(_) => summary.http_errors += 1,
                    ProbeOutcome::Unreachable(_) => summary.unreachable += 1,
                }
                summary
            })
    }
}

/// Single owner of the result collections while a run is in flight.
#[derive(Debug, Default)]
pub struct Aggregator {
    result: RunResult,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one report. The first report for a host wins.
    pub fn push(&mut self, report: HostReport) {
        let HostReport {
            host,
            outcome,
            open_ports,
        } = report;

        let accessible = outcome.is_accessible();
        match self.result.outcomes.entry(host.clone()) {
            Entry::Occupied(_) => {
                warn!("Ignoring second report for {host}");
                return;
            }
            Entry::Vacant(slot) => {
                slot.insert(outcome);
            }
        }

        if let Some(ports) = open_ports {
            if accessible {
                self.result.open_ports.insert(host, ports);
            } else {
                warn!("Dropping port set for {host}, host was not accessible");
            }
        }
    }

    pub fn finish(self) -> RunResult {
        self.result
    }
}

/// Folds completed reports into a [`RunResult`].
pub fn aggregate<I>(reports: I) -> RunResult
where
    I: IntoIterator<Item = HostReport>,
{
    let mut aggregator = Aggregator::new();
    for report in reports {
        aggregator.push(report);
    }
    aggregator.finish()
}
