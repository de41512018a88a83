//! Core functionality for actual probing behaviour.
//!
//! A run happens in two stages. Every host gets one HTTP GET, with at most
//! [`OUTER_CONCURRENCY`] host tasks alive at a time. Hosts that answer 200 are
//! then, if requested, checked for open [`COMMON_PORTS`] through their own
//! pool of [`INNER_CONCURRENCY`] connect tasks. Inner pools are not shared, so
//! a run may have up to `OUTER_CONCURRENCY * INNER_CONCURRENCY` connection
//! attempts in flight.
pub mod liveness;
pub mod ports;

use crate::host::{normalize, HostKey, HostSet};
use crate::results::{Aggregator, HostReport, RunResult};
use futures::{stream, StreamExt};
use liveness::{probe_host, HttpTransport, ProbeOutcome, ReqwestTransport};
use log::{debug, warn};
use ports::{Connector, PortScanner, TcpConnector};
use std::{sync::Arc, time::Duration};

/// Number of hosts probed at the same time.
pub const OUTER_CONCURRENCY: usize = 10;

/// Number of ports probed at the same time for one host.
pub const INNER_CONCURRENCY: usize = 10;

pub const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

pub const PORT_TIMEOUT: Duration = Duration::from_secs(2);

/// Service ports checked on every accessible host.
pub const COMMON_PORTS: [u16; 12] = [
    80, 443, 21, 22, 25, 3306, 1433, 1521, 5432, 6379, 27017, 8080,
];

/// Runs the liveness probe, and optionally the port scan, over a host set.
#[derive(Debug)]
pub struct Scanner<T, C> {
    transport: Arc<T>,
    port_scanner: Option<Arc<PortScanner<C>>>,
    http_timeout: Duration,
}

impl Scanner<ReqwestTransport, TcpConnector> {
    /// Scanner using a `reqwest` client and plain TCP connects.
    pub fn with_defaults(check_ports: bool) -> reqwest::Result<Self> {
        let transport = ReqwestTransport::new(HTTP_TIMEOUT)?;
        Ok(Self::new(Arc::new(transport), Arc::new(TcpConnector), check_ports))
    }
}

impl<T: HttpTransport, C: Connector> Scanner<T, C> {
    pub fn new(transport: Arc<T>, connector: Arc<C>, check_ports: bool) -> Self {
        let port_scanner = check_ports
            .then(|| Arc::new(PortScanner::new(connector, INNER_CONCURRENCY, PORT_TIMEOUT)));

        Self {
            transport,
            port_scanner,
            http_timeout: HTTP_TIMEOUT,
        }
    }

    pub async fn run(&self, hosts: &HostSet) -> RunResult {
        self.run_with(hosts, |_| {}).await
    }

    /// Probes every host and hands each report to `on_complete` as soon as
    /// it finishes, in completion order.
    ///
    /// The returned result holds exactly one outcome per host in `hosts`.
    pub async fn run_with<F>(&self, hosts: &HostSet, mut on_complete: F) -> RunResult
    where
        F: FnMut(&HostReport),
    {
        debug!(
            "Start probing hosts. \nHosts {}\nPort checks {}\nOuter width {}\nInner width {}",
            hosts.len(),
            self.port_scanner.is_some(),
            OUTER_CONCURRENCY,
            INNER_CONCURRENCY
        );

        let mut completions = stream::iter(hosts.iter().cloned())
            .map(|host| {
                let task = tokio::spawn(probe_one(
                    Arc::clone(&self.transport),
                    self.port_scanner.clone(),
                    host.clone(),
                    self.http_timeout,
                ));
                async move {
                    match task.await {
                        Ok(report) => report,
                        Err(e) => {
                            warn!("Probe task for {host} failed: {e}");
                            HostReport {
                                host,
                                outcome: ProbeOutcome::Unreachable("probe task failed".to_owned()),
                                open_ports: None,
                            }
                        }
                    }
                }
            })
            .buffer_unordered(OUTER_CONCURRENCY);

        let mut aggregator = Aggregator::new();
        while let Some(report) = completions.next().await {
            on_complete(&report);
            aggregator.push(report);
        }

        let result = aggregator.finish();
        debug!("Probed {} hosts: {:?}", result.len(), result.summary());
        result
    }
}

/// Body of a single host task.
async fn probe_one<T: HttpTransport, C: Connector>(
    transport: Arc<T>,
    port_scanner: Option<Arc<PortScanner<C>>>,
    host: HostKey,
    http_timeout: Duration,
) -> HostReport {
    let host = normalize(host.as_str());
    let outcome = probe_host(transport.as_ref(), &host, http_timeout).await;

    let open_ports = match port_scanner {
        Some(scanner) if outcome.is_accessible() => Some(scanner.scan(&host, &COMMON_PORTS).await),
        _ => None,
    };

    HostReport {
        host,
        outcome,
        open_ports,
    }
}
