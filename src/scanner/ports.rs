//! TCP connect checks against a fixed list of service ports.
use crate::host::HostKey;
use async_trait::async_trait;
use futures::{stream, StreamExt};
use log::debug;
use std::{collections::BTreeSet, sync::Arc, time::Duration};
use tokio::{io::AsyncWriteExt, net::TcpStream, time};

use super::INNER_CONCURRENCY;

/// Open ports found for one host.
pub type PortSet = BTreeSet<u16>;

/// Something able to tell whether `host:port` accepts TCP connections.
///
/// Implementations must fold every failure into `false`.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    async fn is_open(&self, host: &str, port: u16, timeout: Duration) -> bool;
}

/// Plain tokio TCP connect.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn is_open(&self, host: &str, port: u16, timeout: Duration) -> bool {
        probe_port(host, port, timeout).await
    }
}

/// Attempts a TCP connection to `(host, port)`.
///
/// Returns true only if the connection completes within `timeout`. Refused
/// connections, resolution failures and timeouts all return false.
pub async fn probe_port(host: &str, port: u16, timeout: Duration) -> bool {
    match time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(tcp_stream)) => {
            debug!("Connection was successful, shutting down stream {host}:{port}");
            if let Err(e) = { tcp_stream }.shutdown().await {
                debug!("Shutdown stream error {}", &e);
            }
            true
        }
        Ok(Err(e)) => {
            debug!("{host}:{port} closed: {e}");
            false
        }
        Err(_) => {
            debug!("{host}:{port} timed out after {timeout:?}");
            false
        }
    }
}

/// Probes a list of candidate ports for a single host.
///
/// Every probe runs as its own task; at most `budget` of them are alive at
/// any time. A scanner owns no state besides its connector, so each host
/// gets an independent pool.
#[derive(Debug)]
pub struct PortScanner<C> {
    connector: Arc<C>,
    budget: usize,
    timeout: Duration,
}

impl<C: Connector> PortScanner<C> {
    pub fn new(connector: Arc<C>, budget: usize, timeout: Duration) -> Self {
        Self {
            connector,
            budget: budget.max(1),
            timeout,
        }
    }

    /// Resolves once every candidate has been probed.
    pub async fn scan(&self, host: &HostKey, candidates: &[u16]) -> PortSet {
        let open_ports = stream::iter(candidates.iter().copied())
            .map(|port| {
                let connector = Arc::clone(&self.connector);
                let target = host.as_str().to_owned();
                let timeout = self.timeout;
                let task =
                    tokio::spawn(async move { connector.is_open(&target, port, timeout).await });
                async move { (port, task.await.unwrap_or(false)) }
            })
            .buffer_unordered(self.budget)
            .filter_map(|(port, open)| async move { open.then_some(port) })
            .collect::<PortSet>()
            .await;

        debug!("Open ports on {host}: {open_ports:?}");
        open_ports
    }
}

/// Scans `candidates` on `host` with a [`TcpConnector`] and the default
/// pool width.
pub async fn scan_ports(host: &HostKey, candidates: &[u16], timeout: Duration) -> PortSet {
    PortScanner::new(Arc::new(TcpConnector), INNER_CONCURRENCY, timeout)
        .scan(host, candidates)
        .await
}
