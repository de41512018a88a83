//! Writes run reports to disk.
//!
//! Every run gets its own folder so consecutive runs never overwrite each
//! other's reports.
use anyhow::{Context, Result};
use chrono::Local;
use log::debug;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::results::RunResult;
use crate::scanner::liveness::ProbeOutcome;
use crate::scanner::ports::PortSet;

pub const STATUS_REPORT: &str = "subdomain_results.txt";
pub const ACCESSIBLE_REPORT: &str = "accessible_subdomains.txt";
pub const PORTS_REPORT: &str = "open_ports.txt";
pub const JSON_REPORT: &str = "results.json";
pub const COMBINED_WORDLIST: &str = "combined_wordlist.txt";

/// Label used for an outcome in the status report.
pub fn status_label(outcome: &ProbeOutcome) -> String {
    match outcome {
        ProbeOutcome::Accessible => "Acessível".to_owned(),
        ProbeOutcome::HttpError(code) => format!("Erro HTTP {code}"),
        ProbeOutcome::Unreachable(_) => "Não acessível".to_owned(),
    }
}

/// `host: status`, one line per host.
pub fn render_status_report(result: &RunResult) -> String {
    result
        .outcomes()
        .map(|(host, outcome)| format!("{host}: {}\n", status_label(outcome)))
        .collect()
}

pub fn render_accessible(result: &RunResult) -> String {
    result.accessible().map(|host| format!("{host}\n")).collect()
}

pub fn render_ports(ports: &PortSet) -> String {
    if ports.is_empty() {
        return "nenhuma".to_owned();
    }
    ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// A `[host]` header followed by the open ports of that host.
pub fn render_ports_report(result: &RunResult) -> String {
    result
        .open_ports()
        .map(|(host, ports)| format!("[{host}]\nPortas abertas: {}\n\n", render_ports(ports)))
        .collect()
}

/// Directory holding the reports of a single run.
#[derive(Debug, Clone)]
pub struct RunFolder {
    path: PathBuf,
}

impl RunFolder {
    /// Creates `run_<timestamp>` under `base`. A folder that already exists
    /// is never reused, the next free `_<n>` suffix is taken instead.
    pub async fn create(base: &Path) -> Result<Self> {
        fs::create_dir_all(base)
            .await
            .with_context(|| format!("Could not create output directory '{}'", base.display()))?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let mut path = base.join(format!("run_{stamp}"));
        let mut attempt = 1;
        loop {
            match fs::create_dir(&path).await {
                Ok(()) => break,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    attempt += 1;
                    path = base.join(format!("run_{stamp}_{attempt}"));
                }
                Err(e) => {
                    return Err(e).with_context(|| {
                        format!("Could not create run folder '{}'", path.display())
                    });
                }
            }
        }

        debug!("Created run folder {}", path.display());
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }

    async fn write(&self, name: &str, content: String) -> Result<PathBuf> {
        let path = self.file(name);
        fs::write(&path, content)
            .await
            .with_context(|| format!("Could not write '{}'", path.display()))?;
        Ok(path)
    }

    pub async fn write_status_report(&self, result: &RunResult) -> Result<PathBuf> {
        self.write(STATUS_REPORT, render_status_report(result)).await
    }

    pub async fn write_accessible(&self, result: &RunResult) -> Result<PathBuf> {
        self.write(ACCESSIBLE_REPORT, render_accessible(result)).await
    }

    pub async fn write_ports_report(&self, result: &RunResult) -> Result<PathBuf> {
        self.write(PORTS_REPORT, render_ports_report(result)).await
    }

    pub async fn write_json(&self, result: &RunResult) -> Result<PathBuf> {
        let json = serde_json::to_string_pretty(result)?;
        self.write(JSON_REPORT, json).await
    }

    /// Saves a wordlist, one entry per line.
    pub async fn write_wordlist<I, S>(&self, name: &str, entries: I) -> Result<PathBuf>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let content = entries.into_iter().fold(String::new(), |mut out, entry| {
            out.push_str(entry.as_ref());
            out.push('\n');
            out
        });
        self.write(name, content).await
    }
}
