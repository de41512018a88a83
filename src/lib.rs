//! This crate exposes the internal functionality of the `subprobe`
//! subdomain checker.
//!
//! Given a wordlist of subdomains, `subprobe` finds out which of them answer
//! an HTTP GET with status 200 and, optionally, which common service ports
//! (`80, 443, 21, 22, 25, 3306, 1433, 1521, 5432, 6379, 27017, 8080`) the
//! accessible ones expose.
//!
//! ## Architecture Overview
//!
//! 1. **Input Processing**: wordlists are read, combined and filtered by
//!    [`wordlist`], then reduced to unique [`host::HostKey`]s with
//!    [`host::dedupe`].
//! 2. **Liveness**: [`scanner::Scanner`] sends one GET per host, at most
//!    [`scanner::OUTER_CONCURRENCY`] at a time.
//! 3. **Port Checks**: accessible hosts get a
//!    [`scanner::ports::PortScanner`] pass with its own pool of
//!    [`scanner::INNER_CONCURRENCY`] connect attempts.
//! 4. **Result Processing**: reports are folded into a
//!    [`results::RunResult`] by a single consumer and written out by
//!    [`output`].
//!
//! ## Basic Usage Example
//!
//! ```rust,no_run
//! use subprobe::host::dedupe;
//! use subprobe::scanner::Scanner;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let (hosts, duplicates) = dedupe(["example.com", "http://example.com", "example.org"]);
//! assert_eq!(duplicates, 1);
//!
//! let scanner = Scanner::with_defaults(true)?;
//! let result = scanner.run(&hosts).await;
//!
//! for (host, outcome) in result.outcomes() {
//!     println!("{host}: {outcome}");
//! }
//! for (host, ports) in result.open_ports() {
//!     println!("{host}: {ports:?}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Individual probes never fail. Network errors become
//! [`scanner::liveness::ProbeOutcome::Unreachable`], non-200 answers become
//! [`scanner::liveness::ProbeOutcome::HttpError`] and closed ports are simply
//! absent from the port set. Only reading the wordlists and writing the
//! reports can fail, both before or after probing.

pub mod tui;

pub mod input;

pub mod host;

pub mod wordlist;

pub mod scanner;

pub mod results;

pub mod output;
