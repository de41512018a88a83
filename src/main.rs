#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::doc_markdown, clippy::if_not_else, clippy::non_ascii_literal)]

use anyhow::{bail, Result};
use log::debug;
use subprobe::host::dedupe;
use subprobe::input::Opts;
use subprobe::output::{RunFolder, COMBINED_WORDLIST};
use subprobe::scanner::Scanner;
use subprobe::tui::{print_banner, progress_bar, report_line};
use subprobe::wordlist;
use subprobe::{detail, output, warning};

/// Reads the command line and config file, then checks every subdomain.
#[cfg(not(tarpaulin_include))]
#[tokio::main]
async fn main() {
    env_logger::init();

    let mut opts = Opts::read();
    if let Err(e) = opts.load_config() {
        warning!(format!("{e:#}\nAborting run."), opts.accessible);
        std::process::exit(1);
    }
    debug!("Main() `opts` arguments are {opts:?}");

    if opts.accessible {
        colored::control::set_override(false);
    }

    let accessible = opts.accessible;
    if let Err(e) = run(opts).await {
        warning!(format!("{e:#}"), accessible);
        std::process::exit(1);
    }
}

#[cfg(not(tarpaulin_include))]
async fn run(opts: Opts) -> Result<()> {
    if !opts.no_banner {
        print_banner(opts.accessible);
    }
    if opts.generate && opts.wordlist.len() != 2 {
        bail!("--generate needs two wordlists");
    }

    let mut wordlist = wordlist::load(&opts).await?;
    let folder = RunFolder::create(&opts.output_dir).await?;

    if opts.generate {
        let path = folder
            .write_wordlist(COMBINED_WORDLIST, &wordlist.entries)
            .await?;
        output!(
            format!("Combined wordlist saved to '{}'.", path.display()),
            opts.accessible
        );
        return Ok(());
    }

    let blank_lines = wordlist.eliminate_blank_lines();
    if opts.eliminate {
        let path = folder
            .write_wordlist(&format!("clean_{}", wordlist.name), &wordlist.entries)
            .await?;
        detail!(
            format!(
                "Removed {blank_lines} blank lines. Clean wordlist saved to '{}'.",
                path.display()
            ),
            opts.accessible
        );
    }

    if opts.correct {
        let (hosts, duplicates) = dedupe(&wordlist.entries);
        let path = folder
            .write_wordlist(&format!("corrected_{}", wordlist.name), &hosts)
            .await?;
        output!(
            format!(
                "Removed {duplicates} duplicates. Corrected wordlist saved to '{}'.",
                path.display()
            ),
            opts.accessible
        );
        return Ok(());
    }

    if let Some(domain) = &opts.filter {
        wordlist.filter_by_domain(domain);
        detail!(
            format!("{} subdomains end with '{domain}'.", wordlist.entries.len()),
            opts.accessible
        );
    }

    let (hosts, duplicates) = dedupe(&wordlist.entries);
    if duplicates > 0 {
        detail!(
            format!(
                "Removed {duplicates} duplicates. {} unique subdomains left.",
                hosts.len()
            ),
            opts.accessible
        );
    }

    if hosts.is_empty() {
        warning!("No subdomains left to check.", opts.accessible);
        return Ok(());
    }

    let scanner = Scanner::with_defaults(opts.ports)?;
    let progress = (!opts.verbose).then(|| progress_bar(hosts.len()));

    let result = scanner
        .run_with(&hosts, |report| match &progress {
            Some(bar) => bar.inc(1),
            None => println!("{}", report_line(report, opts.accessible)),
        })
        .await;

    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    let status = folder.write_status_report(&result).await?;
    let accessible_list = folder.write_accessible(&result).await?;
    if opts.ports {
        folder.write_ports_report(&result).await?;
    }
    if opts.json {
        folder.write_json(&result).await?;
    }

    let summary = result.summary();
    detail!(
        format!(
            "Checked {} subdomains: {} accessible, {} HTTP errors, {} not accessible.",
            summary.total, summary.accessible, summary.http_errors, summary.unreachable
        ),
        opts.accessible
    );
    output!(
        format!(
            "Results saved to '{}' and accessible subdomains to '{}'.",
            status.display(),
            accessible_list.display()
        ),
        opts.accessible
    );

    Ok(())
}
