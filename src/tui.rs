//! Utilities for terminal output during a run.
use colored::{Color, Colorize};
use indicatif::{ProgressBar, ProgressStyle};

use crate::output::render_ports;
use crate::results::HostReport;
use crate::scanner::liveness::ProbeOutcome;

/// Terminal user interface macros.
///
/// Each macro takes the message and the `accessible` flag. In accessible
/// mode the colored `[x]` prefixes are dropped so screen readers only read
/// the message.
#[macro_export]
macro_rules! warning {
    ($name:expr) => {
        eprintln!("{} {}", colored::Colorize::bold(colored::Colorize::red("[!]")), $name);
    };
    ($name:expr, $accessible:expr) => {
        if $accessible {
            eprintln!("{}", $name);
        } else {
            eprintln!("{} {}", colored::Colorize::bold(colored::Colorize::red("[!]")), $name);
        }
    };
}

#[macro_export]
macro_rules! detail {
    ($name:expr) => {
        println!("{} {}", colored::Colorize::bold(colored::Colorize::blue("[~]")), $name);
    };
    ($name:expr, $accessible:expr) => {
        if $accessible {
            println!("{}", $name);
        } else {
            println!("{} {}", colored::Colorize::bold(colored::Colorize::blue("[~]")), $name);
        }
    };
}

#[macro_export]
macro_rules! output {
    ($name:expr) => {
        println!("{} {}", colored::Colorize::bold(colored::Colorize::green("[>]")), $name);
    };
    ($name:expr, $accessible:expr) => {
        if $accessible {
            println!("{}", $name);
        } else {
            println!("{} {}", colored::Colorize::bold(colored::Colorize::green("[>]")), $name);
        }
    };
}

const BANNER: &str = r"
           _                     _
 ___ _   _| |__  _ __  _ __ ___ | |__   ___
/ __| | | | '_ \| '_ \| '__/ _ \| '_ \ / _ \
\__ \ |_| | |_) | |_) | | | (_) | |_) |  __/
|___/\__,_|_.__/| .__/|_|  \___/|_.__/ \___|
                |_|
";

/// Prints the ascii banner, skipped in accessible mode.
pub fn print_banner(accessible: bool) {
    if accessible {
        println!("subprobe {}", env!("CARGO_PKG_VERSION"));
    } else {
        println!("{}", BANNER.cyan());
        println!("{}\n", format!("v{}", env!("CARGO_PKG_VERSION")).dimmed());
    }
}

/// Verbose mode line for a finished host, tagged `[SUCCESS]`, `[WARNING]`
/// or `[ERROR]`. Tags stay uncolored in accessible mode.
pub fn report_line(report: &HostReport, accessible: bool) -> String {
    let host = &report.host;
    let (tag, color, message) = match &report.outcome {
        ProbeOutcome::Accessible => {
            let ports = report
                .open_ports
                .as_ref()
                .map(|ports| format!(" Open ports: {}.", render_ports(ports)))
                .unwrap_or_default();
            (
                "[SUCCESS]",
                Color::Green,
                format!("{host} is accessible (HTTP 200).{ports}"),
            )
        }
        ProbeOutcome::HttpError(code) => (
            "[WARNING]",
            Color::Yellow,
            format!("{host} returned HTTP error {code}."),
        ),
        ProbeOutcome::Unreachable(reason) => (
            "[ERROR]",
            Color::Red,
            format!("{host} is not accessible. Error: {reason}"),
        ),
    };

    if accessible {
        format!("{tag} {message}")
    } else {
        format!("{} {message}", tag.color(color).bold())
    }
}

/// Progress bar counting finished hosts.
pub fn progress_bar(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    let style = ProgressStyle::with_template(
        "{msg} {bar:40.cyan/blue} {pos}/{len} hosts [{elapsed_precise}<{eta_precise}]",
    )
    .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style);
    bar.set_message("Checking subdomains");
    bar
}
