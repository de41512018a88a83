//! Reading and preparing subdomain wordlists before a run.
use anyhow::{bail, Context, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tokio::fs;

use crate::input::Opts;
use crate::output::COMBINED_WORDLIST;

/// Reads a wordlist file, one entry per line, trimming surrounding
/// whitespace. Blank lines are kept.
pub async fn read_wordlist(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Could not read wordlist '{}'", path.display()))?;

    Ok(content.lines().map(|line| line.trim().to_owned()).collect())
}

pub fn eliminate_blank_lines(entries: Vec<String>) -> Vec<String> {
    entries.into_iter().filter(|e| !e.is_empty()).collect()
}

/// Keeps the entries ending with `domain`.
pub fn filter_by_domain(entries: Vec<String>, domain: &str) -> Vec<String> {
    entries
        .into_iter()
        .filter(|entry| entry.ends_with(domain))
        .collect()
}

/// Sorted union of two wordlists.
pub fn combine(first: Vec<String>, second: Vec<String>) -> BTreeSet<String> {
    first.into_iter().chain(second).collect()
}

/// Entries of `first` that do not appear in `second`.
pub fn difference(first: Vec<String>, second: Vec<String>) -> BTreeSet<String> {
    let second: BTreeSet<String> = second.into_iter().collect();
    first
        .into_iter()
        .filter(|entry| !second.contains(entry))
        .collect()
}

/// The wordlist a run starts from, plus where it came from.
#[derive(Debug)]
pub struct Wordlist {
    pub entries: Vec<String>,
    /// File name used when saving derived copies of the list.
    pub name: String,
}

impl Wordlist {
    /// Drops blank entries, returns how many were removed.
    pub fn eliminate_blank_lines(&mut self) -> usize {
        let before = self.entries.len();
        self.entries = eliminate_blank_lines(std::mem::take(&mut self.entries));
        before - self.entries.len()
    }

    pub fn filter_by_domain(&mut self, domain: &str) {
        self.entries = filter_by_domain(std::mem::take(&mut self.entries), domain);
    }
}

/// Loads the one or two wordlists named in `opts` and applies the
/// combination mode. Entries come back as read: blank lines and the domain
/// filter are left to the caller, since `--generate` and `--correct` save
/// the list before filtering.
pub async fn load(opts: &Opts) -> Result<Wordlist> {
    let (entries, name) = match opts.wordlist.as_slice() {
        [single] => (read_wordlist(single).await?, file_name(single)),
        [first, second] => {
            let (a, b) = tokio::try_join!(read_wordlist(first), read_wordlist(second))?;
            let merged = if opts.difference {
                difference(a, b)
            } else {
                combine(a, b)
            };
            (merged.into_iter().collect(), COMBINED_WORDLIST.to_owned())
        }
        other => bail!("Expected one or two wordlists, got {}", other.len()),
    };

    Ok(Wordlist { entries, name })
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "wordlist.txt".to_owned(), |n| n.to_string_lossy().into_owned())
}
