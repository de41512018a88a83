//! Canonical host keys and wordlist deduplication.
use serde_derive::Serialize;
use std::collections::BTreeSet;
use std::fmt;

const SCHEME_PREFIXES: [&str; 2] = ["http://", "https://"];

/// A hostname with any `http://` or `https://` prefix removed.
///
/// This is the identity used for deduplication and as the key of every
/// result collection. It is only ever built through [`normalize`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct HostKey(String);

impl HostKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HostKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for HostKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Unique host keys, iterated in sorted order.
pub type HostSet = BTreeSet<HostKey>;

/// Strips leading `http://` / `https://` prefixes from `raw`.
///
/// Matching is case-sensitive. Whitespace is left alone, trimming is up to
/// the caller. Prefixes are stripped until none remains, so normalizing an
/// already normalized key is a no-op.
///
/// ```rust
/// # use subprobe::host::normalize;
/// assert_eq!(normalize("https://a.b.com").as_str(), "a.b.com");
/// assert_eq!(normalize("a.b.com").as_str(), "a.b.com");
/// ```
pub fn normalize(raw: &str) -> HostKey {
    let mut host = raw;
    while let Some(rest) = SCHEME_PREFIXES
        .iter()
        .find_map(|prefix| host.strip_prefix(prefix))
    {
        host = rest;
    }
    HostKey(host.to_owned())
}

/// Normalizes every entry into a [`HostSet`].
///
/// Returns the set together with the number of entries that collapsed into
/// an existing key.
pub fn dedupe<I>(entries: I) -> (HostSet, usize)
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut total = 0;
    let hosts: HostSet = entries
        .into_iter()
        .inspect(|_| total += 1)
        .map(|entry| normalize(entry.as_ref()))
        .collect();

    let duplicates = total - hosts.len();
    (hosts, duplicates)
}

#[cfg(test)]
mod tests {
    use super::{dedupe, normalize, HostKey};
    use parameterized::parameterized;
    use std::collections::HashSet;

    #[parameterized(raw = {
        "https://a.b.com", "http://a.b.com", "a.b.com", "HTTP://a.b.com",
        "http://https://a.b.com", "", "  http://a.b.com", "ftp://a.b.com",
    }, expected = {
        "a.b.com", "a.b.com", "a.b.com", "HTTP://a.b.com",
        "a.b.com", "", "  http://a.b.com", "ftp://a.b.com",
    })]
    fn normalize_strips_scheme(raw: &str, expected: &str) {
        assert_eq!(normalize(raw).as_str(), expected);
    }

    #[parameterized(raw = {
        "http://x.com", "https://https://x.com", "http://", "https://http://", "x.com/path",
        "http://http://http://",
    })]
    fn normalize_is_idempotent(raw: &str) {
        let once = normalize(raw);
        assert_eq!(normalize(once.as_str()), once);
    }

    #[test]
    fn dedupe_collapses_scheme_variants() {
        let (hosts, duplicates) = dedupe(["a.com", "http://b.com", "a.com"]);

        let expected: Vec<&str> = vec!["a.com", "b.com"];
        assert_eq!(hosts.iter().map(HostKey::as_str).collect::<Vec<_>>(), expected);
        assert_eq!(duplicates, 1);
    }

    #[test]
    fn dedupe_counts_distinct_normalized_values() {
        let entries = vec![
            "https://x.org",
            "x.org",
            "http://x.org",
            "y.org",
            "z.org",
            "https://z.org",
        ];
        let distinct: HashSet<_> = entries.iter().map(|e| normalize(e)).collect();

        let (hosts, duplicates) = dedupe(&entries);

        assert!(hosts.len() <= entries.len());
        assert_eq!(hosts.len(), distinct.len());
        assert_eq!(duplicates, entries.len() - distinct.len());
    }

    #[test]
    fn dedupe_ignores_entry_order() {
        let forward = vec!["c.io", "a.io", "http://b.io", "a.io"];
        let mut backward = forward.clone();
        backward.reverse();

        assert_eq!(dedupe(&forward), dedupe(&backward));
    }

    #[test]
    fn dedupe_empty_input() {
        let (hosts, duplicates) = dedupe(Vec::<String>::new());
        assert!(hosts.is_empty());
        assert_eq!(duplicates, 0);
    }
}
