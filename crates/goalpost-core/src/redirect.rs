//! Static redirect table for pages that moved across site reorganizations.
//!
//! The table is consulted by the hosting layer at request time, not by the
//! page transformation passes. Each entry is a single hop: `old -> mid ->
//! new` chains are NOT auto-resolved here and must be flattened by whoever
//! maintains the table.

use std::collections::BTreeMap;

use eyre::{Result, bail};

/// Mapping of old absolute site paths to their new locations.
#[derive(Debug, Clone, Default)]
pub struct RedirectTable {
    entries: BTreeMap<String, String>,
}

impl RedirectTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(from, to)` pairs.
    ///
    /// Both paths must be absolute site paths. Duplicate `from` keys are
    /// rejected rather than resolved last-wins, so a stale entry cannot
    /// silently shadow a newer one.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, String)>) -> Result<Self> {
        let mut table = BTreeMap::new();
        for (from, to) in entries {
            for path in [&from, &to] {
                if !path.starts_with('/') {
                    bail!("redirect path `{path}` must be an absolute site path starting with `/`");
                }
            }
            if let Some(existing) = table.get(&from) {
                bail!("duplicate redirect entry for `{from}` (maps to both `{existing}` and `{to}`)");
            }
            table.insert(from, to);
        }
        Ok(RedirectTable { entries: table })
    }

    /// Exact lookup; no partial or fuzzy matching.
    pub fn lookup(&self, old_path: &str) -> Option<&str> {
        self.entries.get(old_path).map(|s| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Generate a static meta-refresh redirect page for a moved path.
///
/// Suitable for static hosting where server-side redirects aren't
/// available.
pub fn generate_redirect_html(target_url: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="0; url={target_url}">
<link rel="canonical" href="{target_url}">
<title>Redirecting</title>
</head>
<body>
This page has moved to <a href="{target_url}">{target_url}</a>.
</body>
</html>
"#
    )
}
