//! User-handle resolution.
//!
//! Scans for handle-shaped tokens (`@` followed by an identifier).
//! Handles on the ignore list are removed from the output entirely,
//! together with one adjoining separator so no orphaned commas or doubled
//! spaces remain. Handles in the user map are replaced with their
//! canonical form. Matching is exact; there is no case normalization.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::OnceLock;

use regex::Regex;

use crate::mask::Rewriter;
use crate::ruleset::RuleSet;
use crate::transform::TransformWarning;

fn handle_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"@[A-Za-z0-9][A-Za-z0-9_-]*").expect("valid handle pattern")
    })
}

pub(crate) fn apply(
    rules: &RuleSet,
    rewriter: &mut Rewriter,
    warnings: &mut Vec<TransformWarning>,
) {
    if rules.users.is_empty() && rules.ignore_users.is_empty() {
        return;
    }
    rewriter.edit_open(|text| {
        let (resolved, mut w) = resolve_handles(text, &rules.users, &rules.ignore_users);
        warnings.append(&mut w);
        resolved
    });
}

/// Resolve every handle mention in a piece of text.
///
/// Returns the rewritten text plus a warning for each handle that was
/// neither mapped nor ignored.
pub fn resolve_handles(
    text: &str,
    users: &BTreeMap<String, String>,
    ignore_users: &BTreeSet<String>,
) -> (String, Vec<TransformWarning>) {
    let mut out = String::with_capacity(text.len());
    let mut warnings = Vec::new();
    let mut cursor = 0usize;

    for m in handle_token().find_iter(text) {
        if m.start() < cursor {
            // Swallowed by a separator skip after an ignored handle.
            continue;
        }
        // An `@` embedded in a word (e.g. an email address) is not a
        // mention.
        if text[..m.start()]
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric())
        {
            out.push_str(&text[cursor..m.end()]);
            cursor = m.end();
            continue;
        }

        let handle = m.as_str();
        if ignore_users.contains(handle) {
            let gap = &text[cursor..m.start()];
            if let Some(stripped) = strip_trailing_separator(gap) {
                out.push_str(stripped);
                cursor = m.end();
            } else {
                out.push_str(gap);
                cursor = m.end() + leading_separator_len(&text[m.end()..]);
            }
        } else if let Some(canonical) = users.get(handle) {
            out.push_str(&text[cursor..m.start()]);
            out.push_str(canonical);
            cursor = m.end();
        } else {
            warnings.push(TransformWarning::UnresolvedHandle {
                handle: handle.to_string(),
            });
            out.push_str(&text[cursor..m.end()]);
            cursor = m.end();
        }
    }

    out.push_str(&text[cursor..]);
    (out, warnings)
}

const SEPARATORS: [&str; 4] = [", and ", " and ", ", ", ","];

/// Strip one list separator from the end of the gap preceding a removed
/// handle, falling back to a single joining space.
fn strip_trailing_separator(gap: &str) -> Option<&str> {
    for sep in SEPARATORS {
        if let Some(stripped) = gap.strip_suffix(sep) {
            return Some(stripped);
        }
    }
    if let Some(stripped) = gap.strip_suffix(' ') {
        if !stripped.is_empty() {
            return Some(stripped);
        }
    }
    None
}

/// Length of a list separator directly following a removed handle.
fn leading_separator_len(rest: &str) -> usize {
    for sep in SEPARATORS {
        if rest.starts_with(sep) {
            return sep.len();
        }
    }
    if rest.starts_with(' ') { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn maps() -> (BTreeMap<String, String>, BTreeSet<String>) {
        let users = BTreeMap::from([("@old".to_string(), "@New".to_string())]);
        let ignore = BTreeSet::from(["@bot".to_string()]);
        (users, ignore)
    }

    #[test]
    fn test_canonicalization_and_removal_leave_no_orphaned_separator() {
        let (users, ignore) = maps();
        let (out, warnings) = resolve_handles("@old and @bot and @other", &users, &ignore);
        assert_eq!(out, "@New and @other");
        assert_eq!(warnings.len(), 1, "only @other is unresolved");
    }

    #[test]
    fn test_removal_from_comma_list() {
        let (users, ignore) = maps();
        let (out, _) = resolve_handles("@old, @bot, @other", &users, &ignore);
        assert_eq!(out, "@New, @other");
    }

    #[test]
    fn test_removal_at_list_start_consumes_following_separator() {
        let (users, ignore) = maps();
        let (out, _) = resolve_handles("@bot, @old", &users, &ignore);
        assert_eq!(out, "@New");
    }

    #[test]
    fn test_removal_of_lone_mention() {
        let (users, ignore) = maps();
        let (out, _) = resolve_handles("reported by @bot.", &users, &ignore);
        assert_eq!(out, "reported by.");
    }

    #[test]
    fn test_unknown_handle_passes_through_with_warning() {
        let (users, ignore) = maps();
        let (out, warnings) = resolve_handles("thanks @someone", &users, &ignore);
        assert_eq!(out, "thanks @someone");
        assert_eq!(
            warnings,
            vec![TransformWarning::UnresolvedHandle {
                handle: "@someone".to_string()
            }]
        );
    }

    #[test]
    fn test_matching_is_exact_case() {
        let (users, ignore) = maps();
        let (out, warnings) = resolve_handles("@Old", &users, &ignore);
        assert_eq!(out, "@Old");
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_email_address_is_not_a_mention() {
        let (users, ignore) = maps();
        let (out, warnings) = resolve_handles("mail me at someone@old.example", &users, &ignore);
        assert_eq!(out, "mail me at someone@old.example");
        assert!(warnings.is_empty());
    }
}
