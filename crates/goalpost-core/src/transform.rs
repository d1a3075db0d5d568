//! The per-page transformation pipeline.
//!
//! Passes run in a fixed order: badges first (so badge tokens are never
//! captured by unrelated link patterns), then linkifiers in declaration
//! order, then user-handle resolution over the already-linkified text.
//! Progress aggregation runs last, over the page's task-list metadata,
//! and injects its summary at the progress marker.

use eyre::Result;

use crate::mask::Rewriter;
use crate::progress::{self, GoalProgress};
use crate::ruleset::RuleSet;
use crate::{badge, linkify, users};

/// A recovered per-page condition, logged by the caller; never stops
/// other pages from processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformWarning {
    /// A badge-shaped token whose label is not in the badge map.
    UnknownBadge { label: String },
    /// A handle-shaped token not present in the user map or ignore list.
    UnresolvedHandle { handle: String },
    /// A task-list marker that is not `x`, `X`, `~` or space.
    MalformedStatus { line: usize, marker: char },
}

impl std::fmt::Display for TransformWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransformWarning::UnknownBadge { label } => {
                write!(f, "unknown badge label `{label}`, passing through")
            }
            TransformWarning::UnresolvedHandle { handle } => {
                write!(f, "unresolved user handle `{handle}`, passing through")
            }
            TransformWarning::MalformedStatus { line, marker } => {
                write!(
                    f,
                    "malformed task status `[{marker}]` on line {line}, counting as not started"
                )
            }
        }
    }
}

/// Result of transforming one page.
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    /// Transformed page text.
    pub text: String,
    /// Aggregated goal progress, for pages that carry goal metadata.
    pub progress: Option<GoalProgress>,
    /// Recovered conditions encountered along the way.
    pub warnings: Vec<TransformWarning>,
}

impl RuleSet {
    /// Transform one page's text against this rule set.
    ///
    /// Pure: the same text and rule set always produce the same outcome,
    /// so pages can be processed in parallel with a shared `&RuleSet`.
    ///
    /// # Errors
    ///
    /// Only fails in strict badge mode, on an unknown badge label.
    pub fn transform_page(&self, text: &str) -> Result<TransformOutcome> {
        let mut warnings = Vec::new();

        let mut rewriter = Rewriter::new(text);
        badge::apply(self, &mut rewriter, &mut warnings)?;
        linkify::apply(self.linkifiers(), &mut rewriter);
        users::apply(self, &mut rewriter, &mut warnings);

        let mut text = rewriter.into_string();
        let progress = progress::attach(&mut text, &mut warnings);

        Ok(TransformOutcome {
            text,
            progress,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn rules() -> RuleSet {
        RuleSet::from_json(
            r##"{
                "linkify": [
                    { "pattern": "#([0-9]+)", "url": "https://github.com/rust-lang/rust/issues/$1" }
                ],
                "badges": {
                    "Team": "https://img.shields.io/badge/Team%20ask-red"
                },
                "users": { "@old": "@New" },
                "ignore-users": ["@bot"]
            }"##,
        )
        .unwrap()
    }

    #[test]
    fn test_pass_order_badges_before_linkify() {
        // A link pattern matching bracket fragments must not capture the
        // badge token, because badges run first.
        let rules = RuleSet::from_json(
            r##"{
                "linkify": [
                    { "pattern": "\\[Team\\]", "url": "https://example.com/teams" }
                ],
                "badges": {
                    "Team": "https://img.shields.io/badge/Team%20ask-red"
                }
            }"##,
        )
        .unwrap();
        let outcome = rules.transform_page("ask ![Team][] please").unwrap();
        assert_eq!(
            outcome.text,
            "ask ![Team](https://img.shields.io/badge/Team%20ask-red) please"
        );
    }

    #[test]
    fn test_users_run_on_linkified_text() {
        let outcome = rules().transform_page("#7 by @old").unwrap();
        assert_eq!(
            outcome.text,
            "[#7](https://github.com/rust-lang/rust/issues/7) by @New"
        );
    }

    #[test]
    fn test_transform_is_idempotent() {
        let page = indoc! {"
            see #123 and ![Team][] by @old and @bot

            - [x] one
            - [ ] two
        "};
        let once = rules().transform_page(page).unwrap();
        let twice = rules().transform_page(&once.text).unwrap();
        assert_eq!(once.text, twice.text);
    }

    #[test]
    fn test_warnings_do_not_stop_the_page() {
        let outcome = rules()
            .transform_page("![Mystery][] by @stranger\n\n- [!] odd\n")
            .unwrap();
        assert_eq!(outcome.warnings.len(), 3);
        assert!(outcome.text.contains("![Mystery][]"));
        assert!(outcome.text.contains("@stranger"));
    }
}
