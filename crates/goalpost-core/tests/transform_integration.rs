//! Integration tests for the full page transformation pipeline.

use std::path::Path;

use goalpost_core::{RuleSet, TransformWarning};

const FIXTURES_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");

fn read_fixture(name: &str) -> String {
    let path = Path::new(FIXTURES_DIR).join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e))
}

fn rules() -> RuleSet {
    RuleSet::from_json(
        r##"{
            "linkify": [
                { "pattern": "#([0-9]+)", "url": "https://github.com/rust-lang/rust/issues/$1" }
            ],
            "badges": {
                "Help wanted": {
                    "image": "https://img.shields.io/badge/help%20wanted-yellow",
                    "link": "https://example.com/help"
                },
                "Complete": "https://img.shields.io/badge/complete-green"
            },
            "users": { "@old": "@New" },
            "ignore-users": ["@bot"],
            "redirect": [
                { "from": "/2025h2/async.html", "to": "/2026h1/async.html" }
            ]
        }"##,
    )
    .expect("valid rule set")
}

#[test]
fn test_sample_goal_page() {
    let markdown = read_fixture("sample_goal.md");
    let outcome = rules().transform_page(&markdown).expect("page transforms");

    // Linkified issue reference, exact mapping.
    assert!(
        outcome
            .text
            .contains("see [#123](https://github.com/rust-lang/rust/issues/123) and")
    );

    // The pre-existing link is untouched.
    assert!(
        outcome
            .text
            .contains("[RFC 3668](https://rust-lang.github.io/rfcs/3668-async-closures.html)")
    );

    // Code regions are byte-for-byte identical.
    assert!(
        outcome
            .text
            .contains("// code is left alone: #999 and @old")
    );
    assert!(outcome.text.contains("Inline code keeps `#456` untouched."));

    // Badge rendered as a link-wrapped image.
    assert!(outcome.text.contains(
        "[![Help wanted](https://img.shields.io/badge/help%20wanted-yellow)](https://example.com/help)"
    ));

    // Handles: canonicalized in the metadata table, ignored bot removed
    // without a dangling separator.
    assert!(outcome.text.contains("| Point of contact | @New"));
    assert!(
        outcome
            .text
            .contains("Thanks to @New and @other for the reviews.")
    );
    assert!(!outcome.text.contains("@bot"));
    assert!(!outcome.text.contains("and  and"));

    // Progress summary injected at the marker.
    let progress = outcome.progress.expect("goal page has tracked items");
    assert_eq!(progress.total, 4);
    assert_eq!(progress.complete, 2);
    assert_eq!(progress.in_progress, 1);
    assert_eq!(progress.not_started, 1);
    assert_eq!(progress.percent, 50);
    assert!(!outcome.text.contains("<!-- goal-progress -->"));
    assert!(outcome.text.contains("data-percent=\"50\""));
    assert!(outcome.text.contains("\"complete\":2"));

    // @other is the only unresolved handle.
    assert_eq!(
        outcome
            .warnings
            .iter()
            .filter(|w| matches!(w, TransformWarning::UnresolvedHandle { .. }))
            .count(),
        1
    );
}

#[test]
fn test_transform_is_idempotent_on_fixture() {
    let markdown = read_fixture("sample_goal.md");
    let rules = rules();
    let once = rules.transform_page(&markdown).expect("first pass");
    let twice = rules.transform_page(&once.text).expect("second pass");
    assert_eq!(once.text, twice.text);
}

#[test]
fn test_redirect_table_from_config() {
    let rules = rules();
    assert_eq!(
        rules.redirects.lookup("/2025h2/async.html"),
        Some("/2026h1/async.html")
    );
    assert_eq!(rules.redirects.lookup("/2025h2/other.html"), None);
}

#[test]
fn test_config_errors_surface_before_any_page() {
    // Malformed pattern.
    let result = RuleSet::from_json(
        r##"{ "linkify": [{ "pattern": "#([0-9]+", "url": "https://example.com/$1" }] }"##,
    );
    assert!(result.is_err());

    // Template referencing a missing capture group.
    let result = RuleSet::from_json(
        r##"{ "linkify": [{ "pattern": "#([0-9]+)", "url": "https://example.com/$2" }] }"##,
    );
    assert!(result.is_err());

    // Duplicate redirect key.
    let result = RuleSet::from_json(
        r##"{ "redirect": [
            { "from": "/a.html", "to": "/b.html" },
            { "from": "/a.html", "to": "/c.html" }
        ] }"##,
    );
    assert!(result.is_err());
}
