//! End-to-end tests for the preprocessor life cycle.

use indoc::indoc;
use mdbook_goalpost::run;

fn input_with(content: &str) -> String {
    let content_json = serde_json::to_string(content).unwrap();
    format!(
        r##"[
            {{
                "root": "/book",
                "config": {{
                    "book": {{ "title": "Project goals" }},
                    "preprocessor": {{ "goalpost": {{
                        "command": "mdbook-goalpost",
                        "linkify": [
                            {{ "pattern": "#([0-9]+)", "url": "https://github.com/rust-lang/rust/issues/$1" }}
                        ],
                        "badges": {{
                            "Team": "https://img.shields.io/badge/Team%20ask-red"
                        }},
                        "users": {{ "@old": "@New" }},
                        "ignore-users": ["@bot"],
                        "redirect": [
                            {{ "from": "/2025h2/index.html", "to": "/2026h1/index.html" }}
                        ]
                    }} }}
                }},
                "renderer": "html",
                "mdbook_version": "0.4.40"
            }},
            {{
                "sections": [
                    {{ "Chapter": {{
                        "name": "Async closures",
                        "content": {content_json},
                        "number": [1],
                        "sub_items": [],
                        "path": "async.md",
                        "source_path": "async.md",
                        "parent_names": []
                    }} }}
                ],
                "__non_exhaustive": null
            }}
        ]"##
    )
}

#[test]
fn test_transform_call_end_to_end() {
    let content = indoc! {"
        # Async closures

        <!-- goal-progress -->

        asked of ![Team][] in #123 by @old and @bot

        - [x] RFC
        - [ ] stabilize
    "};
    let book = run(&input_with(content)).unwrap();
    let chapter = book.chapters().next().unwrap();

    assert!(
        chapter
            .content
            .contains("[#123](https://github.com/rust-lang/rust/issues/123)")
    );
    assert!(
        chapter
            .content
            .contains("![Team](https://img.shields.io/badge/Team%20ask-red)")
    );
    assert!(chapter.content.contains("by @New\n"));
    assert!(!chapter.content.contains("@bot"));
    assert!(chapter.content.contains("data-percent=\"50\""));
    assert!(!chapter.content.contains("<!-- goal-progress -->"));
}

#[test]
fn test_output_book_serializes_for_the_host() {
    let book = run(&input_with("plain page\n")).unwrap();
    let json = serde_json::to_string(&book).unwrap();
    assert!(json.contains("\"sections\""));
    assert!(json.contains("plain page"));
}

#[test]
fn test_configuration_error_aborts_the_run() {
    let input = r##"[
        {
            "root": "/book",
            "config": {
                "preprocessor": { "goalpost": {
                    "redirect": [
                        { "from": "/a.html", "to": "/b.html" },
                        { "from": "/a.html", "to": "/c.html" }
                    ]
                } }
            },
            "renderer": "html",
            "mdbook_version": "0.4.40"
        },
        { "sections": [], "__non_exhaustive": null }
    ]"##;
    let err = run(input).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("duplicate"), "{message}");
}

#[test]
fn test_page_without_applicable_transformations_is_not_an_error() {
    let book = run(&input_with("nothing here matches any rule\n")).unwrap();
    assert_eq!(
        book.chapters().next().unwrap().content,
        "nothing here matches any rule\n"
    );
}
