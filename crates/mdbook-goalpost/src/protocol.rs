//! Wire types for the mdBook preprocessor protocol.
//!
//! The host build tool invokes the preprocessor with `[context, book]` as
//! JSON on stdin and expects the transformed book as JSON on stdout. Only
//! the fields this preprocessor needs are typed; the configuration table
//! stays a raw JSON value so unrelated host entries pass through.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The invocation context: project root, full config table, and the
/// renderer the book is being built for.
#[derive(Debug, Clone, Deserialize)]
pub struct PreprocessorContext {
    pub root: PathBuf,
    pub config: serde_json::Value,
    pub renderer: String,
    pub mdbook_version: String,
}

/// A loaded book: a tree of chapters interspersed with separators and
/// part titles.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Book {
    pub sections: Vec<BookItem>,
    #[serde(default, rename = "__non_exhaustive")]
    non_exhaustive: (),
}

impl Book {
    pub fn new(sections: Vec<BookItem>) -> Self {
        Book {
            sections,
            non_exhaustive: (),
        }
    }

    /// Iterate all chapters depth-first.
    pub fn chapters(&self) -> impl Iterator<Item = &Chapter> {
        fn collect<'a>(items: &'a [BookItem], out: &mut Vec<&'a Chapter>) {
            for item in items {
                if let BookItem::Chapter(chapter) = item {
                    out.push(chapter);
                    collect(&chapter.sub_items, out);
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.sections, &mut out);
        out.into_iter()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BookItem {
    Chapter(Chapter),
    Separator,
    PartTitle(String),
}

/// One page of the book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    pub name: String,
    pub content: String,
    #[serde(default)]
    pub number: Option<Vec<u32>>,
    #[serde(default)]
    pub sub_items: Vec<BookItem>,
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default)]
    pub source_path: Option<PathBuf>,
    #[serde(default)]
    pub parent_names: Vec<String>,
}

impl Chapter {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Chapter {
            name: name.into(),
            content: content.into(),
            number: None,
            sub_items: Vec::new(),
            path: None,
            source_path: None,
            parent_names: Vec::new(),
        }
    }
}

/// Parse the `[context, book]` pair from the preprocessor's stdin.
pub fn parse_input(input: &str) -> eyre::Result<(PreprocessorContext, Book)> {
    use eyre::WrapErr;
    serde_json::from_str(input).wrap_err("failed to parse preprocessor input JSON")
}
