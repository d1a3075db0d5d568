//! mdbook-goalpost - preprocessor wiring for the goalpost engine
//!
//! This library exposes the preprocessor internals for testing and
//! embedding purposes; the binary in `main.rs` is a thin shell around
//! [`run`].

pub mod config;
pub mod preprocess;
pub mod protocol;

use eyre::Result;

use protocol::Book;

/// Renderers this preprocessor applies to.
pub fn renderer_supported(renderer: &str) -> bool {
    matches!(renderer, "html" | "markdown")
}

/// Run one transform invocation: parse `[context, book]`, build the rule
/// set (fail-fast on configuration errors), transform all pages, and
/// return the book to be serialized back to the host.
pub fn run(input: &str) -> Result<Book> {
    let (ctx, mut book) = protocol::parse_input(input)?;
    let rules = config::ruleset_from_context(&ctx)?;
    preprocess::process_book(&rules, &mut book)?;
    Ok(book)
}
