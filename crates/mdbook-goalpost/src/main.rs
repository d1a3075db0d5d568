//! mdbook-goalpost - goal-tracking documentation preprocessor
//!
//! Invoked by the host build tool with two life-cycle calls:
//!
//! - `mdbook-goalpost supports <renderer>` answers (via exit code)
//!   whether this preprocessor applies to a renderer
//! - otherwise, `[context, book]` JSON arrives on stdin and the
//!   transformed book leaves on stdout
//!
//! A configuration error exits non-zero before any page is processed;
//! page-level warnings are logged to stderr and never fail the build.

use std::io::Read;

use eyre::{Result, WrapErr};
use mdbook_goalpost::renderer_supported;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.get(1).map(|s| s.as_str()) == Some("supports") {
        let renderer = args.get(2).map(|s| s.as_str()).unwrap_or_default();
        if renderer_supported(renderer) {
            return Ok(());
        }
        std::process::exit(1);
    }

    let mut input = String::new();
    std::io::stdin()
        .read_to_string(&mut input)
        .wrap_err("failed to read preprocessor input from stdin")?;

    let book = mdbook_goalpost::run(&input)?;

    serde_json::to_writer(std::io::stdout().lock(), &book)
        .wrap_err("failed to write transformed book to stdout")?;
    Ok(())
}
