//! Rule set extraction from the host config table.
//!
//! The rule set lives under `[preprocessor.goalpost]` in the book
//! configuration. Any configuration error aborts the run before page
//! processing starts: the tool's contract is a fully consistent site or
//! nothing.

use eyre::{Result, WrapErr};
use goalpost_core::{RuleSet, RuleSetConfig};

use crate::protocol::PreprocessorContext;

/// The table name this preprocessor reads its rules from.
pub const PREPROCESSOR_NAME: &str = "goalpost";

/// Build the immutable rule set for this run from the invocation context.
///
/// A missing table yields an empty rule set (the preprocessor is a no-op
/// then, which is not an error).
pub fn ruleset_from_context(ctx: &PreprocessorContext) -> Result<RuleSet> {
    let table = ctx
        .config
        .pointer(&format!("/preprocessor/{PREPROCESSOR_NAME}"))
        .cloned()
        .unwrap_or_else(|| serde_json::Value::Object(Default::default()));

    let config: RuleSetConfig = serde_json::from_value(table)
        .wrap_err_with(|| format!("failed to parse [preprocessor.{PREPROCESSOR_NAME}] table"))?;

    RuleSet::from_config(config)
        .wrap_err_with(|| format!("invalid [preprocessor.{PREPROCESSOR_NAME}] configuration"))
}
