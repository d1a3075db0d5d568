//! Status badge rendering.
//!
//! Authors write status tags as collapsed-reference images with no
//! definition, e.g. `![Help wanted][]`. Labels found in the badge map are
//! rewritten to a link-wrapped badge image; labels of the same shape that
//! are not in the map pass through byte-for-byte (authors introduce ad hoc
//! labels), but are locked so later link patterns cannot corrupt them.

use std::sync::OnceLock;

use eyre::{Result, bail};
use regex::Regex;

use crate::mask::Rewriter;
use crate::ruleset::RuleSet;
use crate::transform::TransformWarning;

/// The badge construct: `![Label][]`. Labels are whole tokens between the
/// brackets, matched case-sensitively; arbitrary prose occurrences of a
/// label are never rewritten.
fn badge_token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"!\[([^\[\]\n]+)\]\[\]").expect("valid badge pattern"))
}

pub(crate) fn apply(
    rules: &RuleSet,
    rewriter: &mut Rewriter,
    warnings: &mut Vec<TransformWarning>,
) -> Result<()> {
    let mut unknown_strict: Option<String> = None;

    rewriter.rewrite(badge_token(), |caps| {
        let label = &caps[1];
        match rules.badges.get(label) {
            Some(badge) => badge.render(label),
            None => {
                if rules.strict_badges {
                    unknown_strict.get_or_insert_with(|| label.to_string());
                } else {
                    warnings.push(TransformWarning::UnknownBadge {
                        label: label.to_string(),
                    });
                }
                caps[0].to_string()
            }
        }
    });

    if let Some(label) = unknown_strict {
        bail!("unknown badge label `{label}` (strict badge mode)");
    }
    Ok(())
}
