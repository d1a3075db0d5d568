//! Pattern-based linkification.
//!
//! Rules are applied in declaration order, leftmost-longest per rule,
//! non-overlapping across rules: once a rule rewrites a span, that span is
//! excluded from matching by subsequent rules, but a later rule may still
//! match unrelated spans of the same text. Existing links and code are
//! never rewritten, which also makes linkification idempotent: a generated
//! link is a markdown link, so a second application masks it out.

use crate::mask::Rewriter;
use crate::ruleset::LinkifierRule;

/// Apply ordered linkifier rules to a page's text.
///
/// The visible text of a generated link is the matched span itself; the
/// target is the rule's URL template with capture groups substituted
/// positionally.
pub fn linkify(text: &str, rules: &[LinkifierRule]) -> String {
    let mut rewriter = Rewriter::new(text);
    apply(rules, &mut rewriter);
    rewriter.into_string()
}

pub(crate) fn apply(rules: &[LinkifierRule], rewriter: &mut Rewriter) {
    for rule in rules {
        rewriter.rewrite(&rule.pattern, |caps| {
            format!("[{}]({})", &caps[0], rule.expand(caps))
        });
    }
}
