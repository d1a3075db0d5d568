//! Page-parallel book transformation.
//!
//! Each chapter's transformation is an independent, side-effect-free
//! computation over its text and the shared immutable rule set, so the
//! chapter tree is walked with rayon. Rule set construction happens
//! strictly before any worker starts; page warnings are logged and never
//! stop other pages.

use eyre::{Result, WrapErr};
use goalpost_core::RuleSet;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::protocol::{Book, BookItem, Chapter};

/// Transform every chapter of the book in place.
pub fn process_book(rules: &RuleSet, book: &mut Book) -> Result<()> {
    transform_items(rules, &mut book.sections)
}

fn transform_items(rules: &RuleSet, items: &mut [BookItem]) -> Result<()> {
    items.par_iter_mut().try_for_each(|item| {
        if let BookItem::Chapter(chapter) = item {
            transform_chapter(rules, chapter)?;
            transform_items(rules, &mut chapter.sub_items)?;
        }
        Ok(())
    })
}

fn transform_chapter(rules: &RuleSet, chapter: &mut Chapter) -> Result<()> {
    let outcome = rules
        .transform_page(&chapter.content)
        .wrap_err_with(|| format!("failed to transform chapter `{}`", chapter.name))?;

    for warning in &outcome.warnings {
        warn!(chapter = %chapter.name, "{warning}");
    }
    if let Some(progress) = &outcome.progress {
        debug!(
            chapter = %chapter.name,
            total = progress.total,
            percent = progress.percent,
            "computed goal progress"
        );
    }

    chapter.content = outcome.text;
    Ok(())
}
