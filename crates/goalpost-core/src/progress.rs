//! Goal progress aggregation.
//!
//! A goal page tracks its sub-items as markdown task-list entries:
//!
//! ```markdown
//! - [x] author RFC
//! - [~] stabilization report
//! - [ ] stabilize
//! ```
//!
//! `[x]` (or `[X]`) is complete, `[~]` is in progress, `[ ]` is not
//! started. Aggregation is a pure reduction over those statuses; the
//! result is recomputed on every run and never cached, since statuses
//! change between site rebuilds.

use serde::Serialize;

use crate::mask::code_ranges;
use crate::transform::TransformWarning;

/// The marker a goal page places where its progress bar should render.
pub const PROGRESS_MARKER: &str = "<!-- goal-progress -->";

/// Status of a single tracked item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    NotStarted,
    InProgress,
    Complete,
}

/// Aggregated completion state of a goal's tracked items.
///
/// This is the stable shape the client-side rendering script consumes; it
/// reads `percent`, `complete` and `total` and performs no further
/// validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GoalProgress {
    pub total: usize,
    pub complete: usize,
    pub in_progress: usize,
    pub not_started: usize,
    /// Rounded completion percentage, 0-100. Zero when `total` is zero;
    /// the consumer can distinguish "no data" via `total`.
    pub percent: u8,
}

impl GoalProgress {
    /// Serialize the summary to JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).expect("failed to serialize goal progress to JSON")
    }
}

/// Count item statuses and compute the completion percentage.
///
/// Pure and order-independent: identical input multisets always yield
/// identical output. An empty item set yields the zero sentinel rather
/// than a division fault.
pub fn aggregate(items: &[ItemStatus]) -> GoalProgress {
    let mut complete = 0;
    let mut in_progress = 0;
    let mut not_started = 0;
    for item in items {
        match item {
            ItemStatus::Complete => complete += 1,
            ItemStatus::InProgress => in_progress += 1,
            ItemStatus::NotStarted => not_started += 1,
        }
    }
    let total = items.len();
    let percent = if total == 0 {
        0
    } else {
        ((complete as f64 / total as f64) * 100.0).round() as u8
    };
    GoalProgress {
        total,
        complete,
        in_progress,
        not_started,
        percent,
    }
}

/// Extract tracked-item statuses from a page's task-list entries.
///
/// Task lines inside code blocks are ignored. A task marker other than
/// `x`, `X`, `~` or space is malformed: it is counted as not started and
/// reported, so an author typo lowers the percentage instead of silently
/// shrinking the denominator.
pub fn tracked_items(text: &str) -> (Vec<ItemStatus>, Vec<TransformWarning>) {
    let code = code_ranges(text);
    let mut items = Vec::new();
    let mut warnings = Vec::new();

    let mut offset = 0usize;
    for (idx, line) in text.split('\n').enumerate() {
        let line_start = offset;
        offset += line.len() + 1;

        if code.iter().any(|r| r.start <= line_start && line_start < r.end) {
            continue;
        }

        let trimmed = line.trim_start();
        let Some(rest) = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "))
            .or_else(|| trimmed.strip_prefix("+ "))
        else {
            continue;
        };

        let mut chars = rest.chars();
        let (Some('['), Some(marker), Some(']')) = (chars.next(), chars.next(), chars.next())
        else {
            continue;
        };
        // Require a word break after the box so `- [x](link)` is not a task.
        if !matches!(chars.next(), None | Some(' ')) {
            continue;
        }

        items.push(match marker {
            ' ' => ItemStatus::NotStarted,
            'x' | 'X' => ItemStatus::Complete,
            '~' => ItemStatus::InProgress,
            other => {
                warnings.push(TransformWarning::MalformedStatus {
                    line: idx + 1,
                    marker: other,
                });
                ItemStatus::NotStarted
            }
        });
    }

    (items, warnings)
}

/// Compute a page's progress and inject the serialized summary at the
/// progress marker.
///
/// Returns `None` for pages with no goal metadata (no tracked items and
/// no marker). A marker on a page without tracked items receives the zero
/// sentinel. Marker occurrences inside code blocks are left alone.
pub(crate) fn attach(text: &mut String, warnings: &mut Vec<TransformWarning>) -> Option<GoalProgress> {
    let (items, mut item_warnings) = tracked_items(text);
    warnings.append(&mut item_warnings);

    let has_marker = text.contains(PROGRESS_MARKER);
    if items.is_empty() && !has_marker {
        return None;
    }

    let progress = aggregate(&items);
    if has_marker {
        if let Some(replaced) = replace_marker_outside_code(text, &progress_html(&progress)) {
            *text = replaced;
        }
    }
    Some(progress)
}

/// The injected page data: a div the client-side script reads via data
/// attributes, with the JSON summary as its text content.
fn progress_html(progress: &GoalProgress) -> String {
    format!(
        "<div class=\"goal-progress\" data-total=\"{total}\" data-complete=\"{complete}\" \
         data-in-progress=\"{in_progress}\" data-not-started=\"{not_started}\" \
         data-percent=\"{percent}\">{json}</div>",
        total = progress.total,
        complete = progress.complete,
        in_progress = progress.in_progress,
        not_started = progress.not_started,
        percent = progress.percent,
        json = progress.to_json(),
    )
}

fn replace_marker_outside_code(text: &str, replacement: &str) -> Option<String> {
    let code = code_ranges(text);
    let mut out = String::with_capacity(text.len() + replacement.len());
    let mut cursor = 0usize;
    let mut replaced = false;

    while let Some(pos) = text[cursor..].find(PROGRESS_MARKER) {
        let start = cursor + pos;
        let end = start + PROGRESS_MARKER.len();
        if code.iter().any(|r| r.start < end && start < r.end) {
            out.push_str(&text[cursor..end]);
        } else {
            out.push_str(&text[cursor..start]);
            out.push_str(replacement);
            replaced = true;
        }
        cursor = end;
    }

    if !replaced {
        return None;
    }
    out.push_str(&text[cursor..]);
    Some(out)
}
