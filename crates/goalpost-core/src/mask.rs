//! Protected-region masking for markdown text.
//!
//! Substitution passes must never rewrite code blocks, inline code,
//! existing links/images, or raw HTML. This module locates those regions
//! via pulldown-cmark byte offsets and exposes [`Rewriter`], which splits a
//! page into locked and open segments. Passes only ever touch open
//! segments, and every substitution output becomes locked, so the first
//! rule to claim a span wins and later rules cannot re-match it.

use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag};
use regex::{Captures, Regex};

fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_FOOTNOTES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
}

/// Byte ranges that no substitution pass may rewrite.
///
/// Covers fenced and indented code blocks, inline code spans, links and
/// images (label included), raw HTML, and link reference definitions.
/// Returned ranges are sorted and non-overlapping.
pub(crate) fn protected_ranges(text: &str) -> Vec<Range<usize>> {
    let parser = Parser::new_ext(text, parser_options());
    let mut ranges: Vec<Range<usize>> = parser
        .reference_definitions()
        .iter()
        .map(|(_, def)| def.span.clone())
        .collect();

    for (event, range) in Parser::new_ext(text, parser_options()).into_offset_iter() {
        match event {
            // A Start event's range covers the whole element, children
            // included, so one range protects the entire link or block.
            Event::Start(Tag::CodeBlock(_))
            | Event::Start(Tag::Link { .. })
            | Event::Start(Tag::Image { .. }) => ranges.push(range),
            Event::Code(_) | Event::Html(_) | Event::InlineHtml(_) => ranges.push(range),
            _ => {}
        }
    }

    merge_ranges(ranges)
}

/// Byte ranges of code only (blocks and inline spans).
///
/// The progress-marker replacement needs to skip code but is itself an
/// HTML injection, so it cannot use the full protected set.
pub(crate) fn code_ranges(text: &str) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    for (event, range) in Parser::new_ext(text, parser_options()).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(_)) | Event::Code(_) => ranges.push(range),
            _ => {}
        }
    }
    merge_ranges(ranges)
}

fn merge_ranges(mut ranges: Vec<Range<usize>>) -> Vec<Range<usize>> {
    ranges.sort_by_key(|r| (r.start, std::cmp::Reverse(r.end)));
    let mut merged: Vec<Range<usize>> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start <= last.end => last.end = last.end.max(range.end),
            _ => merged.push(range),
        }
    }
    merged
}

#[derive(Debug)]
struct Segment {
    text: String,
    locked: bool,
}

/// A page split into locked and open segments.
///
/// Created once per page; each substitution pass narrows the open
/// segments further. [`Rewriter::into_string`] reassembles the page with
/// all non-matched text byte-for-byte intact.
#[derive(Debug)]
pub(crate) struct Rewriter {
    segments: Vec<Segment>,
}

impl Rewriter {
    pub(crate) fn new(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut cursor = 0usize;
        for range in protected_ranges(text) {
            if range.start > cursor {
                segments.push(Segment {
                    text: text[cursor..range.start].to_string(),
                    locked: false,
                });
            }
            segments.push(Segment {
                text: text[range.start..range.end].to_string(),
                locked: true,
            });
            cursor = range.end;
        }
        if cursor < text.len() {
            segments.push(Segment {
                text: text[cursor..].to_string(),
                locked: false,
            });
        }
        Rewriter { segments }
    }

    /// Apply a pattern over all open segments, leftmost non-overlapping.
    ///
    /// The replacement returned by `replace` is locked against every later
    /// pass. Empty matches are skipped.
    pub(crate) fn rewrite<F>(&mut self, pattern: &Regex, mut replace: F)
    where
        F: FnMut(&Captures<'_>) -> String,
    {
        let mut out: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for segment in self.segments.drain(..) {
            if segment.locked {
                out.push(segment);
                continue;
            }
            let text = segment.text;
            let mut cursor = 0usize;
            let mut pending = String::new();
            for caps in pattern.captures_iter(&text) {
                let m = caps.get(0).expect("capture group 0 always exists");
                if m.start() == m.end() {
                    continue;
                }
                pending.push_str(&text[cursor..m.start()]);
                if !pending.is_empty() {
                    out.push(Segment {
                        text: std::mem::take(&mut pending),
                        locked: false,
                    });
                }
                out.push(Segment {
                    text: replace(&caps),
                    locked: true,
                });
                cursor = m.end();
            }
            pending.push_str(&text[cursor..]);
            if !pending.is_empty() {
                out.push(Segment {
                    text: pending,
                    locked: false,
                });
            }
        }
        self.segments = out;
    }

    /// Rewrite each open segment wholesale. Only suitable for the final
    /// pass, since the edited text stays open.
    pub(crate) fn edit_open<F>(&mut self, mut edit: F)
    where
        F: FnMut(&str) -> String,
    {
        for segment in &mut self.segments {
            if !segment.locked {
                segment.text = edit(&segment.text);
            }
        }
    }

    pub(crate) fn into_string(self) -> String {
        let mut result = String::new();
        for segment in self.segments {
            result.push_str(&segment.text);
        }
        result
    }
}
