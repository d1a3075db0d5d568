//! goalpost-core - Transformation engine for goal-tracking documentation
//!
//! This crate provides the building blocks for enriching goal-tracking
//! markdown pages before static-site rendering:
//!
//! - Linkifying textual patterns (issue references and the like) against
//!   ordered pattern/URL-template rules
//! - Rendering status labels as badges
//! - Canonicalizing or suppressing contributor handle mentions
//! - Aggregating a goal's tracked sub-items into a completion percentage
//! - A static redirect table for pages that moved
//!
//! The whole engine is pure: a [`RuleSet`] is built once from
//! configuration (any invalid rule aborts the run before a single page is
//! processed) and shared read-only across page transformations, so pages
//! can be processed in parallel.
//!
//! # Transforming a page
//!
//! ```
//! use goalpost_core::RuleSet;
//!
//! let rules = RuleSet::from_json(r##"{
//!     "linkify": [
//!         { "pattern": "#([0-9]+)", "url": "https://github.com/rust-lang/rust/issues/$1" }
//!     ],
//!     "users": { "@old": "@New" }
//! }"##).unwrap();
//!
//! let page = rules.transform_page("see #123, filed by @old").unwrap();
//! assert_eq!(
//!     page.text,
//!     "see [#123](https://github.com/rust-lang/rust/issues/123), filed by @New"
//! );
//! ```
//!
//! Code spans, code blocks, and existing links are never rewritten:
//!
//! ```
//! # use goalpost_core::RuleSet;
//! # let rules = RuleSet::from_json(r##"{
//! #     "linkify": [{ "pattern": "#([0-9]+)", "url": "https://example.com/$1" }]
//! # }"##).unwrap();
//! let page = rules.transform_page("`#1` and [#2](https://example.com/two)").unwrap();
//! assert_eq!(page.text, "`#1` and [#2](https://example.com/two)");
//! ```
//!
//! # Aggregating goal progress
//!
//! ```
//! use goalpost_core::{ItemStatus, aggregate};
//!
//! let progress = aggregate(&[
//!     ItemStatus::Complete,
//!     ItemStatus::Complete,
//!     ItemStatus::InProgress,
//!     ItemStatus::NotStarted,
//! ]);
//! assert_eq!(progress.total, 4);
//! assert_eq!(progress.percent, 50);
//! ```

mod badge;
mod linkify;
mod mask;
mod progress;
mod redirect;
mod ruleset;
mod transform;
mod users;

pub use linkify::linkify;
pub use progress::{GoalProgress, ItemStatus, PROGRESS_MARKER, aggregate, tracked_items};
pub use redirect::{RedirectTable, generate_redirect_html};
pub use ruleset::{
    Badge, BadgeConfig, LinkifierConfig, LinkifierRule, RedirectConfig, RuleSet, RuleSetConfig,
    SiteInfo,
};
pub use transform::{TransformOutcome, TransformWarning};
pub use users::resolve_handles;
