//! Accessibility extension for OverlayHub.
//!
//! Flags common accessibility problems from the counters the browser
//! reports with each page, outlines the offending elements and scores the
//! page whenever an analysis completes.
//!
//! | hook | effect |
//! |---|---|
//! | `page_load` | adds `accessibilityIssues`, outlines problems |
//! | `dom_ready` | remembers the snapshot's issues |
//! | `analysis_complete` | adds `accessibilityReport`, draws a score badge |

mod extension;
mod issues;

pub use extension::{AccessibilityConfig, AccessibilityExtension};
pub use issues::{
    badge_color, check_page, recommendations, score, AccessibilityIssue, AccessibilityReport,
    IssueKind, PageCounters, Severity,
};
