//! Issue detection and scoring.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Score of a page without issues.
pub const MAX_SCORE: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    MissingAlt,
    LowContrast,
    NoHeadings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn penalty(self) -> u32 {
        match self {
            Self::Error => 2,
            Self::Warning => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub count: u64,
    pub message: String,
}

/// Counters a browser attaches to `page_load` / `dom_ready` data.
///
/// A missing counter means "not measured", never zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageCounters {
    pub images_without_alt: Option<u64>,
    pub heading_count: Option<u64>,
    pub low_contrast_count: Option<u64>,
}

impl PageCounters {
    pub fn from_data(data: &Value) -> Self {
        serde_json::from_value(data.clone()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Issues implied by the measured counters.
pub fn check_page(counters: &PageCounters) -> Vec<AccessibilityIssue> {
    let mut issues = Vec::new();

    if let Some(count) = counters.images_without_alt.filter(|&n| n > 0) {
        issues.push(AccessibilityIssue {
            kind: IssueKind::MissingAlt,
            severity: Severity::Error,
            count,
            message: format!("{} images without an alt attribute", count),
        });
    }

    if let Some(count) = counters.low_contrast_count.filter(|&n| n > 0) {
        issues.push(AccessibilityIssue {
            kind: IssueKind::LowContrast,
            severity: Severity::Warning,
            count,
            message: "Elements with low color contrast".to_string(),
        });
    }

    if counters.heading_count == Some(0) {
        issues.push(AccessibilityIssue {
            kind: IssueKind::NoHeadings,
            severity: Severity::Error,
            count: 1,
            message: "The page has no heading structure".to_string(),
        });
    }

    issues
}

/// 10, minus 2 per error and 1 per warning, never below 0.
pub fn score(issues: &[AccessibilityIssue]) -> u32 {
    let penalty: u32 = issues.iter().map(|i| i.severity.penalty()).sum();
    MAX_SCORE.saturating_sub(penalty)
}

pub fn recommendations(issues: &[AccessibilityIssue]) -> Vec<String> {
    let has = |kind: IssueKind| issues.iter().any(|i| i.kind == kind);
    let mut out = Vec::new();
    if has(IssueKind::MissingAlt) {
        out.push("Add descriptive alt attributes to every image".to_string());
    }
    if has(IssueKind::LowContrast) {
        out.push("Improve color contrast for readability".to_string());
    }
    if has(IssueKind::NoHeadings) {
        out.push("Add a hierarchical heading structure".to_string());
    }
    out
}

/// Green from 8, amber from 5, red below.
pub fn badge_color(score: u32) -> &'static str {
    match score {
        8.. => "#4caf50",
        5..=7 => "#ff9800",
        _ => "#f44336",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessibilityReport {
    pub score: u32,
    pub issues: Vec<AccessibilityIssue>,
    pub recommendations: Vec<String>,
}

impl AccessibilityReport {
    pub fn from_issues(issues: Vec<AccessibilityIssue>) -> Self {
        Self {
            score: score(&issues),
            recommendations: recommendations(&issues),
            issues,
        }
    }
}
