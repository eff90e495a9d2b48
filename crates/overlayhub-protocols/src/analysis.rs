//! Analysis provider protocol.
//!
//! The hub never interprets pixels itself. A provider turns a screenshot into
//! a [`PageAnalysis`], which the planner then converts into overlay commands.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::AnalysisError;

/// Bounds of a layout area, in percent of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl LayoutBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }
}

/// Layout areas detected on a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<LayoutBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation: Option<LayoutBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<LayoutBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sidebar: Option<LayoutBox>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<LayoutBox>,
    #[serde(flatten)]
    pub other: BTreeMap<String, LayoutBox>,
}

impl PageLayout {
    /// Areas in page order: the well-known ones first, then the rest by name.
    pub fn areas(&self) -> Vec<(&str, LayoutBox)> {
        let known = [
            ("header", self.header),
            ("navigation", self.navigation),
            ("main", self.main),
            ("sidebar", self.sidebar),
            ("footer", self.footer),
        ];
        known
            .into_iter()
            .filter_map(|(name, area)| area.map(|a| (name, a)))
            .chain(self.other.iter().map(|(name, area)| (name.as_str(), *area)))
            .collect()
    }
}

/// An element recognised in a screenshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedElement {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub confidence: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessibilitySummary {
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub issues: Vec<String>,
}

/// Structured result of analysing a screenshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageAnalysis {
    pub description: String,
    #[serde(default)]
    pub layout: PageLayout,
    #[serde(default)]
    pub elements: Vec<DetectedElement>,
    #[serde(default)]
    pub accessibility: AccessibilitySummary,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// A source of page analyses.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Provider identifier (`mock`, `remote-a`, `remote-b`).
    fn id(&self) -> &str;

    /// Analyse a base64-encoded screenshot.
    async fn analyze_image(
        &self,
        image: &str,
        prompt: Option<&str>,
    ) -> Result<PageAnalysis, AnalysisError>;

    /// Analyse free text (page copy, transcripts).
    async fn analyze_text(&self, text: &str, prompt: Option<&str>) -> Result<Value, AnalysisError>;
}
