//! Deterministic analysis provider.

use async_trait::async_trait;
use serde_json::{json, Value};

use overlayhub_protocols::analysis::{
    AccessibilitySummary, AnalysisProvider, DetectedElement, LayoutBox, PageAnalysis, PageLayout,
};
use overlayhub_protocols::error::AnalysisError;

/// Returns the same example analysis for every screenshot.
#[derive(Debug, Default, Clone)]
pub struct MockProvider;

impl MockProvider {
    pub fn new() -> Self {
        Self
    }

    /// The fixed analysis every screenshot gets.
    pub fn sample_analysis() -> PageAnalysis {
        PageAnalysis {
            description: "Main web page with visible navigation and main content".to_string(),
            layout: PageLayout {
                header: Some(LayoutBox::new(0.0, 0.0, 100.0, 10.0)),
                navigation: Some(LayoutBox::new(0.0, 10.0, 100.0, 5.0)),
                main: Some(LayoutBox::new(0.0, 15.0, 70.0, 75.0)),
                sidebar: Some(LayoutBox::new(70.0, 15.0, 30.0, 75.0)),
                footer: Some(LayoutBox::new(0.0, 90.0, 100.0, 10.0)),
                other: Default::default(),
            },
            elements: vec![
                DetectedElement {
                    kind: "button".to_string(),
                    text: Some("Sign in".to_string()),
                    fields: None,
                    confidence: 0.9,
                },
                DetectedElement {
                    kind: "link".to_string(),
                    text: Some("Contact us".to_string()),
                    fields: None,
                    confidence: 0.8,
                },
                DetectedElement {
                    kind: "form".to_string(),
                    text: None,
                    fields: Some(vec!["email".to_string(), "password".to_string()]),
                    confidence: 0.85,
                },
            ],
            accessibility: AccessibilitySummary {
                score: 7.5,
                issues: vec![
                    "Images missing alt text".to_string(),
                    "Low contrast in some text".to_string(),
                ],
            },
            suggestions: vec![
                "Highlight the primary call-to-action button".to_string(),
                "Improve text contrast".to_string(),
                "Add descriptions to images".to_string(),
            ],
        }
    }
}

#[async_trait]
impl AnalysisProvider for MockProvider {
    fn id(&self) -> &str {
        "mock"
    }

    async fn analyze_image(
        &self,
        _image: &str,
        _prompt: Option<&str>,
    ) -> Result<PageAnalysis, AnalysisError> {
        Ok(Self::sample_analysis())
    }

    async fn analyze_text(&self, text: &str, prompt: Option<&str>) -> Result<Value, AnalysisError> {
        let excerpt: String = text.chars().take(200).collect();
        Ok(json!({
            "wordCount": text.split_whitespace().count(),
            "characterCount": text.chars().count(),
            "excerpt": excerpt,
            "prompt": prompt,
        }))
    }
}
