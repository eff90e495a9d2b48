//! Structural analysis of DOM snapshots sent by the browser.

use serde::{Deserialize, Serialize};

/// Tags a user can interact with.
const INTERACTIVE_TAGS: [&str; 5] = ["BUTTON", "A", "INPUT", "SELECT", "TEXTAREA"];

const ACTION_WORDS: [&str; 6] = ["start", "begin", "get started", "iniciar", "empezar", "comenzar"];
const HELP_WORDS: [&str; 5] = ["contact", "help", "support", "ayuda", "soporte"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
}

/// One element as reported by the browser preload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomElement {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl DomElement {
    fn is_tag(&self, tag: &str) -> bool {
        self.tag_name.eq_ignore_ascii_case(tag)
    }

    fn is_heading(&self) -> bool {
        let tag = self.tag_name.to_ascii_uppercase();
        let bytes = tag.as_bytes();
        bytes.len() == 2 && bytes[0] == b'H' && (b'1'..=b'6').contains(&bytes[1])
    }

    /// `#id`, else the first class, else the lowercase tag.
    pub fn selector(&self) -> String {
        if let Some(id) = self.id.as_deref().filter(|id| !id.is_empty()) {
            return format!("#{}", id);
        }
        let first_class = self
            .class_name
            .as_deref()
            .and_then(|classes| classes.split_whitespace().next());
        match first_class {
            Some(class) => format!(".{}", class),
            None => self.tag_name.to_lowercase(),
        }
    }
}

/// A `dom_data` payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomSnapshot {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub elements: Vec<DomElement>,
    #[serde(default)]
    pub text_content: String,
    #[serde(default)]
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomStructure {
    pub title: String,
    pub url: String,
    pub element_count: usize,
    pub text_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomAccessibility {
    pub has_title: bool,
    pub has_lang: bool,
    /// Number of images that carry alt text.
    pub has_alt_text: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomAnalysis {
    pub structure: DomStructure,
    pub interactive_elements: Vec<DomElement>,
    pub forms: Vec<DomElement>,
    pub headings: Vec<DomElement>,
    pub images: Vec<DomElement>,
    pub accessibility: DomAccessibility,
}

/// An element worth pointing out, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterestingElement {
    pub element: DomElement,
    pub reason: String,
    pub confidence: f64,
}

pub fn analyze_dom(snapshot: &DomSnapshot) -> DomAnalysis {
    let collect = |pred: &dyn Fn(&DomElement) -> bool| -> Vec<DomElement> {
        snapshot.elements.iter().filter(|e| pred(e)).cloned().collect()
    };

    DomAnalysis {
        structure: DomStructure {
            title: snapshot.title.clone(),
            url: snapshot.url.clone(),
            element_count: snapshot.elements.len(),
            text_length: snapshot.text_content.chars().count(),
        },
        interactive_elements: collect(&|e| INTERACTIVE_TAGS.iter().any(|t| e.is_tag(t))),
        forms: collect(&|e| e.is_tag("FORM")),
        headings: collect(&|e| e.is_heading()),
        images: collect(&|e| e.is_tag("IMG")),
        accessibility: DomAccessibility {
            has_title: !snapshot.title.is_empty(),
            has_lang: snapshot.html.contains("lang="),
            has_alt_text: snapshot
                .elements
                .iter()
                .filter(|e| e.is_tag("IMG") && e.alt.as_deref().is_some_and(|a| !a.is_empty()))
                .count(),
        },
    }
}

/// Call-to-action buttons, forms and help links, most confident first.
pub fn find_interesting_elements(analysis: &DomAnalysis) -> Vec<InterestingElement> {
    let mentions = |element: &DomElement, words: &[&str]| {
        let text = element.text.to_lowercase();
        words.iter().any(|w| text.contains(w))
    };

    let mut interesting = Vec::new();

    for element in &analysis.interactive_elements {
        if element.is_tag("BUTTON") && mentions(element, &ACTION_WORDS[..]) {
            interesting.push(InterestingElement {
                element: element.clone(),
                reason: "Primary action button".to_string(),
                confidence: 0.9,
            });
        }
    }

    for form in &analysis.forms {
        interesting.push(InterestingElement {
            element: form.clone(),
            reason: "User form".to_string(),
            confidence: 0.8,
        });
    }

    for element in &analysis.interactive_elements {
        if element.is_tag("A") && mentions(element, &HELP_WORDS[..]) {
            interesting.push(InterestingElement {
                element: element.clone(),
                reason: "Help or contact link".to_string(),
                confidence: 0.7,
            });
        }
    }

    // stable: equal confidence keeps discovery order
    interesting.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
    interesting
}

#[cfg(test)]
#[path = "dom_tests.rs"]
mod tests;
