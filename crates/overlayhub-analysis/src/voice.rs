//! Voice transcript interpretation.

use regex::Regex;
use serde_json::{json, Value};
use std::sync::OnceLock;

const SEARCH_URL: &str = "https://www.google.com/search";

fn keyword_pattern(
    cell: &'static OnceLock<Option<Regex>>,
    pattern: &str,
) -> Option<&'static Regex> {
    cell.get_or_init(|| Regex::new(pattern).ok()).as_ref()
}

fn strip(cell: &'static OnceLock<Option<Regex>>, pattern: &str, text: &str) -> String {
    match keyword_pattern(cell, pattern) {
        Some(re) => re.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// Map a spoken phrase onto a raw command.
///
/// Phrases that match nothing become an on-screen error label, so the user
/// always sees a reaction.
pub fn interpret(transcript: &str) -> Value {
    static SEARCH: OnceLock<Option<Regex>> = OnceLock::new();
    static CLICK: OnceLock<Option<Regex>> = OnceLock::new();

    let lower = transcript.to_lowercase();

    if lower.contains("buscar") || lower.contains("search") {
        let term = strip(&SEARCH, r"buscar|search", &lower);
        let url = url::Url::parse_with_params(SEARCH_URL, &[("q", term.as_str())])
            .map(|u| u.to_string())
            .unwrap_or_else(|_| SEARCH_URL.to_string());
        return json!({"action": "navigate", "url": url});
    }

    if lower.contains("clic") || lower.contains("click") {
        // "click" before "clic" so the longer word is removed whole
        let label = strip(&CLICK, r"click|clic", &lower);
        return json!({
            "action": "highlight",
            "selector": "button",
            "style": {"outline": "3px solid #4caf50"},
            "options": {"matchText": label},
        });
    }

    if lower.contains("limpiar") || lower.contains("clear") {
        return json!({"action": "clear"});
    }

    if lower.contains("capturar") || lower.contains("capture") {
        return json!({"action": "capture"});
    }

    json!({
        "action": "text",
        "text": format!("Unrecognized command: \"{}\"", transcript),
        "position": [100, 100],
        "color": "#f44336",
        "backgroundColor": "rgba(244, 67, 54, 0.9)",
    })
}
