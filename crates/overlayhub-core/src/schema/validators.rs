//! Built-in named field validators.

use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, OnceLock};

/// A named predicate over one field value.
pub type Validator = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

pub const SELECTOR: &str = "selector";
pub const COLOR: &str = "color";
pub const URL: &str = "url";
pub const COORDINATES: &str = "coordinates";

/// CSS selector syntax, checked with the same parser the DOM surface mirrors.
pub fn selector(value: &Value) -> Result<(), String> {
    let Some(text) = value.as_str() else {
        return Err("selector must be a string".to_string());
    };
    scraper::Selector::parse(text)
        .map(|_| ())
        .map_err(|_| format!("'{}' is not a valid CSS selector", text))
}

fn color_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(
                r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$|^rgb\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*\)$|^rgba\(\s*\d+\s*,\s*\d+\s*,\s*\d+\s*,\s*[\d.]+\s*\)$",
            )
            .ok()
        })
        .as_ref()
}

/// Hex3, hex6, `rgb(...)` or `rgba(...)`.
pub fn color(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some(text) if color_pattern().is_some_and(|re| re.is_match(text)) => Ok(()),
        _ => Err("expected #hex, rgb() or rgba()".to_string()),
    }
}

/// Absolute URL parseable by the WHATWG rules.
pub fn url(value: &Value) -> Result<(), String> {
    let Some(text) = value.as_str() else {
        return Err("URL must be a string".to_string());
    };
    url::Url::parse(text)
        .map(|_| ())
        .map_err(|e| format!("invalid URL ({})", e))
}

/// A two-element numeric array `[x, y]`.
pub fn coordinates(value: &Value) -> Result<(), String> {
    match value.as_array() {
        Some(items) if items.len() == 2 && items.iter().all(Value::is_number) => Ok(()),
        _ => Err("coordinates must be an array of two numbers [x, y]".to_string()),
    }
}

/// The validators every registry starts with.
pub fn builtin() -> Vec<(&'static str, Validator)> {
    vec![
        (SELECTOR, Arc::new(selector) as Validator),
        (COLOR, Arc::new(color) as Validator),
        (URL, Arc::new(url) as Validator),
        (COORDINATES, Arc::new(coordinates) as Validator),
    ]
}
