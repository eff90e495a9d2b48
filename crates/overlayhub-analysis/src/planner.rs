//! Turns analyses into overlay and DOM commands.
//!
//! The planner only builds raw commands; they still go through the command
//! processor like anything a peer sends.

use serde_json::{json, Value};

use overlayhub_protocols::analysis::PageAnalysis;

use crate::dom::InterestingElement;

/// Reference viewport the percentage layout is projected onto.
pub const VIEWPORT_WIDTH: f64 = 1200.0;
pub const VIEWPORT_HEIGHT: f64 = 800.0;

/// At most this many DOM elements get highlighted per snapshot.
pub const MAX_HIGHLIGHTS: usize = 5;

const HIGHLIGHT_COLOR: &str = "#ff4081";

/// Outline color for a named layout area.
pub fn area_color(area: &str) -> &'static str {
    match area {
        "header" => "#2196f3",
        "navigation" => "#4caf50",
        "main" => "#ff9800",
        "sidebar" => "#9c27b0",
        "footer" => "#607d8b",
        _ => HIGHLIGHT_COLOR,
    }
}

/// Title, one labelled rectangle per layout area, one line per suggestion.
pub fn overlay_commands(analysis: &PageAnalysis) -> Vec<Value> {
    let mut commands = vec![json!({
        "action": "text",
        "text": "AI Analysis",
        "position": [100, 50],
        "color": "#ffffff",
        "backgroundColor": "rgba(33, 33, 33, 0.9)",
        "fontSize": 18,
        "id": "analysis_title",
    })];

    for (area, bounds) in analysis.layout.areas() {
        let x = bounds.x * VIEWPORT_WIDTH / 100.0;
        let y = bounds.y * VIEWPORT_HEIGHT / 100.0;
        let color = area_color(area);

        commands.push(json!({
            "action": "rectangle",
            "x": x,
            "y": y,
            "width": bounds.width * VIEWPORT_WIDTH / 100.0,
            "height": bounds.height * VIEWPORT_HEIGHT / 100.0,
            "color": color,
            "fill": true,
            "fillColor": format!("{}20", color),
            "id": format!("layout_{}", area),
        }));
        commands.push(json!({
            "action": "text",
            "text": area.to_uppercase(),
            "position": [x + 10.0, y + 20.0],
            "color": color,
            "fontSize": 14,
            "backgroundColor": "rgba(0, 0, 0, 0.7)",
            "id": format!("label_{}", area),
        }));
    }

    for (index, suggestion) in analysis.suggestions.iter().enumerate() {
        commands.push(json!({
            "action": "text",
            "text": format!("✓ {}", suggestion),
            "position": [100, 150 + index * 30],
            "color": "#4caf50",
            "fontSize": 14,
            "backgroundColor": "rgba(76, 175, 80, 0.1)",
            "id": format!("suggestion_{}", index),
        }));
    }

    commands
}

/// A highlight plus a tooltip for each of the first [`MAX_HIGHLIGHTS`] elements.
pub fn highlight_commands(elements: &[InterestingElement]) -> Vec<Value> {
    let mut commands = Vec::new();

    for (index, item) in elements.iter().take(MAX_HIGHLIGHTS).enumerate() {
        commands.push(json!({
            "action": "highlight",
            "selector": item.element.selector(),
            "style": {
                "outline": "3px solid #ff4081",
                "outlineOffset": "2px",
                "boxShadow": "0 0 15px rgba(255, 64, 129, 0.5)",
            },
            "options": {"addIndicator": true},
            "id": format!("highlight_{}", index),
        }));

        let (x, y) = item
            .element
            .bounding_box
            .map_or((100.0, 100.0), |b| (b.x, b.y));
        commands.push(json!({
            "action": "text",
            "text": item.reason,
            "position": [x, y - 30.0],
            "color": "#ffffff",
            "backgroundColor": "rgba(255, 64, 129, 0.9)",
            "fontSize": 12,
            "id": format!("tooltip_{}", index),
        }));
    }

    commands
}
