//! Typed command bodies.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Fields;

/// An `[x, y]` coordinate.
pub type Point = [f64; 2];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    Solid,
    Dashed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureFormat {
    Png,
    Jpeg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClearScope {
    Overlay,
    Dom,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsertPosition {
    Beforebegin,
    Afterbegin,
    Beforeend,
    Afterend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    Pulse,
    Fade,
    Slide,
    Bounce,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBehavior {
    Smooth,
    Auto,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollBlock {
    Start,
    Center,
    End,
    Nearest,
}

/// Options of a `scroll_to` command, with defaults filled in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrollOptions {
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
    pub highlight_after_scroll: bool,
    pub scroll_delay: f64,
    pub highlight_duration: f64,
}

/// Element description for `inject_element`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Fields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Fields>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// The consumer a command is meant for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    /// Canvas overlay renderer.
    Overlay,
    /// DOM manipulator inside the page.
    Dom,
    /// The browser shell itself.
    Shell,
    /// No preference; goes to the primary surface.
    Any,
}

/// Body of a command, one variant per known action.
///
/// Actions without a typed variant, or payloads that carry fields a typed
/// variant cannot represent, are kept verbatim in [`CommandBody::Other`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CommandBody {
    Draw {
        #[serde(rename = "type")]
        kind: String,
        data: Value,
    },
    Arrow {
        from: Point,
        to: Point,
        color: String,
        width: f64,
        style: LineStyle,
        animated: bool,
    },
    #[serde(rename_all = "camelCase")]
    Circle {
        center: Point,
        radius: f64,
        color: String,
        fill: bool,
        fill_color: String,
        width: f64,
    },
    #[serde(rename_all = "camelCase")]
    Rectangle {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: String,
        fill: bool,
        fill_color: String,
        border_radius: f64,
    },
    #[serde(rename_all = "camelCase")]
    Text {
        text: String,
        position: Point,
        color: String,
        font_size: f64,
        font_family: String,
        background_color: String,
        padding: f64,
        border_radius: f64,
    },
    Highlight {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Fields>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Fields>,
    },
    Unhighlight {
        selector: String,
    },
    Hide {
        selector: String,
    },
    Show {
        selector: String,
    },
    ModifyStyle {
        selector: String,
        styles: Fields,
    },
    ModifyText {
        selector: String,
        text: String,
    },
    ModifyAttribute {
        selector: String,
        attribute: String,
        value: String,
    },
    InjectElement {
        selector: String,
        element: ElementSpec,
        position: InsertPosition,
    },
    RemoveElement {
        selector: String,
    },
    ClickElement {
        selector: String,
    },
    ScrollTo {
        selector: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<ScrollOptions>,
    },
    GetElementInfo {
        selector: String,
    },
    ClearAll {},
    Navigate {
        url: String,
    },
    Capture {
        format: CaptureFormat,
        quality: f64,
    },
    #[serde(rename = "get_dom", rename_all = "camelCase")]
    GetDom {
        include_text: bool,
        include_styles: bool,
        max_depth: u32,
    },
    Clear {
        #[serde(rename = "type")]
        scope: ClearScope,
    },
    /// Removes the overlay element whose id is the command id.
    ClearElement {},
    #[serde(rename_all = "camelCase")]
    Animate {
        animation_type: AnimationKind,
        target: String,
        duration: f64,
        iterations: f64,
        easing: String,
    },
    #[serde(skip)]
    Other { action: String, fields: Fields },
}

impl CommandBody {
    /// Build a body from normalized fields (including `action`).
    ///
    /// Never fails: anything a typed variant cannot hold losslessly becomes
    /// [`CommandBody::Other`].
    pub fn from_fields(mut fields: Fields) -> Self {
        let typed = serde_json::from_value::<CommandBody>(Value::Object(fields.clone()))
            .ok()
            .filter(|body| {
                let round_trip = Value::Object(body.to_fields());
                same_shape(&round_trip, &Value::Object(fields.clone()))
            });
        match typed {
            Some(body) => body,
            None => {
                let action = match fields.remove("action") {
                    Some(Value::String(action)) => action,
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                Self::Other { action, fields }
            }
        }
    }

    /// Wire fields of this body, including `action`.
    pub fn to_fields(&self) -> Fields {
        match self {
            Self::Other { action, fields } => {
                let mut out = fields.clone();
                out.insert("action".to_string(), Value::String(action.clone()));
                out
            }
            typed => match serde_json::to_value(typed) {
                Ok(Value::Object(map)) => map,
                _ => Fields::new(),
            },
        }
    }

    pub fn action(&self) -> &str {
        match self {
            Self::Draw { .. } => "draw",
            Self::Arrow { .. } => "arrow",
            Self::Circle { .. } => "circle",
            Self::Rectangle { .. } => "rectangle",
            Self::Text { .. } => "text",
            Self::Highlight { .. } => "highlight",
            Self::Unhighlight { .. } => "unhighlight",
            Self::Hide { .. } => "hide",
            Self::Show { .. } => "show",
            Self::ModifyStyle { .. } => "modify_style",
            Self::ModifyText { .. } => "modify_text",
            Self::ModifyAttribute { .. } => "modify_attribute",
            Self::InjectElement { .. } => "inject_element",
            Self::RemoveElement { .. } => "remove_element",
            Self::ClickElement { .. } => "click_element",
            Self::ScrollTo { .. } => "scroll_to",
            Self::GetElementInfo { .. } => "get_element_info",
            Self::ClearAll {} => "clear_all",
            Self::Navigate { .. } => "navigate",
            Self::Capture { .. } => "capture",
            Self::GetDom { .. } => "get_dom",
            Self::Clear { .. } => "clear",
            Self::ClearElement {} => "clear_element",
            Self::Animate { .. } => "animate",
            Self::Other { action, .. } => action,
        }
    }

    /// Which consumer should receive this command.
    pub fn surface(&self) -> Surface {
        match self {
            Self::Draw { .. }
            | Self::Arrow { .. }
            | Self::Circle { .. }
            | Self::Rectangle { .. }
            | Self::Text { .. }
            | Self::Animate { .. }
            | Self::Clear { .. }
            | Self::ClearElement {} => Surface::Overlay,
            Self::Highlight { .. }
            | Self::Unhighlight { .. }
            | Self::Hide { .. }
            | Self::Show { .. }
            | Self::ModifyStyle { .. }
            | Self::ModifyText { .. }
            | Self::ModifyAttribute { .. }
            | Self::InjectElement { .. }
            | Self::RemoveElement { .. }
            | Self::ClickElement { .. }
            | Self::ScrollTo { .. }
            | Self::GetElementInfo { .. }
            | Self::ClearAll {} => Surface::Dom,
            Self::Navigate { .. } | Self::Capture { .. } | Self::GetDom { .. } => Surface::Shell,
            Self::Other { action, .. } => surface_for_action(action),
        }
    }

    /// Commands whose consumer must report a result back.
    pub fn is_informational(&self) -> bool {
        match self {
            Self::ClickElement { .. } | Self::GetElementInfo { .. } => true,
            Self::Other { action, .. } => {
                matches!(action.as_str(), "click_element" | "get_element_info")
            }
            _ => false,
        }
    }

    /// The CSS selector targeted by a DOM command, if any.
    pub fn selector(&self) -> Option<&str> {
        match self {
            Self::Highlight { selector, .. }
            | Self::Unhighlight { selector }
            | Self::Hide { selector }
            | Self::Show { selector }
            | Self::ModifyStyle { selector, .. }
            | Self::ModifyText { selector, .. }
            | Self::ModifyAttribute { selector, .. }
            | Self::InjectElement { selector, .. }
            | Self::RemoveElement { selector }
            | Self::ClickElement { selector }
            | Self::ScrollTo { selector, .. }
            | Self::GetElementInfo { selector } => Some(selector),
            Self::Other { fields, .. } => fields.get("selector").and_then(Value::as_str),
            _ => None,
        }
    }
}

/// Surface for an action name, used for payloads kept as raw fields.
pub fn surface_for_action(action: &str) -> Surface {
    match action {
        "draw" | "arrow" | "circle" | "rectangle" | "text" | "animate" | "clear"
        | "clear_element" => Surface::Overlay,
        "highlight" | "unhighlight" | "hide" | "show" | "modify_style" | "modify_text"
        | "modify_attribute" | "inject_element" | "remove_element" | "click_element"
        | "scroll_to" | "get_element_info" | "clear_all" => Surface::Dom,
        "navigate" | "capture" | "get_dom" => Surface::Shell,
        _ => Surface::Any,
    }
}

/// Structural equality: same object keys and array lengths all the way down.
/// Scalars are not compared, so `2` and `2.0` are the same shape; the wire
/// form is kept by [`Command`](super::Command), not rebuilt from the body.
fn same_shape(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Object(a), Value::Object(b)) => {
            a.len() == b.len()
                && a
                    .iter()
                    .all(|(key, va)| b.get(key).is_some_and(|vb| same_shape(va, vb)))
        }
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| same_shape(x, y))
        }
        (Value::Object(_), _) | (_, Value::Object(_)) => false,
        (Value::Array(_), _) | (_, Value::Array(_)) => false,
        (Value::Null, other) | (other, Value::Null) => other.is_null(),
        _ => true,
    }
}

#[cfg(test)]
#[path = "body_tests.rs"]
mod tests;
