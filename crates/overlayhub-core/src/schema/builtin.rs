//! Built-in command catalog.

use serde_json::json;

use overlayhub_protocols::schema::{CommandSchema, ParamFormat, ParamSpec};

const ACCENT: &str = "#ff4081";
const ACCENT_FILL: &str = "rgba(255, 64, 129, 0.2)";

fn id() -> ParamSpec {
    ParamSpec::string().with_description("Stable id; redrawing the same id replaces it")
}

fn selector() -> ParamSpec {
    ParamSpec::string().required()
}

fn dom(description: &str) -> CommandSchema {
    CommandSchema::new(description)
        .param("selector", selector())
        .param("id", id())
}

/// Every action the overlay, DOM and shell surfaces understand out of the box.
pub fn catalog() -> Vec<(&'static str, CommandSchema)> {
    vec![
        (
            "draw",
            CommandSchema::new("Custom drawing handed to the overlay as-is")
                .param("type", ParamSpec::string().required().one_of(["custom"]))
                .param("data", ParamSpec::object().required())
                .param("id", id()),
        ),
        (
            "arrow",
            CommandSchema::new("Arrow between two points")
                .param("from", ParamSpec::point().required())
                .param("to", ParamSpec::point().required())
                .param("color", ParamSpec::string().with_default(ACCENT))
                .param("width", ParamSpec::number().with_default(2))
                .param(
                    "style",
                    ParamSpec::string()
                        .one_of(["solid", "dashed"])
                        .with_default("solid"),
                )
                .param("animated", ParamSpec::boolean().with_default(false))
                .param("id", id())
                .with_example(json!({"action": "arrow", "from": [100, 100], "to": [300, 200]})),
        ),
        (
            "circle",
            CommandSchema::new("Circle around a point")
                .param("center", ParamSpec::point().required())
                .param("radius", ParamSpec::number().required().with_min(1.0))
                .param("color", ParamSpec::string().with_default(ACCENT))
                .param("fill", ParamSpec::boolean().with_default(false))
                .param("fillColor", ParamSpec::string().with_default(ACCENT_FILL))
                .param("width", ParamSpec::number().with_default(2))
                .param("id", id())
                .with_example(json!({"action": "circle", "center": [200, 150], "radius": 50})),
        ),
        (
            "rectangle",
            CommandSchema::new("Rectangle, optionally filled")
                .param("x", ParamSpec::number().required())
                .param("y", ParamSpec::number().required())
                .param("width", ParamSpec::number().required().with_min(1.0))
                .param("height", ParamSpec::number().required().with_min(1.0))
                .param("color", ParamSpec::string().with_default(ACCENT))
                .param("fill", ParamSpec::boolean().with_default(false))
                .param("fillColor", ParamSpec::string().with_default(ACCENT_FILL))
                .param("borderRadius", ParamSpec::number().with_default(0))
                .param("id", id()),
        ),
        (
            "text",
            CommandSchema::new("Text label at a point")
                .param("text", ParamSpec::string().required().with_max_length(200))
                .param("position", ParamSpec::point().required())
                .param("color", ParamSpec::string().with_default("#ffffff"))
                .param(
                    "fontSize",
                    ParamSpec::number()
                        .with_min(8.0)
                        .with_max(72.0)
                        .with_default(16),
                )
                .param("fontFamily", ParamSpec::string().with_default("Arial, sans-serif"))
                .param(
                    "backgroundColor",
                    ParamSpec::string().with_default("rgba(33, 33, 33, 0.9)"),
                )
                .param("padding", ParamSpec::number().with_default(8))
                .param("borderRadius", ParamSpec::number().with_default(4))
                .param("id", id())
                .with_example(json!({"action": "text", "text": "Sign in here", "position": [100, 50]})),
        ),
        (
            "highlight",
            dom("Outline elements matching a selector")
                .param("style", ParamSpec::object())
                .param("options", ParamSpec::object()),
        ),
        ("unhighlight", dom("Remove a highlight")),
        ("hide", dom("Hide matching elements")),
        ("show", dom("Show previously hidden elements")),
        (
            "modify_style",
            dom("Apply inline styles").param("styles", ParamSpec::object().required()),
        ),
        (
            "modify_text",
            dom("Replace the text content").param("text", ParamSpec::string().required()),
        ),
        (
            "modify_attribute",
            dom("Set an attribute")
                .param("attribute", ParamSpec::string().required())
                .param("value", ParamSpec::string().required()),
        ),
        (
            "inject_element",
            dom("Insert a new element relative to the match")
                .param(
                    "element",
                    ParamSpec::object()
                        .required()
                        .with_property("tag", ParamSpec::string().required())
                        .with_property("attributes", ParamSpec::object())
                        .with_property("style", ParamSpec::object())
                        .with_property("html", ParamSpec::string())
                        .with_property("text", ParamSpec::string()),
                )
                .param(
                    "position",
                    ParamSpec::string()
                        .one_of(["beforebegin", "afterbegin", "beforeend", "afterend"])
                        .with_default("beforeend"),
                ),
        ),
        ("remove_element", dom("Remove matching elements")),
        ("click_element", dom("Click the first match and report the result")),
        (
            "scroll_to",
            dom("Scroll the first match into view").param(
                "options",
                ParamSpec::object()
                    .with_property(
                        "behavior",
                        ParamSpec::string()
                            .one_of(["smooth", "auto"])
                            .with_default("smooth"),
                    )
                    .with_property(
                        "block",
                        ParamSpec::string()
                            .one_of(["start", "center", "end", "nearest"])
                            .with_default("center"),
                    )
                    .with_property(
                        "highlightAfterScroll",
                        ParamSpec::boolean().with_default(false),
                    )
                    .with_property("scrollDelay", ParamSpec::number().with_default(1000))
                    .with_property("highlightDuration", ParamSpec::number().with_default(3000)),
            ),
        ),
        ("get_element_info", dom("Report position and attributes of the first match")),
        (
            "clear_all",
            CommandSchema::new("Undo every DOM manipulation").param("id", id()),
        ),
        (
            "navigate",
            CommandSchema::new("Load a URL in the browser")
                .param(
                    "url",
                    ParamSpec::string().required().with_format(ParamFormat::Url),
                )
                .param("id", id()),
        ),
        (
            "capture",
            CommandSchema::new("Take a screenshot")
                .param(
                    "format",
                    ParamSpec::string().one_of(["png", "jpeg"]).with_default("png"),
                )
                .param(
                    "quality",
                    ParamSpec::number()
                        .with_min(0.1)
                        .with_max(1.0)
                        .with_default(0.9),
                )
                .param("id", id()),
        ),
        (
            "get_dom",
            CommandSchema::new("Send back a DOM snapshot")
                .param("includeText", ParamSpec::boolean().with_default(true))
                .param("includeStyles", ParamSpec::boolean().with_default(false))
                .param("maxDepth", ParamSpec::number().with_default(10))
                .param("id", id()),
        ),
        (
            "clear",
            CommandSchema::new("Clear the overlay, the DOM changes, or both")
                .param(
                    "type",
                    ParamSpec::string()
                        .one_of(["overlay", "dom", "all"])
                        .with_default("all"),
                )
                .param("id", id()),
        ),
        (
            "clear_element",
            CommandSchema::new("Remove one overlay element by id")
                .param("id", ParamSpec::string().required()),
        ),
        (
            "animate",
            CommandSchema::new("Animate an overlay element")
                .param(
                    "animationType",
                    ParamSpec::string()
                        .required()
                        .one_of(["pulse", "fade", "slide", "bounce"]),
                )
                .param("target", ParamSpec::string().required())
                .param("duration", ParamSpec::number().with_default(1000))
                .param("iterations", ParamSpec::number().with_default(1))
                .param("easing", ParamSpec::string().with_default("ease-in-out"))
                .param("id", id()),
        ),
    ]
}
