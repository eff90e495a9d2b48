use super::*;
use serde_json::json;
use crate::Command;

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

#[test]
fn test_arrow_parses_typed() {
    let body = CommandBody::from_fields(fields(json!({
        "action": "arrow",
        "from": [0, 0],
        "to": [10, 10],
        "color": "#ff4081",
        "width": 2,
        "style": "solid",
        "animated": false
    })));
    match &body {
        CommandBody::Arrow { from, to, style, width, .. } => {
            assert_eq!(*from, [0.0, 0.0]);
            assert_eq!(*to, [10.0, 10.0]);
            assert_eq!(*style, LineStyle::Solid);
            assert_eq!(*width, 2.0);
        }
        other => panic!("expected arrow, got {:?}", other),
    }
    assert_eq!(body.action(), "arrow");
    assert_eq!(body.surface(), Surface::Overlay);
}

#[test]
fn test_circle_camel_case_fields() {
    let body = CommandBody::from_fields(fields(json!({
        "action": "circle",
        "center": [5, 5],
        "radius": 3,
        "color": "#fff",
        "fill": true,
        "fillColor": "rgba(255, 64, 129, 0.2)",
        "width": 2
    })));
    assert!(matches!(body, CommandBody::Circle { fill: true, .. }));
    let wire = body.to_fields();
    assert_eq!(wire["fillColor"], "rgba(255, 64, 129, 0.2)");
    assert_eq!(wire["action"], "circle");
}

#[test]
fn test_unknown_action_is_other() {
    let body = CommandBody::from_fields(fields(json!({
        "action": "sparkle",
        "intensity": 11
    })));
    match &body {
        CommandBody::Other { action, fields } => {
            assert_eq!(action, "sparkle");
            assert_eq!(fields["intensity"], 11);
            assert!(!fields.contains_key("action"));
        }
        other => panic!("expected other, got {:?}", other),
    }
    assert_eq!(body.surface(), Surface::Any);
    assert_eq!(body.to_fields()["action"], "sparkle");
}

#[test]
fn test_extra_field_on_known_action_is_preserved() {
    let body = CommandBody::from_fields(fields(json!({
        "action": "hide",
        "selector": ".ad",
        "reason": "noise"
    })));
    assert!(matches!(body, CommandBody::Other { .. }));
    assert_eq!(body.action(), "hide");
    assert_eq!(body.surface(), Surface::Dom);
    assert_eq!(body.to_fields()["reason"], "noise");
}

#[test]
fn test_missing_required_field_falls_back() {
    let body = CommandBody::from_fields(fields(json!({"action": "navigate"})));
    assert!(matches!(body, CommandBody::Other { .. }));
    assert_eq!(body.surface(), Surface::Shell);
}

#[test]
fn test_empty_variants() {
    let body = CommandBody::from_fields(fields(json!({"action": "clear_all"})));
    assert_eq!(body, CommandBody::ClearAll {});
    assert_eq!(body.to_fields(), fields(json!({"action": "clear_all"})));

    let body = CommandBody::from_fields(fields(json!({"action": "clear_element"})));
    assert_eq!(body, CommandBody::ClearElement {});
    assert_eq!(body.surface(), Surface::Overlay);
}

#[test]
fn test_scroll_options_nested() {
    let body = CommandBody::from_fields(fields(json!({
        "action": "scroll_to",
        "selector": "#footer",
        "options": {
            "behavior": "smooth",
            "block": "center",
            "highlightAfterScroll": false,
            "scrollDelay": 1000,
            "highlightDuration": 3000
        }
    })));
    match body {
        CommandBody::ScrollTo { options: Some(options), .. } => {
            assert_eq!(options.block, ScrollBlock::Center);
            assert_eq!(options.scroll_delay, 1000.0);
        }
        other => panic!("expected scroll_to, got {:?}", other),
    }
}

#[test]
fn test_informational_actions() {
    let click = CommandBody::from_fields(fields(json!({
        "action": "click_element",
        "selector": "button"
    })));
    assert!(click.is_informational());
    assert_eq!(click.selector(), Some("button"));

    let hide = CommandBody::from_fields(fields(json!({"action": "hide", "selector": "p"})));
    assert!(!hide.is_informational());
}

#[test]
fn test_get_dom_and_clear_wire_names() {
    let body = CommandBody::from_fields(fields(json!({
        "action": "get_dom",
        "includeText": true,
        "includeStyles": false,
        "maxDepth": 10
    })));
    assert!(matches!(body, CommandBody::GetDom { max_depth: 10, .. }));

    let body = CommandBody::from_fields(fields(json!({"action": "clear", "type": "overlay"})));
    assert_eq!(body, CommandBody::Clear { scope: ClearScope::Overlay });
    assert_eq!(body.to_fields()["type"], "overlay");
}

#[test]
fn test_surface_for_action() {
    assert_eq!(surface_for_action("rectangle"), Surface::Overlay);
    assert_eq!(surface_for_action("modify_attribute"), Surface::Dom);
    assert_eq!(surface_for_action("capture"), Surface::Shell);
    assert_eq!(surface_for_action("teleport"), Surface::Any);
}

#[test]
fn test_command_round_trip_keeps_identity() {
    let command = Command::from_fields(fields(json!({
        "action": "navigate",
        "url": "https://example.com",
        "id": "cmd_1_abc",
        "timestamp": 1700000000000_i64
    })))
    .unwrap();
    assert_eq!(command.id, "cmd_1_abc");
    assert_eq!(command.timestamp, 1_700_000_000_000);
    assert_eq!(command.action(), "navigate");

    let text = serde_json::to_string(&command).unwrap();
    let back: Command = serde_json::from_str(&text).unwrap();
    assert_eq!(back, command);
}

#[test]
fn test_command_requires_identity() {
    assert!(Command::from_fields(fields(json!({"action": "clear_all"}))).is_none());
    let err = serde_json::from_value::<Command>(json!({"id": "x", "timestamp": 1}));
    assert!(err.is_err());
}

#[test]
fn test_command_wire_keeps_integers() {
    let command = Command::from_fields(fields(json!({
        "action": "arrow",
        "from": [0, 0],
        "to": [10, 10],
        "color": "#ff4081",
        "width": 2,
        "style": "solid",
        "animated": false,
        "id": "cmd_1_abc",
        "timestamp": 1
    })))
    .unwrap();
    assert!(matches!(command.body(), CommandBody::Arrow { width, .. } if *width == 2.0));

    let wire = command.to_value();
    assert_eq!(wire["width"], json!(2));
    assert_eq!(wire["from"], json!([0, 0]));
    assert_eq!(wire["to"], json!([10, 10]));
}
