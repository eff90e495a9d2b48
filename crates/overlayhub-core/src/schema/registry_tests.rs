use super::*;
use serde_json::json;

fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected object"),
    }
}

fn registry() -> SchemaRegistry {
    SchemaRegistry::with_builtin_catalog()
}

#[test]
fn test_builtin_catalog_loaded() {
    let registry = registry();
    for action in [
        "draw", "arrow", "circle", "rectangle", "text", "highlight", "unhighlight", "hide",
        "show", "modify_style", "modify_text", "modify_attribute", "inject_element",
        "remove_element", "click_element", "scroll_to", "get_element_info", "clear_all",
        "navigate", "capture", "get_dom", "clear", "clear_element", "animate",
    ] {
        assert!(registry.contains(action), "missing builtin schema {}", action);
    }
    assert!(SchemaRegistry::new().list().is_empty());
}

#[test]
fn test_builtin_catalog_passes_sanity_check() {
    for (name, schema) in builtin::catalog() {
        assert!(schema.check(name).is_ok(), "builtin schema {} is malformed", name);
    }
}

#[test]
fn test_missing_required_field_names_it() {
    let registry = registry();
    let result = registry.validate(&fields(json!({"action": "circle", "radius": 5})));
    assert!(!result.valid);
    assert_eq!(result.errors, vec!["center is required"]);
}

#[test]
fn test_every_required_field_is_reported() {
    let registry = registry();
    for (name, schema) in builtin::catalog() {
        for (param, spec) in &schema.parameters {
            if !spec.required {
                continue;
            }
            let result = registry.validate(&fields(json!({"action": name})));
            assert!(!result.valid);
            assert!(
                result.errors.iter().any(|e| e.contains(param.as_str())),
                "{}: no error names {}",
                name,
                param
            );
        }
    }
}

#[test]
fn test_radius_minimum() {
    let registry = registry();
    let result = registry.validate(&fields(json!({
        "action": "circle",
        "center": [10, 10],
        "radius": 0
    })));
    assert!(!result.valid);
    assert_eq!(result.errors, vec!["radius must be at least 1"]);
}

#[test]
fn test_enum_inside_and_outside() {
    let registry = registry();
    let ok = registry.validate(&fields(json!({
        "action": "arrow", "from": [0, 0], "to": [1, 1], "style": "dashed"
    })));
    assert!(ok.valid, "{:?}", ok.errors);

    let bad = registry.validate(&fields(json!({
        "action": "arrow", "from": [0, 0], "to": [1, 1], "style": "dotted"
    })));
    assert!(!bad.valid);
    assert_eq!(bad.errors, vec!["style must be one of: solid, dashed"]);
}

#[test]
fn test_every_builtin_enum_rejects_outsiders() {
    let registry = registry();
    let mut checked = 0;
    for (name, schema) in builtin::catalog() {
        for (param, spec) in &schema.parameters {
            let Some(allowed) = &spec.allowed else { continue };
            let mut command = fields(json!({"action": name}));
            command.insert(param.clone(), json!("definitely-not-allowed"));
            let result = registry.validate(&command);
            assert!(
                result.errors.iter().any(|e| e.starts_with(&format!("{} must be one of", param))),
                "{}.{} accepted an outsider",
                name,
                param
            );

            command.insert(param.clone(), allowed[0].clone());
            let result = registry.validate(&command);
            assert!(
                !result.errors.iter().any(|e| e.starts_with(param.as_str())),
                "{}.{} rejected {:?}",
                name,
                param,
                allowed[0]
            );
            checked += 1;
        }
    }
    assert!(checked >= 5);
}

#[test]
fn test_unknown_action_is_permissive() {
    let registry = registry();
    let result = registry.validate(&fields(json!({"action": "sparkle", "color": "nope"})));
    assert!(result.valid);
    assert!(result.errors.is_empty());
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("sparkle"));
}

#[test]
fn test_missing_action() {
    let registry = registry();
    let result = registry.validate(&fields(json!({"selector": "#a"})));
    assert!(!result.valid);
    assert!(result.errors[0].contains("action"));

    let result = registry.validate(&fields(json!({"action": ""})));
    assert!(!result.valid);
}

#[test]
fn test_type_check_precedes_constraints() {
    let registry = registry();
    let result = registry.validate(&fields(json!({
        "action": "circle", "center": [0, 0], "radius": "big"
    })));
    assert_eq!(result.errors, vec!["radius must be of type number"]);
}

#[test]
fn test_all_fields_checked_without_short_circuit() {
    let registry = registry();
    let result = registry.validate(&fields(json!({
        "action": "text",
        "text": "x".repeat(201),
        "position": [1],
        "fontSize": 100
    })));
    assert_eq!(result.errors.len(), 3, "{:?}", result.errors);
    assert!(result.errors.contains(&"fontSize must be at most 72".to_string()));
    assert!(result.errors.contains(&"position must have exactly 2 elements".to_string()));
    assert!(result.errors.contains(&"text must not exceed 200 characters".to_string()));
}

#[test]
fn test_items_type_checked() {
    let registry = registry();
    let result = registry.validate(&fields(json!({
        "action": "arrow", "from": [0, "a"], "to": [1, 1]
    })));
    assert_eq!(result.errors, vec!["from elements must be of type number"]);
}

#[test]
fn test_url_format() {
    let registry = registry();
    let ok = registry.validate(&fields(
        json!({"action": "navigate", "url": "https://example.com"}),
    ));
    assert!(ok.valid);
    let bad = registry.validate(&fields(json!({"action": "navigate", "url": "example dot com"})));
    assert!(!bad.valid);
    assert!(bad.errors[0].starts_with("url: invalid URL"));
}

#[test]
fn test_fractional_bounds() {
    let registry = registry();
    let bad = registry.validate(&fields(json!({"action": "capture", "quality": 0.05})));
    assert_eq!(bad.errors, vec!["quality must be at least 0.1"]);
}

#[test]
fn test_cross_cutting_selector_and_color() {
    let registry = registry();
    let result = registry.validate(&fields(json!({"action": "hide", "selector": "div[["})));
    assert!(!result.valid);
    assert!(result.errors[0].starts_with("Invalid selector"));

    // color is not declared by navigate, but is still checked
    let result = registry.validate(&fields(json!({
        "action": "navigate", "url": "https://example.com", "color": "blue"
    })));
    assert!(!result.valid);
    assert!(result.errors[0].starts_with("Invalid color"));

    let result = registry.validate(&fields(json!({
        "action": "circle", "center": [0, 0], "radius": 4, "color": "rgba(1, 2, 3, 0.5)"
    })));
    assert!(result.valid);
}

#[test]
fn test_type_error_not_duplicated_by_cross_cutting() {
    let registry = registry();
    let result = registry.validate(&fields(json!({"action": "hide", "selector": 5})));
    assert_eq!(result.errors, vec!["selector must be of type string"]);
}

#[test]
fn test_nested_properties_validated() {
    let registry = registry();
    let result = registry.validate(&fields(json!({
        "action": "inject_element",
        "selector": "body",
        "element": {"html": "<b>hi</b>"}
    })));
    assert_eq!(result.errors, vec!["element.tag is required"]);

    let result = registry.validate(&fields(json!({
        "action": "scroll_to",
        "selector": "#footer",
        "options": {"block": "middle"}
    })));
    assert_eq!(
        result.errors,
        vec!["options.block must be one of: start, center, end, nearest"]
    );
}

#[test]
fn test_null_counts_as_absent() {
    let registry = registry();
    let result = registry.validate(&fields(json!({
        "action": "arrow", "from": [0, 0], "to": [1, 1], "color": null
    })));
    assert!(result.valid);
}

#[test]
fn test_apply_defaults() {
    let registry = registry();
    let mut command = fields(json!({"action": "arrow", "from": [0, 0], "to": [10, 10]}));
    registry.apply_defaults(&mut command);
    assert_eq!(command["color"], "#ff4081");
    assert_eq!(command["width"], 2);
    assert_eq!(command["style"], "solid");
    assert_eq!(command["animated"], false);
    assert!(!command.contains_key("id"));
}

#[test]
fn test_apply_defaults_keeps_given_values() {
    let registry = registry();
    let mut command = fields(json!({"action": "capture", "quality": 0.5}));
    registry.apply_defaults(&mut command);
    assert_eq!(command["quality"], 0.5);
    assert_eq!(command["format"], "png");
}

#[test]
fn test_apply_nested_defaults_only_when_parent_present() {
    let registry = registry();
    let mut without = fields(json!({"action": "scroll_to", "selector": "#a"}));
    registry.apply_defaults(&mut without);
    assert!(!without.contains_key("options"));

    let mut with = fields(
        json!({"action": "scroll_to", "selector": "#a", "options": {"block": "end"}}),
    );
    registry.apply_defaults(&mut with);
    assert_eq!(with["options"]["block"], "end");
    assert_eq!(with["options"]["behavior"], "smooth");
    assert_eq!(with["options"]["scrollDelay"], 1000);
}

#[test]
fn test_register_schema_replaces_and_returns_previous() {
    let registry = registry();
    let previous = registry
        .register_schema(
            "hide",
            CommandSchema::new("Hide with fade").param("selector", ParamSpec::string().required()),
        )
        .unwrap();
    assert!(previous.is_some());
    assert_eq!(registry.get_schema("hide").unwrap().description, "Hide with fade");

    registry.restore_schema("hide", previous.unwrap());
    assert_eq!(
        registry.get_schema("hide").unwrap().description,
        "Hide matching elements"
    );
}

#[test]
fn test_register_schema_rejects_malformed() {
    let registry = SchemaRegistry::new();
    let err = registry
        .register_schema(
            "bad",
            CommandSchema::new("x").param("n", ParamSpec::number().with_min(3.0).with_max(1.0)),
        )
        .unwrap_err();
    assert!(err.to_string().contains("bad"));
    assert!(!registry.contains("bad"));
}

#[test]
fn test_unregister_schema() {
    let registry = registry();
    assert!(registry.unregister_schema("animate").is_some());
    assert!(!registry.contains("animate"));
    assert!(registry.unregister_schema("animate").is_none());
    let result = registry.validate(&fields(json!({"action": "animate"})));
    assert!(result.valid);
    assert!(!result.warnings.is_empty());
}

#[test]
fn test_custom_validator_overrides_builtin() {
    let registry = registry();
    registry.register_validator("color", |value: &Value| match value.as_str() {
        Some("brand") => Ok(()),
        _ => Err("only the brand color is allowed".to_string()),
    });
    let result = registry.validate(&fields(json!({
        "action": "circle", "center": [0, 0], "radius": 3, "color": "#fff"
    })));
    assert_eq!(result.errors, vec!["Invalid color: only the brand color is allowed"]);
    assert!(registry.run_validator("no-such-validator", &json!(1)).is_ok());
}

#[test]
fn test_catalog_snapshot() {
    let registry = registry();
    let catalog = registry.catalog();
    assert_eq!(catalog.len(), registry.list().len());
    assert!(catalog["circle"].parameters["radius"].required);
}
