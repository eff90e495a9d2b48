use super::*;
use overlayhub_core::{ExtensionHost, HookDispatcher, MemoryStore, SchemaRegistry};
use overlayhub_protocols::extension::EmittedCommand;
use tokio::sync::mpsc;

async fn hosted(
    config: Value,
) -> (ExtensionHost, Arc<HookDispatcher>, mpsc::Receiver<EmittedCommand>) {
    let hooks = Arc::new(HookDispatcher::new());
    let host = ExtensionHost::new(
        hooks.clone(),
        Arc::new(SchemaRegistry::with_builtin_catalog()),
        Arc::new(MemoryStore::new()),
        16,
    );
    let outbox = host.take_outbox().unwrap();
    host.load(Box::new(AutomationExtension::new()), config)
        .await
        .unwrap();
    (host, hooks, outbox)
}

fn drain(outbox: &mut mpsc::Receiver<EmittedCommand>) -> Vec<Value> {
    let mut out = Vec::new();
    while let Ok(emitted) = outbox.try_recv() {
        out.push(emitted.command);
    }
    out
}

#[test]
fn test_default_config_enables_everything() {
    let config = AutomationConfig::default();
    assert_eq!(config.enabled().len(), 3);
    assert_eq!(
        AutomationExtension::new().default_config()["enabledAutomations"][1],
        "login_assistant"
    );
}

#[test]
fn test_unknown_automation_skipped() {
    let config = AutomationConfig {
        enabled_automations: vec!["form_filler".into(), "teleporter".into()],
    };
    assert_eq!(config.enabled(), HashSet::from([Automation::FormFiller]));
}

#[tokio::test]
async fn test_form_filler() {
    let (_host, hooks, mut outbox) = hosted(Value::Null).await;

    let data = json!({"url": "https://shop.example/checkout", "formCount": 2});
    assert_eq!(hooks.fire(names::DOM_READY, data.clone()).await, data);

    let emitted = drain(&mut outbox);
    assert_eq!(emitted.len(), 2);
    assert_eq!(emitted[0]["text"], "Forms detected");
    assert_eq!(emitted[1]["action"], "highlight");

    hooks.fire(names::DOM_READY, json!({"formCount": 0})).await;
    assert!(drain(&mut outbox).is_empty());
}

#[tokio::test]
async fn test_login_assistant() {
    let (_host, hooks, mut outbox) = hosted(Value::Null).await;

    hooks
        .fire(names::PAGE_LOAD, json!({"url": "https://example.com/signin"}))
        .await;
    let emitted = drain(&mut outbox);
    assert_eq!(emitted[0]["text"], "Login page detected");
    assert_eq!(emitted[0]["position"], json!([10, 150]));

    hooks
        .fire(names::PAGE_LOAD, json!({"url": "https://example.com/about"}))
        .await;
    hooks.fire(names::PAGE_LOAD, json!({"title": "no url"})).await;
    assert!(drain(&mut outbox).is_empty());
}

#[tokio::test]
async fn test_disabled_assistants() {
    let (host, hooks, mut outbox) =
        hosted(json!({"enabledAutomations": ["login_assistant"]})).await;

    hooks.fire(names::DOM_READY, json!({"formCount": 3})).await;
    assert!(drain(&mut outbox).is_empty());

    host.set_config("automation", json!({"enabledAutomations": ["form_filler"]}))
        .await
        .unwrap();
    let enabled = host
        .with_extension::<AutomationExtension, _>("automation", |ext| {
            (
                ext.is_enabled(Automation::FormFiller),
                ext.is_enabled(Automation::LoginAssistant),
            )
        })
        .await
        .unwrap();
    assert_eq!(enabled, (true, false));

    hooks.fire(names::DOM_READY, json!({"formCount": 3})).await;
    hooks
        .fire(names::PAGE_LOAD, json!({"url": "https://example.com/login"}))
        .await;
    let emitted = drain(&mut outbox);
    assert_eq!(emitted.len(), 2);
    assert_eq!(emitted[0]["text"], "Forms detected");
}
