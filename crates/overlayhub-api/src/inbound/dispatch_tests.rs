use super::*;
use overlayhub_protocols::error::HookError;
use overlayhub_protocols::hook::{names, FnListener};
use parking_lot::Mutex;
use tokio::sync::mpsc;

fn peer(state: &AppState, id: &str, role: Option<PeerRole>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(64);
    state.hub.register(id, tx);
    if let Some(role) = role {
        state.hub.classify(id, role);
    }
    rx
}

fn drain(rx: &mut mpsc::Receiver<String>) -> Vec<Value> {
    let mut out = Vec::new();
    while let Ok(text) = rx.try_recv() {
        out.push(serde_json::from_str(&text).unwrap());
    }
    out
}

fn of_type(messages: &[Value], message_type: &str) -> Option<Value> {
    messages.iter().find(|m| m["type"] == message_type).cloned()
}

fn capture(state: &AppState, hook: &str) -> Arc<Mutex<Vec<Value>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    state.hooks.add_listener(
        hook,
        Arc::new(FnListener::new(move |data: Value| {
            let sink = sink.clone();
            async move {
                sink.lock().push(data);
                Ok::<_, HookError>(None)
            }
        })),
        10,
    );
    seen
}

#[tokio::test]
async fn test_invalid_json_answered_with_error() {
    let state = AppState::default();
    let mut rx = peer(&state, "p", None);
    let errors = capture(&state, names::ERROR_OCCURRED);

    dispatch(&state, "p", "{not json").await;
    dispatch(&state, "p", "[1, 2]").await;
    dispatch(&state, "p", r#"{"hello": "world"}"#).await;

    let replies = drain(&mut rx);
    assert_eq!(replies.len(), 3);
    assert!(replies.iter().all(|r| r["type"] == "error" && r["code"] == "INVALID_MESSAGE"));
    assert_eq!(errors.lock().len(), 3);
}

#[tokio::test]
async fn test_identification_classifies_once() {
    let state = AppState::default();
    let _rx = peer(&state, "p", None);

    dispatch(&state, "p", r#"{"type": "control_ready"}"#).await;
    assert_eq!(state.hub.role("p"), Some(PeerRole::Control));

    dispatch(&state, "p", r#"{"type": "browser_ready"}"#).await;
    assert_eq!(state.hub.role("p"), Some(PeerRole::Control));
    assert!(!state.hub.has_primary());
}

#[tokio::test]
async fn test_browser_ready_notifies_control() {
    let state = AppState::default();
    let mut control = peer(&state, "control", Some(PeerRole::Control));
    let mut other = peer(&state, "other", None);
    let _browser = peer(&state, "browser", None);

    dispatch(
        &state,
        "browser",
        r#"{"type": "browser_ready", "config": {"width": 1200}}"#,
    )
    .await;

    assert_eq!(state.hub.primary().as_deref(), Some("browser"));
    let notices = drain(&mut control);
    let connected = of_type(&notices, "browser_connected").unwrap();
    assert_eq!(connected["info"]["width"], 1200);
    assert!(drain(&mut other).is_empty());
}

#[tokio::test]
async fn test_unidentified_command_rejected() {
    let state = AppState::default();
    let mut rx = peer(&state, "p", None);

    dispatch(&state, "p", r#"{"action": "clear"}"#).await;

    let replies = drain(&mut rx);
    assert_eq!(replies[0]["type"], "error");
    assert_eq!(replies[0]["code"], "NOT_IDENTIFIED");
    assert!(state.processor.history().is_empty());
}

#[tokio::test]
async fn test_unidentified_command_allowed_when_configured() {
    let mut state = AppState::default();
    state.settings.require_identification = false;
    let mut rx = peer(&state, "p", None);

    dispatch(&state, "p", r#"{"action": "clear"}"#).await;

    let replies = drain(&mut rx);
    assert_eq!(replies[0]["type"], "command_accepted");
    assert_eq!(state.processor.history().len(), 1);
}

#[tokio::test]
async fn test_identified_command_accepted_and_routed() {
    let state = AppState::default();
    let mut agent = peer(&state, "agent", Some(PeerRole::Agent));
    let mut browser = peer(&state, "browser", Some(PeerRole::Browser));

    dispatch(
        &state,
        "agent",
        r#"{"action": "arrow", "from": [0, 0], "to": [10, 10]}"#,
    )
    .await;

    let reply = drain(&mut agent).remove(0);
    assert_eq!(reply["type"], "command_accepted");
    assert_eq!(reply["action"], "arrow");
    assert_eq!(reply["delivery"]["status"], "primary_surface");

    let delivered = drain(&mut browser).remove(0);
    assert_eq!(delivered["id"], reply["id"]);
    assert_eq!(delivered["style"], "solid");

    let history = state.processor.history().recent(1);
    assert_eq!(history[0].context.source, "agent");
    assert_eq!(history[0].context.role, Some(PeerRole::Agent));
}

#[tokio::test]
async fn test_invalid_command_rejected_with_errors() {
    let state = AppState::default();
    let mut agent = peer(&state, "agent", Some(PeerRole::Agent));

    dispatch(
        &state,
        "agent",
        r#"{"action": "circle", "center": [10, 10], "radius": 0}"#,
    )
    .await;

    let reply = drain(&mut agent).remove(0);
    assert_eq!(reply["type"], "command_rejected");
    assert_eq!(reply["code"], "VALIDATION_ERROR");
    assert!(reply["errors"][0].as_str().unwrap().contains("radius"));
}

#[tokio::test]
async fn test_ping_pong() {
    let state = AppState::default();
    let mut rx = peer(&state, "p", None);

    dispatch(&state, "p", r#"{"type": "ping", "timestamp": 1234}"#).await;
    assert_eq!(drain(&mut rx), vec![json!({"type": "pong", "timestamp": 1234})]);

    dispatch(&state, "p", r#"{"type": "ping"}"#).await;
    assert!(drain(&mut rx)[0]["timestamp"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn test_unknown_type_ignored() {
    let state = AppState::default();
    let mut rx = peer(&state, "p", None);
    let errors = capture(&state, names::ERROR_OCCURRED);

    dispatch(&state, "p", r#"{"type": "weather_report"}"#).await;
    assert!(drain(&mut rx).is_empty());
    assert!(errors.lock().is_empty());
}

#[tokio::test]
async fn test_activity_recorded() {
    let state = AppState::default();
    let _rx = peer(&state, "p", None);
    let before = state.hub.peer("p").unwrap().last_activity;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;

    dispatch(&state, "p", r#"{"type": "weather_report"}"#).await;
    assert!(state.hub.peer("p").unwrap().last_activity > before);
}

#[tokio::test]
async fn test_screenshot_draws_and_reports() {
    let state = AppState::default();
    let mut browser = peer(&state, "browser", Some(PeerRole::Browser));
    let mut control = peer(&state, "control", Some(PeerRole::Control));
    let taken = capture(&state, names::SCREENSHOT_TAKEN);
    let completed = capture(&state, names::ANALYSIS_COMPLETE);

    dispatch(
        &state,
        "browser",
        r#"{"type": "screenshot", "data": "iVBORw0KGgo=", "url": "https://example.com", "timestamp": 99}"#,
    )
    .await;

    assert_eq!(taken.lock().len(), 1);
    assert_eq!(completed.lock()[0]["source"], "screenshot");

    let drawn = drain(&mut browser);
    assert!(drawn.iter().any(|c| c["action"] == "rectangle"));
    assert!(drawn.iter().any(|c| c["text"] == "AI Analysis"));

    let report = of_type(&drain(&mut control), "screenshot_analysis").unwrap();
    assert_eq!(report["url"], "https://example.com");
    assert_eq!(report["timestamp"], 99);
    assert_eq!(report["analysis"]["accessibility"]["score"], 7.5);
    assert!(state.cached_analysis("https://example.com").is_some());
}

#[tokio::test]
async fn test_screenshot_without_data_is_an_error() {
    let state = AppState::default();
    let mut rx = peer(&state, "browser", Some(PeerRole::Browser));

    dispatch(&state, "browser", r#"{"type": "screenshot"}"#).await;
    let replies = drain(&mut rx);
    assert_eq!(replies[0]["type"], "error");
    assert_eq!(replies[0]["code"], "INVALID_MESSAGE");
}

#[tokio::test]
async fn test_dom_data_highlights_and_reports() {
    let state = AppState::default();
    let mut browser = peer(&state, "browser", Some(PeerRole::Browser));
    let mut control = peer(&state, "control", Some(PeerRole::Control));
    let ready = capture(&state, names::DOM_READY);

    let message = json!({
        "type": "dom_data",
        "data": {
            "title": "Shop",
            "url": "https://shop.example",
            "elements": [
                {"tagName": "BUTTON", "text": "Get started", "id": "start"},
                {"tagName": "FORM", "text": ""},
                {"tagName": "IMG", "text": ""},
                {"tagName": "H1", "text": "Welcome"}
            ],
            "textContent": "Welcome Get started"
        }
    });
    dispatch(&state, "browser", &message.to_string()).await;

    let dom_ready = ready.lock()[0].clone();
    assert_eq!(dom_ready["formCount"], 1);
    assert_eq!(dom_ready["headingCount"], 1);
    assert_eq!(dom_ready["imagesWithoutAlt"], 1);

    let drawn = drain(&mut browser);
    assert!(drawn.iter().any(|c| c["action"] == "highlight" && c["selector"] == "#start"));

    let report = of_type(&drain(&mut control), "dom_analysis").unwrap();
    assert_eq!(report["url"], "https://shop.example");
    assert_eq!(report["interestingElements"][0]["confidence"], 0.9);
}

#[tokio::test]
async fn test_page_navigated_broadcasts_and_clears_cache() {
    let state = AppState::default();
    let _browser = peer(&state, "browser", Some(PeerRole::Browser));
    let mut stranger = peer(&state, "stranger", None);
    let loads = capture(&state, names::PAGE_LOAD);
    state.cache_analysis(
        "https://old.example",
        overlayhub_analysis::MockProvider::sample_analysis(),
    );

    dispatch(
        &state,
        "browser",
        r#"{"type": "page_navigated", "url": "https://new.example", "timestamp": 7}"#,
    )
    .await;

    assert_eq!(loads.lock()[0]["url"], "https://new.example");
    assert!(loads.lock()[0].get("type").is_none());
    assert!(state.cached_analysis("https://old.example").is_none());
    assert_eq!(
        drain(&mut stranger),
        vec![json!({"type": "page_navigated", "url": "https://new.example", "timestamp": 7})]
    );
}

#[tokio::test]
async fn test_request_analysis_replies() {
    let state = AppState::default();
    let mut rx = peer(&state, "control", Some(PeerRole::Control));

    dispatch(
        &state,
        "control",
        r#"{"type": "request_analysis", "kind": "text", "data": "rust async book", "requestId": "r1"}"#,
    )
    .await;
    let reply = drain(&mut rx).remove(0);
    assert_eq!(reply["type"], "analysis_result");
    assert_eq!(reply["request_id"], "r1");
    assert_eq!(reply["analysis"]["wordCount"], 3);

    dispatch(
        &state,
        "control",
        r#"{"type": "request_analysis", "kind": "smell", "request_id": "r2"}"#,
    )
    .await;
    let reply = drain(&mut rx).remove(0);
    assert_eq!(reply["type"], "analysis_error");
    assert_eq!(reply["request_id"], "r2");
    assert!(reply["error"].as_str().unwrap().contains("smell"));
}

#[tokio::test]
async fn test_request_analysis_screenshot_and_dom() {
    let state = AppState::default();
    let mut rx = peer(&state, "control", Some(PeerRole::Control));

    dispatch(
        &state,
        "control",
        r#"{"type": "request_analysis", "kind": "screenshot", "data": "AAAA", "request_id": 1}"#,
    )
    .await;
    let reply = drain(&mut rx).remove(0);
    assert_eq!(reply["type"], "analysis_result");
    assert_eq!(reply["analysis"]["suggestions"].as_array().unwrap().len(), 3);

    dispatch(
        &state,
        "control",
        r#"{"type": "request_analysis", "kind": "dom", "data": {"title": "T", "elements": []}}"#,
    )
    .await;
    let reply = drain(&mut rx).remove(0);
    assert_eq!(reply["analysis"]["structure"]["title"], "T");
    assert!(reply["request_id"].is_null());
}

#[tokio::test]
async fn test_voice_command_processed() {
    let state = AppState::default();
    let mut control = peer(&state, "control", Some(PeerRole::Control));
    let mut browser = peer(&state, "browser", Some(PeerRole::Browser));

    dispatch(
        &state,
        "control",
        r#"{"type": "voice_command", "command": "search rust async book"}"#,
    )
    .await;

    let reply = drain(&mut control).remove(0);
    assert_eq!(reply["type"], "voice_command_processed");
    assert_eq!(reply["original"], "search rust async book");
    assert_eq!(reply["processed"]["action"], "navigate");
    assert!(reply["processed"]["id"].is_string());

    let navigated = drain(&mut browser).remove(0);
    assert_eq!(navigated["action"], "navigate");
}

#[tokio::test]
async fn test_voice_command_without_transcript() {
    let state = AppState::default();
    let mut rx = peer(&state, "control", Some(PeerRole::Control));

    dispatch(&state, "control", r#"{"type": "voice_command"}"#).await;
    assert_eq!(drain(&mut rx)[0]["type"], "voice_command_error");
}

#[tokio::test]
async fn test_dom_report_forwarded_to_control() {
    let state = AppState::default();
    let mut control = peer(&state, "control", Some(PeerRole::Control));
    let _browser = peer(&state, "browser", Some(PeerRole::Browser));
    let manipulations = capture(&state, names::DOM_MANIPULATION);

    let report = json!({"type": "element_clicked", "selector": "#buy", "result": {"ok": true}});
    dispatch(&state, "browser", &report.to_string()).await;

    assert_eq!(drain(&mut control), vec![report]);
    assert_eq!(manipulations.lock()[0]["peer"], "browser");
}

#[tokio::test]
async fn test_custom_handler() {
    struct Echo;

    #[async_trait]
    impl MessageHandler for Echo {
        async fn handle(
            &self,
            state: &AppState,
            peer: &str,
            message: Value,
        ) -> Result<(), HubError> {
            state.hub.send(peer, &json!({"type": "echo", "body": message["body"]}));
            Ok(())
        }
    }

    struct Broken;

    #[async_trait]
    impl MessageHandler for Broken {
        async fn handle(
            &self,
            _state: &AppState,
            _peer: &str,
            _message: Value,
        ) -> Result<(), HubError> {
            Err(HubError::Handler("out of cheese".into()))
        }
    }

    let state = AppState::default();
    state.handlers.register("echo", Arc::new(Echo));
    state.handlers.register("broken", Arc::new(Broken));
    assert!(state.handlers.types().contains(&"echo".to_string()));
    let mut rx = peer(&state, "p", None);

    dispatch(&state, "p", r#"{"type": "echo", "body": 5}"#).await;
    dispatch(&state, "p", r#"{"type": "broken"}"#).await;

    let replies = drain(&mut rx);
    assert_eq!(replies[0], json!({"type": "echo", "body": 5}));
    assert_eq!(replies[1]["code"], "HANDLER_ERROR");
}
