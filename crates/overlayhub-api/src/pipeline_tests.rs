use super::*;
use overlayhub_protocols::error::HookError;
use overlayhub_protocols::hook::FnListener;
use overlayhub_protocols::peer::PeerRole;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

type Trail = Arc<Mutex<Vec<String>>>;

fn record(state: &AppState, hook: &'static str, trail: &Trail) {
    let trail = trail.clone();
    state.hooks.add_listener(
        hook,
        Arc::new(FnListener::new(move |_data: Value| {
            let trail = trail.clone();
            async move {
                trail.lock().push(hook.to_string());
                Ok::<_, HookError>(None)
            }
        })),
        10,
    );
}

fn record_all(state: &AppState) -> Trail {
    let trail = Trail::default();
    for hook in [
        names::COMMAND_RECEIVED,
        names::OVERLAY_DRAW,
        names::DOM_MANIPULATION,
        names::COMMAND_EXECUTED,
        names::ERROR_OCCURRED,
    ] {
        record(state, hook, &trail);
    }
    trail
}

fn overlay_peer(state: &AppState) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    state.hub.register("overlay", tx);
    state.hub.classify("overlay", PeerRole::Overlay);
    rx
}

fn ctx() -> CommandContext {
    CommandContext::new("client_test").with_role(PeerRole::Agent)
}

#[tokio::test]
async fn test_accepted_command_is_routed_and_hooked() {
    let state = AppState::default();
    let trail = record_all(&state);
    let mut overlay = overlay_peer(&state);

    let accepted = submit_command(
        &state,
        json!({"action": "arrow", "from": [0, 0], "to": [10, 10]}),
        &ctx(),
    )
    .await
    .unwrap();

    assert_eq!(accepted.command.action(), "arrow");
    assert!(accepted.delivery.is_delivered());
    assert_eq!(
        *trail.lock(),
        vec!["command_received", "overlay_draw", "command_executed"]
    );

    let sent: Value = serde_json::from_str(&overlay.try_recv().unwrap()).unwrap();
    assert_eq!(sent["action"], "arrow");
    assert_eq!(sent["color"], "#ff4081");
    assert_eq!(sent["id"], accepted.command.id.as_str());

    let reply = accepted.to_reply();
    assert_eq!(reply["type"], "command_accepted");
    assert_eq!(reply["delivery"]["status"], "delivered");
}

#[tokio::test]
async fn test_rejected_command_reports_error() {
    let state = AppState::default();
    let trail = record_all(&state);

    let err = submit_command(
        &state,
        json!({"action": "circle", "center": [10, 10], "radius": 0}),
        &ctx(),
    )
    .await
    .unwrap_err();

    assert!(err.to_string().contains("radius must be at least 1"));
    assert_eq!(*trail.lock(), vec!["command_received", "error_occurred"]);

    let reply = rejection_reply(&err);
    assert_eq!(reply["type"], "command_rejected");
    assert_eq!(reply["code"], "VALIDATION_ERROR");
    assert_eq!(reply["errors"][0], "radius must be at least 1");
}

#[tokio::test]
async fn test_security_rejection() {
    let state = AppState::default();
    let err = submit_command(&state, json!({"action": "eval", "code": "1"}), &ctx())
        .await
        .unwrap_err();
    assert_eq!(rejection_reply(&err)["code"], "SECURITY_REJECTION");
    assert!(state.processor.history().is_empty());
}

#[tokio::test]
async fn test_command_received_can_transform() {
    let state = AppState::default();
    state.hooks.add_listener(
        names::COMMAND_RECEIVED,
        Arc::new(FnListener::new(|mut data: Value| async move {
            data["color"] = json!("#00ff00");
            Ok::<_, HookError>(Some(data))
        })),
        1,
    );

    let accepted = submit_command(
        &state,
        json!({"action": "arrow", "from": [0, 0], "to": [5, 5]}),
        &ctx(),
    )
    .await
    .unwrap();
    assert_eq!(accepted.command.to_value()["color"], "#00ff00");
}

#[tokio::test]
async fn test_no_consumer_is_soft() {
    let state = AppState::default();
    let trail = record_all(&state);

    let accepted = submit_command(&state, json!({"action": "hide", "selector": ".ad"}), &ctx())
        .await
        .unwrap();
    assert!(matches!(accepted.delivery, Delivery::NoConsumer { .. }));
    assert_eq!(*trail.lock(), vec!["command_received", "command_executed"]);
    assert_eq!(state.processor.history().len(), 1);
}

#[tokio::test]
async fn test_dom_command_fires_dom_hook() {
    let state = AppState::default();
    let trail = record_all(&state);
    let (tx, _rx) = mpsc::channel(4);
    state.hub.register("browser", tx);
    state.hub.classify("browser", PeerRole::Browser);

    let accepted = submit_command(&state, json!({"action": "show", "selector": "#menu"}), &ctx())
        .await
        .unwrap();
    assert!(matches!(accepted.delivery, Delivery::PrimarySurface { .. }));
    assert!(trail.lock().contains(&"dom_manipulation".to_string()));
}
