use super::*;
use serde_json::json;

fn command(raw: Value) -> Command {
    let mut fields = raw.as_object().cloned().unwrap();
    fields.insert("id".into(), json!("cmd_test"));
    fields.insert("timestamp".into(), json!(1));
    Command::from_fields(fields).unwrap()
}

fn peer(hub: &ConnectionHub, id: &str) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(8);
    hub.register(id, tx);
    rx
}

fn received(rx: &mut mpsc::Receiver<String>) -> Vec<Value> {
    let mut out = Vec::new();
    while let Ok(text) = rx.try_recv() {
        out.push(serde_json::from_str(&text).unwrap());
    }
    out
}

#[test]
fn test_client_id_format() {
    let id = generate_client_id(1_700_000_000_000);
    let parts: Vec<&str> = id.split('_').collect();
    assert_eq!(parts[0], "client");
    assert_eq!(parts[1], "1700000000000");
    assert_eq!(parts[2].len(), 9);
}

#[test]
fn test_connect_starts_unknown() {
    let hub = ConnectionHub::default();
    let (id, _rx) = hub.connect();
    assert!(id.starts_with("client_"));
    assert_eq!(hub.role(&id), Some(PeerRole::Unknown));
    assert_eq!(hub.peer_count(), 1);
}

#[test]
fn test_classify_only_once() {
    let hub = ConnectionHub::default();
    let _rx = peer(&hub, "a");

    assert!(hub.classify("a", PeerRole::Control));
    assert!(!hub.classify("a", PeerRole::Browser));
    assert_eq!(hub.role("a"), Some(PeerRole::Control));
    assert!(!hub.has_primary());

    assert!(!hub.classify("ghost", PeerRole::Control));
    assert!(!hub.classify("a", PeerRole::Unknown));
}

#[test]
fn test_browser_claims_primary_and_disconnect_frees_it() {
    let hub = ConnectionHub::default();
    let _a = peer(&hub, "a");
    let _b = peer(&hub, "b");

    hub.classify("a", PeerRole::Browser);
    assert_eq!(hub.primary().as_deref(), Some("a"));

    // a second browser pre-empts the first
    hub.classify("b", PeerRole::Browser);
    assert_eq!(hub.primary().as_deref(), Some("b"));

    // the displaced peer leaving does not clear the new holder
    hub.disconnect("a");
    assert_eq!(hub.primary().as_deref(), Some("b"));

    let info = hub.disconnect("b").unwrap();
    assert_eq!(info.role, PeerRole::Browser);
    assert!(!hub.has_primary());
    assert!(hub.disconnect("b").is_none());
}

#[test]
fn test_broadcast_scoped_to_role() {
    let hub = ConnectionHub::default();
    let mut control = peer(&hub, "control");
    let mut unknown = peer(&hub, "unknown");
    let mut browser = peer(&hub, "browser");
    hub.classify("control", PeerRole::Control);
    hub.classify("browser", PeerRole::Browser);

    let sent = hub.broadcast(&json!({"type": "note"}), RoleFilter::Role(PeerRole::Control));
    assert_eq!(sent, 1);
    assert_eq!(received(&mut control), vec![json!({"type": "note"})]);
    assert!(received(&mut unknown).is_empty());
    assert!(received(&mut browser).is_empty());

    assert_eq!(hub.broadcast(&json!({"type": "all"}), RoleFilter::All), 3);
    assert_eq!(received(&mut unknown).len(), 1);
}

#[test]
fn test_send_to_missing_peer_is_noop() {
    let hub = ConnectionHub::default();
    assert!(!hub.send("nobody", &json!({"type": "ping"})));
    assert_eq!(hub.dropped_messages(), 0);
}

#[test]
fn test_full_or_closed_transport_counts_drops() {
    let hub = ConnectionHub::default();
    let (tx, rx) = mpsc::channel(1);
    hub.register("slow", tx);

    assert!(hub.send("slow", &json!(1)));
    assert!(!hub.send("slow", &json!(2)));
    assert_eq!(hub.dropped_messages(), 1);

    drop(rx);
    assert!(!hub.send("slow", &json!(3)));
    assert_eq!(hub.dropped_messages(), 2);
}

#[test]
fn test_route_prefers_surface_role() {
    let hub = ConnectionHub::default();
    let mut overlay = peer(&hub, "overlay");
    let mut browser = peer(&hub, "browser");
    hub.classify("overlay", PeerRole::Overlay);
    hub.classify("browser", PeerRole::Browser);

    let delivery = hub.route(&command(json!({"action": "clear"})));
    assert_eq!(
        delivery,
        Delivery::Delivered {
            role: PeerRole::Overlay,
            recipients: 1
        }
    );
    let got = received(&mut overlay);
    assert_eq!(got[0]["action"], "clear");
    assert_eq!(got[0]["id"], "cmd_test");
    assert!(received(&mut browser).is_empty());
}

#[test]
fn test_route_falls_back_to_primary() {
    let hub = ConnectionHub::default();
    let mut browser = peer(&hub, "browser");
    hub.classify("browser", PeerRole::Browser);

    let delivery = hub.route(&command(json!({"action": "hide", "selector": ".ad"})));
    assert_eq!(
        delivery,
        Delivery::PrimarySurface {
            peer: "browser".into()
        }
    );
    assert_eq!(received(&mut browser)[0]["selector"], ".ad");

    // shell commands find the browser through its own role
    let delivery = hub.route(&command(json!({"action": "navigate", "url": "https://example.com"})));
    assert!(matches!(
        delivery,
        Delivery::Delivered {
            role: PeerRole::Browser,
            ..
        }
    ));
}

#[test]
fn test_route_without_consumer() {
    let hub = ConnectionHub::default();
    let _control = peer(&hub, "control");
    hub.classify("control", PeerRole::Control);

    let delivery = hub.route(&command(json!({"action": "sparkle"})));
    match &delivery {
        Delivery::NoConsumer { reason } => assert!(reason.contains("primary surface")),
        other => panic!("expected no consumer, got {:?}", other),
    }
    assert!(delivery.failure("sparkle").is_some());
}

#[test]
fn test_touch_updates_activity() {
    let hub = ConnectionHub::default();
    let _rx = peer(&hub, "a");
    let before = hub.peer("a").unwrap().last_activity;
    std::thread::sleep(std::time::Duration::from_millis(5));
    hub.touch("a");
    let info = hub.peer("a").unwrap();
    assert!(info.last_activity > before);
    assert_eq!(info.connected_at, before);
}

#[test]
fn test_peers_snapshot() {
    let hub = ConnectionHub::default();
    let _a = peer(&hub, "a");
    std::thread::sleep(std::time::Duration::from_millis(2));
    let _b = peer(&hub, "b");
    hub.classify("b", PeerRole::Agent);

    let peers = hub.peers();
    assert_eq!(peers.len(), 2);
    assert_eq!(peers[0].id, "a");
    assert_eq!(peers[1].role, PeerRole::Agent);
}
