//! Monitor item lifecycle against the fake supervisor.

use procguard::models::MonitorItem;
use procguard::Error;

use super::helpers::Harness;

fn sample_item(id: &str, exe_path: &str) -> MonitorItem {
    MonitorItem::create(exe_path, "worker", Some(id.to_string()))
        .with_args("--queue jobs")
        .with_heartbeat_timeout_ms(2500)
}

#[test]
fn test_add_then_list_round_trips_fields() {
    let harness = Harness::start();
    let item = sample_item("w-1", "/usr/bin/worker");

    harness.client.add_monitor_item(&item).unwrap();

    let listed = harness.client.get_all_monitor_items().unwrap();
    assert_eq!(listed.skipped, 0);
    assert_eq!(listed.value.len(), 1);
    assert_eq!(listed.value[0], item);
}

#[test]
fn test_duplicate_exe_path_rejected_first_item_unaffected() {
    let harness = Harness::start();
    let first = sample_item("w-1", "/usr/bin/worker");
    harness.client.add_monitor_item(&first).unwrap();

    let second = sample_item("w-2", "/usr/bin/worker");
    match harness.client.add_monitor_item(&second) {
        Err(Error::Application(message)) => assert!(message.contains("already monitored")),
        other => panic!("expected application error, got {other:?}"),
    }

    let listed = harness.client.get_all_monitor_items().unwrap();
    assert_eq!(listed.value.len(), 1);
    assert_eq!(listed.value[0], first);
}

#[test]
fn test_update_replaces_item() {
    let harness = Harness::start();
    harness
        .client
        .add_monitor_item(&sample_item("w-1", "/usr/bin/worker"))
        .unwrap();

    let mut updated = sample_item("w-1", "/usr/bin/worker-v2");
    updated.name = "worker-v2".to_string();
    harness.client.update_monitor_item(&updated).unwrap();

    let listed = harness.client.get_all_monitor_items().unwrap();
    assert_eq!(listed.value[0].exe_path, "/usr/bin/worker-v2");
    assert_eq!(listed.value[0].name, "worker-v2");
}

#[test]
fn test_update_unknown_id_is_application_error() {
    let harness = Harness::start();
    let result = harness
        .client
        .update_monitor_item(&sample_item("ghost", "/usr/bin/ghost"));
    assert!(matches!(result, Err(Error::Application(_))));
}

#[test]
fn test_remove_item() {
    let harness = Harness::start();
    harness
        .client
        .add_monitor_item(&sample_item("w-1", "/usr/bin/worker"))
        .unwrap();

    harness.client.remove_monitor_item("w-1").unwrap();
    assert!(harness.item_ids().is_empty());
}

#[test]
fn test_pause_resume_toggle_enabled() {
    let harness = Harness::start();
    harness
        .client
        .add_monitor_item(&sample_item("w-1", "/usr/bin/worker"))
        .unwrap();

    harness.client.pause_monitor_item("w-1").unwrap();
    assert!(!harness.state.lock().unwrap().items[0].enabled);

    harness.client.resume_monitor_item("w-1").unwrap();
    assert!(harness.state.lock().unwrap().items[0].enabled);
}

#[test]
fn test_consecutive_operations_reconnect_per_call() {
    let harness = Harness::start();
    harness
        .client
        .add_monitor_item(&sample_item("w-1", "/usr/bin/worker"))
        .unwrap();

    // Each operation reconnects; the channel never stays open in between.
    for _ in 0..3 {
        harness.client.get_all_monitor_items().unwrap();
        assert!(!harness.client.is_connected());
    }

    // add performs a list (duplicate check) plus the add itself.
    let seen = harness.state.lock().unwrap().seen.clone();
    assert_eq!(seen[..2], ["list".to_string(), "add".to_string()]);
}

#[test]
fn test_list_skips_malformed_entry() {
    let harness = Harness::start();
    harness.set_raw_response(
        "list",
        serde_json::json!({
            "success": true,
            "data": [
                {
                    "id": "w-1",
                    "exe_path": "/usr/bin/worker",
                    "name": "worker",
                    "minimize": false,
                    "no_window": false,
                    "enabled": true,
                    "heartbeat_timeout_ms": 1000
                },
                { "exe_path": 17 }
            ]
        })
        .to_string()
        .into_bytes(),
    );

    let listed = harness.client.get_all_monitor_items().unwrap();
    assert_eq!(listed.value.len(), 1);
    assert_eq!(listed.value[0].id, "w-1");
    assert_eq!(listed.skipped, 1);
    assert!(listed.last_error.is_some());
}
