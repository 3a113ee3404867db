//! Service status queries, including tolerant decoding of bad entries.

use procguard::models::MonitorItem;
use procguard::Error;

use super::helpers::Harness;

#[test]
fn test_status_reflects_items_and_heartbeats() {
    let harness = Harness::start();
    let item = MonitorItem::create("/usr/bin/worker", "worker", Some("w-1".to_string()));
    harness.client.add_monitor_item(&item).unwrap();
    harness.client.send_heartbeat("w-1").unwrap();

    let status = harness.client.get_service_status().unwrap();
    assert_eq!(status.skipped, 0);
    assert!(status.value.service_running);
    assert_eq!(status.value.total_items, 1);
    assert_eq!(status.value.items.len(), 1);

    let entry = &status.value.items[0];
    assert_eq!(entry.id, "w-1");
    assert_eq!(entry.process_id, None);
    assert!(entry.last_heartbeat_ms > 0);
    assert!(entry.is_heartbeat_ok);
}

#[test]
fn test_status_skips_malformed_entry() {
    let harness = Harness::start();
    harness.set_raw_response(
        "status",
        serde_json::json!({
            "success": true,
            "data": {
                "service_running": true,
                "total_items": 2,
                "items": [
                    {
                        "id": "w-1",
                        "name": "worker",
                        "exe_path": "/usr/bin/worker",
                        "enabled": true,
                        "process_id": 4242,
                        "last_heartbeat_ms": 1700000000000i64,
                        "heartbeat_timeout_ms": 1000,
                        "restart_count": 3,
                        "is_alive": true,
                        "is_heartbeat_ok": true
                    },
                    { "id": "w-2", "last_heartbeat_ms": "not-a-number" }
                ]
            }
        })
        .to_string()
        .into_bytes(),
    );

    let status = harness.client.get_service_status().unwrap();
    assert_eq!(status.value.items.len(), 1);
    assert_eq!(status.value.items[0].process_id, Some(4242));
    assert_eq!(status.value.items[0].restart_count, 3);
    assert_eq!(status.skipped, 1);
    assert!(status.last_error.is_some());
}

#[test]
fn test_status_error_response_is_application_error() {
    let harness = Harness::start();
    harness.set_raw_response(
        "status",
        br#"{"success":false,"message":"Supervisor shutting down"}"#.to_vec(),
    );

    match harness.client.get_service_status() {
        Err(Error::Application(message)) => assert!(message.contains("shutting down")),
        other => panic!("expected application error, got {other:?}"),
    }
}
