//! Scripted fake supervisor for integration tests.
//!
//! Mirrors the real supervisor's request handling: one connection per
//! request, read to end-of-stream, answer with a JSON envelope, close.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::os::unix::net::UnixListener;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use procguard::models::MonitorItem;
use procguard::protocol::{Request, Response};
use procguard::{Client, ClientConfig};
use tempfile::TempDir;

/// Mutable state the fake supervisor serves from.
#[derive(Default)]
pub struct SupervisorState {
    pub items: Vec<MonitorItem>,
    /// (item_id, timestamp) pairs of accepted heartbeats.
    pub heartbeats: Vec<(String, i64)>,
    /// Request type tags in arrival order.
    pub seen: Vec<String>,
    /// When true, every heartbeat is rejected with "Item not found".
    pub reject_heartbeats: bool,
    /// Raw response bodies substituted per request tag, bypassing the
    /// scripted handler (for malformed-payload scenarios).
    pub raw_responses: HashMap<String, Vec<u8>>,
}

/// A fake supervisor plus a client wired to its socket.
pub struct Harness {
    pub client: Client,
    pub state: Arc<Mutex<SupervisorState>>,
    shutdown: Arc<AtomicBool>,
    socket_path: PathBuf,
    server: Option<JoinHandle<()>>,
    _dir: TempDir,
}

impl Harness {
    pub fn start() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let socket_path = dir.path().join("supervisor.sock");
        let state = Arc::new(Mutex::new(SupervisorState::default()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let listener = UnixListener::bind(&socket_path).expect("Failed to bind socket");
        listener
            .set_nonblocking(true)
            .expect("Failed to set non-blocking");

        let server_state = Arc::clone(&state);
        let server_shutdown = Arc::clone(&shutdown);
        let server = thread::spawn(move || {
            while !server_shutdown.load(Ordering::Relaxed) {
                match listener.accept() {
                    Ok((stream, _)) => serve_connection(stream, &server_state),
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        let config = ClientConfig::default()
            .with_socket_path(&socket_path)
            .with_connect_timeout(Duration::from_secs(2));
        let client = Client::with_config(config);

        Self {
            client,
            state,
            shutdown,
            socket_path,
            server: Some(server),
            _dir: dir,
        }
    }

    /// Substitute a raw response body for the given request tag.
    pub fn set_raw_response(&self, tag: &str, body: impl Into<Vec<u8>>) {
        self.state
            .lock()
            .unwrap()
            .raw_responses
            .insert(tag.to_string(), body.into());
    }

    pub fn item_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .items
            .iter()
            .map(|item| item.id.clone())
            .collect()
    }

    pub fn heartbeat_count(&self, id: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .heartbeats
            .iter()
            .filter(|(item_id, _)| item_id == id)
            .count()
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(server) = self.server.take() {
            let _ = server.join();
        }
        let _ = std::fs::remove_file(&self.socket_path);
    }
}

fn serve_connection(mut stream: std::os::unix::net::UnixStream, state: &Mutex<SupervisorState>) {
    let mut body = Vec::new();
    if stream.read_to_end(&mut body).is_err() || body.is_empty() {
        // Client connected without sending a request (e.g. a bare connect
        // probe); nothing to answer.
        return;
    }

    let request: Request = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            let reply = error_response(&format!("Invalid JSON: {e}"));
            let _ = stream.write_all(&serde_json::to_vec(&reply).unwrap());
            return;
        }
    };

    let mut state = state.lock().unwrap();
    state.seen.push(tag_of(&request).to_string());

    if let Some(raw) = state.raw_responses.get(tag_of(&request)) {
        let raw = raw.clone();
        drop(state);
        let _ = stream.write_all(&raw);
        return;
    }

    let reply = handle_request(&request, &mut state);
    drop(state);
    let _ = stream.write_all(&serde_json::to_vec(&reply).unwrap());
}

fn tag_of(request: &Request) -> &'static str {
    match request {
        Request::List => "list",
        Request::Add { .. } => "add",
        Request::Update { .. } => "update",
        Request::Remove { .. } => "remove",
        Request::Stop { .. } => "stop",
        Request::Start { .. } => "start",
        Request::Status => "status",
        Request::Heartbeat { .. } => "heartbeat",
    }
}

fn handle_request(request: &Request, state: &mut SupervisorState) -> Response {
    match request {
        Request::List => ok_response(serde_json::to_value(&state.items).unwrap()),
        Request::Add { config } => {
            if state.items.iter().any(|item| item.id == config.id) {
                return error_response("Item with this ID already exists");
            }
            if state.items.iter().any(|item| item.exe_path == config.exe_path) {
                return error_response("Executable path already monitored");
            }
            state.items.push(config.clone());
            plain_ok()
        }
        Request::Update { config } => {
            match state.items.iter_mut().find(|item| item.id == config.id) {
                Some(existing) => {
                    *existing = config.clone();
                    plain_ok()
                }
                None => error_response("Item not found"),
            }
        }
        Request::Remove { id } => {
            let before = state.items.len();
            state.items.retain(|item| &item.id != id);
            if state.items.len() == before {
                error_response("Item not found")
            } else {
                plain_ok()
            }
        }
        Request::Stop { id } | Request::Start { id } => {
            let enable = matches!(request, Request::Start { .. });
            match state.items.iter_mut().find(|item| &item.id == id) {
                Some(item) => {
                    item.enabled = enable;
                    plain_ok()
                }
                None => error_response("Item not found"),
            }
        }
        Request::Status => {
            let items: Vec<serde_json::Value> = state
                .items
                .iter()
                .map(|item| {
                    let last = state
                        .heartbeats
                        .iter()
                        .rev()
                        .find(|(id, _)| id == &item.id)
                        .map(|(_, ts)| *ts)
                        .unwrap_or(0);
                    serde_json::json!({
                        "id": item.id,
                        "name": item.name,
                        "exe_path": item.exe_path,
                        "enabled": item.enabled,
                        "process_id": null,
                        "last_heartbeat_ms": last,
                        "heartbeat_timeout_ms": item.heartbeat_timeout_ms,
                        "restart_count": 0,
                        "is_alive": true,
                        "is_heartbeat_ok": last > 0
                    })
                })
                .collect();
            ok_response(serde_json::json!({
                "service_running": true,
                "total_items": state.items.len(),
                "items": items
            }))
        }
        Request::Heartbeat { item_id, timestamp } => {
            if state.reject_heartbeats || !state.items.iter().any(|item| &item.id == item_id) {
                return error_response("Item not found");
            }
            state.heartbeats.push((item_id.clone(), *timestamp));
            plain_ok()
        }
    }
}

fn plain_ok() -> Response {
    Response {
        success: true,
        message: None,
        data: None,
    }
}

fn ok_response(data: serde_json::Value) -> Response {
    Response {
        success: true,
        message: None,
        data: Some(data),
    }
}

fn error_response(message: &str) -> Response {
    Response {
        success: false,
        message: Some(message.to_string()),
        data: None,
    }
}
