//! Wire protocol codec for the supervisor channel.
//!
//! Each exchange is one JSON request and one JSON response. Requests carry a
//! `type` discriminator; responses carry a `success` flag, an optional
//! `message`, and an optional `data` payload whose shape depends on the
//! request type. The codec does structural decoding only; field-level
//! validation happens in the client facade before a request is sent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::models::{MonitorItem, ProcessStatus, ServiceStatus};

/// Client request to the supervisor.
///
/// The variant set is closed: one variant per `type` the supervisor accepts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Request {
    /// List all monitor items.
    List,
    /// Register a new monitor item.
    Add { config: MonitorItem },
    /// Replace an existing monitor item.
    Update { config: MonitorItem },
    /// Remove a monitor item by id.
    Remove { id: String },
    /// Pause monitoring of an item.
    Stop { id: String },
    /// Resume monitoring of an item.
    Start { id: String },
    /// Query aggregate service status.
    Status,
    /// Report liveness for an item.
    Heartbeat { item_id: String, timestamp: i64 },
}

/// Supervisor response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    /// The failure message, or a fixed fallback when the supervisor sent none.
    pub fn message_or_default(&self) -> String {
        self.message
            .clone()
            .unwrap_or_else(|| "unknown error".to_string())
    }
}

/// A decoded payload plus a record of entries that failed to decode.
///
/// List and status payloads are decoded entry by entry: a malformed entry is
/// skipped rather than failing the whole response, and the last such failure
/// is kept for reporting.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub value: T,
    pub skipped: usize,
    pub last_error: Option<String>,
}

impl<T> Decoded<T> {
    fn clean(value: T) -> Self {
        Self {
            value,
            skipped: 0,
            last_error: None,
        }
    }
}

/// Serialize a request to wire bytes.
pub fn encode_request(request: &Request) -> Result<Vec<u8>> {
    serde_json::to_vec(request).map_err(|e| Error::Protocol(format!("encode request: {e}")))
}

/// Deserialize a response envelope from wire bytes.
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    serde_json::from_slice(bytes).map_err(|e| Error::Protocol(format!("decode response: {e}")))
}

/// Decode a `list` response payload into monitor items.
///
/// A missing `data` field means an empty list; a non-array `data` is a
/// protocol error.
pub fn decode_items(response: &Response) -> Result<Decoded<Vec<MonitorItem>>> {
    let Some(data) = &response.data else {
        return Ok(Decoded::clean(Vec::new()));
    };
    let Value::Array(entries) = data else {
        return Err(Error::Protocol("list data is not an array".to_string()));
    };

    let mut decoded = Decoded::clean(Vec::with_capacity(entries.len()));
    for entry in entries {
        match serde_json::from_value::<MonitorItem>(entry.clone()) {
            Ok(item) => decoded.value.push(item),
            Err(e) => {
                tracing::warn!("skipping malformed item entry: {e}");
                decoded.skipped += 1;
                decoded.last_error = Some(format!("decode item entry: {e}"));
            }
        }
    }
    Ok(decoded)
}

/// Decode a `status` response payload into a [`ServiceStatus`].
///
/// Status entries are decoded with the same per-entry tolerance as
/// [`decode_items`].
pub fn decode_status(response: &Response) -> Result<Decoded<ServiceStatus>> {
    let Some(data) = &response.data else {
        return Ok(Decoded::clean(ServiceStatus::default()));
    };
    let Value::Object(fields) = data else {
        return Err(Error::Protocol("status data is not an object".to_string()));
    };

    let mut status = ServiceStatus {
        service_running: fields
            .get("service_running")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        total_items: fields
            .get("total_items")
            .and_then(Value::as_u64)
            .unwrap_or(0) as usize,
        items: Vec::new(),
    };

    let mut decoded = Decoded::clean(ServiceStatus::default());
    if let Some(items) = fields.get("items") {
        let Value::Array(entries) = items else {
            return Err(Error::Protocol("status items is not an array".to_string()));
        };
        for entry in entries {
            match serde_json::from_value::<ProcessStatus>(entry.clone()) {
                Ok(item) => status.items.push(item),
                Err(e) => {
                    tracing::warn!("skipping malformed status entry: {e}");
                    decoded.skipped += 1;
                    decoded.last_error = Some(format!("decode status entry: {e}"));
                }
            }
        }
    }
    decoded.value = status;
    Ok(decoded)
}
