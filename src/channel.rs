//! Channel session to the supervisor's Unix socket endpoint.
//!
//! The protocol is connect-per-call, not a persistent duplex stream: every
//! exchange is one connect, one full request write, one bounded response
//! read, then an unconditional close. A single mutex serializes all use so
//! concurrent callers (heartbeat reporters plus foreground calls) never
//! interleave on the stream; mutual exclusion is the only ordering
//! guarantee, there is no FIFO fairness.

use std::io::{Read, Write};
use std::net::Shutdown;
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};
use crate::protocol::{self, Request, Response};

/// Maximum accepted response size. A response that fills this bound without
/// reaching end-of-stream is a protocol violation.
pub const MAX_RESPONSE_BYTES: usize = 64 * 1024;

/// Pause between connect attempts while the endpoint is unavailable.
const CONNECT_RETRY_DELAY: Duration = Duration::from_millis(50);

struct ChannelState {
    stream: Option<UnixStream>,
    connected: bool,
}

/// Owns the transient connection to the supervisor endpoint.
pub struct ChannelSession {
    socket_path: PathBuf,
    io_timeout: Duration,
    state: Mutex<ChannelState>,
}

impl ChannelSession {
    pub fn new(socket_path: impl Into<PathBuf>, io_timeout: Duration) -> Self {
        Self {
            socket_path: socket_path.into(),
            io_timeout,
            state: Mutex::new(ChannelState {
                stream: None,
                connected: false,
            }),
        }
    }

    /// The endpoint this session connects to.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Whether the most recent channel operation left the channel open.
    ///
    /// This is not a standing-session indicator: a completed exchange closes
    /// the channel, so the flag drops back to `false` after every
    /// [`send_request`](Self::send_request).
    pub fn is_connected(&self) -> bool {
        self.state.lock().map(|s| s.connected).unwrap_or(false)
    }

    /// Open the channel, retrying while the endpoint is unavailable (busy or
    /// not yet listening), until `timeout` elapses.
    ///
    /// A zero timeout performs exactly one attempt and fails deterministically
    /// when the endpoint does not accept.
    pub fn connect(&self, timeout: Duration) -> Result<()> {
        let mut state = self.lock_state()?;

        // Drop any previous stream before reconnecting.
        state.stream = None;
        state.connected = false;

        let deadline = Instant::now() + timeout;
        let mut last_error;

        loop {
            match UnixStream::connect(&self.socket_path) {
                Ok(stream) => {
                    stream
                        .set_read_timeout(Some(self.io_timeout))
                        .map_err(|e| Error::Connection(format!("set read timeout: {e}")))?;
                    stream
                        .set_write_timeout(Some(self.io_timeout))
                        .map_err(|e| Error::Connection(format!("set write timeout: {e}")))?;

                    tracing::debug!(socket = %self.socket_path.display(), "channel connected");
                    state.stream = Some(stream);
                    state.connected = true;
                    return Ok(());
                }
                Err(e) => last_error = e,
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(CONNECT_RETRY_DELAY.min(deadline - now));
        }

        Err(Error::Connection(format!(
            "failed to connect to {} within {:?}: {last_error}",
            self.socket_path.display(),
            timeout
        )))
    }

    /// Perform one request/response exchange on a connected channel.
    ///
    /// Fails immediately with [`Error::NotConnected`] when the channel is not
    /// open; reconnecting is the caller's responsibility. The channel is
    /// closed before returning whether the exchange succeeded or failed.
    pub fn send_request(&self, request: &Request) -> Result<Response> {
        let mut state = self.lock_state()?;

        if !state.connected {
            return Err(Error::NotConnected);
        }
        // Closed unconditionally: the stream is consumed by this exchange and
        // dropped on every exit path below.
        state.connected = false;
        let Some(mut stream) = state.stream.take() else {
            return Err(Error::NotConnected);
        };

        let payload = protocol::encode_request(request)?;
        stream
            .write_all(&payload)
            .map_err(|e| Error::Connection(format!("write failed: {e}")))?;
        // Signal end-of-request so the supervisor's read completes.
        let _ = stream.shutdown(Shutdown::Write);

        let bytes = read_bounded(&mut stream)?;
        tracing::debug!(len = bytes.len(), "response received");
        protocol::decode_response(&bytes)
    }

    /// Close the channel. Safe to call when already disconnected.
    pub fn disconnect(&self) {
        if let Ok(mut state) = self.state.lock() {
            if let Some(stream) = state.stream.take() {
                let _ = stream.shutdown(Shutdown::Both);
            }
            state.connected = false;
        }
    }

    fn lock_state(&self) -> Result<std::sync::MutexGuard<'_, ChannelState>> {
        self.state
            .lock()
            .map_err(|_| Error::Connection("channel lock poisoned".to_string()))
    }
}

/// Read one response up to [`MAX_RESPONSE_BYTES`].
fn read_bounded(stream: &mut UnixStream) -> Result<Vec<u8>> {
    let mut buf = vec![0u8; MAX_RESPONSE_BYTES];
    let mut total = 0;

    while total < buf.len() {
        match stream.read(&mut buf[total..]) {
            Ok(0) => break,
            Ok(n) => total += n,
            Err(e) => return Err(Error::Connection(format!("read failed: {e}"))),
        }
    }

    if total == 0 {
        return Err(Error::Connection("empty response".to_string()));
    }

    if total == buf.len() {
        // Buffer full: probe for trailing bytes to distinguish an exact-size
        // response from an oversized one.
        let mut probe = [0u8; 1];
        match stream.read(&mut probe) {
            Ok(0) => {}
            Ok(_) => {
                return Err(Error::Protocol(format!(
                    "response exceeds {MAX_RESPONSE_BYTES} byte bound"
                )))
            }
            Err(e) => return Err(Error::Connection(format!("read failed: {e}"))),
        }
    }

    buf.truncate(total);
    Ok(buf)
}
