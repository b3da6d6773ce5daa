use std::io::{ErrorKind, Read, Write};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info};

use tr3link_frame::Parser;
use tr3link_transport::{self as transport, LanStream};

use crate::error::{ClientError, Result};
use crate::reply::Reply;

/// I/O timeout used when callers have no opinion.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Blocking transaction client for a LAN-attached reader.
///
/// One client owns at most one TCP connection. The write+read sequence of
/// a transaction is guarded by an internal lock, so concurrent callers are
/// serialized rather than rejected, and one caller's exchange is never
/// interleaved with another's.
pub struct Tr3Client {
    stream: Mutex<Option<LanStream>>,
}

impl Tr3Client {
    /// Create a disconnected client.
    pub fn new() -> Self {
        Self {
            stream: Mutex::new(None),
        }
    }

    /// Connect to the reader at `host:port`, replacing any existing
    /// connection (the old one is closed first).
    ///
    /// `timeout` bounds the connect attempt and every subsequent read and
    /// write. On failure the client is left disconnected.
    pub fn connect(&self, host: &str, port: u16, timeout: Duration) -> Result<()> {
        let mut guard = self.lock();
        if let Some(old) = guard.take() {
            let _ = old.shutdown();
        }
        let stream = transport::connect(host, port, timeout)
            .map_err(|source| ClientError::ConnectionFailed { source })?;
        info!(host, port, ?timeout, "reader connected");
        *guard = Some(stream);
        Ok(())
    }

    /// Close the connection if one exists. Idempotent, never fails.
    pub fn close(&self) {
        let mut guard = self.lock();
        if let Some(stream) = guard.take() {
            let _ = stream.shutdown();
            debug!("reader connection closed");
        }
    }

    /// Whether a connection is currently held.
    pub fn is_connected(&self) -> bool {
        self.lock().is_some()
    }

    /// Send one command frame and wait for its response frame.
    ///
    /// `retries` counts additional attempts after the first; a timed-out
    /// attempt discards any partial parse and resends the identical bytes.
    /// A zero-length read fails immediately with
    /// [`ClientError::ConnectionClosed`] no matter how many attempts
    /// remain.
    pub fn transact(&self, frame: &[u8], retries: u32) -> Result<Reply> {
        let raw = {
            let mut guard = self.lock();
            let stream = guard.as_mut().ok_or(ClientError::NotConnected)?;
            send_and_receive(stream, frame, retries)?
        };
        Reply::from_raw(raw).map_err(ClientError::from)
    }

    /// Wait for the next frame without sending anything.
    ///
    /// Used to collect follow-up frames after an initiating command, e.g.
    /// tag reports after an inventory acknowledgment. Performs a single
    /// attempt bounded by the connection timeout.
    pub fn receive_only(&self) -> Result<Reply> {
        self.receive_only_with_retries(0)
    }

    /// Receive-only with timeout retries. Each timed-out attempt discards
    /// the partial parse and listens again; no bytes are written.
    pub fn receive_only_with_retries(&self, retries: u32) -> Result<Reply> {
        let raw = {
            let mut guard = self.lock();
            let stream = guard.as_mut().ok_or(ClientError::NotConnected)?;
            receive_with_retries(stream, retries)?
        };
        Reply::from_raw(raw).map_err(ClientError::from)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<LanStream>> {
        self.stream.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Tr3Client {
    fn default() -> Self {
        Self::new()
    }
}

/// Write `frame`, then read until one complete frame arrives. Retries the
/// whole write+read on timeout, up to `retries` additional attempts.
fn send_and_receive<S>(stream: &mut S, frame: &[u8], retries: u32) -> Result<Bytes>
where
    S: Read + Write,
{
    let mut parser = Parser::new();
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        let outcome =
            write_request(stream, frame).and_then(|()| receive_frame(stream, &mut parser));
        match outcome {
            Ok(raw) => return Ok(raw),
            Err(err) if is_timeout(&err) => {
                if attempt > retries {
                    return Err(ClientError::ReceiveTimeout { attempts: attempt });
                }
                debug!(attempt, "attempt timed out; resending frame");
                parser.reset();
            }
            Err(err) => return Err(err),
        }
    }
}

/// Read until one complete frame arrives, with no write. Timeouts restart
/// a fresh parse up to `retries` additional attempts.
fn receive_with_retries<S: Read>(stream: &mut S, retries: u32) -> Result<Bytes> {
    let mut parser = Parser::new();
    let mut attempt: u32 = 0;
    loop {
        attempt += 1;
        match receive_frame(stream, &mut parser) {
            Ok(raw) => return Ok(raw),
            Err(err) if is_timeout(&err) => {
                if attempt > retries {
                    return Err(ClientError::ReceiveTimeout { attempts: attempt });
                }
                debug!(attempt, "receive timed out; listening again");
                parser.reset();
            }
            Err(err) => return Err(err),
        }
    }
}

fn write_request<S: Write>(stream: &mut S, frame: &[u8]) -> Result<()> {
    stream
        .write_all(frame)
        .and_then(|()| stream.flush())
        .map_err(|err| match err.kind() {
            ErrorKind::WriteZero | ErrorKind::BrokenPipe | ErrorKind::ConnectionReset => {
                ClientError::ConnectionClosed
            }
            _ => ClientError::Io(err),
        })
}

/// Read one byte at a time into `parser` until a frame completes.
fn receive_frame<S: Read>(stream: &mut S, parser: &mut Parser) -> Result<Bytes> {
    let mut byte = [0u8; 1];
    loop {
        let read = match stream.read(&mut byte) {
            Ok(n) => n,
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err)
                if matches!(
                    err.kind(),
                    ErrorKind::ConnectionReset | ErrorKind::UnexpectedEof
                ) =>
            {
                return Err(ClientError::ConnectionClosed)
            }
            Err(err) => return Err(ClientError::Io(err)),
        };
        if read == 0 {
            return Err(ClientError::ConnectionClosed);
        }
        if parser.push(byte[0]) {
            return Ok(parser.take_raw()?);
        }
    }
}

fn is_timeout(err: &ClientError) -> bool {
    matches!(
        err,
        ClientError::Io(io) if matches!(io.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
    )
}
