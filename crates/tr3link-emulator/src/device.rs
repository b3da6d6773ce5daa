use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info, warn};

use tr3link_frame::Parser;
use tr3link_transport::{LanListener, LanStream, TransportError};

use crate::responder::{build_replies, default_tags};

/// Per-connection read timeout. Keeps the service loop polling the stop
/// flag instead of blocking indefinitely on a quiet client.
const SESSION_READ_TIMEOUT: Duration = Duration::from_millis(500);

/// How long the wake-up connection in [`EmulatorHandle::stop`] may take.
const WAKE_TIMEOUT: Duration = Duration::from_millis(200);

/// An in-process reader emulator.
///
/// Configure it, then [`spawn`](Self::spawn) to bind a port and serve in
/// a background thread.
pub struct DeviceEmulator {
    tags: Vec<Bytes>,
}

impl DeviceEmulator {
    /// Emulator with the demo tag list.
    pub fn new() -> Self {
        Self {
            tags: default_tags(),
        }
    }

    /// Replace the tag list reported by inventory.
    pub fn with_tags(mut self, tags: Vec<Bytes>) -> Self {
        self.tags = tags;
        self
    }

    /// Bind `addr` and serve connections on a background thread.
    ///
    /// Returns once the listener is bound, so a client may connect
    /// immediately. Port 0 picks an ephemeral port; read it back via
    /// [`EmulatorHandle::local_addr`].
    pub fn spawn(self, addr: SocketAddr) -> Result<EmulatorHandle, TransportError> {
        let listener = LanListener::bind(addr)?;
        let local_addr = listener.local_addr();
        let stopping = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stopping);
        let tags = self.tags;
        let thread = std::thread::spawn(move || serve(listener, flag, tags));
        info!(%local_addr, "reader emulator started");
        Ok(EmulatorHandle {
            local_addr,
            stopping,
            thread: Some(thread),
        })
    }
}

impl Default for DeviceEmulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Owner handle for a running emulator. Stops it on drop.
pub struct EmulatorHandle {
    local_addr: SocketAddr,
    stopping: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl EmulatorHandle {
    /// The address the emulator is listening on.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop the accept loop and join the service thread.
    ///
    /// The blocked accept is released by a throwaway connection; any
    /// active session notices the flag at its next read timeout.
    pub fn stop(&mut self) {
        self.stopping.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = TcpStream::connect_timeout(&self.local_addr, WAKE_TIMEOUT);
            let _ = thread.join();
            info!(local_addr = %self.local_addr, "reader emulator stopped");
        }
    }
}

impl Drop for EmulatorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

fn serve(listener: LanListener, stopping: Arc<AtomicBool>, tags: Vec<Bytes>) {
    while !stopping.load(Ordering::SeqCst) {
        let stream = match listener.accept() {
            Ok(stream) => stream,
            Err(err) => {
                if !stopping.load(Ordering::SeqCst) {
                    warn!(error = %err, "accept failed; emulator shutting down");
                }
                break;
            }
        };
        if stopping.load(Ordering::SeqCst) {
            // The wake-up connection from stop(), not a client.
            break;
        }
        if let Err(err) = handle_session(stream, &stopping, &tags) {
            debug!(error = %err, "session ended");
        }
    }
    debug!("emulator accept loop exited");
}

/// Serve one client connection: parse command frames byte by byte and
/// answer each with its canned replies.
fn handle_session(
    mut stream: LanStream,
    stopping: &AtomicBool,
    tags: &[Bytes],
) -> std::io::Result<()> {
    stream
        .set_read_timeout(Some(SESSION_READ_TIMEOUT))
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    let mut parser = Parser::new();
    let mut byte = [0u8; 1];
    while !stopping.load(Ordering::SeqCst) {
        let read = match stream.read(&mut byte) {
            Ok(n) => n,
            Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                continue
            }
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        if read == 0 {
            break;
        }
        if !parser.push(byte[0]) {
            continue;
        }
        let Ok((address, command, data)) = parser.take_fields() else {
            continue;
        };
        debug!(command, len = data.len(), "command received");
        match build_replies(address, command, &data, tags) {
            Ok(replies) => {
                for reply in replies {
                    stream.write_all(&reply)?;
                }
                stream.flush()?;
            }
            Err(err) => warn!(error = %err, "reply could not be encoded"),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpStream;

    fn loopback() -> SocketAddr {
        "127.0.0.1:0".parse().expect("loopback addr should parse")
    }

    #[test]
    fn spawn_binds_an_ephemeral_port() {
        let mut handle = DeviceEmulator::new()
            .spawn(loopback())
            .expect("spawn should succeed");
        assert_ne!(handle.local_addr().port(), 0);
        handle.stop();
    }

    #[test]
    fn stop_is_idempotent_and_joins_the_thread() {
        let mut handle = DeviceEmulator::new()
            .spawn(loopback())
            .expect("spawn should succeed");
        handle.stop();
        handle.stop();

        // Once stopped, new connections are refused or go unanswered.
        let result = TcpStream::connect_timeout(&handle.local_addr(), Duration::from_millis(200));
        if let Ok(stream) = result {
            stream
                .set_read_timeout(Some(Duration::from_millis(200)))
                .expect("timeout should apply");
            let mut buf = [0u8; 1];
            let read = (&stream).read(&mut buf);
            assert!(matches!(read, Ok(0) | Err(_)));
        }
    }

    #[test]
    fn answers_a_raw_command_frame() {
        let mut handle = DeviceEmulator::new()
            .spawn(loopback())
            .expect("spawn should succeed");

        let mut stream = TcpStream::connect_timeout(&handle.local_addr(), Duration::from_secs(2))
            .expect("connect should succeed");
        stream
            .set_read_timeout(Some(Duration::from_secs(2)))
            .expect("timeout should apply");

        let request = tr3link_frame::commands::buzzer(0x01, 0x00).expect("encode should succeed");
        stream.write_all(&request).expect("write should succeed");

        let mut parser = Parser::new();
        let mut byte = [0u8; 1];
        loop {
            stream.read_exact(&mut byte).expect("read should succeed");
            if parser.push(byte[0]) {
                break;
            }
        }
        let (_, command, payload) = parser.take_fields().expect("fields should be available");
        assert_eq!(command, tr3link_frame::commands::CMD_BUZZER);
        assert_eq!(payload.as_ref(), &[0x00]);

        handle.stop();
    }
}
