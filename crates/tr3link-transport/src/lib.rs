//! Blocking TCP transport for TR3 LAN reader links.
//!
//! Provides connect-with-timeout to a reader, a listener side for the
//! device emulator, and a stream wrapper that carries the configured
//! I/O timeouts. Everything here is plain blocking I/O; callers that
//! need concurrency put the stream behind their own lock.

pub mod error;
pub mod tcp;

pub use error::{Result, TransportError};
pub use tcp::{connect, LanListener, LanStream};
