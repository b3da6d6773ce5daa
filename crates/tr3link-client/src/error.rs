use tr3link_frame::FrameError;
use tr3link_transport::TransportError;

/// Errors that can occur in transaction operations.
///
/// Protocol-level noise never appears here: malformed frames are absorbed
/// by the parser's resynchronization. These are transport conditions and
/// caller contract violations only.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Operation attempted with no live connection.
    #[error("not connected to a reader")]
    NotConnected,

    /// Connect attempt failed; the client remains disconnected.
    #[error("connection failed: {source}")]
    ConnectionFailed {
        #[source]
        source: TransportError,
    },

    /// The reader closed the connection mid-read. Retrying requires a
    /// fresh connect.
    #[error("connection closed by reader")]
    ConnectionClosed,

    /// Every configured attempt timed out without a complete valid frame.
    #[error("receive timed out after {attempts} attempt(s)")]
    ReceiveTimeout { attempts: u32 },

    /// Frame-layer contract violation.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// An I/O error on the stream other than a close or timeout.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
