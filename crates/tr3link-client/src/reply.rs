use bytes::Bytes;

use tr3link_frame::{FrameError, Parser};

/// A decoded response frame.
///
/// Owned by the caller; the payload is opaque to this layer and
/// interpreted by whoever issued the command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reader address the frame was sent from.
    pub address: u8,
    /// Command code echoed or originated by the reader.
    pub command: u8,
    /// Payload bytes.
    pub payload: Bytes,
    /// The complete frame as received, `STX` through `CR`.
    pub raw: Bytes,
}

impl Reply {
    /// Decode a reply from the raw bytes of one complete frame.
    ///
    /// Fails with [`FrameError::ParserNotReady`] if `raw` is not exactly
    /// one valid frame.
    pub fn from_raw(raw: Bytes) -> Result<Self, FrameError> {
        let mut parser = Parser::new();
        let mut complete = false;
        for &byte in raw.iter() {
            complete = parser.push(byte);
        }
        if !complete {
            return Err(FrameError::ParserNotReady);
        }
        let (address, command, payload) = parser.take_fields()?;
        Ok(Self {
            address,
            command,
            payload,
            raw,
        })
    }
}
