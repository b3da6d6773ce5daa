/// Errors that can occur during frame encoding and extraction.
///
/// Malformed frames seen on the wire are never reported here; the parser
/// absorbs them by resynchronizing. These variants cover caller contract
/// violations only.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds what the one-byte length field can describe.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Frame extraction attempted before a complete frame was parsed.
    #[error("no complete frame available")]
    ParserNotReady,
}

pub type Result<T> = std::result::Result<T, FrameError>;
