//! TR3 wire protocol: checksummed framing codec and incremental parser.
//!
//! Every message on the wire is one frame:
//! - A 1-byte `STX` start sentinel
//! - A 3-byte header (address, command, payload length)
//! - The payload (0–255 bytes)
//! - A 3-byte footer (`ETX`, additive checksum, `CR`)
//!
//! The [`Parser`] consumes a byte stream one byte at a time, recognizes
//! complete valid frames, and silently resynchronizes past noise and
//! corrupted frames. Payload contents are opaque at this layer.

pub mod checksum;
pub mod codec;
pub mod commands;
pub mod error;
pub mod parser;

pub use checksum::checksum;
pub use codec::{
    encode_frame, Frame, CR, ETX, FOOTER_LEN, HEADER_LEN, MAX_PAYLOAD, MIN_FRAME_LEN, STX,
};
pub use error::{FrameError, Result};
pub use parser::Parser;
