use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::checksum;
use crate::codec::{CR, ETX, FOOTER_LEN, HEADER_LEN, MIN_FRAME_LEN, STX};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = MIN_FRAME_LEN + 64;

/// Where the parser is within the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Scanning for `STX`. Initial state and resync target.
    SeekStart,
    /// Accumulating the remainder of the 4-byte header.
    ReadHeader,
    /// Accumulating payload and footer.
    ReadPayload,
    /// A validated frame is buffered, awaiting extraction.
    Complete,
}

/// Incremental frame parser.
///
/// Feed received bytes one at a time through [`push`](Self::push); it
/// returns `true` exactly when a complete, checksum-valid frame is
/// available. Extract it immediately with [`take_fields`](Self::take_fields)
/// or [`take_raw`](Self::take_raw); both reset the parser for the next
/// frame.
///
/// Any structural violation (short frame, bad `ETX`/`CR` position,
/// checksum mismatch) silently resets the parser to start-seeking, so a
/// corrupted frame costs at most itself: parsing resumes at the next `STX`
/// in the stream.
pub struct Parser {
    state: State,
    buf: BytesMut,
    need: usize,
}

impl Parser {
    /// Create a parser in the start-seeking state.
    pub fn new() -> Self {
        Self {
            state: State::SeekStart,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            need: 0,
        }
    }

    /// Discard all buffered bytes and return to start-seeking.
    pub fn reset(&mut self) {
        self.state = State::SeekStart;
        self.buf.clear();
        self.need = 0;
    }

    /// Feed one received byte. Returns `true` when a complete valid frame
    /// is now buffered.
    pub fn push(&mut self, byte: u8) -> bool {
        match self.state {
            State::SeekStart => {
                if byte == STX {
                    self.buf.clear();
                    self.buf.put_u8(byte);
                    self.state = State::ReadHeader;
                    self.need = HEADER_LEN - 1;
                }
                false
            }
            State::ReadHeader => {
                self.buf.put_u8(byte);
                self.need -= 1;
                if self.need == 0 {
                    if self.buf.len() < HEADER_LEN {
                        self.reset();
                        return false;
                    }
                    let data_len = usize::from(self.buf[3]);
                    self.need = data_len + FOOTER_LEN;
                    self.state = State::ReadPayload;
                }
                false
            }
            State::ReadPayload => {
                self.buf.put_u8(byte);
                self.need -= 1;
                if self.need > 0 {
                    return false;
                }
                let size = self.buf.len();
                if size < MIN_FRAME_LEN {
                    self.reset();
                    return false;
                }
                if self.buf[size - 1] != CR || self.buf[size - 3] != ETX {
                    self.reset();
                    return false;
                }
                let expected = self.buf[size - 2];
                if checksum(&self.buf[..size - 2]) != expected {
                    self.reset();
                    return false;
                }
                self.state = State::Complete;
                true
            }
            State::Complete => {
                // A byte arriving before extraction discards the pending
                // frame; the byte itself is not reused.
                self.reset();
                false
            }
        }
    }

    /// Whether a complete frame is buffered and ready for extraction.
    pub fn is_complete(&self) -> bool {
        self.state == State::Complete
    }

    /// Extract `(address, command, payload)` from the completed frame and
    /// reset the parser.
    ///
    /// Fails with [`FrameError::ParserNotReady`] unless the last `push`
    /// returned `true`.
    pub fn take_fields(&mut self) -> Result<(u8, u8, Bytes)> {
        if self.state != State::Complete {
            return Err(FrameError::ParserNotReady);
        }
        let raw = self.buf.split().freeze();
        self.reset();
        let address = raw[1];
        let command = raw[2];
        let data_len = usize::from(raw[3]);
        let payload = raw.slice(HEADER_LEN..HEADER_LEN + data_len);
        Ok((address, command, payload))
    }

    /// Extract the raw bytes of the completed frame (`STX` through `CR`)
    /// and reset the parser.
    ///
    /// Fails with [`FrameError::ParserNotReady`] unless the last `push`
    /// returned `true`.
    pub fn take_raw(&mut self) -> Result<Bytes> {
        if self.state != State::Complete {
            return Err(FrameError::ParserNotReady);
        }
        let raw = self.buf.split().freeze();
        self.reset();
        Ok(raw)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
