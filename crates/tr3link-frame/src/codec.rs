use bytes::{BufMut, Bytes, BytesMut};

use crate::checksum::checksum;
use crate::error::{FrameError, Result};

/// Start-of-frame sentinel.
pub const STX: u8 = 0x02;
/// End-of-payload sentinel, third byte from the end of a frame.
pub const ETX: u8 = 0x03;
/// Frame terminator, always the final byte.
pub const CR: u8 = 0x0D;

/// Header length: `STX`, address, command, payload length.
pub const HEADER_LEN: usize = 4;
/// Footer length: `ETX`, checksum, `CR`.
pub const FOOTER_LEN: usize = 3;
/// Smallest possible frame: header plus footer with an empty payload.
pub const MIN_FRAME_LEN: usize = HEADER_LEN + FOOTER_LEN;
/// The length field is a single byte.
pub const MAX_PAYLOAD: usize = 255;

/// A command or reply frame addressed to or from a reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Reader address (`0x00` for the usual single-reader setup).
    pub address: u8,
    /// Command code. Meaning belongs to the caller, not this layer.
    pub command: u8,
    /// Opaque payload, at most [`MAX_PAYLOAD`] bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(address: u8, command: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            address,
            command,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload + footer).
    pub fn wire_size(&self) -> usize {
        HEADER_LEN + self.payload.len() + FOOTER_LEN
    }

    /// Encode this frame into its wire representation.
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        encode_frame(self.address, self.command, &self.payload, &mut buf)?;
        Ok(buf.freeze())
    }
}

/// Encode a frame into the wire format, appending to `dst`.
///
/// Wire format:
/// ```text
/// ┌──────┬──────┬──────┬──────┬────────────┬──────┬──────┬──────┐
/// │ STX  │ ADDR │ CMD  │ LEN  │ DATA       │ ETX  │ SUM  │ CR   │
/// │ 0x02 │      │      │      │ LEN bytes  │ 0x03 │      │ 0x0D │
/// └──────┴──────┴──────┴──────┴────────────┴──────┴──────┴──────┘
/// ```
/// `SUM` is the additive checksum over `STX` through `ETX` inclusive.
pub fn encode_frame(address: u8, command: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_LEN + payload.len() + FOOTER_LEN);
    let start = dst.len();
    dst.put_u8(STX);
    dst.put_u8(address);
    dst.put_u8(command);
    dst.put_u8(payload.len() as u8);
    dst.put_slice(payload);
    dst.put_u8(ETX);
    let sum = checksum(&dst[start..]);
    dst.put_u8(sum);
    dst.put_u8(CR);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_the_documented_example() {
        let mut buf = BytesMut::new();
        encode_frame(0x00, 0x42, &[0x01, 0x00], &mut buf).expect("encode should succeed");
        assert_eq!(
            buf.as_ref(),
            &[0x02, 0x00, 0x42, 0x02, 0x01, 0x00, 0x03, 0x4A, 0x0D]
        );
    }

    #[test]
    fn empty_payload_frame() {
        let mut buf = BytesMut::new();
        encode_frame(0x00, 0x4F, &[], &mut buf).expect("encode should succeed");
        assert_eq!(buf.len(), MIN_FRAME_LEN);
        assert_eq!(buf[0], STX);
        assert_eq!(buf[3], 0x00);
        assert_eq!(buf[4], ETX);
        assert_eq!(buf[6], CR);
        assert_eq!(buf[5], checksum(&buf[..5]));
    }

    #[test]
    fn max_payload_accepted() {
        let payload = vec![0xAB; MAX_PAYLOAD];
        let mut buf = BytesMut::new();
        encode_frame(0x01, 0x78, &payload, &mut buf).expect("encode should succeed");
        assert_eq!(buf.len(), HEADER_LEN + MAX_PAYLOAD + FOOTER_LEN);
        assert_eq!(buf[3], 0xFF);
    }

    #[test]
    fn oversized_payload_rejected() {
        let payload = vec![0u8; MAX_PAYLOAD + 1];
        let mut buf = BytesMut::new();
        let err = encode_frame(0x00, 0x78, &payload, &mut buf).expect_err("encode should fail");
        assert!(matches!(err, FrameError::PayloadTooLarge { size: 256, .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn appending_to_nonempty_buffer_checksums_only_the_new_frame() {
        let mut buf = BytesMut::new();
        encode_frame(0x00, 0x42, &[0x01, 0x00], &mut buf).expect("first encode should succeed");
        let first_len = buf.len();
        encode_frame(0x00, 0x42, &[0x01, 0x00], &mut buf).expect("second encode should succeed");

        assert_eq!(&buf[..first_len], &buf[first_len..]);
    }

    #[test]
    fn frame_struct_encode_matches_free_function() {
        let frame = Frame::new(0x00, 0x42, &[0x01, 0x00][..]);
        let mut buf = BytesMut::new();
        encode_frame(0x00, 0x42, &[0x01, 0x00], &mut buf).expect("encode should succeed");
        assert_eq!(
            frame.encode().expect("encode should succeed"),
            buf.freeze()
        );
        assert_eq!(frame.wire_size(), 9);
    }
}
