//! Frame layout.
//!
//! Each record in the stream is wrapped in the following envelope:
//!
//! ```text
//! +-------------------+--------------+-------------------+---------------+
//! | length            | length_check | payload           | payload_check |
//! | 8 bytes (u64 LE)  | 4 bytes      | length bytes      | 4 bytes       |
//! +-------------------+--------------+-------------------+---------------+
//! ```
//!
//! The check fields are masked CRC32C values (little-endian) when written by
//! a conforming producer. Readers skip them unless verification is enabled.

use bytes::Bytes;

/// Size of the length field.
pub const LENGTH_SIZE: usize = 8;

/// Size of each check field.
pub const CHECK_SIZE: usize = 4;

/// Size of the frame header (length + length check).
pub const HEADER_SIZE: usize = LENGTH_SIZE + CHECK_SIZE;

/// Size of the frame footer (payload check).
pub const FOOTER_SIZE: usize = CHECK_SIZE;

/// Bytes of envelope around every payload.
pub const FRAME_OVERHEAD: usize = HEADER_SIZE + FOOTER_SIZE;

const MASK_DELTA: u32 = 0xa282_ead8;

/// Computes the masked CRC32C used by the check fields.
pub fn masked_crc32c(data: &[u8]) -> u32 {
    crc32c::crc32c(data).rotate_right(15).wrapping_add(MASK_DELTA)
}

/// A parsed frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub length: u64,
    pub length_check: u32,
}

impl FrameHeader {
    /// Interprets the raw length field.
    pub fn length_from_bytes(buf: [u8; LENGTH_SIZE]) -> u64 {
        u64::from_le_bytes(buf)
    }

    /// Interprets a raw check field.
    pub fn check_from_bytes(buf: [u8; CHECK_SIZE]) -> u32 {
        u32::from_le_bytes(buf)
    }

    /// Returns the check a conforming producer would have written for this length.
    pub fn expected_length_check(&self) -> u32 {
        masked_crc32c(&self.length.to_le_bytes())
    }

    /// Returns whether the stored length check matches the length.
    pub fn length_check_matches(&self) -> bool {
        self.length_check == self.expected_length_check()
    }
}

/// A complete frame as read from the source, before payload decoding.
#[derive(Debug, Clone)]
pub struct RawFrame {
    /// Byte offset of the frame start within the source.
    pub offset: u64,
    pub header: FrameHeader,
    pub payload: Bytes,
    pub payload_check: u32,
}

impl RawFrame {
    /// Returns the check a conforming producer would have written for this payload.
    pub fn expected_payload_check(&self) -> u32 {
        masked_crc32c(&self.payload)
    }

    /// Returns whether the stored payload check matches the payload.
    pub fn payload_check_matches(&self) -> bool {
        self.payload_check == self.expected_payload_check()
    }

    /// Returns the total size of this frame in the source.
    pub fn frame_len(&self) -> u64 {
        FRAME_OVERHEAD as u64 + self.payload.len() as u64
    }
}
