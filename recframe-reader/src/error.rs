//! Reader error types.

use std::fmt;
use thiserror::Error;

/// A field of the framing envelope, in stream order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSection {
    /// The 8-byte little-endian payload length.
    Length,
    /// The 4-byte check over the length field.
    LengthCheck,
    /// The payload bytes.
    Payload,
    /// The 4-byte check over the payload.
    PayloadCheck,
}

impl fmt::Display for FrameSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FrameSection::Length => "length",
            FrameSection::LengthCheck => "length check",
            FrameSection::Payload => "payload",
            FrameSection::PayloadCheck => "payload check",
        };
        f.write_str(name)
    }
}

/// Why a reader stopped producing records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// No bytes were left at the start of a new frame.
    CleanEnd,
    /// The source ended partway through a frame.
    Truncated {
        offset: u64,
        section: FrameSection,
        expected: u64,
        actual: u64,
    },
    /// The declared length exceeded the configured ceiling.
    Oversized { offset: u64, length: u64, max: u64 },
    /// The source reported an error other than end-of-stream.
    Io {
        offset: u64,
        kind: std::io::ErrorKind,
    },
    /// The length check did not match (only with checksum verification on).
    ChecksumMismatch {
        offset: u64,
        section: FrameSection,
        expected: u32,
        actual: u32,
    },
}

impl Termination {
    /// Returns whether the source was consumed to a frame boundary without error.
    pub fn is_clean(&self) -> bool {
        matches!(self, Termination::CleanEnd)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::CleanEnd => f.write_str("clean end of stream"),
            Termination::Truncated {
                offset,
                section,
                expected,
                actual,
            } => write!(
                f,
                "truncated frame at offset {}: {} needs {} bytes, got {}",
                offset, section, expected, actual
            ),
            Termination::Oversized {
                offset,
                length,
                max,
            } => write!(
                f,
                "oversized length at offset {}: {} bytes (max {})",
                offset, length, max
            ),
            Termination::Io { offset, kind } => {
                write!(f, "I/O failure at offset {}: {}", offset, kind)
            }
            Termination::ChecksumMismatch {
                offset,
                section,
                expected,
                actual,
            } => write!(
                f,
                "{} mismatch at offset {}: expected {:#x}, got {:#x}",
                section, offset, expected, actual
            ),
        }
    }
}

/// Errors yielded by a [`RecordReader`](crate::RecordReader).
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("truncated frame at offset {offset}: {section} needs {expected} bytes, got {actual}")]
    TruncatedFrame {
        offset: u64,
        section: FrameSection,
        expected: u64,
        actual: u64,
    },

    #[error("declared length {length} at offset {offset} exceeds maximum {max}")]
    OversizedLength { offset: u64, length: u64, max: u64 },

    #[error("I/O error at offset {offset}: {source}")]
    Io {
        offset: u64,
        source: std::io::Error,
    },

    #[error("{section} mismatch at offset {offset}: expected {expected:#x}, got {actual:#x}")]
    ChecksumMismatch {
        offset: u64,
        section: FrameSection,
        expected: u32,
        actual: u32,
    },

    #[error("record {index} at offset {offset} failed to decode: {source}")]
    Payload {
        index: u64,
        offset: u64,
        source: PayloadError,
    },
}

impl ReadError {
    /// Returns whether this error ends the record sequence.
    ///
    /// Payload-level failures leave the framing intact, so the reader moves on
    /// to the next frame after yielding them.
    pub fn is_terminal(&self) -> bool {
        match self {
            ReadError::Payload { .. } => false,
            ReadError::ChecksumMismatch { section, .. } => *section != FrameSection::PayloadCheck,
            _ => true,
        }
    }

    /// Returns the termination this error stands for, if it is terminal.
    pub fn termination(&self) -> Option<Termination> {
        if !self.is_terminal() {
            return None;
        }
        let termination = match self {
            ReadError::TruncatedFrame {
                offset,
                section,
                expected,
                actual,
            } => Termination::Truncated {
                offset: *offset,
                section: *section,
                expected: *expected,
                actual: *actual,
            },
            ReadError::OversizedLength {
                offset,
                length,
                max,
            } => Termination::Oversized {
                offset: *offset,
                length: *length,
                max: *max,
            },
            ReadError::Io { offset, source } => Termination::Io {
                offset: *offset,
                kind: source.kind(),
            },
            ReadError::ChecksumMismatch {
                offset,
                section,
                expected,
                actual,
            } => Termination::ChecksumMismatch {
                offset: *offset,
                section: *section,
                expected: *expected,
                actual: *actual,
            },
            ReadError::Payload { .. } => return None,
        };
        Some(termination)
    }
}

/// Errors from a [`PayloadDecoder`](crate::PayloadDecoder).
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid UTF-8 in payload: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("{0}")]
    Custom(String),
}

/// An unrecognized payload format tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown payload format: {0}")]
pub struct UnknownFormat(pub String);
