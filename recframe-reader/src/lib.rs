//! # recframe-reader
//!
//! Streaming decoder for length-framed event record files.
//!
//! This crate provides:
//! - A lazy, single-pass [`RecordReader`] over any sequential byte source
//! - A typed termination taxonomy (clean end, truncation, oversize, I/O)
//! - Pluggable payload decoders keyed by [`PayloadFormat`]
//! - Optional masked CRC32C verification of the check fields
//! - Whole-source scanning for integrity reports

pub mod config;
pub mod error;
pub mod frame;
pub mod payload;
pub mod reader;
pub mod scan;
pub mod source;

pub use config::{ChecksumPolicy, ConfigError, ReaderConfig};
pub use error::{FrameSection, PayloadError, ReadError, Termination, UnknownFormat};
pub use frame::{masked_crc32c, FrameHeader, RawFrame, FRAME_OVERHEAD, HEADER_SIZE};
pub use payload::{
    JsonPayload, PayloadDecoder, PayloadFormat, PayloadValue, RawPayload, Utf8Payload,
};
pub use reader::{Record, RecordReader};
pub use scan::{scan, scan_path, ScanReport};
pub use source::{open_path, ByteSource, ReadSource};

/// Default ceiling on a single record's declared payload length (256 MiB).
pub const DEFAULT_MAX_RECORD_SIZE: u64 = 256 * 1024 * 1024;

/// Default cap on the payload buffer allocated before any payload bytes arrive (64 KiB).
pub const DEFAULT_INITIAL_PAYLOAD_CAPACITY: usize = 64 * 1024;
