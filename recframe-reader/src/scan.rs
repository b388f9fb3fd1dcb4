//! Whole-source integrity scan.
//!
//! Walks every frame of a source without interpreting payloads and reports
//! what was found and why the walk stopped.

use crate::config::ReaderConfig;
use crate::error::{ReadError, Termination};
use crate::payload::RawPayload;
use crate::reader::RecordReader;
use crate::source::ByteSource;
use std::io;
use std::path::Path;

/// Result of scanning a framed source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    /// Number of well-formed records.
    pub records: u64,
    /// Sum of payload lengths of well-formed records.
    pub payload_bytes: u64,
    /// Bytes consumed from the source, including any partial trailing frame.
    pub bytes_consumed: u64,
    /// Frames whose framing was intact but whose payload was rejected.
    pub payload_failures: u64,
    /// Largest payload seen.
    pub largest_record: u64,
    /// Why the scan stopped.
    pub termination: Termination,
}

impl ScanReport {
    /// Returns whether every frame was well-formed and the source ended cleanly.
    pub fn is_clean(&self) -> bool {
        self.payload_failures == 0 && self.termination.is_clean()
    }
}

/// Scans a source to its end.
pub fn scan<S: ByteSource>(source: S, config: ReaderConfig) -> ScanReport {
    let mut reader = RecordReader::with_config(source, RawPayload, config);

    let mut records = 0u64;
    let mut payload_bytes = 0u64;
    let mut payload_failures = 0u64;
    let mut largest_record = 0u64;

    for item in reader.by_ref() {
        match item {
            Ok(record) => {
                records += 1;
                payload_bytes += record.payload_len;
                largest_record = largest_record.max(record.payload_len);
            }
            // Recorded by the reader as its termination.
            Err(err) if err.is_terminal() => {}
            Err(ReadError::ChecksumMismatch { offset, .. }) => {
                payload_failures += 1;
                tracing::debug!("Payload check mismatch at offset {}", offset);
            }
            Err(_) => payload_failures += 1,
        }
    }

    let termination = reader
        .termination()
        .cloned()
        .unwrap_or(Termination::CleanEnd);

    let report = ScanReport {
        records,
        payload_bytes,
        bytes_consumed: reader.offset(),
        payload_failures,
        largest_record,
        termination,
    };

    tracing::info!(
        "Scan complete: {} records, {} payload bytes, {} failures ({})",
        report.records,
        report.payload_bytes,
        report.payload_failures,
        report.termination
    );

    report
}

/// Opens a file and scans it.
pub fn scan_path(path: impl AsRef<Path>, config: ReaderConfig) -> io::Result<ScanReport> {
    let source = crate::source::open_path(path)?;
    Ok(scan(source, config))
}
