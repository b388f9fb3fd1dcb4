//! Lazy record reader.
//!
//! [`RecordReader`] pulls one frame at a time from its source, hands the
//! payload to a [`PayloadDecoder`] and yields the result. Framing errors are
//! yielded once as the final item; payload errors are yielded in place and
//! decoding carries on with the next frame.

use crate::config::ReaderConfig;
use crate::error::{FrameSection, ReadError, Termination};
use crate::frame::{FrameHeader, RawFrame, CHECK_SIZE, LENGTH_SIZE};
use crate::payload::PayloadDecoder;
use crate::source::{open_path, ByteSource};
use bytes::Bytes;
use std::fs::File;
use std::io::{self, BufReader, ErrorKind, Read};
use std::iter::FusedIterator;
use std::path::Path;

/// A decoded record and where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    /// Zero-based position of the frame in the stream.
    pub index: u64,
    /// Byte offset of the frame start.
    pub offset: u64,
    /// Declared payload length.
    pub payload_len: u64,
    pub value: T,
}

impl<T> Record<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

/// Single-pass reader over a framed record stream.
///
/// The source is closed exactly once: when the stream terminates, when
/// [`close`](Self::close) is called, or when the reader is dropped.
pub struct RecordReader<S: ByteSource, D> {
    source: Option<S>,
    decoder: D,
    config: ReaderConfig,
    /// Bytes consumed from the source so far.
    offset: u64,
    frames_read: u64,
    termination: Option<Termination>,
}

impl<D> RecordReader<BufReader<File>, D> {
    /// Opens a file and reads records from its start.
    pub fn open(path: impl AsRef<Path>, decoder: D, config: ReaderConfig) -> io::Result<Self> {
        let source = open_path(path)?;
        Ok(Self::with_config(source, decoder, config))
    }
}

impl<S: ByteSource, D> RecordReader<S, D> {
    /// Creates a reader with default configuration.
    pub fn new(source: S, decoder: D) -> Self {
        Self::with_config(source, decoder, ReaderConfig::default())
    }

    /// Creates a reader with explicit configuration.
    pub fn with_config(source: S, decoder: D, config: ReaderConfig) -> Self {
        Self {
            source: Some(source),
            decoder,
            config,
            offset: 0,
            frames_read: 0,
            termination: None,
        }
    }

    /// Why the reader stopped, or `None` while records may still follow.
    pub fn termination(&self) -> Option<&Termination> {
        self.termination.as_ref()
    }

    /// Number of complete frames read so far.
    pub fn frames_read(&self) -> u64 {
        self.frames_read
    }

    /// Bytes consumed from the source so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Stops reading and releases the source now.
    ///
    /// Unlike dropping the reader, this surfaces the close error.
    pub fn close(mut self) -> io::Result<()> {
        match self.source.take() {
            Some(source) => source.close(),
            None => Ok(()),
        }
    }

    /// Reads the next complete frame.
    ///
    /// Returns `Ok(None)` on a clean end of stream. Every error returned here
    /// is terminal.
    fn read_frame(&mut self) -> Result<Option<RawFrame>, ReadError> {
        let Some(source) = self.source.as_mut() else {
            return Ok(None);
        };
        let frame_offset = self.offset;

        // Length (8 bytes)
        let mut length_buf = [0u8; LENGTH_SIZE];
        let read = read_full(source, &mut length_buf, &mut self.offset)
            .map_err(|e| io_error(frame_offset, e))?;
        if read == 0 {
            return Ok(None);
        }
        if read < LENGTH_SIZE {
            return Err(truncated(frame_offset, FrameSection::Length, LENGTH_SIZE, read));
        }

        let length = FrameHeader::length_from_bytes(length_buf);
        let max = self.config.max_record_size;
        let Some(payload_len) = usize::try_from(length).ok().filter(|_| length <= max) else {
            return Err(ReadError::OversizedLength {
                offset: frame_offset,
                length,
                max,
            });
        };

        // Length check (4 bytes)
        let mut check_buf = [0u8; CHECK_SIZE];
        let read = read_full(source, &mut check_buf, &mut self.offset)
            .map_err(|e| io_error(frame_offset, e))?;
        if read < CHECK_SIZE {
            return Err(truncated(frame_offset, FrameSection::LengthCheck, CHECK_SIZE, read));
        }
        let header = FrameHeader {
            length,
            length_check: FrameHeader::check_from_bytes(check_buf),
        };
        if self.config.verifies_checksums() && !header.length_check_matches() {
            return Err(ReadError::ChecksumMismatch {
                offset: frame_offset,
                section: FrameSection::LengthCheck,
                expected: header.expected_length_check(),
                actual: header.length_check,
            });
        }

        tracing::debug!(
            "Frame {} at offset {}: {} byte payload",
            self.frames_read,
            frame_offset,
            length
        );

        // Payload (length bytes)
        let mut payload =
            Vec::with_capacity(payload_len.min(self.config.initial_payload_capacity));
        let read = match source.by_ref().take(length).read_to_end(&mut payload) {
            Ok(n) => n,
            Err(e) => {
                self.offset += payload.len() as u64;
                return Err(io_error(frame_offset, e));
            }
        };
        self.offset += read as u64;
        if read < payload_len {
            return Err(truncated(frame_offset, FrameSection::Payload, payload_len, read));
        }

        // Payload check (4 bytes)
        let read = read_full(source, &mut check_buf, &mut self.offset)
            .map_err(|e| io_error(frame_offset, e))?;
        if read < CHECK_SIZE {
            return Err(truncated(frame_offset, FrameSection::PayloadCheck, CHECK_SIZE, read));
        }

        Ok(Some(RawFrame {
            offset: frame_offset,
            header,
            payload: Bytes::from(payload),
            payload_check: FrameHeader::check_from_bytes(check_buf),
        }))
    }

    /// Records the termination and releases the source.
    fn finish(&mut self, termination: Termination) {
        match &termination {
            Termination::CleanEnd => tracing::debug!(
                "Reached end of stream after {} frames ({} bytes)",
                self.frames_read,
                self.offset
            ),
            other => tracing::warn!("Stopped after {} frames: {}", self.frames_read, other),
        }

        if let Some(source) = self.source.take() {
            if let Err(e) = source.close() {
                tracing::warn!("Failed to close byte source: {}", e);
            }
        }
        self.termination = Some(termination);
    }
}

impl<S: ByteSource, D: PayloadDecoder> Iterator for RecordReader<S, D> {
    type Item = Result<Record<D::Record>, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.termination.is_some() {
            return None;
        }

        let frame = match self.read_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                self.finish(Termination::CleanEnd);
                return None;
            }
            Err(err) => {
                if let Some(termination) = err.termination() {
                    self.finish(termination);
                }
                return Some(Err(err));
            }
        };

        let index = self.frames_read;
        self.frames_read += 1;

        if self.config.verifies_checksums() && !frame.payload_check_matches() {
            tracing::warn!(
                "Payload check mismatch in frame {} at offset {}",
                index,
                frame.offset
            );
            return Some(Err(ReadError::ChecksumMismatch {
                offset: frame.offset,
                section: FrameSection::PayloadCheck,
                expected: frame.expected_payload_check(),
                actual: frame.payload_check,
            }));
        }

        let offset = frame.offset;
        let payload_len = frame.header.length;
        let item = match self.decoder.decode(frame.payload) {
            Ok(value) => Ok(Record {
                index,
                offset,
                payload_len,
                value,
            }),
            Err(source) => {
                tracing::debug!("Frame {} payload rejected: {}", index, source);
                Err(ReadError::Payload {
                    index,
                    offset,
                    source,
                })
            }
        };
        tracing::trace!("Yielding frame {}", index);
        Some(item)
    }
}

impl<S: ByteSource, D: PayloadDecoder> FusedIterator for RecordReader<S, D> {}

impl<S: ByteSource, D> Drop for RecordReader<S, D> {
    fn drop(&mut self) {
        if let Some(source) = self.source.take() {
            tracing::debug!(
                "Reader dropped after {} frames, releasing source",
                self.frames_read
            );
            if let Err(e) = source.close() {
                tracing::warn!("Failed to close byte source: {}", e);
            }
        }
    }
}

/// Reads until `buf` is full or the source is exhausted, returning the count read.
///
/// `consumed` advances as bytes arrive, so it stays accurate when a read fails.
fn read_full<R: Read>(source: &mut R, buf: &mut [u8], consumed: &mut u64) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => {
                filled += n;
                *consumed += n as u64;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn io_error(offset: u64, source: io::Error) -> ReadError {
    ReadError::Io { offset, source }
}

fn truncated(offset: u64, section: FrameSection, expected: usize, actual: usize) -> ReadError {
    ReadError::TruncatedFrame {
        offset,
        section,
        expected: expected as u64,
        actual: actual as u64,
    }
}
