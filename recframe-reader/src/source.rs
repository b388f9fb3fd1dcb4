//! Byte sources.
//!
//! A byte source is anything the reader can pull bytes from sequentially.
//! The reader owns its source and releases it exactly once through
//! [`ByteSource::close`], which consumes the source.

use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::Path;

/// A sequential, readable byte stream that can be released.
///
/// `Read::read` returning `Ok(0)` is end-of-stream; any `Err` other than
/// `Interrupted` is an I/O failure distinct from end-of-stream.
pub trait ByteSource: Read {
    /// Releases the source. The default drops it.
    fn close(self) -> io::Result<()>
    where
        Self: Sized,
    {
        Ok(())
    }
}

impl ByteSource for File {}

impl ByteSource for &[u8] {}

impl<T: AsRef<[u8]>> ByteSource for Cursor<T> {}

impl<R: ByteSource> ByteSource for BufReader<R> {
    fn close(self) -> io::Result<()> {
        self.into_inner().close()
    }
}

/// Adapts any reader into a [`ByteSource`] released by dropping it.
#[derive(Debug)]
pub struct ReadSource<R>(R);

impl<R: Read> ReadSource<R> {
    pub fn new(inner: R) -> Self {
        Self(inner)
    }

    /// Consumes the adapter and returns the inner reader.
    pub fn into_inner(self) -> R {
        self.0
    }
}

impl<R: Read> Read for ReadSource<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read> ByteSource for ReadSource<R> {}

/// Opens a file as a buffered byte source positioned at its start.
pub fn open_path(path: impl AsRef<Path>) -> io::Result<BufReader<File>> {
    let file = File::open(path.as_ref())?;
    Ok(BufReader::new(file))
}
