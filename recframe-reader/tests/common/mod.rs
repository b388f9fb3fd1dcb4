//! Shared helpers for reader integration tests.

#![allow(dead_code)]

use bytes::BufMut;
use recframe_reader::{masked_crc32c, ByteSource};
use std::cell::Cell;
use std::io::{self, Cursor, Read};
use std::rc::Rc;

/// Frames a payload the way a conforming producer would.
pub fn frame(payload: &[u8]) -> Vec<u8> {
    let length = payload.len() as u64;
    let mut buf = Vec::with_capacity(16 + payload.len());
    buf.put_u64_le(length);
    buf.put_u32_le(masked_crc32c(&length.to_le_bytes()));
    buf.put_slice(payload);
    buf.put_u32_le(masked_crc32c(payload));
    buf
}

/// Frames each payload and concatenates the results.
pub fn stream<P: AsRef<[u8]>>(payloads: &[P]) -> Vec<u8> {
    payloads.iter().flat_map(|p| frame(p.as_ref())).collect()
}

/// In-memory source that counts how many times it is closed.
pub struct CountingSource {
    inner: Cursor<Vec<u8>>,
    closes: Rc<Cell<u32>>,
}

impl CountingSource {
    pub fn new(bytes: Vec<u8>) -> (Self, Rc<Cell<u32>>) {
        let closes = Rc::new(Cell::new(0));
        let source = Self {
            inner: Cursor::new(bytes),
            closes: closes.clone(),
        };
        (source, closes)
    }
}

impl Read for CountingSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl ByteSource for CountingSource {
    fn close(self) -> io::Result<()> {
        self.closes.set(self.closes.get() + 1);
        Ok(())
    }
}
