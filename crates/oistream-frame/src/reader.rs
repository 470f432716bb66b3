use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use crate::error::{FrameError, Result};
use crate::parser::{ParserStats, StreamParser};
use crate::sensor::SensorFrame;

const DEFAULT_READ_CHUNK_SIZE: usize = 4 * 1024;

/// Reads complete sensor frames from any `Read` stream.
///
/// Handles partial reads internally; callers always get complete frames.
pub struct FrameReader<T> {
    inner: T,
    parser: StreamParser,
    ready: VecDeque<SensorFrame>,
    chunk: Vec<u8>,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader over the Open Interface registry.
    pub fn new(inner: T) -> Self {
        Self::with_parser(inner, StreamParser::new())
    }

    /// Create a new frame reader with an explicitly configured parser.
    pub fn with_parser(inner: T, parser: StreamParser) -> Self {
        Self {
            inner,
            parser,
            ready: VecDeque::new(),
            chunk: vec![0u8; DEFAULT_READ_CHUNK_SIZE],
        }
    }

    /// Limit how many bytes each underlying read may return.
    ///
    /// Values below 1 are treated as 1.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk.resize(chunk_size.max(1), 0);
        self
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<SensorFrame> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Ok(frame);
            }

            let read = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.parser.parse(&self.chunk[..read], &mut self.ready);
        }
    }

    /// Counters of the underlying parser.
    pub fn stats(&self) -> &ParserStats {
        self.parser.stats()
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<SensorFrame>;

    /// Yields frames until EOF; other errors are yielded once each.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(FrameError::ConnectionClosed) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
