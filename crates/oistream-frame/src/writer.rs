use std::io::{ErrorKind, Write};
use std::sync::Arc;

use bytes::BytesMut;

use crate::codec::{encode_frame, ParserConfig, SensorRecord, HEADER_SIZE, MAX_PAYLOAD};
use crate::error::{FrameError, Result};
use crate::registry::SensorRegistry;

const INITIAL_BUFFER_CAPACITY: usize = HEADER_SIZE + MAX_PAYLOAD + 1;

/// Writes complete sensor frames to any `Write` stream.
///
/// This is the robot side of the wire; the host uses it to replay or
/// simulate a stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    registry: Arc<SensorRegistry>,
    config: ParserConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer over the Open Interface registry.
    pub fn new(inner: T) -> Self {
        Self::with_config(
            inner,
            SensorRegistry::open_interface_shared(),
            ParserConfig::default(),
        )
    }

    /// Create a new frame writer with explicit registry and configuration.
    pub fn with_config(inner: T, registry: Arc<SensorRegistry>, config: ParserConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            registry,
            config,
        }
    }

    /// Encode and send one frame.
    pub fn send(&mut self, records: &[SensorRecord]) -> Result<()> {
        self.buf.clear();
        encode_frame(records, &self.registry, self.config.marker, &mut self.buf)?;

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};

    use super::*;
    use crate::parser::StreamParser;

    #[test]
    fn writes_encoded_frame() {
        let mut writer = FrameWriter::new(Vec::new());
        writer
            .send(&[
                SensorRecord::new(46, 0x0A07),
                SensorRecord::new(47, 0x0AC8),
                SensorRecord::new(13, 1),
            ])
            .unwrap();

        assert_eq!(
            writer.get_ref().as_slice(),
            &[19, 8, 46, 10, 7, 47, 10, 200, 13, 1, 151]
        );
    }

    #[test]
    fn consecutive_frames_parse_back() {
        let mut writer = FrameWriter::new(Vec::new());
        writer.send(&[SensorRecord::new(24, 31)]).unwrap();
        writer.send(&[SensorRecord::new(24, 32)]).unwrap();

        let mut parser = StreamParser::new();
        let frames = parser.feed(&writer.into_inner());
        let temps: Vec<i32> = frames.iter().map(|f| f.sensors[0].value).collect();
        assert_eq!(temps, vec![31, 32]);
        assert!(frames.iter().all(|f| f.checksum_ok));
    }

    #[test]
    fn encode_errors_write_nothing() {
        let mut writer = FrameWriter::new(Vec::new());
        let err = writer.send(&[SensorRecord::new(200, 0)]).unwrap_err();
        assert!(matches!(err, FrameError::UnknownSensorId(200)));
        assert!(writer.get_ref().is_empty());
    }

    #[test]
    fn short_writes_are_completed() {
        let mut writer = FrameWriter::new(OneByteWriter::default());
        writer.send(&[SensorRecord::new(22, 16_000)]).unwrap();
        assert_eq!(writer.get_ref().written.len(), 6);
        assert!(writer.get_ref().flushed);
    }

    #[test]
    fn zero_write_reports_closed() {
        let mut writer = FrameWriter::new(ClosedWriter);
        let err = writer.send(&[SensorRecord::new(8, 1)]).unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn would_block_is_returned_to_caller() {
        let mut writer = FrameWriter::new(BlockedWriter);
        let err = writer.send(&[SensorRecord::new(8, 1)]).unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == io::ErrorKind::WouldBlock));
    }

    #[derive(Default)]
    struct OneByteWriter {
        written: Vec<u8>,
        flushed: bool,
    }

    impl Write for OneByteWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            match buf.first() {
                Some(&b) => {
                    self.written.push(b);
                    Ok(1)
                }
                None => Ok(0),
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushed = true;
            Ok(())
        }
    }

    struct ClosedWriter;

    impl Write for ClosedWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct BlockedWriter;

    impl Write for BlockedWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from(io::ErrorKind::WouldBlock))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }
}
