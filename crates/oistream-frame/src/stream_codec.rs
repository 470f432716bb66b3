//! `tokio_util` codec over [`StreamParser`].
//!
//! Lets an async byte source be wrapped in `FramedRead` and polled as a
//! stream of [`SensorFrame`]s.

use std::collections::VecDeque;

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_frame, SensorRecord};
use crate::error::FrameError;
use crate::parser::StreamParser;
use crate::sensor::SensorFrame;

/// Async codec for the sensor stream.
///
/// Decoding consumes every buffered byte on each call; frames that
/// complete together are queued and handed out one per `decode`.
#[derive(Debug, Default)]
pub struct SensorStreamCodec {
    parser: StreamParser,
    ready: VecDeque<SensorFrame>,
}

impl SensorStreamCodec {
    /// Codec over the Open Interface registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Codec over an explicitly configured parser.
    pub fn with_parser(parser: StreamParser) -> Self {
        Self {
            parser,
            ready: VecDeque::new(),
        }
    }

    /// The underlying parser.
    pub fn parser(&self) -> &StreamParser {
        &self.parser
    }
}

impl Decoder for SensorStreamCodec {
    type Item = SensorFrame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if !src.is_empty() {
            let chunk = src.split();
            self.parser.parse(&chunk, &mut self.ready);
        }
        Ok(self.ready.pop_front())
    }
}

impl Encoder<Vec<SensorRecord>> for SensorStreamCodec {
    type Error = FrameError;

    fn encode(&mut self, records: Vec<SensorRecord>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let marker = self.parser.config().marker;
        encode_frame(&records, self.parser.registry(), marker, dst)
    }
}
