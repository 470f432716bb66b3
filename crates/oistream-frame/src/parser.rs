//! Push-based stream parser.
//!
//! State machine:
//!
//! ```text
//! SeekMarker ──marker──> Length ──N > 0──> RecordId ──width 1──> SingleByte ──┐
//!   ^   │                  │                 │   └──width 2──> HighByte        │
//!   │   └─ other: skip     │ N = 0           │                    │            │
//!   │                      v                 │                 LowByte ────────┤
//!   │                   Checksum <───────────┼──── payload consumed ───────────┤
//!   │                      │                 │                                 │
//!   ├──── emit frame ──────┘                 │ <──── more payload ─────────────┘
//!   └──── unknown id / overrun: abort ───────┘
//! ```
//!
//! Every byte from the marker through the checksum byte feeds the running
//! [`Checksum`]. All state survives across [`StreamParser::parse`] calls, so a
//! record may be split anywhere between two chunks.

use std::collections::VecDeque;
use std::sync::mpsc::Sender;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::checksum::Checksum;
use crate::codec::ParserConfig;
use crate::error::FrameError;
use crate::registry::{ByteLength, SensorDefinition, SensorRegistry};
use crate::sensor::{ParsedSensor, SensorFrame};

/// Receives frames as the parser completes them.
pub trait FrameListener {
    /// Called once per frame, in the order checksum bytes are consumed.
    fn on_frame(&mut self, frame: SensorFrame);
}

impl<F: FnMut(SensorFrame)> FrameListener for F {
    fn on_frame(&mut self, frame: SensorFrame) {
        self(frame)
    }
}

impl FrameListener for Vec<SensorFrame> {
    fn on_frame(&mut self, frame: SensorFrame) {
        self.push(frame);
    }
}

impl FrameListener for VecDeque<SensorFrame> {
    fn on_frame(&mut self, frame: SensorFrame) {
        self.push_back(frame);
    }
}

impl FrameListener for Sender<SensorFrame> {
    fn on_frame(&mut self, frame: SensorFrame) {
        // A dropped receiver means nobody is interested any more.
        let _ = self.send(frame);
    }
}

/// Current parse mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseState {
    /// Outside a frame, scanning for the marker byte.
    SeekMarker,
    /// Marker seen, next byte is the payload length.
    Length,
    /// Inside a frame, next byte is a packet id.
    RecordId,
    /// Next byte is the value of a one-byte sensor.
    SingleByte(SensorDefinition),
    /// Next byte is the high byte of a two-byte sensor.
    HighByte(SensorDefinition),
    /// Next byte is the low byte of a two-byte sensor.
    LowByte { def: SensorDefinition, high: u8 },
    /// Payload consumed, next byte is the checksum.
    Checksum,
}

/// Counters describing everything a parser has seen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParserStats {
    /// Bytes passed to `parse`.
    pub bytes_consumed: u64,
    /// Bytes discarded while scanning for a marker.
    pub bytes_skipped: u64,
    /// Frames delivered to a listener.
    pub frames_emitted: u64,
    /// Frames whose checksum failed, delivered or not.
    pub checksum_failures: u64,
    /// Frames abandoned on an unknown id or a record overrun.
    pub frames_aborted: u64,
}

/// Stateful decoder for one logical sensor stream.
///
/// Not shareable between producers: `parse` takes `&mut self`, so feeding a
/// parser from several threads needs external serialisation. Create one
/// parser per stream; the registry is shared.
#[derive(Debug)]
pub struct StreamParser {
    registry: Arc<SensorRegistry>,
    config: ParserConfig,
    state: ParseState,
    remaining: usize,
    sensors: Vec<ParsedSensor>,
    checksum: Checksum,
    stats: ParserStats,
}

impl StreamParser {
    /// Create a parser over the shared Open Interface registry.
    pub fn new() -> Self {
        Self::with_registry(SensorRegistry::open_interface_shared())
    }

    /// Create a parser over an explicit registry with default configuration.
    pub fn with_registry(registry: Arc<SensorRegistry>) -> Self {
        Self::with_config(registry, ParserConfig::default())
    }

    /// Create a parser with explicit registry and configuration.
    pub fn with_config(registry: Arc<SensorRegistry>, config: ParserConfig) -> Self {
        Self {
            registry,
            config,
            state: ParseState::SeekMarker,
            remaining: 0,
            sensors: Vec::new(),
            checksum: Checksum::new(),
            stats: ParserStats::default(),
        }
    }

    /// Consume a chunk, delivering every frame it completes to `listener`.
    pub fn parse<L: FrameListener + ?Sized>(&mut self, chunk: &[u8], listener: &mut L) {
        for &byte in chunk {
            self.stats.bytes_consumed += 1;
            if let Some(frame) = self.step(byte) {
                listener.on_frame(frame);
            }
        }
    }

    /// Consume a chunk and return the frames it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<SensorFrame> {
        let mut frames = Vec::new();
        self.parse(chunk, &mut frames);
        frames
    }

    /// Drop any partial frame and scan for the next marker.
    pub fn reset(&mut self) {
        self.state = ParseState::SeekMarker;
        self.remaining = 0;
        self.sensors.clear();
        self.checksum.reset();
    }

    /// Current parse mode.
    pub fn state(&self) -> ParseState {
        self.state
    }

    /// True when no frame is in flight.
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::SeekMarker
    }

    /// Counters since construction.
    pub fn stats(&self) -> &ParserStats {
        &self.stats
    }

    /// Registry used for record sizes.
    pub fn registry(&self) -> &Arc<SensorRegistry> {
        &self.registry
    }

    /// Current parser configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    fn step(&mut self, byte: u8) -> Option<SensorFrame> {
        match self.state {
            ParseState::SeekMarker => {
                if byte == self.config.marker {
                    self.begin_frame();
                    self.checksum.accumulate(byte);
                    self.state = ParseState::Length;
                } else {
                    self.stats.bytes_skipped += 1;
                }
                None
            }
            ParseState::Length => {
                self.checksum.accumulate(byte);
                self.remaining = usize::from(byte);
                self.state = if self.remaining == 0 {
                    ParseState::Checksum
                } else {
                    ParseState::RecordId
                };
                None
            }
            ParseState::RecordId => {
                self.checksum.accumulate(byte);
                self.remaining -= 1;
                self.start_record(byte);
                None
            }
            ParseState::SingleByte(def) => {
                self.checksum.accumulate(byte);
                self.remaining -= 1;
                self.finish_record(ParsedSensor::from_raw(&def, 0, byte));
                None
            }
            ParseState::HighByte(def) => {
                self.checksum.accumulate(byte);
                self.remaining -= 1;
                self.state = ParseState::LowByte { def, high: byte };
                None
            }
            ParseState::LowByte { def, high } => {
                self.checksum.accumulate(byte);
                self.remaining -= 1;
                self.finish_record(ParsedSensor::from_raw(&def, high, byte));
                None
            }
            ParseState::Checksum => self.finish_frame(byte),
        }
    }

    fn begin_frame(&mut self) {
        self.sensors.clear();
        self.checksum.reset();
        self.remaining = 0;
    }

    fn start_record(&mut self, id: u8) {
        let Some(def) = self.registry.lookup(id).copied() else {
            self.abort(FrameError::UnknownSensorId(id));
            return;
        };

        let needed = def.byte_len.get();
        if needed > self.remaining {
            self.abort(FrameError::RecordOverrun {
                id,
                needed,
                remaining: self.remaining,
            });
            return;
        }

        self.state = match def.byte_len {
            ByteLength::One => ParseState::SingleByte(def),
            ByteLength::Two => ParseState::HighByte(def),
        };
    }

    fn finish_record(&mut self, sensor: ParsedSensor) {
        self.sensors.push(sensor);
        self.state = if self.remaining == 0 {
            ParseState::Checksum
        } else {
            ParseState::RecordId
        };
    }

    fn finish_frame(&mut self, received: u8) -> Option<SensorFrame> {
        let expected_checksum = self.checksum.complement();
        self.checksum.accumulate(received);
        let checksum_ok = self.checksum.is_valid();

        let frame = SensorFrame {
            sensors: std::mem::take(&mut self.sensors),
            checksum_ok,
            checksum: received,
            expected_checksum,
        };
        self.reset();

        if !checksum_ok {
            self.stats.checksum_failures += 1;
            warn!(
                expected = expected_checksum,
                actual = received,
                sensors = frame.sensors.len(),
                "sensor frame checksum mismatch"
            );
            if !self.config.emit_corrupt_frames {
                return None;
            }
        }

        self.stats.frames_emitted += 1;
        Some(frame)
    }

    fn abort(&mut self, reason: FrameError) {
        debug!(error = %reason, partial = self.sensors.len(), "abandoning sensor frame");
        self.stats.frames_aborted += 1;
        self.reset();
    }
}

impl Default for StreamParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;

    use bytes::BytesMut;

    use super::*;
    use crate::codec::{encode_frame, SensorRecord, FRAME_MARKER};

    fn encode(records: &[SensorRecord]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(
            records,
            &SensorRegistry::open_interface(),
            FRAME_MARKER,
            &mut buf,
        )
        .unwrap();
        buf.to_vec()
    }

    fn values(frame: &SensorFrame) -> Vec<(u8, i32)> {
        frame.sensors.iter().map(|s| (s.id, s.value)).collect()
    }

    #[test]
    fn decodes_single_frame() {
        let mut parser = StreamParser::new();
        let frames = parser.feed(&[19, 8, 46, 10, 7, 47, 10, 200, 13, 1, 151]);

        assert_eq!(frames.len(), 1);
        assert!(frames[0].checksum_ok);
        assert_eq!(values(&frames[0]), vec![(46, 2567), (47, 2760), (13, 1)]);
        assert!(parser.is_idle());
    }

    #[test]
    fn keeps_raw_bytes() {
        let mut parser = StreamParser::new();
        let frames = parser.feed(&encode(&[SensorRecord::new(23, -2)]));
        let current = frames[0].get(23).unwrap();
        assert_eq!((current.raw_high, current.raw_low), (0xFF, 0xFE));
        assert_eq!(current.value, -2);
        assert_eq!(current.unit, "mA");
    }

    #[test]
    fn record_split_across_chunks() {
        let wire = encode(&[SensorRecord::new(22, 14_800)]);
        let mut parser = StreamParser::new();

        assert!(parser.feed(&wire[..3]).is_empty());
        let voltage = *SensorRegistry::open_interface().lookup(22).unwrap();
        assert_eq!(parser.state(), ParseState::HighByte(voltage));
        assert!(parser.feed(&wire[3..4]).is_empty());
        assert!(matches!(parser.state(), ParseState::LowByte { .. }));

        let frames = parser.feed(&wire[4..]);
        assert_eq!(values(&frames[0]), vec![(22, 14_800)]);
        assert!(frames[0].checksum_ok);
    }

    #[test]
    fn skips_garbage_before_marker() {
        let mut wire = vec![0, 1, 2, 200, 255];
        wire.extend(encode(&[SensorRecord::new(8, 1)]));

        let mut parser = StreamParser::new();
        let frames = parser.feed(&wire);

        assert_eq!(frames.len(), 1);
        assert_eq!(parser.stats().bytes_skipped, 5);
        assert_eq!(parser.stats().bytes_consumed, wire.len() as u64);
    }

    #[test]
    fn unknown_id_aborts_and_resynchronises() {
        // 99 is not an Open Interface packet.
        let mut wire = vec![19, 4, 8, 1, 99, 0];
        wire.extend(encode(&[SensorRecord::new(35, 2)]));

        let mut parser = StreamParser::new();
        let frames = parser.feed(&wire);

        assert_eq!(frames.len(), 1);
        assert_eq!(values(&frames[0]), vec![(35, 2)]);
        assert!(frames[0].checksum_ok);
        assert_eq!(parser.stats().frames_aborted, 1);
    }

    #[test]
    fn aborted_frame_does_not_stall_the_stream() {
        let mut parser = StreamParser::new();
        let frames = parser.feed(&[19, 2, 99, 0, 0, 19, 0, 237]);

        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_empty());
        assert!(frames[0].checksum_ok);
        assert_eq!(parser.stats().frames_aborted, 1);
        assert_eq!(parser.stats().bytes_skipped, 2);
    }

    #[test]
    fn marker_in_aborted_frame_swallows_next_frame() {
        // The trailing 19 of the broken frame is taken as a new marker, and
        // the real frame's marker then reads as its length byte.
        let reference = [19, 8, 46, 10, 7, 47, 10, 200, 13, 1, 151];
        let mut wire = vec![19, 4, 7, 0, 99, 19];
        wire.extend_from_slice(&reference);

        let mut parser = StreamParser::new();
        assert!(parser.feed(&wire).is_empty());
        assert_eq!(parser.stats().frames_aborted, 2);
        assert!(parser.is_idle());

        let frames = parser.feed(&reference);
        assert_eq!(frames.len(), 1);
        assert_eq!(values(&frames[0]), vec![(46, 2567), (47, 2760), (13, 1)]);
    }

    #[test]
    fn overrun_aborts_frame() {
        // Length 2 leaves one byte after id 22, which needs two.
        let mut parser = StreamParser::new();
        let frames = parser.feed(&[19, 2, 22, 0]);
        assert!(frames.is_empty());
        assert_eq!(parser.stats().frames_aborted, 1);
        assert!(parser.is_idle());
    }

    #[test]
    fn empty_frame_is_emitted() {
        let mut parser = StreamParser::new();
        let frames = parser.feed(&[19, 0, 237]);
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_empty());
        assert!(frames[0].checksum_ok);
    }

    #[test]
    fn bad_checksum_is_flagged() {
        let mut wire = encode(&[SensorRecord::new(25, 1_000)]);
        let last = wire.len() - 1;
        wire[last] ^= 0x01;

        let mut parser = StreamParser::new();
        let frames = parser.feed(&wire);

        assert_eq!(frames.len(), 1);
        assert!(!frames[0].checksum_ok);
        assert_eq!(values(&frames[0]), vec![(25, 1_000)]);
        assert_eq!(parser.stats().checksum_failures, 1);
        assert_eq!(parser.stats().frames_emitted, 1);
    }

    #[test]
    fn corrupt_frames_can_be_suppressed() {
        let mut wire = encode(&[SensorRecord::new(25, 1_000)]);
        let last = wire.len() - 1;
        wire[last] ^= 0x01;
        wire.extend(encode(&[SensorRecord::new(26, 2_000)]));

        let config = ParserConfig {
            emit_corrupt_frames: false,
            ..ParserConfig::default()
        };
        let mut parser = StreamParser::with_config(SensorRegistry::open_interface_shared(), config);
        let frames = parser.feed(&wire);

        assert_eq!(frames.len(), 1);
        assert_eq!(values(&frames[0]), vec![(26, 2_000)]);
        assert_eq!(parser.stats().checksum_failures, 1);
        assert_eq!(parser.stats().frames_emitted, 1);
    }

    #[test]
    fn marker_inside_frame_is_a_sensor_id() {
        // Packet 19 (Distance) carries the same value as the marker.
        let wire = encode(&[SensorRecord::new(19, 19), SensorRecord::new(20, -90)]);
        let mut parser = StreamParser::new();
        let frames = parser.feed(&wire);
        assert_eq!(values(&frames[0]), vec![(19, 19), (20, -90)]);
    }

    #[test]
    fn reset_discards_partial_frame() {
        let wire = encode(&[SensorRecord::new(8, 1)]);
        let mut parser = StreamParser::new();
        parser.feed(&wire[..3]);
        assert!(!parser.is_idle());

        parser.reset();
        assert!(parser.is_idle());
        assert!(parser.feed(&wire[3..]).is_empty());
    }

    #[test]
    fn closure_listener_sees_frames_in_order() {
        let mut wire = encode(&[SensorRecord::new(7, 1)]);
        wire.extend(encode(&[SensorRecord::new(7, 2)]));
        wire.extend(encode(&[SensorRecord::new(7, 3)]));

        let mut seen = Vec::new();
        let mut parser = StreamParser::new();
        parser.parse(&wire, &mut |frame: SensorFrame| seen.push(frame.sensors[0].value));

        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn channel_listener_delivers_frames() {
        let (mut tx, rx) = mpsc::channel();
        let mut parser = StreamParser::new();
        parser.parse(&encode(&[SensorRecord::new(21, 4)]), &mut tx);
        drop(tx);

        let frames: Vec<SensorFrame> = rx.iter().collect();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].sensors[0].value, 4);
    }

    #[test]
    fn custom_registry_and_marker() {
        let registry = Arc::new(
            SensorRegistry::from_definitions([
                SensorDefinition::one(1, "Left", ""),
                SensorDefinition::two(2, "Right", ""),
            ])
            .unwrap(),
        );
        let config = ParserConfig {
            marker: 0xAA,
            ..ParserConfig::default()
        };

        let mut buf = BytesMut::new();
        encode_frame(
            &[SensorRecord::new(2, -5), SensorRecord::new(1, 9)],
            &registry,
            0xAA,
            &mut buf,
        )
        .unwrap();

        let mut parser = StreamParser::with_config(registry, config);
        let mut wire = vec![19u8];
        wire.extend_from_slice(&buf);
        let frames = parser.feed(&wire);

        assert_eq!(values(&frames[0]), vec![(2, -5), (1, 9)]);
        assert_eq!(parser.stats().bytes_skipped, 1);
    }
}
