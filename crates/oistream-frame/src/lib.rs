//! Streaming decoder for Open Interface sensor frames.
//!
//! A robot publishes its sensor stream as arbitrarily chunked fragments.
//! Every frame on the wire is:
//! - A marker byte (19)
//! - A payload length byte `N`
//! - `N` bytes of `(packet id, value bytes)` records
//! - One checksum byte making the sum of all frame bytes zero (mod 256)
//!
//! [`StreamParser`] keeps partial state across chunks, so callers push
//! whatever the transport delivered and receive complete [`SensorFrame`]s.

pub mod checksum;
pub mod codec;
pub mod error;
pub mod parser;
pub mod reader;
pub mod registry;
pub mod sample;
pub mod sensor;
pub mod writer;

#[cfg(feature = "async")]
pub mod stream_codec;

pub use checksum::Checksum;
pub use codec::{encode_frame, ParserConfig, SensorRecord, FRAME_MARKER, HEADER_SIZE, MAX_PAYLOAD};
pub use error::{FrameError, Result};
pub use parser::{FrameListener, ParseState, ParserStats, StreamParser};
pub use reader::FrameReader;
pub use registry::{ByteLength, SensorDefinition, SensorRegistry, OPEN_INTERFACE};
pub use sample::{sample_records, SampleValues};
pub use sensor::{ParsedSensor, SensorFrame};
pub use writer::FrameWriter;

#[cfg(feature = "async")]
pub use stream_codec::SensorStreamCodec;
