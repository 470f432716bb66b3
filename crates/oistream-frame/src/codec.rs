use bytes::{BufMut, BytesMut};

use crate::checksum::Checksum;
use crate::error::{FrameError, Result};
use crate::registry::SensorRegistry;

/// Marker byte that opens every stream frame.
pub const FRAME_MARKER: u8 = 19;

/// Frame header: marker (1) + payload length (1) = 2 bytes.
pub const HEADER_SIZE: usize = 2;

/// Largest payload a single length byte can describe.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// A sensor value to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorRecord {
    /// Packet id.
    pub id: u8,
    /// Value; must fit the sensor's width.
    pub value: i32,
}

impl SensorRecord {
    /// Create a new record.
    pub fn new(id: u8, value: i32) -> Self {
        Self { id, value }
    }
}

/// Configuration for stream decoding and encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Marker byte that opens a frame. Default: 19.
    pub marker: u8,
    /// Deliver frames whose checksum failed (flagged `checksum_ok = false`).
    /// When false they are counted and dropped. Default: true.
    pub emit_corrupt_frames: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            marker: FRAME_MARKER,
            emit_corrupt_frames: true,
        }
    }
}

/// Encode records into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────┬────────┬──────────────────────────────┬──────────┐
/// │ Marker │ Length │ Records                      │ Checksum │
/// │ (1B)   │ N (1B) │ id, value (1 or 2B BE) ...   │ (1B)     │
/// │ 0x13   │        │ N bytes                      │          │
/// └────────┴────────┴──────────────────────────────┴──────────┘
/// ```
/// The checksum makes the sum of all frame bytes zero modulo 256.
pub fn encode_frame(
    records: &[SensorRecord],
    registry: &SensorRegistry,
    marker: u8,
    dst: &mut BytesMut,
) -> Result<()> {
    let mut payload = BytesMut::with_capacity(records.len() * 3);
    for record in records {
        let def = registry
            .lookup(record.id)
            .ok_or(FrameError::UnknownSensorId(record.id))?;
        let (high, low) = def.encode(record.value).ok_or(FrameError::ValueOutOfRange {
            id: record.id,
            value: record.value,
        })?;
        payload.put_u8(record.id);
        if def.byte_len.get() == 2 {
            payload.put_u8(high);
        }
        payload.put_u8(low);
    }

    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }

    let start = dst.len();
    dst.reserve(HEADER_SIZE + payload.len() + 1);
    dst.put_u8(marker);
    dst.put_u8(payload.len() as u8);
    dst.put_slice(&payload);
    let trailer = Checksum::complement_of(&dst[start..]);
    dst.put_u8(trailer);
    Ok(())
}
