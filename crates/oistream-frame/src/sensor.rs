use std::fmt;

use crate::error::{FrameError, Result};
use crate::registry::SensorDefinition;

/// A fully decoded sensor reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedSensor {
    /// Packet id.
    pub id: u8,
    /// First value byte on the wire (0 for one-byte sensors).
    pub raw_high: u8,
    /// Last value byte on the wire.
    pub raw_low: u8,
    /// Interpreted value.
    pub value: i32,
    /// Human-readable label.
    pub label: &'static str,
    /// Display unit.
    pub unit: &'static str,
}

impl ParsedSensor {
    /// Decode raw value bytes according to a registry entry.
    pub fn from_raw(def: &SensorDefinition, raw_high: u8, raw_low: u8) -> Self {
        Self {
            id: def.id,
            raw_high,
            raw_low,
            value: def.decode(raw_high, raw_low),
            label: def.label,
            unit: def.unit,
        }
    }

    /// A reading that did not come off the binary stream.
    ///
    /// Raw bytes are zero; used for records derived from text telemetry.
    pub fn derived(id: u8, value: i32, label: &'static str, unit: &'static str) -> Self {
        Self {
            id,
            raw_high: 0,
            raw_low: 0,
            value,
            label,
            unit,
        }
    }
}

impl fmt::Display for ParsedSensor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{}: {}", self.label, self.value)
        } else {
            write!(f, "{}: {} {}", self.label, self.value, self.unit)
        }
    }
}

/// One decoded frame: readings in wire order plus the checksum verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorFrame {
    /// Readings in the order their ids were read.
    pub sensors: Vec<ParsedSensor>,
    /// True when the frame bytes summed to zero.
    pub checksum_ok: bool,
    /// The trailing checksum byte as received.
    pub checksum: u8,
    /// The checksum byte an intact frame would have carried.
    pub expected_checksum: u8,
}

impl SensorFrame {
    /// Reading for a packet id, if the frame carries one.
    pub fn get(&self, id: u8) -> Option<&ParsedSensor> {
        self.sensors.iter().find(|sensor| sensor.id == id)
    }

    /// Number of readings.
    pub fn len(&self) -> usize {
        self.sensors.len()
    }

    /// Returns true if the frame carries no readings.
    pub fn is_empty(&self) -> bool {
        self.sensors.is_empty()
    }

    /// Readings, or `ChecksumMismatch` if the frame is corrupt.
    pub fn verified(self) -> Result<Vec<ParsedSensor>> {
        if self.checksum_ok {
            Ok(self.sensors)
        } else {
            Err(FrameError::ChecksumMismatch {
                expected: self.expected_checksum,
                actual: self.checksum,
            })
        }
    }
}
