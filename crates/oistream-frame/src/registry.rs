//! Packet id → record size and display metadata.
//!
//! The parser cannot skip a record it does not understand: the only thing
//! that says where the next id starts is the size registered here.

use std::sync::{Arc, OnceLock};

use crate::error::{FrameError, Result};

/// Number of value bytes following a packet id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteLength {
    One,
    Two,
}

impl ByteLength {
    /// The width in bytes.
    pub const fn get(self) -> usize {
        match self {
            ByteLength::One => 1,
            ByteLength::Two => 2,
        }
    }
}

/// Registry entry for one sensor packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SensorDefinition {
    /// Packet id as it appears on the wire.
    pub id: u8,
    /// Number of value bytes after the id.
    pub byte_len: ByteLength,
    /// Human-readable label.
    pub label: &'static str,
    /// Display unit, empty for dimensionless values.
    pub unit: &'static str,
}

impl SensorDefinition {
    /// A one-byte sensor.
    pub const fn one(id: u8, label: &'static str, unit: &'static str) -> Self {
        Self {
            id,
            byte_len: ByteLength::One,
            label,
            unit,
        }
    }

    /// A two-byte sensor.
    pub const fn two(id: u8, label: &'static str, unit: &'static str) -> Self {
        Self {
            id,
            byte_len: ByteLength::Two,
            label,
            unit,
        }
    }

    /// Interpret raw value bytes.
    ///
    /// Two-byte values are big-endian two's complement, sign-extended.
    /// One-byte values are unsigned and only `low` is used.
    pub fn decode(&self, high: u8, low: u8) -> i32 {
        match self.byte_len {
            ByteLength::One => i32::from(low),
            ByteLength::Two => i32::from(i16::from_be_bytes([high, low])),
        }
    }

    /// Split a value into `(high, low)` wire bytes.
    ///
    /// Returns `None` when the value does not fit: `i16` for two-byte
    /// sensors, `u8` for one-byte sensors (`high` is then always 0).
    pub fn encode(&self, value: i32) -> Option<(u8, u8)> {
        match self.byte_len {
            ByteLength::One => u8::try_from(value).ok().map(|low| (0, low)),
            ByteLength::Two => i16::try_from(value).ok().map(|v| {
                let [high, low] = v.to_be_bytes();
                (high, low)
            }),
        }
    }
}

/// Open Interface sensor packets 7–58.
pub static OPEN_INTERFACE: &[SensorDefinition] = &[
    SensorDefinition::one(7, "Bumps and Wheel Drops", ""),
    SensorDefinition::one(8, "Wall", ""),
    SensorDefinition::one(9, "Cliff Left", ""),
    SensorDefinition::one(10, "Cliff Front Left", ""),
    SensorDefinition::one(11, "Cliff Front Right", ""),
    SensorDefinition::one(12, "Cliff Right", ""),
    SensorDefinition::one(13, "Virtual Wall", ""),
    SensorDefinition::one(14, "Wheel Overcurrents", ""),
    SensorDefinition::one(15, "Dirt Detect", ""),
    SensorDefinition::one(16, "Unused", ""),
    SensorDefinition::one(17, "Infrared Character Omni", ""),
    SensorDefinition::one(18, "Buttons", ""),
    SensorDefinition::two(19, "Distance", "mm"),
    SensorDefinition::two(20, "Angle", "deg"),
    SensorDefinition::one(21, "Charging State", ""),
    SensorDefinition::two(22, "Voltage", "mV"),
    SensorDefinition::two(23, "Current", "mA"),
    SensorDefinition::one(24, "Temperature", "°C"),
    SensorDefinition::two(25, "Battery Charge", "mAh"),
    SensorDefinition::two(26, "Battery Capacity", "mAh"),
    SensorDefinition::two(27, "Wall Signal", ""),
    SensorDefinition::two(28, "Cliff Left Signal", ""),
    SensorDefinition::two(29, "Cliff Front Left Signal", ""),
    SensorDefinition::two(30, "Cliff Front Right Signal", ""),
    SensorDefinition::two(31, "Cliff Right Signal", ""),
    SensorDefinition::one(32, "Unused", ""),
    SensorDefinition::two(33, "Unused", ""),
    SensorDefinition::one(34, "Charging Sources Available", ""),
    SensorDefinition::one(35, "OI Mode", ""),
    SensorDefinition::one(36, "Song Number", ""),
    SensorDefinition::one(37, "Song Playing", ""),
    SensorDefinition::one(38, "Number of Stream Packets", ""),
    SensorDefinition::two(39, "Requested Velocity", "mm/s"),
    SensorDefinition::two(40, "Requested Radius", "mm"),
    SensorDefinition::two(41, "Requested Right Velocity", "mm/s"),
    SensorDefinition::two(42, "Requested Left Velocity", "mm/s"),
    SensorDefinition::two(43, "Left Encoder Counts", ""),
    SensorDefinition::two(44, "Right Encoder Counts", ""),
    SensorDefinition::one(45, "Light Bumper", ""),
    SensorDefinition::two(46, "Light Bump Left Signal", ""),
    SensorDefinition::two(47, "Light Bump Front Left Signal", ""),
    SensorDefinition::two(48, "Light Bump Center Left Signal", ""),
    SensorDefinition::two(49, "Light Bump Center Right Signal", ""),
    SensorDefinition::two(50, "Light Bump Front Right Signal", ""),
    SensorDefinition::two(51, "Light Bump Right Signal", ""),
    SensorDefinition::one(52, "Infrared Character Left", ""),
    SensorDefinition::one(53, "Infrared Character Right", ""),
    SensorDefinition::two(54, "Left Motor Current", "mA"),
    SensorDefinition::two(55, "Right Motor Current", "mA"),
    SensorDefinition::two(56, "Main Brush Motor Current", "mA"),
    SensorDefinition::two(57, "Side Brush Motor Current", "mA"),
    SensorDefinition::one(58, "Stasis", ""),
];

/// Id-indexed table of sensor definitions.
///
/// Immutable after construction; share one instance between parsers with
/// [`SensorRegistry::open_interface_shared`] or your own `Arc`.
#[derive(Debug, Clone)]
pub struct SensorRegistry {
    slots: Vec<Option<SensorDefinition>>,
    len: usize,
}

impl SensorRegistry {
    /// Build a registry from definitions, rejecting duplicate ids.
    pub fn from_definitions(
        definitions: impl IntoIterator<Item = SensorDefinition>,
    ) -> Result<Self> {
        let mut slots = vec![None; usize::from(u8::MAX) + 1];
        let mut len = 0usize;
        for def in definitions {
            let slot = &mut slots[usize::from(def.id)];
            if slot.is_some() {
                return Err(FrameError::DuplicateSensor(def.id));
            }
            *slot = Some(def);
            len += 1;
        }
        Ok(Self { slots, len })
    }

    /// The Open Interface packet table.
    pub fn open_interface() -> Self {
        let mut slots = vec![None; usize::from(u8::MAX) + 1];
        for def in OPEN_INTERFACE {
            slots[usize::from(def.id)] = Some(*def);
        }
        Self {
            slots,
            len: OPEN_INTERFACE.len(),
        }
    }

    /// Process-wide shared Open Interface registry.
    pub fn open_interface_shared() -> Arc<Self> {
        static SHARED: OnceLock<Arc<SensorRegistry>> = OnceLock::new();
        SHARED
            .get_or_init(|| Arc::new(SensorRegistry::open_interface()))
            .clone()
    }

    /// Look up a packet id.
    pub fn lookup(&self, id: u8) -> Option<&SensorDefinition> {
        self.slots[usize::from(id)].as_ref()
    }

    /// Returns true if the id is registered.
    pub fn contains(&self, id: u8) -> bool {
        self.lookup(id).is_some()
    }

    /// Number of registered sensors.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no sensors are registered.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Registered definitions in id order.
    pub fn iter(&self) -> impl Iterator<Item = &SensorDefinition> + '_ {
        self.slots.iter().filter_map(Option::as_ref)
    }
}

impl Default for SensorRegistry {
    fn default() -> Self {
        Self::open_interface()
    }
}
