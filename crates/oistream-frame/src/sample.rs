//! The demonstration frame a test robot publishes.
//!
//! Twelve records, 35 payload bytes: six light-bump signals, battery
//! capacity/charge, current, voltage, cliff front-left signal and virtual
//! wall. Useful for exercising a display without hardware.

use crate::codec::SensorRecord;

/// Values for the twelve sample records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleValues {
    /// Light bump signals, packets 46–51.
    pub light_bumps: [i32; 6],
    /// Battery capacity, packet 26.
    pub battery_capacity: i32,
    /// Battery charge, packet 25.
    pub battery_charge: i32,
    /// Current, packet 23.
    pub current: i32,
    /// Voltage, packet 22.
    pub voltage: i32,
    /// Cliff front-left signal, packet 29.
    pub cliff_front_left: i32,
    /// Virtual wall, packet 13.
    pub virtual_wall: bool,
}

impl Default for SampleValues {
    fn default() -> Self {
        Self {
            light_bumps: [0x0A00; 6],
            battery_capacity: 0x6400,
            battery_charge: 0x5000,
            current: 0,
            voltage: 0,
            cliff_front_left: 0x0200,
            virtual_wall: false,
        }
    }
}

/// Build the sample records in wire order.
pub fn sample_records(values: &SampleValues) -> Vec<SensorRecord> {
    let mut records: Vec<SensorRecord> = (46u8..=51)
        .zip(values.light_bumps)
        .map(|(id, value)| SensorRecord::new(id, value))
        .collect();
    records.extend([
        SensorRecord::new(26, values.battery_capacity),
        SensorRecord::new(25, values.battery_charge),
        SensorRecord::new(23, values.current),
        SensorRecord::new(22, values.voltage),
        SensorRecord::new(29, values.cliff_front_left),
        SensorRecord::new(13, i32::from(values.virtual_wall)),
    ]);
    records
}
