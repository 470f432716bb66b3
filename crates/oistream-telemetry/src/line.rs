use oistream_frame::ParsedSensor;

use crate::error::{Result, TelemetryError};

/// Tag opening every small-robot telemetry line.
pub const TELEMETRY_TAG: &str = "TS";

/// Record id for the fixed full-scale battery value.
pub const ID_MAX_BATTERY: u8 = 26;
/// Record id for the battery percentage.
pub const ID_BATTERY_PERCENT: u8 = 25;
/// Record id for the battery voltage.
pub const ID_VOLTAGE: u8 = 22;
/// Record id for the battery current.
pub const ID_CURRENT: u8 = 23;
/// Record id for the robot's elapsed time.
pub const ID_ELAPSED: u8 = 100;
/// Record id for the radio signal strength.
pub const ID_SIGNAL: u8 = 101;
/// Record id for the capacity used so far.
pub const ID_USED_CAPACITY: u8 = 102;

/// A record shown on the sensor display.
///
/// Telemetry records have no wire bytes, so `raw_high` and `raw_low` are 0.
pub type DisplayRecord = ParsedSensor;

/// How telemetry lines are turned into records.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetryConfig {
    /// Cell voltage reported as 0 %. Default: 3.3 V.
    pub empty_volts: f32,
    /// Cell voltage reported as 100 %. Default: 4.2 V.
    pub full_volts: f32,
    /// Clamp the battery percentage to 0..=100. Default: false.
    pub clamp_percentage: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            empty_volts: 3.3,
            full_volts: 4.2,
            clamp_percentage: false,
        }
    }
}

/// Linearly map `x` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Not clamped: inputs outside the source range extrapolate.
pub fn map_range(x: f32, in_min: f32, in_max: f32, out_min: f32, out_max: f32) -> f32 {
    (x - in_min) * (out_max - out_min) / (in_max - in_min) + out_min
}

/// Decode `TS;time;rssi;vbat;current;usedCapacity` with the default config.
pub fn parse_telemetry_line(text: &str) -> Result<Vec<DisplayRecord>> {
    parse_telemetry_line_with(text, &TelemetryConfig::default())
}

/// Decode a telemetry line into display records.
///
/// Either every record is produced or an error is returned; fields after
/// the fifth are ignored.
pub fn parse_telemetry_line_with(
    text: &str,
    config: &TelemetryConfig,
) -> Result<Vec<DisplayRecord>> {
    let mut fields = text.trim_end_matches(['\r', '\n']).split(';');

    let tag = fields.next().unwrap_or_default().trim();
    if tag != TELEMETRY_TAG {
        return Err(TelemetryError::UnknownTag(tag.to_owned()));
    }

    let time: i32 = int_field(fields.next(), "time")?;
    let rssi: i32 = int_field(fields.next(), "rssi")?;
    let vbat = float_field(fields.next(), "vbat")?;
    let current = float_field(fields.next(), "current")?;
    let used = float_field(fields.next(), "usedCapacity")?;

    let mut percent = map_range(vbat, config.empty_volts, config.full_volts, 0.0, 100.0);
    if config.clamp_percentage {
        percent = percent.clamp(0.0, 100.0);
    }

    Ok(vec![
        ParsedSensor::derived(ID_MAX_BATTERY, 100, "Max battery percentage", ""),
        ParsedSensor::derived(ID_BATTERY_PERCENT, percent as i32, "Battery Percentage", "%"),
        ParsedSensor::derived(ID_VOLTAGE, (vbat * 1000.0) as i32, "Voltage", "mV"),
        ParsedSensor::derived(ID_CURRENT, current as i32, "Current", "mA"),
        ParsedSensor::derived(ID_ELAPSED, time, "Elapsed Time", "s"),
        ParsedSensor::derived(ID_SIGNAL, rssi, "Signal Strength", "dBm"),
        ParsedSensor::derived(ID_USED_CAPACITY, used as i32, "Used Capacity", "mAh"),
    ])
}

fn int_field(raw: Option<&str>, field: &'static str) -> Result<i32> {
    let raw = raw.ok_or(TelemetryError::MissingField(field))?.trim();
    raw.parse().map_err(|_| TelemetryError::InvalidField {
        field,
        value: raw.to_owned(),
    })
}

fn float_field(raw: Option<&str>, field: &'static str) -> Result<f32> {
    let raw = raw.ok_or(TelemetryError::MissingField(field))?.trim();
    match raw.parse::<f32>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(TelemetryError::InvalidField {
            field,
            value: raw.to_owned(),
        }),
    }
}
