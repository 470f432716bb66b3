//! Text telemetry, joystick control and display state for oistream.
//!
//! Besides the binary sensor stream the small robot publishes a
//! `TS;time;rssi;vbat;current;usedCapacity` line on its telemetry topic and
//! receives joystick commands on its control topic. This crate decodes both
//! and keeps the [`SensorBoard`] an operator display renders from.

pub mod board;
pub mod control;
pub mod error;
pub mod line;

pub use board::{BoardConfig, BoardStats, SensorBoard, DEFAULT_REFRESH_INTERVAL};
pub use control::{parse_control, JoystickPosition};
pub use error::{Result, TelemetryError};
pub use line::{
    map_range, parse_telemetry_line, parse_telemetry_line_with, DisplayRecord, TelemetryConfig,
    TELEMETRY_TAG,
};
