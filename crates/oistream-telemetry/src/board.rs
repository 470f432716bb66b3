use std::time::{Duration, Instant};

use oistream_frame::SensorFrame;
use tracing::trace;

use crate::control::JoystickPosition;
use crate::line::DisplayRecord;

/// Default minimum gap between two frame refreshes.
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_millis(250);

/// Display board configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoardConfig {
    /// Frames arriving sooner than this after the last refresh are dropped.
    pub refresh_interval: Duration,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }
}

/// Counters for what the board accepted and dropped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardStats {
    /// Frames that replaced the records.
    pub frames_applied: u64,
    /// Valid frames dropped inside the refresh interval.
    pub frames_throttled: u64,
    /// Frames dropped for a failed checksum.
    pub frames_rejected: u64,
    /// Telemetry lines applied.
    pub telemetry_updates: u64,
    /// Joystick positions stored.
    pub control_updates: u64,
}

/// Latest values shown to the operator.
///
/// Sensor frames refresh the records at most once per
/// [`BoardConfig::refresh_interval`]; telemetry lines replace them at once.
#[derive(Debug, Clone, Default)]
pub struct SensorBoard {
    config: BoardConfig,
    records: Vec<DisplayRecord>,
    joystick: Option<JoystickPosition>,
    next_refresh: Option<Instant>,
    stats: BoardStats,
}

impl SensorBoard {
    /// Create an empty board with the default refresh interval.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty board with explicit configuration.
    pub fn with_config(config: BoardConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Apply a decoded frame observed at `now`.
    ///
    /// Returns true if the records were replaced. Frames with a failed
    /// checksum never are.
    pub fn apply_frame(&mut self, frame: &SensorFrame, now: Instant) -> bool {
        if !frame.checksum_ok {
            self.stats.frames_rejected += 1;
            return false;
        }
        if self.next_refresh.is_some_and(|due| now < due) {
            self.stats.frames_throttled += 1;
            trace!(sensors = frame.len(), "frame throttled");
            return false;
        }

        self.records.clone_from(&frame.sensors);
        self.next_refresh = Some(now + self.config.refresh_interval);
        self.stats.frames_applied += 1;
        true
    }

    /// Replace the records with telemetry-derived ones.
    pub fn apply_telemetry(&mut self, records: Vec<DisplayRecord>) {
        self.records = records;
        self.stats.telemetry_updates += 1;
    }

    /// Record the latest joystick position.
    pub fn apply_control(&mut self, position: JoystickPosition) {
        self.joystick = Some(position);
        self.stats.control_updates += 1;
    }

    /// Records currently on display, in the order they arrived.
    pub fn records(&self) -> &[DisplayRecord] {
        &self.records
    }

    /// Last joystick position, if any control message was applied.
    pub fn joystick(&self) -> Option<JoystickPosition> {
        self.joystick
    }

    /// Counters since construction.
    pub fn stats(&self) -> &BoardStats {
        &self.stats
    }

    /// Current board configuration.
    pub fn config(&self) -> &BoardConfig {
        &self.config
    }
}
