//! Decoder for the Roomba Open Interface sensor stream a robot publishes
//! over MQTT.
//!
//! # Crate Structure
//!
//! - [`transport`]: topic-tagged message delivery and capture replay
//! - [`frame`]: sensor registry, checksum and the streaming frame parser
//! - [`telemetry`]: text telemetry, joystick control and display state
//!   (behind the `telemetry` feature, on by default)

/// Re-export transport types.
pub mod transport {
    pub use oistream_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use oistream_frame::*;
}

/// Re-export telemetry types (requires `telemetry` feature).
#[cfg(feature = "telemetry")]
pub mod telemetry {
    pub use oistream_telemetry::*;
}
