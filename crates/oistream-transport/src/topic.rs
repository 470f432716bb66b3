//! Logical topics a robot publishes on.
//!
//! Topic names are deployment-specific, so they are resolved through a
//! [`TopicConfig`] rather than hard-coded into the decoders.

/// Default topic for `TS;...` text telemetry lines.
pub const DEFAULT_TELEMETRY_TOPIC: &str = "robot/telemetry";

/// Default topic for joystick/control bytes.
pub const DEFAULT_CONTROL_TOPIC: &str = "robot/control";

/// Default topic for the binary sensor stream.
pub const DEFAULT_STREAM_TOPIC: &str = "robot/stream";

/// The logical topic a message was delivered on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Text telemetry lines.
    Telemetry,
    /// Control bytes (joystick echo).
    Control,
    /// Binary Open Interface sensor stream fragments.
    SensorStream,
    /// Any topic the configuration does not know about.
    Other(String),
}

/// Maps broker topic names to logical topics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicConfig {
    /// Topic carrying text telemetry lines.
    pub telemetry: String,
    /// Topic carrying control bytes.
    pub control: String,
    /// Topic carrying the binary sensor stream.
    pub stream: String,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            telemetry: DEFAULT_TELEMETRY_TOPIC.to_string(),
            control: DEFAULT_CONTROL_TOPIC.to_string(),
            stream: DEFAULT_STREAM_TOPIC.to_string(),
        }
    }
}

impl TopicConfig {
    /// Resolve a broker topic name.
    pub fn resolve(&self, name: &str) -> Topic {
        if name == self.telemetry {
            Topic::Telemetry
        } else if name == self.control {
            Topic::Control
        } else if name == self.stream {
            Topic::SensorStream
        } else {
            Topic::Other(name.to_string())
        }
    }

    /// The broker topic name for a logical topic.
    pub fn name_of<'a>(&'a self, topic: &'a Topic) -> &'a str {
        match topic {
            Topic::Telemetry => &self.telemetry,
            Topic::Control => &self.control,
            Topic::SensorStream => &self.stream,
            Topic::Other(name) => name,
        }
    }

}
