//! Topic-tagged message delivery for robot telemetry.
//!
//! The broker connection itself lives outside this workspace. This crate
//! describes what arrives from it:
//! - [`Topic`]: the three logical topics a robot publishes on
//! - [`Message`]: one delivered payload, tagged by topic
//! - [`MessageSource`]: anything that yields messages in delivery order
//!
//! [`CaptureSource`] replays a recorded session from JSON lines, which is how
//! the CLI and the tests drive the decoders without a live broker.

pub mod capture;
pub mod error;
pub mod topic;
pub mod traits;

pub use capture::{CaptureSource, CapturedMessage};
pub use error::{Result, TransportError};
pub use topic::{Topic, TopicConfig};
pub use traits::{Message, MessageSource};
