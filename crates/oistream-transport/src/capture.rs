use std::io::BufRead;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::topic::TopicConfig;
use crate::traits::{Message, MessageSource};

/// One line of a recorded broker session.
///
/// ```text
/// {"topic":"robot/stream","hex":"1308..."}
/// {"topic":"robot/telemetry","text":"TS;1000;-60;3.7;0.5;120"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedMessage {
    /// Broker topic name as received.
    pub topic: String,
    /// Binary payload as hex digits.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hex: Option<String>,
    /// Text payload, used when `hex` is absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CapturedMessage {
    /// Record a binary payload.
    pub fn binary(topic: impl Into<String>, payload: &[u8]) -> Self {
        Self {
            topic: topic.into(),
            hex: Some(hex::encode(payload)),
            text: None,
        }
    }

    /// Record a text payload.
    pub fn text(topic: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            hex: None,
            text: Some(text.into()),
        }
    }

    /// Serialize as a single capture line (no trailing newline).
    pub fn to_line(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    fn payload(&self, line: usize) -> Result<Bytes> {
        if let Some(hex) = &self.hex {
            let bytes = hex::decode(hex.trim())
                .map_err(|source| TransportError::InvalidHex { line, source })?;
            return Ok(Bytes::from(bytes));
        }
        if let Some(text) = &self.text {
            return Ok(Bytes::copy_from_slice(text.as_bytes()));
        }
        Err(TransportError::MissingPayload(line))
    }
}

/// Replays a recorded session, one JSON object per line.
///
/// Blank lines and lines starting with `#` are skipped.
pub struct CaptureSource<R> {
    inner: R,
    topics: TopicConfig,
    line: usize,
}

impl<R: BufRead> CaptureSource<R> {
    /// Create a capture source with the default topic names.
    pub fn new(inner: R) -> Self {
        Self::with_topics(inner, TopicConfig::default())
    }

    /// Create a capture source with explicit topic names.
    pub fn with_topics(inner: R, topics: TopicConfig) -> Self {
        Self {
            inner,
            topics,
            line: 0,
        }
    }

    /// Number of lines read so far.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Topic names used to resolve captured topics.
    pub fn topics(&self) -> &TopicConfig {
        &self.topics
    }

    /// Consume the source and return the inner reader.
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: BufRead> MessageSource for CaptureSource<R> {
    fn recv(&mut self) -> Result<Option<Message>> {
        let mut buf = String::new();
        loop {
            buf.clear();
            if self.inner.read_line(&mut buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let trimmed = buf.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let captured: CapturedMessage =
                serde_json::from_str(trimmed).map_err(|source| {
                    TransportError::MalformedCapture {
                        line: self.line,
                        source,
                    }
                })?;
            let payload = captured.payload(self.line)?;
            let topic = self.topics.resolve(&captured.topic);
            debug!(line = self.line, topic = %captured.topic, size = payload.len(), "replayed message");

            return Ok(Some(Message { topic, payload }));
        }
    }
}
