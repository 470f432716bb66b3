/// Errors that can occur while receiving messages.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// An I/O error occurred on the underlying source.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A capture line is not valid JSON or misses required fields.
    #[error("malformed capture line {line}: {source}")]
    MalformedCapture {
        line: usize,
        source: serde_json::Error,
    },

    /// A capture line carries a payload that is not valid hex.
    #[error("invalid hex payload on capture line {line}: {source}")]
    InvalidHex {
        line: usize,
        source: hex::FromHexError,
    },

    /// A capture line carries neither a `hex` nor a `text` payload.
    #[error("capture line {0} has no payload")]
    MissingPayload(usize),
}

pub type Result<T> = std::result::Result<T, TransportError>;
