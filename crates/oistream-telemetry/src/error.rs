/// Errors that can occur while decoding a telemetry line.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The line does not start with the expected tag.
    #[error("unknown telemetry tag {0:?}")]
    UnknownTag(String),

    /// The line ends before a required field.
    #[error("telemetry line is missing field `{0}`")]
    MissingField(&'static str),

    /// A field is present but not a number of the expected kind.
    #[error("telemetry field `{field}` has invalid value {value:?}")]
    InvalidField { field: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, TelemetryError>;
