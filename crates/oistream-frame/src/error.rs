/// Errors that can occur during sensor frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// A record carries a packet id the registry does not know.
    #[error("unknown sensor packet id {0}")]
    UnknownSensorId(u8),

    /// A record needs more bytes than the frame length has left.
    #[error("sensor {id} needs {needed} bytes but only {remaining} remain in frame")]
    RecordOverrun {
        id: u8,
        needed: usize,
        remaining: usize,
    },

    /// The trailing checksum does not bring the frame sum to zero.
    #[error("checksum mismatch (expected {expected:#04x}, got {actual:#04x})")]
    ChecksumMismatch { expected: u8, actual: u8 },

    /// A registry was built with the same packet id twice.
    #[error("sensor packet id {0} registered twice")]
    DuplicateSensor(u8),

    /// A value does not fit the width of its sensor.
    #[error("value {value} does not fit sensor {id}")]
    ValueOutOfRange { id: u8, value: i32 },

    /// The encoded records exceed what the length byte can describe.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
