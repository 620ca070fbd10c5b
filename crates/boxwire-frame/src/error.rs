use crate::field::FieldType;

/// Errors that can occur while defining frame kinds or encoding/decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The header bytes could not be decoded into a usable header.
    #[error("malformed frame header: {0}")]
    Decode(String),

    /// The header decoded but was rejected by the kind's verifier.
    #[error("frame header verification failed: {0}")]
    Verification(String),

    /// The frame kind definition is invalid.
    #[error("invalid frame kind: {0}")]
    Schema(String),

    /// The resolved frame length exceeds the configured maximum.
    #[error("frame too large ({size} bytes, max {max})")]
    FrameTooLarge { size: usize, max: usize },

    /// A header value does not fit its field's width.
    #[error("value {value} out of range for {ty} field `{field}`")]
    FieldRange {
        field: String,
        value: i64,
        ty: FieldType,
    },

    /// The named field is not part of the frame kind.
    #[error("unknown header field `{0}`")]
    UnknownField(String),

    /// The payload is not valid JSON.
    #[error("payload is not valid JSON: {0}")]
    PayloadDecode(#[source] serde_json::Error),

    /// A value could not be serialized into a JSON payload.
    #[error("payload could not be encoded as JSON: {0}")]
    PayloadEncode(#[source] serde_json::Error),

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended before a complete frame was received.
    #[error("connection closed (incomplete frame)")]
    ConnectionClosed,
}

impl FrameError {
    /// Negative code reported to callers that track parse outcomes as integers.
    pub fn code(&self) -> i64 {
        match self {
            FrameError::Decode(_) => -1,
            FrameError::Verification(_) => -2,
            FrameError::Schema(_) => -3,
            FrameError::FrameTooLarge { .. } => -4,
            FrameError::FieldRange { .. } => -5,
            FrameError::UnknownField(_) => -6,
            FrameError::PayloadDecode(_) => -7,
            FrameError::PayloadEncode(_) => -8,
            FrameError::Io(_) => -9,
            FrameError::ConnectionClosed => -10,
        }
    }

    /// True when frame boundaries in the stream can no longer be trusted.
    ///
    /// Transports must tear the connection down on these errors.
    pub fn is_framing_fatal(&self) -> bool {
        matches!(
            self,
            FrameError::Decode(_)
                | FrameError::Verification(_)
                | FrameError::Schema(_)
                | FrameError::FrameTooLarge { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
