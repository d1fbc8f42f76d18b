/// Errors that can occur while decoding or encoding APRS fields.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    /// The frame has no `>` separating the source address.
    #[error("frame has no '>' after the source address")]
    MissingSourceDelimiter,

    /// The frame has no `:` after the destination field.
    #[error("frame has no ':' after the destination field")]
    MissingPayloadDelimiter,

    /// A coordinate text field could not be parsed.
    #[error("invalid coordinate {text:?}: {reason}")]
    InvalidCoordinate { text: String, reason: &'static str },

    /// A position block is shorter than its fixed layout.
    #[error("position block too short ({len} bytes, need {need})")]
    ShortPositionBlock { len: usize, need: usize },

    /// A coordinate value is outside the range of its axis.
    #[error("coordinate {value} outside [-{limit}, {limit}]")]
    CoordinateOutOfRange { value: f64, limit: f64 },

    /// A timestamp token could not be parsed or names an impossible date.
    #[error("invalid timestamp {text:?}")]
    InvalidTimestamp { text: String },

    /// The timestamp format has no place in a position report.
    #[error("{0} timestamps cannot lead a position report")]
    UnsupportedTimeFormat(crate::time::TimeFormat),

    /// A character outside the base-91 alphabet (`!` to `{`).
    #[error("invalid base-91 digit {0:?}")]
    InvalidBase91Digit(char),

    /// The base-91 text encodes a value wider than 64 bits.
    #[error("base-91 value overflows u64")]
    Base91Overflow,
}

impl CodecError {
    /// True when the frame itself could not be split into its three parts.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            CodecError::MissingSourceDelimiter | CodecError::MissingPayloadDelimiter
        )
    }
}

/// Soft failures reported alongside a decoded packet.
///
/// The packet is still produced; it just carries no position (or a
/// substituted timestamp).
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeWarning {
    #[error("mic-e destination too short ({len} bytes, need 6)")]
    InsufficientMicEDestination { len: usize },

    #[error("mic-e payload too short ({len} bytes, need 10)")]
    InsufficientMicEPayload { len: usize },

    /// The ASCII position block was short or unparseable.
    #[error("malformed position: {0}")]
    MalformedPosition(String),

    /// The timestamp token was unparseable; the decode-time clock was used.
    #[error("malformed timestamp: {0}")]
    MalformedTimestamp(String),

    /// The decoded coordinates fall outside [-90, 90] / [-180, 180].
    #[error("decoded position out of range (lat {latitude}, lon {longitude})")]
    OutOfRange { latitude: f64, longitude: f64 },
}

pub type Result<T> = std::result::Result<T, CodecError>;
