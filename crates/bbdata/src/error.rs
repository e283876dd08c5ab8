//! Error types for data tree and codec operations.

use std::fmt;
use std::io;

use thiserror::Error;

/// Error type for bbdata operations.
#[derive(Debug, Error)]
pub enum Error {
    // Argument errors
    /// Path-based mutators need at least one segment.
    #[error("path must not be empty")]
    EmptyPath,
    /// List write outside `0..=len`.
    #[error("index {index} out of range (length={length})")]
    IndexOutOfRange { index: usize, length: usize },
    /// A value that has no node representation.
    #[error("unsupported type: {0}")]
    UnsupportedType(String),
    /// Map keys must be strings.
    #[error("map key must be a string")]
    NonStringKey,
    /// Message raised by a `Serialize` impl.
    #[error("{0}")]
    Custom(String),

    // Decode errors
    /// Type tag that is not part of the format.
    #[error("unknown type tag {ch:?} ({0:#04x})", ch = tag_char(.0))]
    UnknownTag(u8),
    /// Byte in a size position that is not an integer tag.
    #[error("{ch:?} ({0:#04x}) can not be used as a size type", ch = tag_char(.0))]
    InvalidSizeTag(u8),
    /// Container mode byte other than `N`, `#` or `$`.
    #[error("expected 'N', '#' or '$', got {ch:?} ({0:#04x})", ch = tag_char(.0))]
    InvalidContainerMode(u8),
    /// Negative or oversized length.
    #[error("invalid size {0}")]
    InvalidSize(i64),
    /// String payload is not valid UTF-8.
    #[error("invalid UTF-8 in string value")]
    InvalidUtf8,
    /// Character payload is not a valid 1-3 byte code unit.
    #[error("malformed character byte {0:#04x}")]
    MalformedChar(u8),
    /// Input ended in the middle of a value.
    #[error("unexpected end of input")]
    UnexpectedEof,
    /// Containers nested deeper than the configured limit.
    #[error("nesting depth exceeds limit of {0}")]
    DepthLimitExceeded(usize),

    // Encode errors
    /// Length does not fit the 32-bit size encoding.
    #[error("size {0} does not fit in a size tag")]
    SizeOverflow(usize),
    /// Character outside the Basic Multilingual Plane.
    #[error("character {0:?} does not fit in a single code unit")]
    CharOutOfRange(char),

    // JSON errors
    /// Failed to parse JSON input.
    #[error("JSON parse error: {0}")]
    JsonParse(String),
    /// Failed to serialize to JSON.
    #[error("JSON serialize error: {0}")]
    JsonSerialize(String),
    /// f32/f64 is NaN or Infinity (not representable in JSON).
    #[error("cannot encode non-finite float {0} as JSON")]
    NonFiniteFloat(f64),

    /// Byte source or sink failure.
    #[error("I/O error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Error::UnexpectedEof
        } else {
            Error::Io(err)
        }
    }
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Custom(msg.to_string())
    }
}

fn tag_char(byte: &u8) -> char {
    char::from(*byte)
}

/// Result type alias for bbdata operations.
pub type Result<T> = std::result::Result<T, Error>;
