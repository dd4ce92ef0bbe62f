use thiserror::Error;

/// Errors that can occur while decoding a received payload.
///
/// Any of these invalidates the whole message: the caller must drop it
/// without applying any partially-read fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The buffer ended before a fixed-width field could be read
    #[error("Unexpected end of payload: needed {needed} more bytes, {remaining} remaining")]
    UnexpectedEnd { needed: usize, remaining: usize },

    /// A length prefix points past the end of the buffer
    /// (possibly malformed or malicious data)
    #[error("Declared length {declared} exceeds the {remaining} bytes remaining in the payload")]
    LengthOutOfBounds { declared: usize, remaining: usize },

    /// A length-prefixed string was not valid UTF-8
    #[error("String field contained invalid UTF-8")]
    InvalidUtf8,

    /// A boolean field held a value other than 0 or 1
    #[error("Invalid boolean byte {value}")]
    InvalidBool { value: u8 },

    /// The leading type tag did not match any known message
    #[error("Unknown message type tag {tag}")]
    UnknownMessageType { tag: u8 },

    /// An object-change message carried an unrecognized change kind
    #[error("Unknown object change kind {value}")]
    UnknownChangeKind { value: u8 },

    /// The payload was empty, so there was no type tag to dispatch on
    #[error("Empty payload has no message type tag")]
    EmptyPayload,
}
