//! Protocol error types.

use thiserror::Error;

/// Errors raised while framing or parsing wire data.
///
/// Any of these on the decode path means the byte stream can no longer be
/// trusted; the connection must be closed rather than resynchronized.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown type tag: {0:#04x}")]
    UnknownTag(u8),

    #[error("invalid length prefix: {0}")]
    InvalidLength(String),

    #[error("invalid numeric value: {0}")]
    InvalidNumber(String),

    #[error("bulk string too large: {size} bytes (max {max})")]
    BulkTooLarge { size: usize, max: usize },

    #[error("array too large: {count} elements (max {max})")]
    ArrayTooLarge { count: usize, max: usize },

    #[error("line exceeds {max} bytes without CRLF terminator")]
    LineTooLong { max: usize },

    #[error("missing CRLF terminator after bulk payload")]
    MissingTerminator,

    #[error("invalid UTF-8 in protocol line")]
    InvalidUtf8,

    #[error("value cannot be encoded: {0}")]
    Unencodable(&'static str),

    #[error("unexpected end of stream mid-request")]
    UnexpectedEof,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProtocolError::UnknownTag(b'!');
        assert!(err.to_string().contains("0x21"));

        let err = ProtocolError::BulkTooLarge {
            size: 100,
            max: 50,
        };
        assert!(err.to_string().contains("100"));
        assert!(err.to_string().contains("50"));

        let err = ProtocolError::InvalidLength("abc".to_string());
        assert!(err.to_string().contains("abc"));

        let err = ProtocolError::Unencodable("non-finite float");
        assert!(err.to_string().contains("non-finite"));
    }
}
