//! Protocol value model.
//!
//! Requests arrive as an [`Value::Array`] of [`Value::Bulk`] elements
//! (command name plus arguments); replies use whichever shape fits the
//! operation: integers for counts, bulk/null for payload lookups, arrays for
//! batches, errors for failures.

use crate::error::ProtocolError;
use bytes::{BufMut, Bytes, BytesMut};

/// A single protocol value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Short text without CR/LF, framed as `+…\r\n`.
    Simple(String),
    /// An error message, framed as `-…\r\n`.
    Error(String),
    /// Signed 64-bit integer, framed as `:…\r\n`.
    Int(i64),
    /// Double-precision float, framed as `:…\r\n` with a decimal point.
    Float(f64),
    /// Arbitrary byte payload, framed as `$len\r\n…\r\n`.
    Bulk(Bytes),
    /// Absence of a value, framed as `$-1\r\n`. Distinct from an empty bulk.
    Null,
    /// Ordered sequence of values, framed as `*count\r\n` plus the elements.
    Array(Vec<Value>),
}

impl Value {
    /// Convenience constructor for bulk values.
    pub fn bulk(data: impl Into<Bytes>) -> Self {
        Value::Bulk(data.into())
    }

    /// Returns the payload bytes when the value is a bulk string.
    pub fn as_bulk(&self) -> Option<&Bytes> {
        match self {
            Value::Bulk(data) => Some(data),
            _ => None,
        }
    }

    /// Encodes the value into its wire representation.
    pub fn encode(&self) -> Result<BytesMut, ProtocolError> {
        let mut buf = BytesMut::with_capacity(self.encoded_size_hint());
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    fn encoded_size_hint(&self) -> usize {
        match self {
            Value::Bulk(data) => data.len() + 16,
            Value::Array(items) => items.len() * 16 + 16,
            _ => 32,
        }
    }

    fn write_to(&self, buf: &mut BytesMut) -> Result<(), ProtocolError> {
        match self {
            Value::Simple(text) => {
                if text.contains('\r') || text.contains('\n') {
                    return Err(ProtocolError::Unencodable(
                        "simple string contains CR or LF",
                    ));
                }
                buf.put_u8(b'+');
                buf.put_slice(text.as_bytes());
                buf.put_slice(b"\r\n");
            }
            Value::Error(message) => {
                if message.contains('\r') || message.contains('\n') {
                    return Err(ProtocolError::Unencodable(
                        "error message contains CR or LF",
                    ));
                }
                buf.put_u8(b'-');
                buf.put_slice(message.as_bytes());
                buf.put_slice(b"\r\n");
            }
            Value::Int(n) => {
                buf.put_u8(b':');
                buf.put_slice(n.to_string().as_bytes());
                buf.put_slice(b"\r\n");
            }
            Value::Float(f) => {
                if !f.is_finite() {
                    return Err(ProtocolError::Unencodable("non-finite float"));
                }
                buf.put_u8(b':');
                buf.put_slice(format_float(*f).as_bytes());
                buf.put_slice(b"\r\n");
            }
            Value::Bulk(data) => {
                buf.put_u8(b'$');
                buf.put_slice(data.len().to_string().as_bytes());
                buf.put_slice(b"\r\n");
                buf.put_slice(data);
                buf.put_slice(b"\r\n");
            }
            Value::Null => buf.put_slice(b"$-1\r\n"),
            Value::Array(items) => {
                buf.put_u8(b'*');
                buf.put_slice(items.len().to_string().as_bytes());
                buf.put_slice(b"\r\n");
                for item in items {
                    item.write_to(buf)?;
                }
            }
        }
        Ok(())
    }
}

/// Renders a finite float so that it always re-decodes as a float.
///
/// A `:` line is classified by the presence of a decimal point, so
/// whole-number renderings like `3` must gain a fractional part. `Display`
/// for `f64` never uses exponent notation, so appending one is always valid.
fn format_float(f: f64) -> String {
    let s = f.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{s}.0")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_simple_string() {
        let encoded = Value::Simple("OK".to_string()).encode().unwrap();
        assert_eq!(&encoded[..], b"+OK\r\n");
    }

    #[test]
    fn test_encode_error() {
        let encoded = Value::Error("boom".to_string()).encode().unwrap();
        assert_eq!(&encoded[..], b"-boom\r\n");
    }

    #[test]
    fn test_encode_integer() {
        let encoded = Value::Int(-1337).encode().unwrap();
        assert_eq!(&encoded[..], b":-1337\r\n");
    }

    #[test]
    fn test_encode_float_always_has_decimal_point() {
        let encoded = Value::Float(1.5).encode().unwrap();
        assert_eq!(&encoded[..], b":1.5\r\n");

        // A whole-number float must not be confused with an integer.
        let encoded = Value::Float(3.0).encode().unwrap();
        assert_eq!(&encoded[..], b":3.0\r\n");

        // Extreme magnitudes still carry a decimal point.
        let encoded = Value::Float(1e-300).encode().unwrap();
        assert!(encoded.iter().any(|&byte| byte == b'.'));
        let encoded = Value::Float(1e300).encode().unwrap();
        assert!(encoded.iter().any(|&byte| byte == b'.'));
    }

    #[test]
    fn test_encode_non_finite_float_fails() {
        assert!(Value::Float(f64::NAN).encode().is_err());
        assert!(Value::Float(f64::INFINITY).encode().is_err());
    }

    #[test]
    fn test_encode_bulk_and_null() {
        let encoded = Value::bulk(&b"hello"[..]).encode().unwrap();
        assert_eq!(&encoded[..], b"$5\r\nhello\r\n");

        // Null and the empty bulk string are distinct on the wire.
        let encoded = Value::Null.encode().unwrap();
        assert_eq!(&encoded[..], b"$-1\r\n");

        let encoded = Value::bulk(&b""[..]).encode().unwrap();
        assert_eq!(&encoded[..], b"$0\r\n\r\n");
    }

    #[test]
    fn test_encode_array() {
        let value = Value::Array(vec![
            Value::bulk(&b"GET"[..]),
            Value::bulk(&b"key"[..]),
        ]);
        let encoded = value.encode().unwrap();
        assert_eq!(&encoded[..], b"*2\r\n$3\r\nGET\r\n$3\r\nkey\r\n");
    }

    #[test]
    fn test_encode_empty_array() {
        let encoded = Value::Array(vec![]).encode().unwrap();
        assert_eq!(&encoded[..], b"*0\r\n");
    }

    #[test]
    fn test_simple_string_rejects_newlines() {
        assert!(Value::Simple("a\r\nb".to_string()).encode().is_err());
        assert!(Value::Error("a\nb".to_string()).encode().is_err());
    }

    #[test]
    fn test_bulk_carries_arbitrary_bytes() {
        let payload = Bytes::from_static(&[0x00, 0xff, 0x0d, 0x0a, 0x24]);
        let encoded = Value::Bulk(payload.clone()).encode().unwrap();
        assert_eq!(&encoded[..], b"$5\r\n\x00\xff\r\n$\r\n");
    }
}
