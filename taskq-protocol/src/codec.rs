//! Streaming decoder for the wire format.

use crate::error::ProtocolError;
use crate::value::Value;
use crate::{MAX_ARRAY_LEN, MAX_BULK_SIZE, MAX_LINE_LEN};
use bytes::{Buf, Bytes, BytesMut};

/// Incremental decoder over a growable byte buffer.
///
/// Feed raw socket reads with [`extend`](Decoder::extend) and pull complete
/// values with [`decode_value`](Decoder::decode_value); partial input stays
/// buffered until the rest arrives.
pub struct Decoder {
    buffer: BytesMut,
}

impl Decoder {
    pub fn new() -> Self {
        Self {
            buffer: BytesMut::with_capacity(8192),
        }
    }

    /// Appends data to the internal buffer.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Attempts to decode the next complete value from the buffer.
    ///
    /// Returns `Ok(None)` when more bytes are needed. On success, exactly the
    /// bytes of the decoded value are consumed.
    pub fn decode_value(&mut self) -> Result<Option<Value>, ProtocolError> {
        let mut pos = 0;
        match parse_value(&self.buffer, &mut pos)? {
            Some(value) => {
                self.buffer.advance(pos);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Returns the number of bytes currently buffered.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Clears the internal buffer.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses one value starting at `*pos`, advancing `*pos` past it on success.
///
/// Returns `Ok(None)` when the buffer ends before the value does; in that
/// case `*pos` is meaningless and the caller must not consume anything.
fn parse_value(buf: &[u8], pos: &mut usize) -> Result<Option<Value>, ProtocolError> {
    let Some(&tag) = buf.get(*pos) else {
        return Ok(None);
    };
    let body = *pos + 1;

    let value = match tag {
        b'+' => match read_line(buf, body, pos)? {
            Some(line) => Value::Simple(line_str(line)?.to_string()),
            None => return Ok(None),
        },
        b'-' => match read_line(buf, body, pos)? {
            Some(line) => Value::Error(line_str(line)?.to_string()),
            None => return Ok(None),
        },
        b':' => match read_line(buf, body, pos)? {
            Some(line) => parse_number(line_str(line)?)?,
            None => return Ok(None),
        },
        b'$' => {
            let Some(line) = read_line(buf, body, pos)? else {
                return Ok(None);
            };
            let declared = parse_length(line)?;
            if declared == -1 {
                Value::Null
            } else if declared < -1 {
                return Err(ProtocolError::InvalidLength(declared.to_string()));
            } else {
                let len = declared as usize;
                if len > MAX_BULK_SIZE {
                    return Err(ProtocolError::BulkTooLarge {
                        size: len,
                        max: MAX_BULK_SIZE,
                    });
                }
                if buf.len() < *pos + len + 2 {
                    return Ok(None);
                }
                if &buf[*pos + len..*pos + len + 2] != b"\r\n" {
                    return Err(ProtocolError::MissingTerminator);
                }
                let payload = Bytes::copy_from_slice(&buf[*pos..*pos + len]);
                *pos += len + 2;
                Value::Bulk(payload)
            }
        }
        b'*' => {
            let Some(line) = read_line(buf, body, pos)? else {
                return Ok(None);
            };
            let declared = parse_length(line)?;
            if declared < 0 {
                return Err(ProtocolError::InvalidLength(declared.to_string()));
            }
            let count = declared as usize;
            if count > MAX_ARRAY_LEN {
                return Err(ProtocolError::ArrayTooLarge {
                    count,
                    max: MAX_ARRAY_LEN,
                });
            }
            let mut items = Vec::with_capacity(count.min(64));
            for _ in 0..count {
                match parse_value(buf, pos)? {
                    Some(item) => items.push(item),
                    None => return Ok(None),
                }
            }
            Value::Array(items)
        }
        other => return Err(ProtocolError::UnknownTag(other)),
    };

    Ok(Some(value))
}

/// Scans for the next CRLF from `start`; on success sets `*pos` past the
/// terminator and returns the line content without it.
fn read_line<'a>(
    buf: &'a [u8],
    start: usize,
    pos: &mut usize,
) -> Result<Option<&'a [u8]>, ProtocolError> {
    let haystack = &buf[start..];
    match haystack.windows(2).position(|window| window == b"\r\n") {
        Some(end) => {
            *pos = start + end + 2;
            Ok(Some(&haystack[..end]))
        }
        None => {
            if haystack.len() > MAX_LINE_LEN {
                return Err(ProtocolError::LineTooLong { max: MAX_LINE_LEN });
            }
            Ok(None)
        }
    }
}

fn line_str(line: &[u8]) -> Result<&str, ProtocolError> {
    std::str::from_utf8(line).map_err(|_| ProtocolError::InvalidUtf8)
}

/// A `:` line holds a float when it contains a decimal point, else an integer.
fn parse_number(text: &str) -> Result<Value, ProtocolError> {
    if text.contains('.') {
        text.parse::<f64>()
            .map(Value::Float)
            .map_err(|_| ProtocolError::InvalidNumber(text.to_string()))
    } else {
        text.parse::<i64>()
            .map(Value::Int)
            .map_err(|_| ProtocolError::InvalidNumber(text.to_string()))
    }
}

fn parse_length(line: &[u8]) -> Result<i64, ProtocolError> {
    let text = line_str(line)?;
    text.parse::<i64>()
        .map_err(|_| ProtocolError::InvalidLength(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode_all(input: &[u8]) -> Result<Vec<Value>, ProtocolError> {
        let mut decoder = Decoder::new();
        decoder.extend(input);
        let mut values = Vec::new();
        while let Some(value) = decoder.decode_value()? {
            values.push(value);
        }
        Ok(values)
    }

    fn roundtrip(value: Value) -> Value {
        let encoded = value.encode().unwrap();
        let mut decoder = Decoder::new();
        decoder.extend(&encoded);
        let decoded = decoder.decode_value().unwrap().unwrap();
        assert_eq!(decoder.buffered(), 0);
        decoded
    }

    #[test]
    fn test_roundtrip_each_shape() {
        for value in [
            Value::Simple("PONG".to_string()),
            Value::Error("Unrecognized command: FOO".to_string()),
            Value::Int(0),
            Value::Int(i64::MIN),
            Value::Float(2.25),
            Value::bulk(&b"payload"[..]),
            Value::bulk(&b""[..]),
            Value::Null,
            Value::Array(vec![]),
            Value::Array(vec![
                Value::bulk(&b"ENQUEUE"[..]),
                Value::bulk(&b"jobs"[..]),
                Value::Null,
                Value::Array(vec![Value::Int(7)]),
            ]),
        ] {
            assert_eq!(roundtrip(value.clone()), value);
        }
    }

    #[test]
    fn test_decode_simple_string() {
        let values = decode_all(b"+OK\r\n").unwrap();
        assert_eq!(values, vec![Value::Simple("OK".to_string())]);
    }

    #[test]
    fn test_decode_error() {
        let values = decode_all(b"-bad thing\r\n").unwrap();
        assert_eq!(values, vec![Value::Error("bad thing".to_string())]);
    }

    #[test]
    fn test_decode_numbers() {
        let values = decode_all(b":1337\r\n:-1\r\n:2.5\r\n").unwrap();
        assert_eq!(
            values,
            vec![Value::Int(1337), Value::Int(-1), Value::Float(2.5)]
        );
    }

    #[test]
    fn test_decode_null_and_empty_bulk_are_distinct() {
        let values = decode_all(b"$-1\r\n$0\r\n\r\n").unwrap();
        assert_eq!(values, vec![Value::Null, Value::bulk(&b""[..])]);
    }

    #[test]
    fn test_decode_request_array() {
        let values = decode_all(b"*3\r\n$7\r\nENQUEUE\r\n$4\r\njobs\r\n$2\r\nhi\r\n").unwrap();
        assert_eq!(
            values,
            vec![Value::Array(vec![
                Value::bulk(&b"ENQUEUE"[..]),
                Value::bulk(&b"jobs"[..]),
                Value::bulk(&b"hi"[..]),
            ])]
        );
    }

    #[test]
    fn test_partial_input_buffers_until_complete() {
        let encoded = Value::Array(vec![Value::bulk(&b"DEQUEUE"[..]), Value::bulk(&b"jobs"[..])])
            .encode()
            .unwrap();

        let mut decoder = Decoder::new();
        for chunk in encoded.chunks(3) {
            decoder.extend(chunk);
        }
        // Nothing was lost across partial feeds.
        let value = decoder.decode_value().unwrap().unwrap();
        assert_eq!(
            value,
            Value::Array(vec![Value::bulk(&b"DEQUEUE"[..]), Value::bulk(&b"jobs"[..])])
        );

        // A prefix alone decodes to nothing and consumes nothing.
        let mut decoder = Decoder::new();
        decoder.extend(&encoded[..5]);
        assert!(decoder.decode_value().unwrap().is_none());
        assert_eq!(decoder.buffered(), 5);
    }

    #[test]
    fn test_pipelined_values_decode_in_order() {
        let mut input = Vec::new();
        input.extend_from_slice(&Value::Int(1).encode().unwrap());
        input.extend_from_slice(&Value::bulk(&b"two"[..]).encode().unwrap());
        let values = decode_all(&input).unwrap();
        assert_eq!(values, vec![Value::Int(1), Value::bulk(&b"two"[..])]);
    }

    #[test]
    fn test_unknown_tag_is_an_error() {
        let result = decode_all(b"!oops\r\n");
        assert!(matches!(result, Err(ProtocolError::UnknownTag(b'!'))));
    }

    #[test]
    fn test_bad_bulk_terminator_is_an_error() {
        let result = decode_all(b"$2\r\nhiXX");
        assert!(matches!(result, Err(ProtocolError::MissingTerminator)));
    }

    #[test]
    fn test_invalid_lengths_are_errors() {
        assert!(matches!(
            decode_all(b"$-2\r\n"),
            Err(ProtocolError::InvalidLength(_))
        ));
        assert!(matches!(
            decode_all(b"*-1\r\n"),
            Err(ProtocolError::InvalidLength(_))
        ));
        assert!(matches!(
            decode_all(b"$abc\r\n"),
            Err(ProtocolError::InvalidLength(_))
        ));
    }

    #[test]
    fn test_invalid_number_is_an_error() {
        assert!(matches!(
            decode_all(b":12x\r\n"),
            Err(ProtocolError::InvalidNumber(_))
        ));
    }

    #[test]
    fn test_unterminated_line_over_cap_is_an_error() {
        let mut input = vec![b'+'];
        input.extend(std::iter::repeat(b'a').take(MAX_LINE_LEN + 1));
        assert!(matches!(
            decode_all(&input),
            Err(ProtocolError::LineTooLong { .. })
        ));
    }

    #[test]
    fn test_oversized_bulk_is_rejected_before_payload_arrives() {
        let input = format!("${}\r\n", MAX_BULK_SIZE + 1);
        assert!(matches!(
            decode_all(input.as_bytes()),
            Err(ProtocolError::BulkTooLarge { .. })
        ));
    }

    fn value_strategy() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<i64>().prop_map(Value::Int),
            (-1.0e9..1.0e9f64).prop_map(Value::Float),
            "[a-zA-Z0-9 _.:-]{0,24}".prop_map(Value::Simple),
            "[a-zA-Z0-9 _.:-]{0,24}".prop_map(Value::Error),
            prop::collection::vec(any::<u8>(), 0..128)
                .prop_map(|data| Value::Bulk(Bytes::from(data))),
        ];
        leaf.prop_recursive(3, 32, 8, |inner| {
            prop::collection::vec(inner, 0..8).prop_map(Value::Array)
        })
    }

    proptest! {
        #[test]
        fn prop_roundtrip(value in value_strategy()) {
            prop_assert_eq!(roundtrip(value.clone()), value);
        }
    }
}
