use bytes::{BufMut, Bytes, BytesMut};

use crate::completion::CompletionCode;
use crate::error::{MessageError, Result};

/// Encodes a message body to its wire layout.
pub trait Encode {
    /// Append the wire bytes to `dst`.
    fn encode(&self, dst: &mut BytesMut) -> Result<()>;

    /// Encode into a fresh buffer.
    fn to_bytes(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        self.encode(&mut buf)?;
        Ok(buf.freeze())
    }
}

/// Decodes a message body from its wire layout.
///
/// Decoding builds a new value; nothing is written on failure.
pub trait Decode: Sized {
    fn decode(src: &[u8]) -> Result<Self>;
}

/// Require exactly `expected` bytes.
pub fn expect_len(message: &'static str, src: &[u8], expected: usize) -> Result<()> {
    expect_range(message, src, expected, expected)
}

/// Require between `min` and `max` bytes inclusive.
pub fn expect_range(message: &'static str, src: &[u8], min: usize, max: usize) -> Result<()> {
    if src.len() < min {
        return Err(MessageError::ShortPacket {
            message,
            expected: min,
            actual: src.len(),
        });
    }
    if src.len() > max {
        return Err(MessageError::LongPacket {
            message,
            expected: max,
            actual: src.len(),
        });
    }
    Ok(())
}

/// Read the completion code that opens every response.
///
/// A buffer too short to hold it is malformed; the status is never guessed.
pub fn completion_code(message: &'static str, src: &[u8]) -> Result<CompletionCode> {
    match src.first() {
        Some(&code) => Ok(CompletionCode(code)),
        None => Err(MessageError::ShortPacket {
            message,
            expected: 1,
            actual: 0,
        }),
    }
}

/// Write `value` into a zero-padded field of exactly `width` bytes.
pub fn put_fixed(
    dst: &mut BytesMut,
    field: &'static str,
    value: &[u8],
    width: usize,
) -> Result<()> {
    if value.len() > width {
        return Err(MessageError::FieldTooLong {
            field,
            len: value.len(),
            max: width,
        });
    }
    dst.reserve(width);
    dst.put_slice(value);
    dst.put_bytes(0, width - value.len());
    Ok(())
}

/// Recover a string from a zero-padded fixed-width field.
///
/// Trailing zeros are trimmed. Bytes that are not valid UTF-8 become
/// U+FFFD, so such a field does not survive a decode/encode round trip.
pub fn fixed_str(src: &[u8]) -> String {
    let end = src.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    String::from_utf8_lossy(&src[..end]).into_owned()
}

/// Read a little-endian 24-bit value (IANA enterprise numbers).
pub fn get_u24_le(src: &[u8]) -> u32 {
    u32::from(src[0]) | (u32::from(src[1]) << 8) | (u32::from(src[2]) << 16)
}

/// Write the low 24 bits of `value` little-endian.
pub fn put_u24_le(dst: &mut BytesMut, value: u32) {
    dst.put_slice(&value.to_le_bytes()[..3]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expect_len_reports_short_and_long() {
        assert!(expect_len("test", &[1, 2], 2).is_ok());
        assert_eq!(
            expect_len("test", &[1], 2),
            Err(MessageError::ShortPacket {
                message: "test",
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            expect_len("test", &[1, 2, 3], 2),
            Err(MessageError::LongPacket {
                message: "test",
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn completion_code_on_empty_buffer_is_short() {
        let err = completion_code("test", &[]).unwrap_err();
        assert!(err.is_malformed_packet());
    }

    #[test]
    fn put_fixed_pads_and_rejects_overflow() {
        let mut buf = BytesMut::new();
        put_fixed(&mut buf, "name", b"ab", 4).unwrap();
        assert_eq!(buf.as_ref(), &[b'a', b'b', 0, 0]);

        let err = put_fixed(&mut buf, "name", b"abcde", 4).unwrap_err();
        assert!(matches!(err, MessageError::FieldTooLong { len: 5, max: 4, .. }));
    }

    #[test]
    fn fixed_str_trims_trailing_zeros_only() {
        assert_eq!(fixed_str(b"test\0\0\0"), "test");
        assert_eq!(fixed_str(b"\0\0"), "");
        assert_eq!(fixed_str(b"full"), "full");
    }

    #[test]
    fn fixed_str_replaces_invalid_utf8() {
        assert_eq!(fixed_str(&[0x66, 0xff, 0x00]), "f\u{fffd}");
        assert_eq!(fixed_str(&[0xc3, 0xa9, 0x00, 0x00]), "\u{e9}");
    }

    #[test]
    fn u24_round_trip() {
        let mut buf = BytesMut::new();
        put_u24_le(&mut buf, 0x00_1a_2b_3c);
        assert_eq!(buf.as_ref(), &[0x3c, 0x2b, 0x1a]);
        assert_eq!(get_u24_le(&buf), 0x1a_2b_3c);
    }
}
