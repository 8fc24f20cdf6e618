//! Class name text handling
//!
//! Class files store names in "internal" form (`java/lang/Object`) encoded
//! as modified UTF-8. The loader works with dotted binary names and converts
//! back to internal form only at the host boundary.

use std::borrow::Cow;

const REPLACEMENT: u16 = 0xFFFD;

/// Decode modified UTF-8 as stored in `CONSTANT_Utf8` records.
///
/// Plain UTF-8 is borrowed as-is. Otherwise the JVM encoding rules apply
/// (two-byte NUL, surrogate pairs as two three-byte sequences) and malformed
/// sequences become U+FFFD.
pub fn decode_modified_utf8(bytes: &[u8]) -> Cow<'_, str> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let lead = bytes[i];
        match lead {
            0x00..=0x7F => {
                units.push(u16::from(lead));
                i += 1;
            }
            0xC0..=0xDF => match continuation(bytes, i + 1) {
                Some(c1) => {
                    units.push((u16::from(lead & 0x1F) << 6) | u16::from(c1));
                    i += 2;
                }
                None => {
                    units.push(REPLACEMENT);
                    i += 1;
                }
            },
            0xE0..=0xEF => match (continuation(bytes, i + 1), continuation(bytes, i + 2)) {
                (Some(c1), Some(c2)) => {
                    units.push(
                        (u16::from(lead & 0x0F) << 12) | (u16::from(c1) << 6) | u16::from(c2),
                    );
                    i += 3;
                }
                _ => {
                    units.push(REPLACEMENT);
                    i += 1;
                }
            },
            _ => {
                units.push(REPLACEMENT);
                i += 1;
            }
        }
    }

    Cow::Owned(String::from_utf16_lossy(&units))
}

/// Low six bits of a continuation byte at `at`, if there is one.
fn continuation(bytes: &[u8], at: usize) -> Option<u8> {
    bytes
        .get(at)
        .copied()
        .filter(|byte| byte & 0xC0 == 0x80)
        .map(|byte| byte & 0x3F)
}

/// `java/lang/Object` -> `java.lang.Object`
pub fn to_binary_name(internal: &str) -> String {
    internal.replace('/', ".")
}

/// `java.lang.Object` -> `java/lang/Object`
pub fn to_internal_name(binary: &str) -> String {
    binary.replace('.', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8_is_borrowed() {
        let decoded = decode_modified_utf8(b"com/example/App");
        assert!(matches!(decoded, Cow::Borrowed("com/example/App")));
    }

    #[test]
    fn test_two_byte_nul() {
        assert_eq!(decode_modified_utf8(&[b'a', 0xC0, 0x80, b'b']), "a\u{0}b");
    }

    #[test]
    fn test_surrogate_pair() {
        // U+1F600 as a CESU-style surrogate pair
        let bytes = [0xED, 0xA0, 0xBD, 0xED, 0xB8, 0x80];
        assert_eq!(decode_modified_utf8(&bytes), "\u{1F600}");
    }

    #[test]
    fn test_malformed_sequences_are_replaced() {
        assert_eq!(decode_modified_utf8(&[b'x', 0xC3]), "x\u{FFFD}");
        assert_eq!(decode_modified_utf8(&[0xFF, b'y']), "\u{FFFD}y");
    }

    #[test]
    fn test_name_conversions() {
        assert_eq!(to_binary_name("a/b/C$Inner"), "a.b.C$Inner");
        assert_eq!(to_internal_name("a.b.C$Inner"), "a/b/C$Inner");
    }
}
