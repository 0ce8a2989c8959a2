//! Key validation
//!
//! OpenKeyval uses the key as a path segment and as a form field, so the
//! accepted alphabet is kept to ASCII letters, digits, `-` and `_`. Every other
//! character is forbidden. The policy is the same for every store.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{Error, Result};

/// Maximum key length in bytes accepted by the service.
pub const MAX_KEY_LENGTH: usize = 128;

/// Unreserved characters per RFC 3986 stay as they are; everything else is
/// percent-encoded.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Returns true if `c` may not appear in a key.
#[inline]
pub fn is_forbidden(c: char) -> bool {
    !(c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Validates that a key can be sent to the service.
///
/// Keys must:
/// - Not be empty
/// - Not exceed [`MAX_KEY_LENGTH`]
/// - Not contain a forbidden character (see [`is_forbidden`])
///
/// # Errors
/// Returns `Error::InvalidKey` carrying the key and the reason.
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(invalid(key, "key cannot be empty".to_string()));
    }

    if key.len() > MAX_KEY_LENGTH {
        return Err(invalid(
            key,
            format!("key too long ({} bytes, max {})", key.len(), MAX_KEY_LENGTH),
        ));
    }

    if let Some((pos, c)) = key.char_indices().find(|&(_, c)| is_forbidden(c)) {
        return Err(invalid(
            key,
            format!("character {:?} at position {} is not allowed", c, pos),
        ));
    }

    Ok(())
}

fn invalid(key: &str, detail: String) -> Error {
    Error::InvalidKey {
        key: key.to_string(),
        detail,
    }
}

/// Percent-encode a key for use in a URI path.
pub fn encode_key(key: &str) -> String {
    utf8_percent_encode(key, PATH_SEGMENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detail(key: &str) -> String {
        match validate_key(key) {
            Err(Error::InvalidKey { key: rejected, detail }) => {
                assert_eq!(rejected, key);
                detail
            }
            other => panic!("Expected InvalidKey for {:?}, got: {:?}", key, other),
        }
    }

    #[test]
    fn test_valid_keys() {
        for key in ["k1", "user_123", "some-key", "ABCxyz09", "-", "_"] {
            assert!(validate_key(key).is_ok(), "{:?} should be valid", key);
        }
    }

    #[test]
    fn test_empty_key() {
        assert!(detail("").contains("empty"));
    }

    #[test]
    fn test_slash_and_whitespace() {
        assert!(detail("a/b").contains("'/'"));
        assert!(detail("a b").contains("' '"));
        assert!(detail("a\tb").contains("position 1"));
        assert!(detail("trailing\n").contains("position 8"));
    }

    #[test]
    fn test_url_syntax_characters() {
        for key in ["a?b", "a#b", "a%20b", "a&b", "a=b", "a+b", "a.b", "a:b"] {
            assert!(validate_key(key).is_err(), "{:?} should be rejected", key);
        }
    }

    #[test]
    fn test_non_ascii() {
        assert!(detail("clé").contains("'é'"));
        assert!(validate_key("日本").is_err());
    }

    #[test]
    fn test_length_limit() {
        let max = "a".repeat(MAX_KEY_LENGTH);
        assert!(validate_key(&max).is_ok());

        let too_long = "a".repeat(MAX_KEY_LENGTH + 1);
        assert!(detail(&too_long).contains("too long"));
    }

    #[test]
    fn test_encode_key() {
        assert_eq!(encode_key("user_123-x"), "user_123-x");
        assert_eq!(encode_key("a b/c"), "a%20b%2Fc");
        assert_eq!(encode_key("a.b~c"), "a.b~c");
    }
}
