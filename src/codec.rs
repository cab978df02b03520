//! Platform-independent name and content conversions.
//!
//! Resource names may arrive percent-encoded (they are frequently sourced
//! from URLs or archive manifests); `decode` normalizes them before any path
//! is touched. Content conversions are fixed to UTF-8 regardless of platform
//! defaults.

use std::path::PathBuf;

use crate::error::FileError;

/// Percent-decode a resource name.
///
/// # Errors
/// Returns `FileError::Corrupted` if the decoded bytes are not valid UTF-8.
pub fn decode(name: &str) -> Result<String, FileError> {
    urlencoding::decode(name)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| FileError::Corrupted {
            path: PathBuf::from(name),
            reason: "percent-encoded name does not decode to UTF-8".to_string(),
        })
}

/// Get the UTF-8 bytes of a string.
pub fn get_bytes(text: &str) -> Vec<u8> {
    text.as_bytes().to_vec()
}

/// Build a string from UTF-8 bytes.
///
/// Malformed sequences are replaced rather than rejected, so this never
/// fails.
pub fn get_string(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain_name_unchanged() {
        assert_eq!(decode("plain/file.txt").unwrap(), "plain/file.txt");
    }

    #[test]
    fn test_decode_percent_sequences() {
        assert_eq!(decode("my%20file.txt").unwrap(), "my file.txt");
        assert_eq!(decode("a%2Fb").unwrap(), "a/b");
    }

    #[test]
    fn test_decode_invalid_utf8_fails() {
        let result = decode("%FF%FE");
        assert!(matches!(result, Err(FileError::Corrupted { .. })));
    }

    #[test]
    fn test_bytes_round_trip() {
        let text = "héllo wörld";
        assert_eq!(get_string(&get_bytes(text)), text);
    }

    #[test]
    fn test_get_string_replaces_malformed_input() {
        let garbled = get_string(&[0x61, 0xFF, 0x62]);
        assert_eq!(garbled, "a\u{FFFD}b");
    }
}
