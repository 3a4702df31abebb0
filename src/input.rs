use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::error::ConvertError;

/// Resolve the literal text to synthesize from the raw positional argument.
///
/// Modes are checked in a fixed priority order: the explicit base64 flag
/// first, then the `@path` file-reference sentinel, then the argument
/// verbatim. Exactly one mode applies per invocation.
pub fn resolve_text(raw: &str, from_base64: bool) -> Result<String, ConvertError> {
    if from_base64 {
        let bytes = BASE64
            .decode(raw.trim())
            .map_err(|e| ConvertError::Base64(e.to_string()))?;
        return String::from_utf8(bytes).map_err(|e| ConvertError::Base64(e.to_string()));
    }

    if let Some(path) = raw.strip_prefix('@') {
        return std::fs::read_to_string(path).map_err(|e| ConvertError::TextFile(e.to_string()));
    }

    Ok(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn decodes_base64_hello() {
        assert_eq!(resolve_text("aGVsbG8=", true).unwrap(), "hello");
    }

    #[test]
    fn rejects_malformed_base64() {
        let err = resolve_text("not*base64*", true).unwrap_err();
        assert!(err.to_string().starts_with("Failed to decode base64"));
    }

    #[test]
    fn rejects_base64_of_invalid_utf8() {
        use base64::engine::general_purpose::STANDARD;
        let blob = STANDARD.encode([0xff, 0xfe, 0xfd]);
        let err = resolve_text(&blob, true).unwrap_err();
        assert!(err.to_string().starts_with("Failed to decode base64"));
    }

    #[test]
    fn missing_text_file_is_an_io_failure() {
        let err = resolve_text("@/no/such/file.txt", false).unwrap_err();
        assert!(err.to_string().starts_with("Failed to read text file"));
    }

    #[test]
    fn reads_text_from_referenced_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "xin chào").unwrap();
        let arg = format!("@{}", file.path().display());
        assert_eq!(resolve_text(&arg, false).unwrap(), "xin chào");
    }

    #[test]
    fn inline_text_passes_through_verbatim() {
        assert_eq!(resolve_text("Hello world", false).unwrap(), "Hello world");
    }

    #[test]
    fn base64_flag_takes_priority_over_file_sentinel() {
        // An @-prefixed argument with the flag set is decoded, not opened.
        let err = resolve_text("@/no/such/file.txt", true).unwrap_err();
        assert!(err.to_string().starts_with("Failed to decode base64"));
    }
}
