use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use lazy_static::lazy_static;
use regex::Regex;

/// Standard-alphabet engine that accepts both padded and unpadded input.
/// Share links in the wild routinely drop the trailing `=`.
const STANDARD_FORGIVING: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

lazy_static! {
    static ref BASE64_ALPHABET: Regex = Regex::new(r"^[A-Za-z0-9+/=]+$").unwrap();
}

/// Encodes a string to standard Base64.
pub fn base64_encode(input: &str) -> String {
    STANDARD.encode(input)
}

/// Decodes a standard-alphabet Base64 string, tolerating missing padding.
///
/// Returns `None` when the input is not valid Base64 or does not decode to
/// valid UTF-8.
pub fn base64_decode(input: &str) -> Option<String> {
    let decoded = STANDARD_FORGIVING.decode(input.trim()).ok()?;
    String::from_utf8(decoded).ok()
}

/// Reverses a URL-safe Base64 string to the standard alphabet and strips
/// embedded whitespace.
pub fn url_safe_base64_reverse(input: &str) -> String {
    input
        .replace('-', "+")
        .replace('_', "/")
        .split_whitespace()
        .collect()
}

/// Pads a Base64 string with `=` to a multiple of four characters.
pub fn pad_base64(input: &str) -> String {
    let mut padded = input.to_string();
    let rem = padded.len() % 4;
    if rem != 0 {
        padded.push_str(&"=".repeat(4 - rem));
    }
    padded
}

/// Decodes a possibly URL-safe, possibly unpadded Base64 string.
pub fn url_safe_base64_decode(input: &str) -> Option<String> {
    base64_decode(&pad_base64(&url_safe_base64_reverse(input)))
}

/// Whether the string consists solely of the standard Base64 alphabet.
/// A plain name can satisfy this too, so callers must sanity-check the decode.
pub fn looks_like_base64(input: &str) -> bool {
    !input.is_empty() && BASE64_ALPHABET.is_match(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        assert_eq!(base64_decode(&base64_encode("hello")).unwrap(), "hello");
    }

    #[test]
    fn test_decode_unpadded() {
        // "Ma" encodes to "TWE=" with padding
        assert_eq!(base64_decode("TWE").unwrap(), "Ma");
        assert_eq!(base64_decode("TWE=").unwrap(), "Ma");
    }

    #[test]
    fn test_url_safe_reverse() {
        assert_eq!(url_safe_base64_reverse("a-b_c"), "a+b/c");
        assert_eq!(url_safe_base64_decode("YWVzLTI1Ng").unwrap(), "aes-256");
    }

    #[test]
    fn test_invalid_input() {
        assert!(base64_decode("not base64!").is_none());
    }

    #[test]
    fn test_looks_like_base64() {
        assert!(looks_like_base64("SGVsbG8="));
        assert!(!looks_like_base64("hello world"));
        assert!(!looks_like_base64(""));
    }
}
