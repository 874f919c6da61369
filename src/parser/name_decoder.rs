//! Best-effort, multi-layer decoding of node display names.
//!
//! Names arrive percent-encoded, double-percent-encoded, Base64-wrapped or
//! mojibake'd, often in combination. Each step below is attempted in order and
//! its failure swallowed, keeping the last successful, plausible result. A
//! legitimately Base64-looking plain name can still be mis-decoded; that is an
//! accepted limitation of the format, not something to guess around.

use crate::utils::base64::{base64_decode, looks_like_base64};

/// Decode a raw display name, falling back to `fallback` when absent.
pub fn decode_node_name(raw: &str, fallback: &str) -> String {
    if raw.is_empty() {
        return fallback.to_string();
    }

    let mut decoded = raw.to_string();

    // Two percent-decode passes; the second handles double-encoded names.
    for _ in 0..2 {
        if let Ok(percent_decoded) = urlencoding::decode(&decoded) {
            decoded = percent_decoded.into_owned();
        }
    }

    // Base64 pass, only accepted when the result looks like a real name.
    // Canonical length only: short unpadded names like "MyNode" must stay raw.
    if decoded.len() % 4 == 0 && looks_like_base64(&decoded) {
        if let Some(text) = base64_decode(&decoded) {
            if is_plausible_name(&text) {
                decoded = text;
            }
        }
    }

    // Legacy-encoding pass: strings whose chars all fit in one byte may be
    // UTF-8 read as Latin-1; reinterpret and keep the result if it differs.
    if let Some(reinterpreted) = latin1_to_utf8(&decoded) {
        if reinterpreted != decoded {
            decoded = reinterpreted;
        }
    }

    decoded
}

/// Printable ASCII or CJK only, and non-empty.
fn is_plausible_name(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| ('\x20'..='\x7e').contains(&c) || ('\u{4e00}'..='\u{9fff}').contains(&c))
}

/// Treat each char as a Latin-1 byte and decode the byte string as UTF-8.
/// Returns `None` when any char is outside Latin-1 or the bytes are not UTF-8.
fn latin1_to_utf8(text: &str) -> Option<String> {
    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        if (c as u32) > 0xff {
            return None;
        }
        bytes.push(c as u8);
    }
    String::from_utf8(bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_falls_back() {
        assert_eq!(decode_node_name("", "default"), "default");
        assert_eq!(decode_node_name("", ""), "");
    }

    #[test]
    fn test_plain_name_passthrough() {
        assert_eq!(decode_node_name("My Node", ""), "My Node");
    }

    #[test]
    fn test_percent_decoding() {
        assert_eq!(decode_node_name("HK%20Node", ""), "HK Node");
    }

    #[test]
    fn test_double_percent_decoding() {
        assert_eq!(decode_node_name("HK%2520Node", ""), "HK Node");
    }

    #[test]
    fn test_base64_name_with_cjk() {
        // base64("香港 HK") — decodes to CJK plus printable ASCII
        assert_eq!(decode_node_name("6aaZ5rivIEhL", ""), "香港 HK");
    }

    #[test]
    fn test_base64_looking_garbage_kept_raw() {
        // Decodes to control bytes, so the base64 step must be rejected.
        assert_eq!(decode_node_name("AAAA", ""), "AAAA");
    }

    #[test]
    fn test_short_ascii_name_kept_raw() {
        // Base64 charset but non-canonical length; must not be decoded.
        assert_eq!(decode_node_name("MyNode", ""), "MyNode");
    }

    #[test]
    fn test_latin1_mojibake_repair() {
        // "中" encoded as UTF-8 then mis-read as Latin-1
        let mojibake: String = "中".bytes().map(|b| b as char).collect();
        assert_eq!(decode_node_name(&mojibake, ""), "中");
    }
}
