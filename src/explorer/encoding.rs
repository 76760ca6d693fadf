// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Text decoding with a fixed fallback chain
//!
//! Files are tried as UTF-8, then Latin-1, then Windows-1252, then
//! ISO-8859-1. The first decoder that accepts the bytes wins.

use std::borrow::Cow;
use std::fmt;

use encoding_rs::WINDOWS_1252;

/// A single-byte or UTF-8 text encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Latin1,
    Windows1252,
    Iso8859_1,
}

/// Order in which encodings are attempted
pub const FALLBACK_CHAIN: [TextEncoding; 4] = [
    TextEncoding::Utf8,
    TextEncoding::Latin1,
    TextEncoding::Windows1252,
    TextEncoding::Iso8859_1,
];

// Unassigned in Windows-1252. The WHATWG decoder maps them to C1 controls,
// so they are rejected before decoding.
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

impl TextEncoding {
    pub fn label(&self) -> &'static str {
        match self {
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::Latin1 => "latin-1",
            TextEncoding::Windows1252 => "cp1252",
            TextEncoding::Iso8859_1 => "iso-8859-1",
        }
    }

    /// Decode `bytes`, or `None` if they are not valid in this encoding.
    pub fn decode(&self, bytes: &[u8]) -> Option<String> {
        match self {
            TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_string),
            TextEncoding::Latin1 | TextEncoding::Iso8859_1 => {
                Some(bytes.iter().map(|&b| b as char).collect())
            }
            TextEncoding::Windows1252 => {
                if bytes.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                    return None;
                }
                WINDOWS_1252
                    .decode_without_bom_handling_and_without_replacement(bytes)
                    .map(Cow::into_owned)
            }
        }
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Decode with the first encoding in `FALLBACK_CHAIN` that accepts the bytes.
pub fn decode_with_fallback(bytes: &[u8]) -> Option<(String, TextEncoding)> {
    FALLBACK_CHAIN
        .iter()
        .find_map(|enc| enc.decode(bytes).map(|text| (text, *enc)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_first() {
        let (text, enc) = decode_with_fallback("héllo".as_bytes()).unwrap();
        assert_eq!(text, "héllo");
        assert_eq!(enc, TextEncoding::Utf8);
    }

    #[test]
    fn test_latin1_fallback() {
        let bytes = [b'c', b'a', b'f', 0xE9];
        let (text, enc) = decode_with_fallback(&bytes).unwrap();
        assert_eq!(text, "café");
        assert_eq!(enc, TextEncoding::Latin1);
    }

    #[test]
    fn test_cp1252_maps_high_range() {
        let text = TextEncoding::Windows1252.decode(&[0x80, 0x93, 0x94]).unwrap();
        assert_eq!(text, "\u{20AC}\u{201C}\u{201D}");

        let text = TextEncoding::Windows1252.decode(&[0x8A, 0x9F, b'a', 0xE9]).unwrap();
        assert_eq!(text, "\u{0160}\u{0178}a\u{00E9}");
    }

    #[test]
    fn test_cp1252_rejects_undefined_bytes() {
        for b in [0x81u8, 0x8D, 0x8F, 0x90, 0x9D] {
            assert!(TextEncoding::Windows1252.decode(&[b]).is_none());
        }
    }

    #[test]
    fn test_labels() {
        let labels: Vec<_> = FALLBACK_CHAIN.iter().map(|e| e.to_string()).collect();
        assert_eq!(labels, vec!["utf-8", "latin-1", "cp1252", "iso-8859-1"]);
    }
}
