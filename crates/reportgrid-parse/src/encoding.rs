//! Byte-to-text encodings for simple and composite fonts.
//!
//! Simple fonts map one byte to one glyph through a base encoding
//! (WinAnsi, MacRoman) optionally patched by a `/Differences` array.
//! Composite (Type0) fonts either use two-byte identity codes, UCS-2
//! codes, or a legacy CJK multibyte encoding named by a predefined CMap.

use encoding_rs::Encoding;

/// A 256-entry byte → character table for simple fonts.
#[derive(Debug, Clone)]
pub struct SimpleEncoding {
    table: [Option<char>; 256],
}

impl SimpleEncoding {
    fn from_encoding(encoding: &'static Encoding) -> Self {
        let mut table = [None; 256];
        for (byte, slot) in table.iter_mut().enumerate().skip(0x20) {
            let bytes = [byte as u8];
            let (decoded, _) = encoding.decode_without_bom_handling(&bytes);
            *slot = decoded.chars().next().filter(|c| *c != '\u{FFFD}');
        }
        Self { table }
    }

    /// WinAnsiEncoding (Windows-1252). Also the fallback for fonts that
    /// name no encoding.
    pub fn win_ansi() -> Self {
        Self::from_encoding(encoding_rs::WINDOWS_1252)
    }

    pub fn mac_roman() -> Self {
        Self::from_encoding(encoding_rs::MACINTOSH)
    }

    /// Pick a base encoding by its PDF name.
    pub fn named(name: &str) -> Self {
        match name {
            "MacRomanEncoding" => Self::mac_roman(),
            _ => Self::win_ansi(),
        }
    }

    /// Apply `/Differences` entries: each glyph name replaces the mapping
    /// of its code.
    pub fn apply_differences<'a>(&mut self, differences: impl IntoIterator<Item = (u8, &'a str)>) {
        for (code, glyph) in differences {
            if let Some(c) = glyph_to_char(glyph) {
                self.table[code as usize] = Some(c);
            }
        }
    }

    pub fn decode(&self, code: u8) -> Option<char> {
        self.table[code as usize]
    }
}

/// Resolve an Adobe glyph name for the glyphs common in report fonts.
pub fn glyph_to_char(name: &str) -> Option<char> {
    if let Some(hex) = name.strip_prefix("uni").filter(|h| h.len() == 4) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(c);
    }
    let c = match name {
        "space" | "nbspace" => ' ',
        "zero" => '0',
        "one" => '1',
        "two" => '2',
        "three" => '3',
        "four" => '4',
        "five" => '5',
        "six" => '6',
        "seven" => '7',
        "eight" => '8',
        "nine" => '9',
        "period" => '.',
        "comma" => ',',
        "colon" => ':',
        "semicolon" => ';',
        "hyphen" | "minus" => '-',
        "percent" => '%',
        "parenleft" => '(',
        "parenright" => ')',
        "slash" => '/',
        "ampersand" => '&',
        "dollar" => '$',
        "quoteright" => '\u{2019}',
        "quoteleft" => '\u{2018}',
        "endash" => '\u{2013}',
        "emdash" => '\u{2014}',
        "bullet" => '\u{2022}',
        _ => return None,
    };
    Some(c)
}

/// How a composite font's byte string splits into codes and text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompositeEncoding {
    /// Two-byte codes with no intrinsic text (`Identity-H`/`-V`); text
    /// comes from a ToUnicode CMap.
    Identity,
    /// Two-byte codes that are UCS-2 code units (`Uni*-UCS2-H`).
    Ucs2,
    /// Variable-length legacy multibyte encoding (Big5, GBK, ...).
    Legacy(&'static Encoding),
}

impl CompositeEncoding {
    /// Detect the encoding from a predefined CMap name.
    pub fn for_cmap(name: &str) -> Self {
        let base = name
            .strip_suffix("-H")
            .or_else(|| name.strip_suffix("-V"))
            .unwrap_or(name);
        if base.starts_with("Uni") && (base.ends_with("UCS2") || base.ends_with("UTF16")) {
            return CompositeEncoding::Ucs2;
        }
        match base {
            "B5pc" | "ETen-B5" | "HKscs-B5" | "ETenms-B5" => CompositeEncoding::Legacy(encoding_rs::BIG5),
            "GBK-EUC" | "GB-EUC" | "GBpc-EUC" | "GBK2K" => CompositeEncoding::Legacy(encoding_rs::GBK),
            "90ms-RKSJ" | "90pv-RKSJ" | "83pv-RKSJ" => CompositeEncoding::Legacy(encoding_rs::SHIFT_JIS),
            "KSC-EUC" | "KSCms-UHC" => CompositeEncoding::Legacy(encoding_rs::EUC_KR),
            _ => CompositeEncoding::Identity,
        }
    }

    /// Split a string operand into `(code, byte_len)` pairs.
    pub fn split_codes(&self, bytes: &[u8]) -> Vec<(u32, usize)> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            let two = match self {
                CompositeEncoding::Identity | CompositeEncoding::Ucs2 => true,
                CompositeEncoding::Legacy(enc) => is_lead_byte(bytes[i], enc),
            };
            if two && i + 1 < bytes.len() {
                out.push((u32::from(bytes[i]) << 8 | u32::from(bytes[i + 1]), 2));
                i += 2;
            } else {
                out.push((u32::from(bytes[i]), 1));
                i += 1;
            }
        }
        out
    }

    /// Intrinsic text of a code, if the encoding carries any.
    pub fn text_for(&self, code: u32, byte_len: usize) -> Option<String> {
        match self {
            CompositeEncoding::Identity => None,
            CompositeEncoding::Ucs2 => u16::try_from(code)
                .ok()
                .map(|unit| String::from_utf16_lossy(&[unit])),
            CompositeEncoding::Legacy(enc) => {
                let bytes = if byte_len == 2 {
                    vec![(code >> 8) as u8, code as u8]
                } else {
                    vec![code as u8]
                };
                let (decoded, _, had_errors) = enc.decode(&bytes);
                (!had_errors).then(|| decoded.into_owned())
            }
        }
    }
}

fn is_lead_byte(byte: u8, encoding: &'static Encoding) -> bool {
    if encoding == encoding_rs::SHIFT_JIS {
        (0x81..=0x9F).contains(&byte) || (0xE0..=0xFC).contains(&byte)
    } else {
        (0x81..=0xFE).contains(&byte)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_maps_ascii_and_euro() {
        let enc = SimpleEncoding::win_ansi();
        assert_eq!(enc.decode(b'A'), Some('A'));
        assert_eq!(enc.decode(0x80), Some('€'));
        assert_eq!(enc.decode(0x05), None);
    }

    #[test]
    fn differences_override_base() {
        let mut enc = SimpleEncoding::win_ansi();
        enc.apply_differences([(0x41, "uni54E1"), (0x42, "three")]);
        assert_eq!(enc.decode(0x41), Some('員'));
        assert_eq!(enc.decode(0x42), Some('3'));
    }

    #[test]
    fn cmap_names_pick_encodings() {
        assert_eq!(CompositeEncoding::for_cmap("Identity-H"), CompositeEncoding::Identity);
        assert_eq!(CompositeEncoding::for_cmap("UniCNS-UCS2-H"), CompositeEncoding::Ucs2);
        assert_eq!(
            CompositeEncoding::for_cmap("ETen-B5-H"),
            CompositeEncoding::Legacy(encoding_rs::BIG5)
        );
    }

    #[test]
    fn big5_mixes_single_and_double_bytes() {
        let enc = CompositeEncoding::for_cmap("ETen-B5-H");
        // "A" followed by 員 (Big5 0xAD FB).
        let codes = enc.split_codes(&[0x41, 0xAD, 0xFB]);
        assert_eq!(codes, vec![(0x41, 1), (0xADFB, 2)]);
        assert_eq!(enc.text_for(0x41, 1).as_deref(), Some("A"));
        assert_eq!(enc.text_for(0xADFB, 2).as_deref(), Some("員"));
    }

    #[test]
    fn identity_codes_are_two_bytes() {
        let codes = CompositeEncoding::Identity.split_codes(&[0x00, 0x24, 0x01]);
        assert_eq!(codes, vec![(0x24, 2), (0x01, 1)]);
        assert_eq!(CompositeEncoding::Identity.text_for(0x24, 2), None);
    }

    #[test]
    fn ucs2_codes_are_text() {
        assert_eq!(CompositeEncoding::Ucs2.text_for(0x5DE5, 2).as_deref(), Some("工"));
    }
}
