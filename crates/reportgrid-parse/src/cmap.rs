//! ToUnicode CMap parser for mapping character codes to Unicode strings.
//!
//! Parses the `beginbfchar`/`endbfchar` and `beginbfrange`/`endbfrange`
//! sections of an embedded `/ToUnicode` stream. Malformed entries are
//! skipped so one bad line does not cost the whole font its mappings.

use std::collections::HashMap;

use tracing::warn;

use crate::error::BackendError;

/// Largest number of codes a single `bfrange` entry may cover.
pub(crate) const MAX_RANGE_SPAN: u32 = 0x1_0000;

/// A parsed ToUnicode CMap.
#[derive(Debug, Clone, Default)]
pub struct CMap {
    mappings: HashMap<u32, String>,
}

impl CMap {
    /// Parse a ToUnicode CMap from its raw stream content.
    pub fn parse(data: &[u8]) -> Self {
        let text = String::from_utf8_lossy(data);
        let mut mappings = HashMap::new();

        for section in sections(&text, "beginbfchar", "endbfchar") {
            parse_bfchar(section, &mut mappings);
        }
        for section in sections(&text, "beginbfrange", "endbfrange") {
            parse_bfrange(section, &mut mappings);
        }

        CMap { mappings }
    }

    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

/// Bodies of every `begin ... end` section in `text`.
fn sections<'a>(text: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut out = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find(begin) {
        let body = &rest[start + begin.len()..];
        match body.find(end) {
            Some(stop) => {
                out.push(&body[..stop]);
                rest = &body[stop + end.len()..];
            }
            None => break,
        }
    }
    out
}

/// A token inside a bf section.
#[derive(Debug, PartialEq)]
enum Token<'a> {
    Hex(&'a str),
    Array(Vec<&'a str>),
}

fn hex_tokens(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = text;
    while let Some(start) = rest.find('<') {
        let Some(len) = rest[start + 1..].find('>') else {
            break;
        };
        tokens.push(rest[start + 1..start + 1 + len].trim());
        rest = &rest[start + 1 + len + 1..];
    }
    tokens
}

fn tokenize(section: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut rest = section;
    loop {
        let next_hex = rest.find('<');
        let next_arr = rest.find('[');
        match (next_hex, next_arr) {
            (Some(h), Some(a)) if a < h => {
                let Some(close) = rest[a..].find(']') else {
                    break;
                };
                tokens.push(Token::Array(hex_tokens(&rest[a + 1..a + close])));
                rest = &rest[a + close + 1..];
            }
            (Some(h), _) => {
                let Some(len) = rest[h + 1..].find('>') else {
                    break;
                };
                tokens.push(Token::Hex(rest[h + 1..h + 1 + len].trim()));
                rest = &rest[h + 1 + len + 1..];
            }
            _ => break,
        }
    }
    tokens
}

fn parse_code(hex: &str) -> Result<u32, BackendError> {
    u32::from_str_radix(hex, 16)
        .map_err(|e| BackendError::Parse(format!("invalid hex code '{hex}': {e}")))
}

fn utf16_units(hex: &str) -> Result<Vec<u16>, BackendError> {
    let padded;
    let hex = if hex.len() % 4 == 2 {
        padded = format!("00{hex}");
        padded.as_str()
    } else {
        hex
    };
    if hex.len() % 4 != 0 {
        return Err(BackendError::Parse(format!(
            "UTF-16BE hex string has odd length: '{hex}'"
        )));
    }
    hex.as_bytes()
        .chunks(4)
        .map(|chunk| {
            let s = std::str::from_utf8(chunk)
                .map_err(|e| BackendError::Parse(format!("invalid hex: {e}")))?;
            u16::from_str_radix(s, 16)
                .map_err(|e| BackendError::Parse(format!("invalid hex '{s}': {e}")))
        })
        .collect()
}

fn decode_utf16(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

fn parse_bfchar(section: &str, mappings: &mut HashMap<u32, String>) {
    let tokens = tokenize(section);
    for pair in tokens.chunks(2) {
        let [Token::Hex(src), Token::Hex(dst)] = pair else {
            continue;
        };
        match (parse_code(src), utf16_units(dst)) {
            (Ok(code), Ok(units)) => {
                mappings.insert(code, decode_utf16(&units));
            }
            (Err(e), _) | (_, Err(e)) => warn!("skipping bfchar entry <{src}>: {e}"),
        }
    }
}

/// Validated `lo..=hi` bounds of a bfrange entry.
fn range_bounds(lo: &str, hi: &str) -> Result<(u32, u32), BackendError> {
    let (lo, hi) = (parse_code(lo)?, parse_code(hi)?);
    if hi < lo {
        return Err(BackendError::Parse(format!("range <{lo:X}> <{hi:X}> is reversed")));
    }
    if hi - lo >= MAX_RANGE_SPAN {
        return Err(BackendError::Parse(format!(
            "range <{lo:X}> <{hi:X}> covers more than {MAX_RANGE_SPAN} codes"
        )));
    }
    Ok((lo, hi))
}

fn parse_bfrange(section: &str, mappings: &mut HashMap<u32, String>) {
    let tokens = tokenize(section);
    for triple in tokens.chunks(3) {
        let (lo, hi, dst) = match triple {
            [Token::Hex(lo), Token::Hex(hi), dst] => (lo, hi, dst),
            _ => continue,
        };
        let (lo, hi) = match range_bounds(lo, hi) {
            Ok(bounds) => bounds,
            Err(e) => {
                warn!("skipping bfrange entry: {e}");
                continue;
            }
        };
        match dst {
            Token::Hex(dst) => {
                let base = match utf16_units(dst) {
                    Ok(units) => units,
                    Err(e) => {
                        warn!("skipping bfrange entry <{lo:X}>: {e}");
                        continue;
                    }
                };
                for (offset, code) in (lo..=hi).enumerate() {
                    // The last code unit is incremented across the range.
                    let mut units = base.clone();
                    if let Some(last) = units.last_mut() {
                        *last = last.wrapping_add(offset as u16);
                    }
                    mappings.insert(code, decode_utf16(&units));
                }
            }
            Token::Array(dsts) => {
                for (code, dst) in (lo..=hi).zip(dsts) {
                    match utf16_units(dst) {
                        Ok(units) => {
                            mappings.insert(code, decode_utf16(&units));
                        }
                        Err(e) => warn!("skipping bfrange code <{code:X}>: {e}"),
                    }
                }
            }
        }
    }
}
