//! Font loading: text decoding and glyph widths.
//!
//! A [`Font`] turns the bytes of a string operand into glyphs carrying
//! their Unicode text and advance width (in 1/1000 text space units).

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};
use tracing::warn;

use crate::cmap::{CMap, MAX_RANGE_SPAN};
use crate::encoding::{CompositeEncoding, SimpleEncoding};
use crate::error::BackendError;

const DEFAULT_ASCENT: f64 = 750.0;
const DEFAULT_DESCENT: f64 = -250.0;
/// Width used for simple fonts with neither `/Widths` nor built-in metrics.
const DEFAULT_SIMPLE_WIDTH: f64 = 600.0;
/// `/DW` default for CID fonts.
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// Helvetica glyph widths for WinAnsi codes 32..=126.
#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// One decoded glyph of a string operand.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub code: u32,
    pub text: String,
    /// Advance width in glyph space (1/1000 em).
    pub width: f64,
    /// Single-byte code 32, the only glyph word spacing applies to.
    pub is_word_space: bool,
}

#[derive(Debug, Clone)]
enum Widths {
    Simple {
        first_char: u32,
        widths: Vec<f64>,
        missing: f64,
    },
    Builtin(&'static [u16; 95]),
    Monospace(f64),
    Cid {
        default: f64,
        widths: HashMap<u32, f64>,
    },
}

impl Widths {
    fn width(&self, code: u32) -> f64 {
        match self {
            Widths::Simple {
                first_char,
                widths,
                missing,
            } => code
                .checked_sub(*first_char)
                .and_then(|i| widths.get(i as usize))
                .copied()
                .unwrap_or(*missing),
            Widths::Builtin(table) => code
                .checked_sub(32)
                .and_then(|i| table.get(i as usize))
                .map_or(DEFAULT_SIMPLE_WIDTH, |w| f64::from(*w)),
            Widths::Monospace(w) => *w,
            Widths::Cid { default, widths } => widths.get(&code).copied().unwrap_or(*default),
        }
    }
}

#[derive(Debug, Clone)]
enum Kind {
    Simple(SimpleEncoding),
    Composite(CompositeEncoding),
}

/// A loaded font resource.
#[derive(Debug, Clone)]
pub struct Font {
    /// Base font name with any subset prefix removed.
    pub name: String,
    pub ascent: f64,
    pub descent: f64,
    kind: Kind,
    to_unicode: Option<CMap>,
    widths: Widths,
}

/// Strip a subset tag such as `ABCDEF+` from a base font name.
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((tag, rest)) if tag.len() == 6 && tag.chars().all(|c| c.is_ascii_uppercase()) => rest,
        _ => name,
    }
}

pub(crate) fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> &'a Object {
    match obj {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(obj),
        other => other,
    }
}

pub(crate) fn number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn dict_number(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<f64> {
    dict.get(key).ok().map(|o| resolve(doc, o)).and_then(number)
}

fn dict_name<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a str> {
    dict.get(key)
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_name().ok())
        .and_then(|n| std::str::from_utf8(n).ok())
}

fn dict_dict<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    dict.get(key)
        .ok()
        .map(|o| resolve(doc, o))
        .and_then(|o| o.as_dict().ok())
}

fn load_to_unicode(doc: &Document, dict: &Dictionary) -> Option<CMap> {
    let obj = dict.get(b"ToUnicode").ok().map(|o| resolve(doc, o))?;
    let stream = obj.as_stream().ok()?;
    let bytes = stream
        .decompressed_content()
        .unwrap_or_else(|_| stream.content.clone());
    Some(CMap::parse(&bytes))
}

fn descriptor_metrics(doc: &Document, font: &Dictionary) -> (f64, f64) {
    let Some(desc) = dict_dict(doc, font, b"FontDescriptor") else {
        return (DEFAULT_ASCENT, DEFAULT_DESCENT);
    };
    let ascent = dict_number(doc, desc, b"Ascent").filter(|a| *a > 0.0);
    let descent = dict_number(doc, desc, b"Descent").filter(|d| *d < 0.0);
    (
        ascent.unwrap_or(DEFAULT_ASCENT),
        descent.unwrap_or(DEFAULT_DESCENT),
    )
}

/// Parse a CID font `/W` array: `c [w1 w2 ...]` or `c_first c_last w`.
///
/// Entries with negative or reversed codes, or ranges wider than
/// [`MAX_RANGE_SPAN`], are skipped.
fn parse_cid_widths(doc: &Document, array: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut i = 0;
    while i < array.len() {
        let Some(first) = number(resolve(doc, &array[i])) else {
            break;
        };
        match array.get(i + 1).map(|o| resolve(doc, o)) {
            Some(Object::Array(list)) => {
                i += 2;
                if first < 0.0 || list.len() as u32 > MAX_RANGE_SPAN {
                    warn!(first, "skipping CID width list");
                    continue;
                }
                let first = first as u32;
                for (offset, w) in list.iter().enumerate() {
                    if let (Some(w), Some(code)) =
                        (number(resolve(doc, w)), first.checked_add(offset as u32))
                    {
                        widths.insert(code, w);
                    }
                }
            }
            Some(last) => {
                let (Some(last), Some(w)) = (
                    number(last),
                    array.get(i + 2).map(|o| resolve(doc, o)).and_then(number),
                ) else {
                    break;
                };
                i += 3;
                if first < 0.0 || last < first || last - first >= f64::from(MAX_RANGE_SPAN) {
                    warn!(first, last, "skipping CID width range");
                    continue;
                }
                for code in (first as u32)..=(last as u32) {
                    widths.insert(code, w);
                }
            }
            None => break,
        }
    }
    widths
}

impl Font {
    /// Load a font from its resource dictionary.
    pub fn load(doc: &Document, dict: &Dictionary) -> Result<Self, BackendError> {
        let subtype = dict_name(doc, dict, b"Subtype").unwrap_or("Type1");
        let base = dict_name(doc, dict, b"BaseFont").unwrap_or("Unknown");
        let name = strip_subset_prefix(base).to_string();
        let to_unicode = load_to_unicode(doc, dict);

        if subtype == "Type0" {
            let encoding = dict_name(doc, dict, b"Encoding")
                .map(CompositeEncoding::for_cmap)
                .unwrap_or(CompositeEncoding::Identity);
            let descendant = dict
                .get(b"DescendantFonts")
                .ok()
                .map(|o| resolve(doc, o))
                .and_then(|o| o.as_array().ok())
                .and_then(|a| a.first())
                .map(|o| resolve(doc, o))
                .and_then(|o| o.as_dict().ok())
                .ok_or_else(|| BackendError::Font(format!("Type0 font {name} has no descendant")))?;
            let default = dict_number(doc, descendant, b"DW").unwrap_or(DEFAULT_CID_WIDTH);
            let widths = descendant
                .get(b"W")
                .ok()
                .map(|o| resolve(doc, o))
                .and_then(|o| o.as_array().ok())
                .map(|a| parse_cid_widths(doc, a))
                .unwrap_or_default();
            let (ascent, descent) = descriptor_metrics(doc, descendant);
            return Ok(Font {
                name,
                ascent,
                descent,
                kind: Kind::Composite(encoding),
                to_unicode,
                widths: Widths::Cid { default, widths },
            });
        }

        let encoding = match dict.get(b"Encoding").ok().map(|o| resolve(doc, o)) {
            Some(Object::Name(n)) => SimpleEncoding::named(&String::from_utf8_lossy(n)),
            Some(Object::Dictionary(enc)) => {
                let mut base_enc = SimpleEncoding::named(
                    dict_name(doc, enc, b"BaseEncoding").unwrap_or("WinAnsiEncoding"),
                );
                if let Ok(diffs) = enc.get(b"Differences").and_then(Object::as_array) {
                    base_enc.apply_differences(differences(diffs));
                }
                base_enc
            }
            _ => SimpleEncoding::win_ansi(),
        };

        let widths = match dict.get(b"Widths").ok().map(|o| resolve(doc, o)) {
            Some(Object::Array(ws)) => Widths::Simple {
                first_char: dict_number(doc, dict, b"FirstChar").unwrap_or(0.0) as u32,
                widths: ws.iter().map(|w| number(resolve(doc, w)).unwrap_or(0.0)).collect(),
                missing: dict_dict(doc, dict, b"FontDescriptor")
                    .and_then(|d| dict_number(doc, d, b"MissingWidth"))
                    .unwrap_or(0.0),
            },
            _ if name.starts_with("Courier") => Widths::Monospace(600.0),
            _ if name.starts_with("Helvetica") || name.starts_with("Arial") => {
                Widths::Builtin(&HELVETICA_ASCII)
            }
            _ => Widths::Monospace(DEFAULT_SIMPLE_WIDTH),
        };
        let (ascent, descent) = descriptor_metrics(doc, dict);

        Ok(Font {
            name,
            ascent,
            descent,
            kind: Kind::Simple(encoding),
            to_unicode,
            widths,
        })
    }

    /// A font for content that references a missing resource.
    pub fn fallback(name: &str) -> Self {
        Font {
            name: name.to_string(),
            ascent: DEFAULT_ASCENT,
            descent: DEFAULT_DESCENT,
            kind: Kind::Simple(SimpleEncoding::win_ansi()),
            to_unicode: None,
            widths: Widths::Monospace(DEFAULT_SIMPLE_WIDTH),
        }
    }

    /// Split a string operand into glyphs.
    pub fn decode(&self, bytes: &[u8]) -> Vec<Glyph> {
        let codes: Vec<(u32, usize)> = match &self.kind {
            Kind::Simple(_) => bytes.iter().map(|b| (u32::from(*b), 1)).collect(),
            Kind::Composite(enc) => enc.split_codes(bytes),
        };
        codes
            .into_iter()
            .map(|(code, len)| {
                let text = self
                    .to_unicode
                    .as_ref()
                    .and_then(|cmap| cmap.lookup(code))
                    .map(str::to_string)
                    .or_else(|| match &self.kind {
                        Kind::Simple(enc) => u8::try_from(code)
                            .ok()
                            .and_then(|b| enc.decode(b))
                            .map(String::from),
                        Kind::Composite(enc) => enc.text_for(code, len),
                    })
                    .unwrap_or_else(|| "\u{FFFD}".to_string());
                Glyph {
                    code,
                    text,
                    width: self.widths.width(code),
                    is_word_space: len == 1 && code == 32,
                }
            })
            .collect()
    }
}

/// Flatten a `/Differences` array into `(code, glyph name)` pairs.
fn differences(array: &[Object]) -> Vec<(u8, &str)> {
    let mut out = Vec::new();
    let mut code: u32 = 0;
    for item in array {
        match item {
            Object::Integer(i) => code = *i as u32,
            Object::Name(n) => {
                if let (Ok(c), Ok(name)) = (u8::try_from(code), std::str::from_utf8(n)) {
                    out.push((c, name));
                }
                code += 1;
            }
            _ => {}
        }
    }
    out
}
