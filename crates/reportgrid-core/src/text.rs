//! Characters and plain-text assembly.

use crate::geometry::BBox;

/// A single character extracted from a PDF page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Char {
    /// The text content of this character (may hold more than one code
    /// point for ligatures).
    pub text: String,
    /// Bounding box in top-left origin coordinates.
    pub bbox: BBox,
    /// Font name with any subset prefix removed.
    pub fontname: String,
    /// Font size in points after the text and graphics matrices.
    pub size: f64,
}

impl Char {
    fn is_blank(&self) -> bool {
        self.text.chars().all(char::is_whitespace)
    }
}

/// Tolerances for grouping characters into lines and words.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextOptions {
    /// Horizontal gap above which a space is inserted between characters.
    pub x_tolerance: f64,
    /// Maximum difference in `top` for two characters to share a line.
    pub y_tolerance: f64,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            x_tolerance: 3.0,
            y_tolerance: 3.0,
        }
    }
}

/// Group characters into lines, top-to-bottom, each sorted left-to-right.
pub fn cluster_lines<'a>(chars: &[&'a Char], y_tolerance: f64) -> Vec<Vec<&'a Char>> {
    let mut sorted: Vec<&Char> = chars.to_vec();
    sorted.sort_by(|a, b| {
        a.bbox
            .top
            .total_cmp(&b.bbox.top)
            .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
    });

    let mut lines: Vec<Vec<&Char>> = Vec::new();
    for ch in sorted {
        match lines.last_mut() {
            Some(line) if (ch.bbox.top - line[0].bbox.top).abs() <= y_tolerance => line.push(ch),
            _ => lines.push(vec![ch]),
        }
    }

    for line in &mut lines {
        line.sort_by(|a, b| a.bbox.x0.total_cmp(&b.bbox.x0));
    }
    lines
}

/// Join one line of characters, inserting a space where the gap between
/// neighbours exceeds `x_tolerance`.
pub fn join_line(line: &[&Char], x_tolerance: f64) -> String {
    let mut out = String::new();
    let mut prev: Option<&Char> = None;
    for ch in line {
        if let Some(p) = prev {
            let gap = ch.bbox.x0 - p.bbox.x1;
            if gap > x_tolerance && !p.is_blank() && !ch.is_blank() {
                out.push(' ');
            }
        }
        out.push_str(&ch.text);
        prev = Some(ch);
    }
    out
}

/// Assemble plain text from characters.
///
/// Returns `None` when there are no characters, which is how a page
/// without a text layer presents itself.
pub fn chars_to_text(chars: &[&Char], options: &TextOptions) -> Option<String> {
    if chars.is_empty() {
        return None;
    }
    let text = cluster_lines(chars, options.y_tolerance)
        .iter()
        .map(|line| join_line(line, options.x_tolerance).trim_end().to_string())
        .collect::<Vec<_>>()
        .join("\n");
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ch(text: &str, x0: f64, top: f64, x1: f64) -> Char {
        Char {
            text: text.to_string(),
            bbox: BBox::new(x0, top, x1, top + 10.0),
            fontname: "Helvetica".to_string(),
            size: 10.0,
        }
    }

    #[test]
    fn no_chars_means_no_text() {
        assert_eq!(chars_to_text(&[], &TextOptions::default()), None);
    }

    #[test]
    fn adjacent_chars_join_without_space() {
        let chars = [ch("H", 0.0, 0.0, 5.0), ch("i", 5.5, 0.0, 8.0)];
        let refs: Vec<&Char> = chars.iter().collect();
        assert_eq!(
            chars_to_text(&refs, &TextOptions::default()).as_deref(),
            Some("Hi")
        );
    }

    #[test]
    fn wide_gap_inserts_space() {
        let chars = [ch("A", 0.0, 0.0, 5.0), ch("B", 20.0, 0.0, 25.0)];
        let refs: Vec<&Char> = chars.iter().collect();
        assert_eq!(
            chars_to_text(&refs, &TextOptions::default()).as_deref(),
            Some("A B")
        );
    }

    #[test]
    fn lines_are_ordered_top_to_bottom() {
        let chars = [
            ch("2", 0.0, 40.0, 5.0),
            ch("1", 0.0, 10.0, 5.0),
            ch("b", 6.0, 11.0, 10.0),
        ];
        let refs: Vec<&Char> = chars.iter().collect();
        assert_eq!(
            chars_to_text(&refs, &TextOptions::default()).as_deref(),
            Some("1b\n2")
        );
    }

    #[test]
    fn explicit_space_is_not_doubled() {
        let chars = [
            ch("A", 0.0, 0.0, 5.0),
            ch(" ", 5.0, 0.0, 8.0),
            ch("B", 30.0, 0.0, 35.0),
        ];
        let refs: Vec<&Char> = chars.iter().collect();
        assert_eq!(
            chars_to_text(&refs, &TextOptions::default()).as_deref(),
            Some("A B")
        );
    }
}
