//! Page type for accessing extracted content from a PDF page.

use reportgrid_core::{
    Char, Edge, ExtractWarning, Line, Rect, Table, TableFinder, TableSettings, TextOptions,
    chars_to_text, derive_edges,
};
use reportgrid_parse::PageContent;

/// A single page from a PDF document.
///
/// Holds the characters and ruling primitives extracted from the page
/// content stream, in top-left page coordinates.
#[derive(Debug, Clone)]
pub struct Page {
    /// Page index (0-based, raw).
    index: usize,
    width: f64,
    height: f64,
    chars: Vec<Char>,
    lines: Vec<Line>,
    rects: Vec<Rect>,
    /// Non-fatal problems met while interpreting this page.
    warnings: Vec<ExtractWarning>,
}

impl Page {
    /// Create a page with the given size and characters.
    pub fn new(index: usize, width: f64, height: f64, chars: Vec<Char>) -> Self {
        Self {
            index,
            width,
            height,
            chars,
            lines: Vec::new(),
            rects: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Create a page from interpreted content.
    pub fn from_content(index: usize, content: PageContent, warnings: Vec<ExtractWarning>) -> Self {
        Self {
            index,
            width: content.width,
            height: content.height,
            chars: content.chars,
            lines: content.lines,
            rects: content.rects,
            warnings,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn chars(&self) -> &[Char] {
        &self.chars
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn warnings(&self) -> &[ExtractWarning] {
        &self.warnings
    }

    /// Edges from all lines and rectangle sides.
    pub fn edges(&self) -> Vec<Edge> {
        derive_edges(&self.lines, &self.rects)
    }

    /// Plain text of the page, `None` when the page has no characters.
    pub fn extract_text(&self, options: &TextOptions) -> Option<String> {
        let chars: Vec<&Char> = self.chars.iter().collect();
        chars_to_text(&chars, options)
    }

    /// Bordered tables on this page, top-to-bottom then left-to-right, with
    /// cell text filled in.
    pub fn find_tables(&self, settings: &TableSettings) -> Vec<Table> {
        TableFinder::new(self.edges(), settings.clone()).extract(&self.chars)
    }

    /// Bordered tables as row grids. `None` marks a grid slot covered by a
    /// spanning cell.
    pub fn extract_tables(&self, settings: &TableSettings) -> Vec<Vec<Vec<Option<String>>>> {
        self.find_tables(settings)
            .iter()
            .map(Table::to_rows)
            .collect()
    }
}
