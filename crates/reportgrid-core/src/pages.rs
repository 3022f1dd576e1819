//! Page numbering and keyword matching.
//!
//! Reports open with a fixed preamble (cover, contents, ...) that is not
//! counted. Pages after it are numbered from 1 ("adjusted" numbers), while
//! the document itself is indexed from 0 ("raw" indices).

/// Number of leading pages excluded from scanning and numbering.
pub const PREAMBLE_PAGES: usize = 4;

/// Raw ↔ adjusted page arithmetic for a given preamble length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageOffset {
    preamble: usize,
}

impl Default for PageOffset {
    fn default() -> Self {
        Self::new(PREAMBLE_PAGES)
    }
}

impl PageOffset {
    pub fn new(preamble: usize) -> Self {
        Self { preamble }
    }

    pub fn preamble(&self) -> usize {
        self.preamble
    }

    /// Adjusted number for a raw index, `None` inside the preamble.
    pub fn to_adjusted(&self, raw: usize) -> Option<u32> {
        let adjusted = raw.checked_sub(self.preamble)? + 1;
        u32::try_from(adjusted).ok()
    }

    /// Raw index for an adjusted number, `None` for 0.
    pub fn to_raw(&self, adjusted: u32) -> Option<usize> {
        let adjusted = usize::try_from(adjusted).ok()?;
        adjusted.checked_sub(1).map(|a| a + self.preamble)
    }

    /// Raw indices of the counted pages in a document of `page_count` pages.
    pub fn counted_pages(&self, page_count: usize) -> std::ops::Range<usize> {
        self.preamble.min(page_count)..page_count
    }
}

/// Case-insensitive substring test using Unicode lowercase folding.
///
/// An empty keyword never matches.
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    if keyword.is_empty() {
        return false;
    }
    text.to_lowercase().contains(&keyword.to_lowercase())
}
