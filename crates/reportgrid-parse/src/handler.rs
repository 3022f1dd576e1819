//! Content handler callback trait for content stream interpretation.
//!
//! The interpreter reports every shown glyph and every painted path to a
//! [`ContentHandler`]. Coordinates in events are PDF page space (bottom-left
//! origin); conversion to top-left page coordinates happens in
//! [`crate::page_objects`].

use reportgrid_core::{ExtractWarning, Matrix};

/// The type of paint operation applied to a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOp {
    Stroke,
    Fill,
    FillAndStroke,
}

/// A rendered glyph with everything needed to place its bounding box.
#[derive(Debug, Clone)]
pub struct CharEvent {
    /// Character code from the string operand.
    pub char_code: u32,
    /// Decoded text (U+FFFD when the code could not be mapped).
    pub unicode: String,
    /// Font base name, subset prefix removed.
    pub font_name: String,
    /// Font size in text space units (`Tf` operand).
    pub font_size: f64,
    /// Text matrix at the time the glyph was shown.
    pub text_matrix: Matrix,
    /// Current transformation matrix at the time the glyph was shown.
    pub ctm: Matrix,
    /// Advance width in glyph space (1/1000 em).
    pub displacement: f64,
    /// Horizontal scaling as a fraction (`Tz 100` = 1.0).
    pub h_scaling: f64,
    pub rise: f64,
    /// Font ascent in glyph space.
    pub ascent: f64,
    /// Font descent in glyph space (negative).
    pub descent: f64,
}

/// One subpath of a painted path, already transformed by the CTM.
#[derive(Debug, Clone, PartialEq)]
pub struct Subpath {
    pub points: Vec<(f64, f64)>,
    /// Closed with `h` or implicitly by the paint operator.
    pub closed: bool,
    /// Built by the `re` operator.
    pub from_rect: bool,
}

/// A painted path.
#[derive(Debug, Clone)]
pub struct PathEvent {
    pub subpaths: Vec<Subpath>,
    pub paint_op: PaintOp,
}

/// Callback handler for content stream interpretation.
///
/// All methods have default no-op implementations, so handlers only
/// implement the events they care about.
pub trait ContentHandler {
    /// Called when a glyph is shown.
    fn on_char(&mut self, _event: CharEvent) {}

    /// Called when a path is stroked, filled, or both.
    fn on_path_painted(&mut self, _event: PathEvent) {}

    /// Called for a non-fatal problem. Interpretation continues with
    /// defaults.
    fn on_warning(&mut self, _warning: ExtractWarning) {}
}
