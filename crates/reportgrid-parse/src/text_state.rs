//! Text and graphics state for the content stream interpreter.
//!
//! [`TextParams`] are the text state parameters that belong to the graphics
//! state and are saved by `q`/`Q`. The text and line matrices live in
//! [`TextState`] and are reset by `BT`.

use reportgrid_core::Matrix;

/// Text state parameters saved and restored with the graphics state.
#[derive(Debug, Clone, PartialEq)]
pub struct TextParams {
    /// Font resource name selected by `Tf`.
    pub font: Option<String>,
    pub font_size: f64,
    /// Character spacing (`Tc`).
    pub char_spacing: f64,
    /// Word spacing (`Tw`).
    pub word_spacing: f64,
    /// Horizontal scaling as a fraction (`Tz 100` = 1.0).
    pub h_scaling: f64,
    /// Leading (`TL`).
    pub leading: f64,
    /// Text rise (`Ts`).
    pub rise: f64,
}

impl Default for TextParams {
    fn default() -> Self {
        Self {
            font: None,
            font_size: 0.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scaling: 1.0,
            leading: 0.0,
            rise: 0.0,
        }
    }
}

/// Full text state: parameters plus the text and line matrices.
#[derive(Debug, Clone, Default)]
pub struct TextState {
    pub params: TextParams,
    text_matrix: Matrix,
    line_matrix: Matrix,
}

impl TextState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text_matrix(&self) -> Matrix {
        self.text_matrix
    }

    /// `BT`: reset both matrices to identity.
    pub fn begin_text(&mut self) {
        self.text_matrix = Matrix::identity();
        self.line_matrix = Matrix::identity();
    }

    /// `Tm`: set both matrices.
    pub fn set_text_matrix(&mut self, m: Matrix) {
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: start a new line offset from the current line start.
    pub fn move_text_position(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Matrix::translation(tx, ty).multiply(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `TD`: like `Td`, also setting leading to `-ty`.
    pub fn move_text_position_and_set_leading(&mut self, tx: f64, ty: f64) {
        self.params.leading = -ty;
        self.move_text_position(tx, ty);
    }

    /// `T*`: move to the start of the next line.
    pub fn move_to_next_line(&mut self) {
        let leading = self.params.leading;
        self.move_text_position(0.0, -leading);
    }

    /// Advance the text matrix horizontally by `tx` text space units.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Matrix::translation(tx, 0.0).multiply(&self.text_matrix);
    }

    /// Horizontal displacement after showing a glyph of width `w0`
    /// (glyph space).
    pub fn glyph_advance(&self, w0: f64, is_word_space: bool) -> f64 {
        let p = &self.params;
        let spacing = p.char_spacing + if is_word_space { p.word_spacing } else { 0.0 };
        (w0 / 1000.0 * p.font_size + spacing) * p.h_scaling
    }

    /// Horizontal displacement for a `TJ` array number.
    pub fn adjustment_advance(&self, amount: f64) -> f64 {
        -amount / 1000.0 * self.params.font_size * self.params.h_scaling
    }
}
