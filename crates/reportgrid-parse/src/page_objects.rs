//! Page objects in top-left page coordinates.
//!
//! [`PageCollector`] is the [`ContentHandler`] used for page extraction: it
//! turns glyph events into [`Char`]s and painted paths into ruling [`Line`]s
//! and [`Rect`]s, flipping y so that `top` grows downwards from the top of
//! the media box.

use reportgrid_core::{BBox, Char, ExtractWarning, Line, Matrix, Rect};

use crate::handler::{CharEvent, ContentHandler, PathEvent, Subpath};

/// Axis alignment slack for deciding whether a `re` subpath stayed a
/// rectangle after the CTM was applied.
const AXIS_EPSILON: f64 = 1e-6;

/// Everything extracted from one page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageContent {
    pub width: f64,
    pub height: f64,
    pub chars: Vec<Char>,
    pub lines: Vec<Line>,
    pub rects: Vec<Rect>,
}

/// Maps PDF page space onto top-left page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageFrame {
    /// Media box left edge in PDF space.
    pub left: f64,
    /// Media box top edge in PDF space.
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PageFrame {
    /// Frame for a media box `[x0 y0 x1 y1]`, in either corner order.
    pub fn from_media_box(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            left: x0.min(x1),
            top: y0.max(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    pub fn to_page(&self, x: f64, y: f64) -> (f64, f64) {
        (x - self.left, self.top - y)
    }
}

/// Bounding box of a glyph in top-left page coordinates.
///
/// The text rendering matrix is `[Tfs*Th 0 0 Tfs 0 Trise] x Tm x CTM`; the
/// glyph box spans `(0, descent)` to `(width, ascent)` in glyph space.
pub fn char_from_event(event: &CharEvent, frame: &PageFrame) -> Char {
    let font_matrix = Matrix::new(
        event.font_size * event.h_scaling,
        0.0,
        0.0,
        event.font_size,
        0.0,
        event.rise,
    );
    let trm = font_matrix
        .multiply(&event.text_matrix)
        .multiply(&event.ctm);

    let w = event.displacement / 1000.0;
    let ascent = event.ascent / 1000.0;
    let descent = event.descent / 1000.0;
    let corners = [
        trm.apply(0.0, descent),
        trm.apply(w, descent),
        trm.apply(w, ascent),
        trm.apply(0.0, ascent),
    ];
    let (min_x, max_x, min_y, max_y) = corners.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY, f64::INFINITY, f64::NEG_INFINITY),
        |(min_x, max_x, min_y, max_y), &(x, y)| (min_x.min(x), max_x.max(x), min_y.min(y), max_y.max(y)),
    );

    let (x0, top) = frame.to_page(min_x, max_y);
    let (x1, bottom) = frame.to_page(max_x, min_y);

    Char {
        text: event.unicode.clone(),
        bbox: BBox::new(x0, top, x1, bottom),
        fontname: event.font_name.clone(),
        size: trm.vertical_scale(),
    }
}

fn is_axis_aligned_box(points: &[(f64, f64)]) -> bool {
    if points.len() != 4 {
        return false;
    }
    (0..4).all(|i| {
        let (ax, ay) = points[i];
        let (bx, by) = points[(i + 1) % 4];
        (ax - bx).abs() < AXIS_EPSILON || (ay - by).abs() < AXIS_EPSILON
    })
}

/// Convert one painted subpath into rulings.
fn subpath_objects(subpath: &Subpath, frame: &PageFrame, lines: &mut Vec<Line>, rects: &mut Vec<Rect>) {
    let points: Vec<(f64, f64)> = subpath
        .points
        .iter()
        .map(|&(x, y)| frame.to_page(x, y))
        .collect();

    if subpath.from_rect && is_axis_aligned_box(&points) {
        let (x0, x1) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.0), hi.max(p.0)));
        let (top, bottom) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.1), hi.max(p.1)));
        rects.push(Rect {
            bbox: BBox::new(x0, top, x1, bottom),
        });
        return;
    }

    for pair in points.windows(2) {
        lines.push(Line::from_points(pair[0].0, pair[0].1, pair[1].0, pair[1].1));
    }
    if subpath.closed && points.len() > 2 {
        if let (Some(&last), Some(&first)) = (points.last(), points.first()) {
            if last != first {
                lines.push(Line::from_points(last.0, last.1, first.0, first.1));
            }
        }
    }
}

/// Collects page objects and warnings during interpretation.
#[derive(Debug)]
pub struct PageCollector {
    frame: PageFrame,
    content: PageContent,
    warnings: Vec<ExtractWarning>,
}

impl PageCollector {
    pub fn new(frame: PageFrame) -> Self {
        Self {
            frame,
            content: PageContent {
                width: frame.width,
                height: frame.height,
                ..PageContent::default()
            },
            warnings: Vec::new(),
        }
    }

    pub fn finish(self) -> (PageContent, Vec<ExtractWarning>) {
        (self.content, self.warnings)
    }
}

impl ContentHandler for PageCollector {
    fn on_char(&mut self, event: CharEvent) {
        self.content.chars.push(char_from_event(&event, &self.frame));
    }

    fn on_path_painted(&mut self, event: PathEvent) {
        for subpath in &event.subpaths {
            subpath_objects(subpath, &self.frame, &mut self.content.lines, &mut self.content.rects);
        }
    }

    fn on_warning(&mut self, warning: ExtractWarning) {
        self.warnings.push(warning);
    }
}
