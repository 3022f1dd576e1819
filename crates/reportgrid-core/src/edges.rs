//! Painted ruling primitives and the edges derived from them.
//!
//! Lines and rectangles come out of the content stream interpreter already
//! converted to top-left page coordinates. Edges are the axis-aligned
//! segments the lattice table finder works on.

use crate::geometry::{BBox, Orientation};

/// A straight painted segment.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Line {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
    pub orientation: Orientation,
}

impl Line {
    /// Build a line from two endpoints, normalizing so that `x0 <= x1` and
    /// `top <= bottom`.
    pub fn from_points(xa: f64, ya: f64, xb: f64, yb: f64) -> Self {
        let orientation = Orientation::classify(xa, ya, xb, yb);
        Self {
            x0: xa.min(xb),
            top: ya.min(yb),
            x1: xa.max(xb),
            bottom: ya.max(yb),
            orientation,
        }
    }
}

/// A painted axis-aligned rectangle.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub bbox: BBox,
}

/// Source of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeSource {
    Line,
    RectTop,
    RectBottom,
    RectLeft,
    RectRight,
}

/// A line segment edge for table detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Edge {
    /// Left x coordinate.
    pub x0: f64,
    /// Top y coordinate (distance from top of page).
    pub top: f64,
    /// Right x coordinate.
    pub x1: f64,
    /// Bottom y coordinate (distance from top of page).
    pub bottom: f64,
    pub orientation: Orientation,
    pub source: EdgeSource,
}

impl Edge {
    /// Length along the primary axis.
    pub fn length(&self) -> f64 {
        let dx = self.x1 - self.x0;
        let dy = self.bottom - self.top;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Derive an Edge from a Line.
pub fn edge_from_line(line: &Line) -> Edge {
    Edge {
        x0: line.x0,
        top: line.top,
        x1: line.x1,
        bottom: line.bottom,
        orientation: line.orientation,
        source: EdgeSource::Line,
    }
}

/// Derive the four sides of a Rect.
pub fn edges_from_rect(rect: &Rect) -> [Edge; 4] {
    let b = rect.bbox;
    [
        Edge {
            x0: b.x0,
            top: b.top,
            x1: b.x1,
            bottom: b.top,
            orientation: Orientation::Horizontal,
            source: EdgeSource::RectTop,
        },
        Edge {
            x0: b.x0,
            top: b.bottom,
            x1: b.x1,
            bottom: b.bottom,
            orientation: Orientation::Horizontal,
            source: EdgeSource::RectBottom,
        },
        Edge {
            x0: b.x0,
            top: b.top,
            x1: b.x0,
            bottom: b.bottom,
            orientation: Orientation::Vertical,
            source: EdgeSource::RectLeft,
        },
        Edge {
            x0: b.x1,
            top: b.top,
            x1: b.x1,
            bottom: b.bottom,
            orientation: Orientation::Vertical,
            source: EdgeSource::RectRight,
        },
    ]
}

/// Collect edges from every line and rectangle on a page.
///
/// Diagonal lines are dropped: they can never bound a lattice cell.
pub fn derive_edges(lines: &[Line], rects: &[Rect]) -> Vec<Edge> {
    let mut edges: Vec<Edge> = lines
        .iter()
        .filter(|l| l.orientation != Orientation::Diagonal)
        .map(edge_from_line)
        .collect();
    for rect in rects {
        edges.extend(edges_from_rect(rect));
    }
    edges
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_from_points_normalizes_direction() {
        let line = Line::from_points(100.0, 50.0, 10.0, 50.0);
        assert_eq!(line.x0, 10.0);
        assert_eq!(line.x1, 100.0);
        assert_eq!(line.orientation, Orientation::Horizontal);
    }

    #[test]
    fn rect_yields_four_sides() {
        let rect = Rect {
            bbox: BBox::new(10.0, 20.0, 110.0, 70.0),
        };
        let edges = edges_from_rect(&rect);
        assert_eq!(edges[0].source, EdgeSource::RectTop);
        assert_eq!(edges[0].top, 20.0);
        assert_eq!(edges[1].top, 70.0);
        assert_eq!(edges[2].x0, 10.0);
        assert_eq!(edges[3].x0, 110.0);
        assert_eq!(edges[3].orientation, Orientation::Vertical);
        assert_eq!(edges[3].length(), 50.0);
    }

    #[test]
    fn derive_edges_skips_diagonals() {
        let lines = vec![
            Line::from_points(0.0, 0.0, 50.0, 0.0),
            Line::from_points(0.0, 0.0, 50.0, 50.0),
        ];
        let edges = derive_edges(&lines, &[]);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].source, EdgeSource::Line);
    }
}
