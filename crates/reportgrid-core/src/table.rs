//! Lattice table detection.
//!
//! Tables are found from visible ruling lines only: edges are filtered,
//! snapped, joined, intersected, and the resulting grid is cut into cells
//! which are grouped into tables. Text is then assigned to cells from the
//! page characters.

use std::collections::{BTreeMap, HashMap};

use crate::edges::Edge;
use crate::geometry::{BBox, Orientation};
use crate::text::{Char, cluster_lines, join_line};

/// Configuration for lattice table detection.
///
/// All tolerance values default to 3.0.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableSettings {
    /// Snap tolerance for vertical edges (clustered along x).
    pub snap_x_tolerance: f64,
    /// Snap tolerance for horizontal edges (clustered along y).
    pub snap_y_tolerance: f64,
    /// Join tolerance for horizontal edges.
    pub join_x_tolerance: f64,
    /// Join tolerance for vertical edges.
    pub join_y_tolerance: f64,
    /// Minimum edge length to consider for table detection.
    pub edge_min_length: f64,
    /// Intersection tolerance along x-axis.
    pub intersection_x_tolerance: f64,
    /// Intersection tolerance along y-axis.
    pub intersection_y_tolerance: f64,
    /// Gap above which characters in a cell are separated by a space.
    pub text_x_tolerance: f64,
    /// Maximum `top` difference for characters in a cell to share a line.
    pub text_y_tolerance: f64,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            snap_x_tolerance: 3.0,
            snap_y_tolerance: 3.0,
            join_x_tolerance: 3.0,
            join_y_tolerance: 3.0,
            edge_min_length: 3.0,
            intersection_x_tolerance: 3.0,
            intersection_y_tolerance: 3.0,
            text_x_tolerance: 3.0,
            text_y_tolerance: 3.0,
        }
    }
}

impl TableSettings {
    /// Set both snap tolerances.
    pub fn with_snap_tolerance(mut self, tolerance: f64) -> Self {
        self.snap_x_tolerance = tolerance;
        self.snap_y_tolerance = tolerance;
        self
    }

    /// Set both join tolerances.
    pub fn with_join_tolerance(mut self, tolerance: f64) -> Self {
        self.join_x_tolerance = tolerance;
        self.join_y_tolerance = tolerance;
        self
    }

    /// Set both text tolerances.
    pub fn with_text_tolerance(mut self, tolerance: f64) -> Self {
        self.text_x_tolerance = tolerance;
        self.text_y_tolerance = tolerance;
        self
    }
}

/// A detected table cell.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub bbox: BBox,
    /// Text content, `None` until [`extract_text_for_cells`] has run.
    pub text: Option<String>,
}

/// A detected table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Table {
    /// Bounding box enclosing the entire table.
    pub bbox: BBox,
    /// All cells in the table, top-to-bottom then left-to-right.
    pub cells: Vec<Cell>,
}

impl Table {
    /// Lay the cells out as a row grid.
    ///
    /// Columns are the distinct left edges of the cells, rows the distinct
    /// top edges. A slot with no cell starting there (a spanned region) is
    /// `None`; a cell without text is `Some("")`.
    pub fn to_rows(&self) -> Vec<Vec<Option<String>>> {
        let mut xs: Vec<f64> = self.cells.iter().map(|c| c.bbox.x0).collect();
        xs.sort_by(f64::total_cmp);
        xs.dedup_by(|a, b| (*a - *b).abs() < 1e-6);

        let mut rows: BTreeMap<i64, Vec<&Cell>> = BTreeMap::new();
        for cell in &self.cells {
            rows.entry(float_key(cell.bbox.top)).or_default().push(cell);
        }

        rows.into_values()
            .map(|row| {
                xs.iter()
                    .map(|&x| {
                        row.iter()
                            .find(|c| (c.bbox.x0 - x).abs() < 1e-6)
                            .map(|c| c.text.clone().unwrap_or_default())
                    })
                    .collect()
            })
            .collect()
    }
}

/// Snap nearby parallel edges to aligned positions.
///
/// Horizontal edges are clustered by y, vertical edges by x: after sorting,
/// an edge joins the current cluster when it lies within the tolerance of
/// the previous edge, so a cluster can span more than the tolerance. Every
/// member of a cluster takes the cluster mean. Edges are aligned, not merged.
pub fn snap_edges(edges: Vec<Edge>, snap_x_tolerance: f64, snap_y_tolerance: f64) -> Vec<Edge> {
    let (mut horizontals, mut verticals, mut result) = split_by_orientation(edges);

    snap_group(
        &mut horizontals,
        snap_y_tolerance,
        |e| e.top,
        |e, v| {
            e.top = v;
            e.bottom = v;
        },
    );
    snap_group(
        &mut verticals,
        snap_x_tolerance,
        |e| e.x0,
        |e, v| {
            e.x0 = v;
            e.x1 = v;
        },
    );

    result.extend(horizontals);
    result.extend(verticals);
    result
}

fn split_by_orientation(edges: Vec<Edge>) -> (Vec<Edge>, Vec<Edge>, Vec<Edge>) {
    let mut horizontals = Vec::new();
    let mut verticals = Vec::new();
    let mut other = Vec::new();
    for edge in edges {
        match edge.orientation {
            Orientation::Horizontal => horizontals.push(edge),
            Orientation::Vertical => verticals.push(edge),
            Orientation::Diagonal => other.push(edge),
        }
    }
    (horizontals, verticals, other)
}

fn snap_group<F, G>(edges: &mut [Edge], tolerance: f64, key: F, mut set: G)
where
    F: Fn(&Edge) -> f64,
    G: FnMut(&mut Edge, f64),
{
    if edges.is_empty() {
        return;
    }
    edges.sort_by(|a, b| key(a).total_cmp(&key(b)));

    let mut start = 0;
    for i in 1..=edges.len() {
        let boundary = i == edges.len() || key(&edges[i]) - key(&edges[i - 1]) > tolerance;
        if boundary {
            let sum: f64 = edges[start..i].iter().map(&key).sum();
            let mean = sum / (i - start) as f64;
            for edge in &mut edges[start..i] {
                set(edge, mean);
            }
            start = i;
        }
    }
}

/// Merge overlapping or nearly touching collinear segments.
pub fn join_edge_group(edges: Vec<Edge>, join_x_tolerance: f64, join_y_tolerance: f64) -> Vec<Edge> {
    let (horizontals, verticals, mut result) = split_by_orientation(edges);

    result.extend(join_collinear(
        horizontals,
        |e| e.top,
        |e| (e.x0, e.x1),
        |proto, start, end| Edge {
            x0: start,
            x1: end,
            ..proto.clone()
        },
        join_x_tolerance,
    ));
    result.extend(join_collinear(
        verticals,
        |e| e.x0,
        |e| (e.top, e.bottom),
        |proto, start, end| Edge {
            top: start,
            bottom: end,
            ..proto.clone()
        },
        join_y_tolerance,
    ));
    result
}

fn join_collinear<K, S, B>(mut edges: Vec<Edge>, key: K, span: S, build: B, tolerance: f64) -> Vec<Edge>
where
    K: Fn(&Edge) -> f64,
    S: Fn(&Edge) -> (f64, f64),
    B: Fn(&Edge, f64, f64) -> Edge,
{
    edges.sort_by(|a, b| {
        key(a)
            .total_cmp(&key(b))
            .then_with(|| span(a).0.total_cmp(&span(b).0))
    });

    let mut result = Vec::new();
    let mut i = 0;
    while i < edges.len() {
        let line = key(&edges[i]);
        let mut j = i + 1;
        while j < edges.len() && (key(&edges[j]) - line).abs() < 1e-9 {
            j += 1;
        }

        let (mut cur_start, mut cur_end) = span(&edges[i]);
        let mut proto = i;
        for k in (i + 1)..j {
            let (s, e) = span(&edges[k]);
            if s <= cur_end + tolerance {
                cur_end = cur_end.max(e);
            } else {
                result.push(build(&edges[proto], cur_start, cur_end));
                cur_start = s;
                cur_end = e;
                proto = k;
            }
        }
        result.push(build(&edges[proto], cur_start, cur_end));
        i = j;
    }
    result
}

/// A point where a horizontal and a vertical edge cross.
///
/// `horizontals` and `verticals` index the edges (in the slice passed to
/// [`edges_to_intersections`]) that pass through the point.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub x: f64,
    pub y: f64,
    pub horizontals: Vec<usize>,
    pub verticals: Vec<usize>,
}

/// Find all crossings between horizontal and vertical edges, sorted
/// top-to-bottom then left-to-right.
///
/// Only the actual segments are considered, never their extensions.
pub fn edges_to_intersections(edges: &[Edge], x_tolerance: f64, y_tolerance: f64) -> Vec<Intersection> {
    let mut points: BTreeMap<(i64, i64), Intersection> = BTreeMap::new();
    for (hi, h) in edges.iter().enumerate() {
        if h.orientation != Orientation::Horizontal {
            continue;
        }
        for (vi, v) in edges.iter().enumerate() {
            if v.orientation != Orientation::Vertical {
                continue;
            }
            if v.x0 >= h.x0 - x_tolerance
                && v.x0 <= h.x1 + x_tolerance
                && h.top >= v.top - y_tolerance
                && h.top <= v.bottom + y_tolerance
            {
                let point = points
                    .entry((float_key(h.top), float_key(v.x0)))
                    .or_insert_with(|| Intersection {
                        x: v.x0,
                        y: h.top,
                        horizontals: Vec::new(),
                        verticals: Vec::new(),
                    });
                point.horizontals.push(hi);
                point.verticals.push(vi);
            }
        }
    }
    points.into_values().collect()
}

fn share_any(a: &[usize], b: &[usize]) -> bool {
    a.iter().any(|i| b.contains(i))
}

/// Build cells from intersections.
///
/// Each intersection is tried as a top-left corner. The cell is the
/// smallest rectangle whose other three corners are intersections joined
/// to it by common edges, so a region spanning several grid columns or
/// rows becomes one cell.
pub fn intersections_to_cells(intersections: &[Intersection]) -> Vec<Cell> {
    let same = |a: f64, b: f64| (a - b).abs() < 1e-9;
    let mut cells = Vec::new();

    for (i, pt) in intersections.iter().enumerate() {
        let rest = &intersections[i + 1..];
        let below: Vec<&Intersection> = rest
            .iter()
            .filter(|p| same(p.x, pt.x) && share_any(&p.verticals, &pt.verticals))
            .collect();
        let right: Vec<&Intersection> = rest
            .iter()
            .filter(|p| same(p.y, pt.y) && share_any(&p.horizontals, &pt.horizontals))
            .collect();

        let found = below.iter().find_map(|b| {
            right.iter().find_map(|r| {
                intersections
                    .iter()
                    .find(|c| same(c.x, r.x) && same(c.y, b.y))
                    .filter(|corner| {
                        share_any(&corner.verticals, &r.verticals)
                            && share_any(&corner.horizontals, &b.horizontals)
                    })
            })
        });

        if let Some(corner) = found {
            cells.push(Cell {
                bbox: BBox::new(pt.x, pt.y, corner.x, corner.y),
                text: None,
            });
        }
    }
    cells
}

/// Group cells sharing an edge into tables, ordered top-to-bottom then
/// left-to-right.
pub fn cells_to_tables(cells: Vec<Cell>) -> Vec<Table> {
    let n = cells.len();
    let mut parent: Vec<usize> = (0..n).collect();

    fn find(parent: &mut [usize], mut i: usize) -> usize {
        while parent[i] != i {
            parent[i] = parent[parent[i]];
            i = parent[i];
        }
        i
    }

    for i in 0..n {
        for j in (i + 1)..n {
            if cells_share_edge(&cells[i], &cells[j]) {
                let ra = find(&mut parent, i);
                let rb = find(&mut parent, j);
                if ra != rb {
                    parent[rb] = ra;
                }
            }
        }
    }

    let mut groups: HashMap<usize, Vec<Cell>> = HashMap::new();
    for (i, cell) in cells.into_iter().enumerate() {
        let root = find(&mut parent, i);
        groups.entry(root).or_default().push(cell);
    }

    let mut tables: Vec<Table> = groups
        .into_values()
        .filter_map(|mut group| {
            group.sort_by(|a, b| {
                a.bbox
                    .top
                    .total_cmp(&b.bbox.top)
                    .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
            });
            let first = group.first()?.bbox;
            let bbox = group.iter().fold(first, |acc, c| acc.union(&c.bbox));
            Some(Table { bbox, cells: group })
        })
        .collect();

    tables.sort_by(|a, b| {
        a.bbox
            .top
            .total_cmp(&b.bbox.top)
            .then_with(|| a.bbox.x0.total_cmp(&b.bbox.x0))
    });
    tables
}

fn cells_share_edge(a: &Cell, b: &Cell) -> bool {
    let eps = 1e-6;
    let shared_vertical = ((a.bbox.x1 - b.bbox.x0).abs() < eps || (a.bbox.x0 - b.bbox.x1).abs() < eps)
        && a.bbox.top < b.bbox.bottom + eps
        && b.bbox.top < a.bbox.bottom + eps;
    let shared_horizontal = ((a.bbox.bottom - b.bbox.top).abs() < eps
        || (a.bbox.top - b.bbox.bottom).abs() < eps)
        && a.bbox.x0 < b.bbox.x1 + eps
        && b.bbox.x0 < a.bbox.x1 + eps;
    shared_vertical || shared_horizontal
}

fn float_key(v: f64) -> i64 {
    (v * 1000.0).round() as i64
}

/// Fill in each cell's text from the characters whose centre lies inside it.
///
/// Every cell ends up with `Some(text)`, an empty string when no characters
/// fall inside.
pub fn extract_text_for_cells(cells: &mut [Cell], chars: &[Char], settings: &TableSettings) {
    for cell in cells.iter_mut() {
        let inside: Vec<&Char> = chars
            .iter()
            .filter(|ch| {
                let (cx, cy) = ch.bbox.center();
                cell.bbox.contains_point(cx, cy)
            })
            .collect();

        let text = cluster_lines(&inside, settings.text_y_tolerance)
            .iter()
            .map(|line| join_line(line, settings.text_x_tolerance).trim().to_string())
            .collect::<Vec<_>>()
            .join("\n");
        cell.text = Some(text);
    }
}

/// Orchestrator for the lattice pipeline.
pub struct TableFinder {
    edges: Vec<Edge>,
    settings: TableSettings,
}

impl TableFinder {
    pub fn new(edges: Vec<Edge>, settings: TableSettings) -> Self {
        Self { edges, settings }
    }

    pub fn settings(&self) -> &TableSettings {
        &self.settings
    }

    /// Run the detection pipeline: filter → snap → join → intersections →
    /// cells → tables. Cells carry no text yet.
    pub fn find_tables(&self) -> Vec<Table> {
        let s = &self.settings;
        let edges: Vec<Edge> = self
            .edges
            .iter()
            .filter(|e| e.orientation != Orientation::Diagonal && e.length() >= s.edge_min_length)
            .cloned()
            .collect();
        if edges.is_empty() {
            return Vec::new();
        }

        let edges = snap_edges(edges, s.snap_x_tolerance, s.snap_y_tolerance);
        let edges = join_edge_group(edges, s.join_x_tolerance, s.join_y_tolerance);
        let intersections =
            edges_to_intersections(&edges, s.intersection_x_tolerance, s.intersection_y_tolerance);
        cells_to_tables(intersections_to_cells(&intersections))
    }

    /// Detect tables and fill their cell text from `chars`.
    pub fn extract(&self, chars: &[Char]) -> Vec<Table> {
        let mut tables = self.find_tables();
        for table in &mut tables {
            extract_text_for_cells(&mut table.cells, chars, &self.settings);
        }
        tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edges::{EdgeSource, Rect, derive_edges};

    fn h(x0: f64, x1: f64, y: f64) -> Edge {
        Edge {
            x0,
            top: y,
            x1,
            bottom: y,
            orientation: Orientation::Horizontal,
            source: EdgeSource::Line,
        }
    }

    fn v(x: f64, top: f64, bottom: f64) -> Edge {
        Edge {
            x0: x,
            top,
            x1: x,
            bottom,
            orientation: Orientation::Vertical,
            source: EdgeSource::Line,
        }
    }

    fn ch(text: &str, x0: f64, top: f64) -> Char {
        Char {
            text: text.to_string(),
            bbox: BBox::new(x0, top, x0 + 6.0, top + 10.0),
            fontname: "Helvetica".to_string(),
            size: 10.0,
        }
    }

    /// A 2x2 grid spanning x 0..200, y 0..60.
    fn grid_edges() -> Vec<Edge> {
        vec![
            h(0.0, 200.0, 0.0),
            h(0.0, 200.0, 30.0),
            h(0.0, 200.0, 60.0),
            v(0.0, 0.0, 60.0),
            v(100.0, 0.0, 60.0),
            v(200.0, 0.0, 60.0),
        ]
    }

    #[test]
    fn snap_aligns_nearby_horizontals_to_mean() {
        let snapped = snap_edges(vec![h(0.0, 10.0, 10.0), h(0.0, 10.0, 12.0)], 3.0, 3.0);
        assert!(snapped.iter().all(|e| e.top == 11.0 && e.bottom == 11.0));
    }

    #[test]
    fn snap_keeps_distant_edges_apart() {
        let snapped = snap_edges(vec![h(0.0, 10.0, 10.0), h(0.0, 10.0, 20.0)], 3.0, 3.0);
        let mut tops: Vec<f64> = snapped.iter().map(|e| e.top).collect();
        tops.sort_by(f64::total_cmp);
        assert_eq!(tops, vec![10.0, 20.0]);
    }

    #[test]
    fn snap_chains_edges_within_tolerance_of_their_neighbour() {
        let snapped = snap_edges(
            vec![h(0.0, 10.0, 16.0), h(0.0, 10.0, 10.0), h(0.0, 10.0, 13.0), h(0.0, 10.0, 30.0)],
            3.0,
            3.0,
        );
        let mut tops: Vec<f64> = snapped.iter().map(|e| e.top).collect();
        tops.sort_by(f64::total_cmp);
        assert_eq!(tops, vec![13.0, 13.0, 13.0, 30.0]);
    }

    #[test]
    fn join_merges_segments_within_tolerance() {
        let joined = join_edge_group(vec![h(0.0, 50.0, 5.0), h(52.0, 100.0, 5.0)], 3.0, 3.0);
        assert_eq!(joined.len(), 1);
        assert_eq!((joined[0].x0, joined[0].x1), (0.0, 100.0));
    }

    #[test]
    fn join_keeps_gapped_segments() {
        let joined = join_edge_group(vec![v(5.0, 0.0, 10.0), v(5.0, 20.0, 30.0)], 3.0, 3.0);
        assert_eq!(joined.len(), 2);
    }

    #[test]
    fn intersections_ignore_line_extensions() {
        let points = edges_to_intersections(&[h(0.0, 50.0, 10.0), v(80.0, 0.0, 20.0)], 3.0, 3.0);
        assert!(points.is_empty());
    }

    #[test]
    fn grid_yields_one_table_with_four_cells() {
        let tables = TableFinder::new(grid_edges(), TableSettings::default()).find_tables();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].cells.len(), 4);
        assert_eq!(tables[0].bbox, BBox::new(0.0, 0.0, 200.0, 60.0));
    }

    #[test]
    fn cells_missing_a_corner_are_skipped() {
        // An L shape: no bottom-right corner.
        let edges = vec![h(0.0, 50.0, 0.0), v(0.0, 0.0, 50.0)];
        let points = edges_to_intersections(&edges, 3.0, 3.0);
        assert_eq!(points.len(), 1);
        assert!(intersections_to_cells(&points).is_empty());
    }

    #[test]
    fn intersections_record_crossing_edges() {
        let points = edges_to_intersections(&grid_edges(), 3.0, 3.0);
        assert_eq!(points.len(), 9);
        assert_eq!((points[0].x, points[0].y), (0.0, 0.0));
        assert_eq!((points[1].x, points[1].y), (100.0, 0.0));
        assert_eq!(points[0].horizontals, vec![0]);
        assert_eq!(points[0].verticals, vec![3]);
    }

    #[test]
    fn separate_grids_become_separate_tables_in_reading_order() {
        let mut edges: Vec<Edge> = grid_edges()
            .into_iter()
            .map(|mut e| {
                e.top += 300.0;
                e.bottom += 300.0;
                e
            })
            .collect();
        edges.extend(grid_edges());
        let tables = TableFinder::new(edges, TableSettings::default()).find_tables();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].bbox.top, 0.0);
        assert_eq!(tables[1].bbox.top, 300.0);
    }

    #[test]
    fn short_edges_are_ignored() {
        let finder = TableFinder::new(vec![h(0.0, 2.0, 0.0), v(0.0, 0.0, 2.0)], TableSettings::default());
        assert!(finder.find_tables().is_empty());
    }

    #[test]
    fn rect_borders_form_a_table() {
        let rects = vec![
            Rect { bbox: BBox::new(0.0, 0.0, 50.0, 20.0) },
            Rect { bbox: BBox::new(50.0, 0.0, 100.0, 20.0) },
        ];
        let edges = derive_edges(&[], &rects);
        let tables = TableFinder::new(edges, TableSettings::default()).find_tables();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].to_rows().len(), 1);
        assert_eq!(tables[0].to_rows()[0].len(), 2);
    }

    #[test]
    fn cell_text_comes_from_char_centres() {
        let chars = vec![
            ch("N", 5.0, 10.0),
            ch("a", 11.0, 10.0),
            ch("1", 105.0, 10.0),
            ch("B", 5.0, 40.0),
        ];
        let tables = TableFinder::new(grid_edges(), TableSettings::default()).extract(&chars);
        let rows = tables[0].to_rows();
        assert_eq!(
            rows,
            vec![
                vec![Some("Na".to_string()), Some("1".to_string())],
                vec![Some("B".to_string()), Some(String::new())],
            ]
        );
    }

    #[test]
    fn spanned_region_is_none_in_row_grid() {
        // Top row is a single merged cell; bottom row has two cells.
        let edges = vec![
            h(0.0, 200.0, 0.0),
            h(0.0, 200.0, 30.0),
            h(0.0, 200.0, 60.0),
            v(0.0, 0.0, 60.0),
            v(100.0, 30.0, 60.0),
            v(200.0, 0.0, 60.0),
        ];
        let tables = TableFinder::new(edges, TableSettings::default()).extract(&[]);
        let rows = tables[0].to_rows();
        assert_eq!(rows[0], vec![Some(String::new()), None]);
        assert_eq!(rows[1], vec![Some(String::new()), Some(String::new())]);
    }

    #[test]
    fn settings_builders_set_both_axes() {
        let s = TableSettings::default()
            .with_snap_tolerance(1.0)
            .with_join_tolerance(2.0)
            .with_text_tolerance(4.0);
        assert_eq!((s.snap_x_tolerance, s.snap_y_tolerance), (1.0, 1.0));
        assert_eq!((s.join_x_tolerance, s.join_y_tolerance), (2.0, 2.0));
        assert_eq!((s.text_x_tolerance, s.text_y_tolerance), (4.0, 4.0));
    }
}
