//! Region segmentation by 4-connected flood fill.
//!
//! Every non-boundary cell ends up in exactly one region; a region holds
//! cells of a single type code. Work is O(rows × cols): each cell is marked
//! visited once, either as boundary or when first pushed onto the fill stack.

use serde::{Deserialize, Serialize};

use crate::codes::BoundarySet;
use crate::grid::Grid;

/// Up, down, left, right. No diagonal merging.
const NEIGHBORS: [(isize, isize); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];

/// A (row, col) position, serialized as `[row, col]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Centroid {
    pub row: f64,
    pub col: f64,
}

impl Centroid {
    pub fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }

    /// Euclidean distance in cell units.
    pub fn distance(&self, other: &Centroid) -> f64 {
        let dr = self.row - other.row;
        let dc = self.col - other.col;
        (dr * dr + dc * dc).sqrt()
    }
}

impl From<[f64; 2]> for Centroid {
    fn from([row, col]: [f64; 2]) -> Self {
        Self { row, col }
    }
}

impl From<Centroid> for [f64; 2] {
    fn from(c: Centroid) -> Self {
        [c.row, c.col]
    }
}

/// Inclusive bounding box in cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BBox {
    pub min_r: usize,
    pub max_r: usize,
    pub min_c: usize,
    pub max_c: usize,
}

impl BBox {
    pub fn contains(&self, row: usize, col: usize) -> bool {
        (self.min_r..=self.max_r).contains(&row) && (self.min_c..=self.max_c).contains(&col)
    }
}

/// A maximal 4-connected set of same-type cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Region {
    #[serde(rename = "type")]
    pub cell_type: String,
    pub cell_count: usize,
    pub centroid: Centroid,
    pub bbox: BBox,
    /// Cells in the order the fill discovered them.
    pub cells: Vec<(usize, usize)>,
}

impl Region {
    /// Compute count, centroid and bbox for a non-empty cell list.
    pub fn from_cells(cell_type: impl Into<String>, cells: Vec<(usize, usize)>) -> Self {
        debug_assert!(!cells.is_empty());
        let n = cells.len() as f64;
        let (mut sum_r, mut sum_c) = (0usize, 0usize);
        let mut bbox = BBox {
            min_r: usize::MAX,
            max_r: 0,
            min_c: usize::MAX,
            max_c: 0,
        };
        for &(r, c) in &cells {
            sum_r += r;
            sum_c += c;
            bbox.min_r = bbox.min_r.min(r);
            bbox.max_r = bbox.max_r.max(r);
            bbox.min_c = bbox.min_c.min(c);
            bbox.max_c = bbox.max_c.max(c);
        }
        Self {
            cell_type: cell_type.into(),
            cell_count: cells.len(),
            centroid: Centroid::new(round1(sum_r as f64 / n), round1(sum_c as f64 / n)),
            bbox,
            cells,
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        self.bbox.contains(row, col) && self.cells.contains(&(row, col))
    }
}

/// Round half away from zero to one decimal place.
pub fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

/// Segment one grid into regions, sorted top-to-bottom then left-to-right
/// by centroid. Ties keep discovery order.
pub fn segment_grid(grid: &Grid, boundary: &BoundarySet) -> Vec<Region> {
    let (rows, cols) = (grid.rows(), grid.cols());
    let mut visited = vec![false; rows * cols];
    let mut regions = Vec::new();

    for r in 0..rows {
        for c in 0..cols {
            if visited[r * cols + c] {
                continue;
            }
            let cell = grid.get(r, c);
            if boundary.contains(cell) {
                visited[r * cols + c] = true;
                continue;
            }
            let Some(code) = cell else { continue };
            let cells = flood_fill(grid, &mut visited, r, c, code);
            regions.push(Region::from_cells(code, cells));
        }
    }

    sort_regions(&mut regions);
    regions
}

/// Stable sort by `(centroid.row, centroid.col)`.
pub fn sort_regions(regions: &mut [Region]) {
    regions.sort_by(|a, b| {
        a.centroid
            .row
            .total_cmp(&b.centroid.row)
            .then(a.centroid.col.total_cmp(&b.centroid.col))
    });
}

/// Iterative fill from `(start_r, start_c)` over cells equal to `code`.
fn flood_fill(
    grid: &Grid,
    visited: &mut [bool],
    start_r: usize,
    start_c: usize,
    code: &str,
) -> Vec<(usize, usize)> {
    let cols = grid.cols();
    let mut cells = Vec::new();
    let mut stack = vec![(start_r, start_c)];
    visited[start_r * cols + start_c] = true;

    while let Some((r, c)) = stack.pop() {
        cells.push((r, c));
        for (dr, dc) in NEIGHBORS {
            let (Some(nr), Some(nc)) = (r.checked_add_signed(dr), c.checked_add_signed(dc)) else {
                continue;
            };
            if !grid.in_bounds(nr, nc) || visited[nr * cols + nc] {
                continue;
            }
            if grid.get(nr, nc) != Some(code) {
                continue;
            }
            visited[nr * cols + nc] = true;
            stack.push((nr, nc));
        }
    }
    cells
}
