//! Floor grid loading and validation.
//!
//! A floors document is `{ floors: [{ label, grid, gridW?, gridH? }], config? }`
//! where `grid` is an array of rows of nullable type codes. Grids are checked
//! for rectangularity once, on load, and are immutable afterwards.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// One floor as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorEntry {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_w: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid_h: Option<usize>,
    pub grid: Vec<Vec<Option<String>>>,
}

/// Top-level floors document. `config` (viewer legend, voxel sizes) is
/// carried through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloorsDocument {
    pub floors: Vec<FloorEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// Rectangular, row-major matrix of nullable type codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<String>>,
}

impl Grid {
    /// Build a grid from rows, rejecting empty or ragged input.
    /// `floor` is only used for error reporting.
    pub fn from_rows(floor: usize, rows: Vec<Vec<Option<String>>>) -> GridResult<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(GridError::EmptyFloor { floor });
        }
        let row_count = rows.len();
        let mut cells = Vec::with_capacity(row_count * cols);
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(GridError::RaggedRow {
                    floor,
                    row: r,
                    expected: cols,
                    actual: row.len(),
                });
            }
            cells.extend(row);
        }
        Ok(Self {
            rows: row_count,
            cols,
            cells,
        })
    }

    /// Build a grid from a compact text picture, one line per row.
    /// `.` is empty, any other character is a one-letter code.
    pub fn from_ascii(picture: &str) -> GridResult<Self> {
        let rows = picture
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.chars()
                    .map(|ch| (ch != '.').then(|| ch.to_string()))
                    .collect()
            })
            .collect();
        Self::from_rows(0, rows)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// `[rows, cols]`, the shape recorded in the region catalog.
    pub fn size(&self) -> [usize; 2] {
        [self.rows, self.cols]
    }

    pub fn in_bounds(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols
    }

    /// Type code at a cell, `None` when empty or out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        if !self.in_bounds(row, col) {
            return None;
        }
        self.cells[row * self.cols + col].as_deref()
    }

    /// Rows in wire form, for writing a floors document back out.
    pub fn to_rows(&self) -> Vec<Vec<Option<String>>> {
        self.cells.chunks(self.cols).map(<[_]>::to_vec).collect()
    }

    /// Number of cells holding the given code.
    pub fn count_code(&self, code: &str) -> usize {
        self.cells
            .iter()
            .filter(|c| c.as_deref() == Some(code))
            .count()
    }
}

/// A loaded, validated floor.
#[derive(Debug, Clone)]
pub struct Floor {
    pub label: String,
    pub grid: Grid,
}

impl FloorsDocument {
    /// Validate every floor. Fails on the first malformed one so that no
    /// partially aligned floor list ever reaches later stages.
    pub fn into_floors(self) -> GridResult<Vec<Floor>> {
        self.floors
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let declared = (entry.grid_h, entry.grid_w);
                let grid = Grid::from_rows(index, entry.grid)?;
                if let (Some(h), Some(w)) = declared {
                    if h != grid.rows() || w != grid.cols() {
                        return Err(GridError::SizeMismatch {
                            floor: index,
                            declared_rows: h,
                            declared_cols: w,
                            rows: grid.rows(),
                            cols: grid.cols(),
                        });
                    }
                }
                Ok(Floor {
                    label: entry.label,
                    grid,
                })
            })
            .collect()
    }

    /// Inverse of [`into_floors`](Self::into_floors), recording grid sizes.
    pub fn from_floors(floors: &[Floor], config: Option<serde_json::Value>) -> Self {
        Self {
            floors: floors
                .iter()
                .map(|f| FloorEntry {
                    label: f.label.clone(),
                    grid_w: Some(f.grid.cols()),
                    grid_h: Some(f.grid.rows()),
                    grid: f.grid.to_rows(),
                })
                .collect(),
            config,
        }
    }
}

/// Parse a floors document from JSON text. `origin` names the source in errors.
pub fn parse_floors(json: &str, origin: &Path) -> GridResult<Vec<Floor>> {
    let doc: FloorsDocument =
        serde_json::from_str(json).map_err(|e| GridError::json(origin, e))?;
    doc.into_floors()
}

/// Read and validate a floors document from disk.
pub fn load_floors(path: &Path) -> GridResult<Vec<Floor>> {
    let raw = std::fs::read_to_string(path).map_err(|e| GridError::io(path, e))?;
    parse_floors(&raw, path)
}
