//! Rasterization of bound rooms into a per-cell room-id lookup grid.

use serde::{Deserialize, Serialize};

use crate::assign::{FloorAssignment, Room};
use crate::error::{GridError, GridResult};
use crate::segment::Centroid;

/// Lightweight room record for the room map; cells are left out since the
/// lookup grid carries them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMeta {
    pub id: String,
    pub name: String,
    pub centroid: Centroid,
    pub cell_count: usize,
}

impl From<&Room> for RoomMeta {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            centroid: room.centroid,
            cell_count: room.cell_count,
        }
    }
}

/// Room map entry for one floor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FloorRooms {
    pub label: String,
    pub rooms: Vec<RoomMeta>,
}

/// Per-cell room ids for one floor. Serialized as an array of rows; read
/// back through [`RoomIdGrid::from_rows`] so ragged rows are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "Vec<Vec<Option<String>>>")]
pub struct RoomIdGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<String>>,
}

impl RoomIdGrid {
    /// All-null grid.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Rebuild a grid from its rows. Every row must be as long as the first.
    pub fn from_rows(floor: usize, rows: Vec<Vec<Option<String>>>) -> GridResult<Self> {
        let cols = rows.first().map(Vec::len).unwrap_or(0);
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

    /// Room id at a cell, `None` when unassigned or out of bounds.
    pub fn room_at(&self, row: usize, col: usize) -> Option<&str> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.cells[row * self.cols + col].as_deref()
    }

    /// Non-null cells, row-major.
    pub fn assigned(&self) -> impl Iterator<Item = (usize, usize, &str)> {
        let cols = self.cols;
        self.cells
            .iter()
            .enumerate()
            .filter_map(move |(i, id)| id.as_deref().map(|id| (i / cols, i % cols, id)))
    }

    /// Write a room's cells. A cell already held by another room is a
    /// conflict and nothing further is written.
    pub fn paint(&mut self, floor: usize, room: &Room) -> GridResult<()> {
        for &(row, col) in &room.cells {
            if row >= self.rows || col >= self.cols {
                return Err(GridError::CellOutOfBounds {
                    floor,
                    room: room.id.clone(),
                    row,
                    col,
                });
            }
            let slot = &mut self.cells[row * self.cols + col];
            if let Some(existing) = slot.as_ref() {
                if *existing != room.id {
                    return Err(GridError::CellConflict {
                        floor,
                        row,
                        col,
                        existing: existing.clone(),
                        incoming: room.id.clone(),
                    });
                }
            }
            *slot = Some(room.id.clone());
        }
        Ok(())
    }
}

impl From<RoomIdGrid> for Vec<Vec<Option<String>>> {
    fn from(grid: RoomIdGrid) -> Self {
        if grid.cols == 0 {
            return vec![Vec::new(); grid.rows];
        }
        grid.cells.chunks(grid.cols).map(<[_]>::to_vec).collect()
    }
}

/// Paint one floor's rooms onto a null grid of the floor's size.
pub fn rasterize_floor(assignment: &FloorAssignment) -> GridResult<RoomIdGrid> {
    let [rows, cols] = assignment.grid_size;
    let mut grid = RoomIdGrid::empty(rows, cols);
    for room in &assignment.rooms {
        grid.paint(assignment.floor, room)?;
    }
    Ok(grid)
}

/// Room metadata for one floor, in binding order.
pub fn floor_rooms(assignment: &FloorAssignment) -> FloorRooms {
    FloorRooms {
        label: assignment.label.clone(),
        rooms: assignment.rooms.iter().map(RoomMeta::from).collect(),
    }
}
