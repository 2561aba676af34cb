//! Schematic floor drawing.
//!
//! Builds floor grids from a list of drawing operations: rectangles,
//! walled rooms, door openings and office bands. Shared operation lists
//! (a building shell, a stair core) are declared once and referenced by
//! name from each floor.
//!
//! All rectangles are half-open: `r0..r1` × `c0..c1`. Anything outside the
//! canvas is clipped.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::codes::cell_types;
use crate::error::{GridError, GridResult};
use crate::grid::{Floor, FloorsDocument, Grid};

const MAX_TEMPLATE_DEPTH: usize = 8;

fn default_wall() -> String {
    cell_types::OUTLINE.to_string()
}

fn default_door() -> String {
    cell_types::GENERAL.to_string()
}

fn default_office() -> String {
    cell_types::OFFICE.to_string()
}

/// One drawing operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    /// Fill a rectangle; `type: null` clears it.
    Fill {
        r0: usize,
        r1: usize,
        c0: usize,
        c1: usize,
        #[serde(rename = "type")]
        code: Option<String>,
    },
    /// Draw the one-cell border of a rectangle.
    Stroke {
        r0: usize,
        r1: usize,
        c0: usize,
        c1: usize,
        #[serde(rename = "type")]
        code: Option<String>,
    },
    /// Border with `wall`, interior with `type`.
    Room {
        r0: usize,
        r1: usize,
        c0: usize,
        c1: usize,
        #[serde(rename = "type")]
        code: String,
        #[serde(default = "default_wall")]
        wall: String,
    },
    /// Open a single cell, general space by default.
    Door {
        r: usize,
        c: usize,
        #[serde(rename = "type", default = "default_door")]
        code: String,
    },
    /// A column of rooms sharing `c0..c1`, each with a door in the middle
    /// of its right-hand wall.
    Offices {
        rows: Vec<[usize; 2]>,
        c0: usize,
        c1: usize,
        #[serde(rename = "type", default = "default_office")]
        code: String,
    },
    /// Apply a shared operation list.
    Use { name: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutFloor {
    pub label: String,
    pub ops: Vec<DrawOp>,
}

/// A whole building: canvas size, shared templates and per-floor ops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDocument {
    pub grid_h: usize,
    pub grid_w: usize,
    #[serde(default)]
    pub shared: BTreeMap<String, Vec<DrawOp>>,
    pub floors: Vec<LayoutFloor>,
    /// Passed through to the floors document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Value>,
}

/// Mutable drawing surface.
#[derive(Debug, Clone)]
pub struct Canvas {
    rows: usize,
    cols: usize,
    cells: Vec<Option<String>>,
}

impl Canvas {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
        }
    }

    pub fn set(&mut self, r: usize, c: usize, code: Option<&str>) {
        if r < self.rows && c < self.cols {
            self.cells[r * self.cols + c] = code.map(str::to_string);
        }
    }

    pub fn get(&self, r: usize, c: usize) -> Option<&str> {
        if r < self.rows && c < self.cols {
            self.cells[r * self.cols + c].as_deref()
        } else {
            None
        }
    }

    pub fn fill_rect(&mut self, r0: usize, r1: usize, c0: usize, c1: usize, code: Option<&str>) {
        for r in r0..r1.min(self.rows) {
            for c in c0..c1.min(self.cols) {
                self.set(r, c, code);
            }
        }
    }

    pub fn stroke_rect(&mut self, r0: usize, r1: usize, c0: usize, c1: usize, code: Option<&str>) {
        if r1 <= r0 || c1 <= c0 {
            return;
        }
        for c in c0..c1.min(self.cols) {
            self.set(r0, c, code);
            self.set(r1 - 1, c, code);
        }
        for r in r0..r1.min(self.rows) {
            self.set(r, c0, code);
            self.set(r, c1 - 1, code);
        }
    }

    /// Walled room: stroke with `wall`, fill the interior with `code`.
    pub fn add_room(&mut self, r0: usize, r1: usize, c0: usize, c1: usize, code: &str, wall: &str) {
        self.stroke_rect(r0, r1, c0, c1, Some(wall));
        if r1 >= r0 + 2 && c1 >= c0 + 2 {
            self.fill_rect(r0 + 1, r1 - 1, c0 + 1, c1 - 1, Some(code));
        }
    }

    pub fn carve_door(&mut self, r: usize, c: usize, code: &str) {
        self.set(r, c, Some(code));
    }

    pub fn into_grid(self, floor: usize) -> GridResult<Grid> {
        let rows = self
            .cells
            .chunks(self.cols.max(1))
            .map(<[_]>::to_vec)
            .collect();
        Grid::from_rows(floor, rows)
    }
}

fn apply_ops(
    canvas: &mut Canvas,
    ops: &[DrawOp],
    shared: &BTreeMap<String, Vec<DrawOp>>,
    label: &str,
    depth: usize,
) -> GridResult<()> {
    if depth > MAX_TEMPLATE_DEPTH {
        return Err(GridError::InvalidLayout {
            floor: label.to_string(),
            reason: "shared templates nest too deeply".to_string(),
        });
    }
    for op in ops {
        match op {
            DrawOp::Fill {
                r0,
                r1,
                c0,
                c1,
                code,
            } => canvas.fill_rect(*r0, *r1, *c0, *c1, code.as_deref()),
            DrawOp::Stroke {
                r0,
                r1,
                c0,
                c1,
                code,
            } => canvas.stroke_rect(*r0, *r1, *c0, *c1, code.as_deref()),
            DrawOp::Room {
                r0,
                r1,
                c0,
                c1,
                code,
                wall,
            } => canvas.add_room(*r0, *r1, *c0, *c1, code, wall),
            DrawOp::Door { r, c, code } => canvas.carve_door(*r, *c, code),
            DrawOp::Offices { rows, c0, c1, code } => {
                for &[r0, r1] in rows {
                    canvas.add_room(r0, r1, *c0, *c1, code, cell_types::OUTLINE);
                    if *c1 > 0 {
                        canvas.carve_door((r0 + r1) / 2, c1 - 1, cell_types::GENERAL);
                    }
                }
            }
            DrawOp::Use { name } => {
                let Some(template) = shared.get(name) else {
                    return Err(GridError::InvalidLayout {
                        floor: label.to_string(),
                        reason: format!("unknown shared template {:?}", name),
                    });
                };
                apply_ops(canvas, template, shared, label, depth + 1)?;
            }
        }
    }
    Ok(())
}

/// Draw every floor of a layout.
pub fn render_layout(layout: &LayoutDocument) -> GridResult<Vec<Floor>> {
    if layout.grid_h == 0 || layout.grid_w == 0 {
        return Err(GridError::InvalidLayout {
            floor: "<all>".to_string(),
            reason: "canvas has zero size".to_string(),
        });
    }
    layout
        .floors
        .iter()
        .enumerate()
        .map(|(i, floor)| {
            let mut canvas = Canvas::new(layout.grid_h, layout.grid_w);
            apply_ops(&mut canvas, &floor.ops, &layout.shared, &floor.label, 0)?;
            log::info!("{}: {} x {}", floor.label, layout.grid_h, layout.grid_w);
            Ok(Floor {
                label: floor.label.clone(),
                grid: canvas.into_grid(i)?,
            })
        })
        .collect()
}

/// Draw a layout into a floors document, keeping its `config`.
pub fn render_document(layout: &LayoutDocument) -> GridResult<FloorsDocument> {
    let floors = render_layout(layout)?;
    Ok(FloorsDocument::from_floors(&floors, layout.config.clone()))
}

pub fn load_layout(path: &Path) -> GridResult<LayoutDocument> {
    let raw = std::fs::read_to_string(path).map_err(|e| GridError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| GridError::json(path, e))
}
