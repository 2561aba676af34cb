//! Per-floor region catalog (`room-regions.json`).

use serde::{Deserialize, Serialize};

use crate::codes::{cell_types, BoundarySet};
use crate::grid::Floor;
use crate::segment::{segment_grid, Region};

/// All regions of one floor, sorted by centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorCatalog {
    #[serde(default)]
    pub floor: usize,
    pub label: String,
    /// `[rows, cols]` of the source grid.
    pub grid_size: [usize; 2],
    pub region_count: usize,
    pub regions: Vec<Region>,
}

impl FloorCatalog {
    pub fn rows(&self) -> usize {
        self.grid_size[0]
    }

    pub fn cols(&self) -> usize {
        self.grid_size[1]
    }

    /// Index of the region covering a cell, if any.
    pub fn region_at(&self, row: usize, col: usize) -> Option<usize> {
        self.regions.iter().position(|reg| reg.contains(row, col))
    }

    /// Regions of one type, in catalog order.
    pub fn regions_of_type<'a>(&'a self, cell_type: &'a str) -> impl Iterator<Item = &'a Region> {
        self.regions.iter().filter(move |r| r.cell_type == cell_type)
    }
}

/// Segment a single floor.
pub fn catalog_floor(index: usize, floor: &Floor, boundary: &BoundarySet) -> FloorCatalog {
    let regions = segment_grid(&floor.grid, boundary);
    log::info!("{}: {} regions", floor.label, regions.len());
    for code in cell_types::ALL {
        let n = regions.iter().filter(|r| r.cell_type == code).count();
        if n > 0 {
            log::debug!("  {} ({}): {}", cell_types::name(code), code, n);
        }
    }
    let mut unknown: Vec<&str> = regions
        .iter()
        .map(|r| r.cell_type.as_str())
        .filter(|code| !cell_types::is_known(code))
        .collect();
    unknown.sort_unstable();
    unknown.dedup();
    if !unknown.is_empty() {
        log::warn!("{}: unknown cell codes {:?}", floor.label, unknown);
    }
    for reg in &regions {
        log::debug!(
            "  {} cells={} centroid=[{},{}] bbox=[{}-{}, {}-{}]",
            reg.cell_type,
            reg.cell_count,
            reg.centroid.row,
            reg.centroid.col,
            reg.bbox.min_r,
            reg.bbox.max_r,
            reg.bbox.min_c,
            reg.bbox.max_c
        );
    }
    FloorCatalog {
        floor: index,
        label: floor.label.clone(),
        grid_size: floor.grid.size(),
        region_count: regions.len(),
        regions,
    }
}

/// Segment every floor in order. Output index `i` is floor `i`.
pub fn build_catalog(floors: &[Floor], boundary: &BoundarySet) -> Vec<FloorCatalog> {
    floors
        .iter()
        .enumerate()
        .map(|(i, f)| catalog_floor(i, f, boundary))
        .collect()
}
