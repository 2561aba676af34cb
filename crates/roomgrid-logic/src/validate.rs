//! Verification of produced artifacts.
//!
//! Pure functions that take catalog / room map / lookup grids (and, when
//! available, the source floors and seeds) and return validation errors.
//! An empty result means the artifacts are mutually consistent.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::artifacts::{RoomIdsDocument, RoomMapDocument};
use crate::catalog::FloorCatalog;
use crate::codes::BoundarySet;
use crate::grid::Floor;
use crate::seeds::{SeedDocument, SeedEntry};
use crate::segment::Region;

/// A validation finding.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

fn error(category: &'static str, message: String) -> ValidationError {
    ValidationError {
        category,
        severity: Severity::Error,
        message,
    }
}

fn warning(category: &'static str, message: String) -> ValidationError {
    ValidationError {
        category,
        severity: Severity::Warning,
        message,
    }
}

// ── A. Catalog (per-floor) ──────────────────────────────────────────────

/// Check every region's count, centroid and bbox against its cell list.
pub fn check_region_stats(catalog: &[FloorCatalog]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (f, floor) in catalog.iter().enumerate() {
        if floor.region_count != floor.regions.len() {
            errors.push(error(
                "catalog",
                format!(
                    "Floor {}: regionCount {} but {} regions listed",
                    f,
                    floor.region_count,
                    floor.regions.len()
                ),
            ));
        }
        for (i, reg) in floor.regions.iter().enumerate() {
            if reg.cells.is_empty() {
                errors.push(error(
                    "catalog",
                    format!("Floor {}: region #{} has no cells", f, i),
                ));
                continue;
            }
            let expected = Region::from_cells(reg.cell_type.clone(), reg.cells.clone());
            if expected.cell_count != reg.cell_count
                || expected.centroid != reg.centroid
                || expected.bbox != reg.bbox
            {
                errors.push(error(
                    "catalog",
                    format!(
                        "Floor {}: region #{} ({}) stats disagree with its cells",
                        f, i, reg.cell_type
                    ),
                ));
            }
        }
    }
    errors
}

/// Check that regions are sorted by centroid row, then column.
pub fn check_catalog_order(catalog: &[FloorCatalog]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (f, floor) in catalog.iter().enumerate() {
        let unsorted = floor.regions.windows(2).position(|w| {
            let (a, b) = (&w[0].centroid, &w[1].centroid);
            a.row > b.row || (a.row == b.row && a.col > b.col)
        });
        if let Some(i) = unsorted {
            errors.push(error(
                "ordering",
                format!(
                    "Floor {}: regions #{} and #{} are out of centroid order",
                    f,
                    i,
                    i + 1
                ),
            ));
        }
    }
    errors
}

/// Check that no cell is in two regions and every cell is inside the grid.
pub fn check_region_disjoint(catalog: &[FloorCatalog]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (f, floor) in catalog.iter().enumerate() {
        let mut owner: HashMap<(usize, usize), usize> = HashMap::new();
        for (i, reg) in floor.regions.iter().enumerate() {
            for &(r, c) in &reg.cells {
                if r >= floor.rows() || c >= floor.cols() {
                    errors.push(error(
                        "partition",
                        format!(
                            "Floor {}: region #{} has cell ({}, {}) outside {}x{}",
                            f,
                            i,
                            r,
                            c,
                            floor.rows(),
                            floor.cols()
                        ),
                    ));
                }
                if let Some(prev) = owner.insert((r, c), i) {
                    errors.push(error(
                        "partition",
                        format!(
                            "Floor {}: cell ({}, {}) is in regions #{} and #{}",
                            f, r, c, prev, i
                        ),
                    ));
                }
            }
        }
    }
    errors
}

/// Check that each region is 4-connected.
pub fn check_region_connectivity(catalog: &[FloorCatalog]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (f, floor) in catalog.iter().enumerate() {
        for (i, reg) in floor.regions.iter().enumerate() {
            if !is_connected(&reg.cells) {
                errors.push(error(
                    "connectivity",
                    format!(
                        "Floor {}: region #{} ({}) is not 4-connected",
                        f, i, reg.cell_type
                    ),
                ));
            }
        }
    }
    errors
}

/// BFS over a cell set using 4-adjacency.
pub fn is_connected(cells: &[(usize, usize)]) -> bool {
    let Some(&start) = cells.first() else {
        return true;
    };
    let members: HashSet<(usize, usize)> = cells.iter().copied().collect();
    let mut visited = HashSet::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some((r, c)) = queue.pop_front() {
        let neighbors = [
            r.checked_sub(1).map(|r| (r, c)),
            Some((r + 1, c)),
            c.checked_sub(1).map(|c| (r, c)),
            Some((r, c + 1)),
        ];
        for next in neighbors.into_iter().flatten() {
            if members.contains(&next) && visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    visited.len() == members.len()
}

// ── B. Catalog against source grid ──────────────────────────────────────

/// Check that regions cover exactly the non-boundary cells, each region
/// holding only cells of its own type.
pub fn check_partition_against_floors(
    catalog: &[FloorCatalog],
    floors: &[Floor],
    boundary: &BoundarySet,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if catalog.len() != floors.len() {
        errors.push(error(
            "alignment",
            format!(
                "catalog has {} floors, source has {}",
                catalog.len(),
                floors.len()
            ),
        ));
        return errors;
    }

    for (f, (cat, floor)) in catalog.iter().zip(floors).enumerate() {
        let grid = &floor.grid;
        if cat.grid_size != grid.size() {
            errors.push(error(
                "alignment",
                format!(
                    "Floor {}: catalog size {:?} vs grid {:?}",
                    f,
                    cat.grid_size,
                    grid.size()
                ),
            ));
            continue;
        }

        let mut covered = HashSet::new();
        for (i, reg) in cat.regions.iter().enumerate() {
            let mixed = reg
                .cells
                .iter()
                .find(|&&(r, c)| grid.get(r, c) != Some(reg.cell_type.as_str()));
            if let Some(&(r, c)) = mixed {
                errors.push(error(
                    "homogeneity",
                    format!(
                        "Floor {}: region #{} ({}) contains cell ({}, {}) of type {:?}",
                        f,
                        i,
                        reg.cell_type,
                        r,
                        c,
                        grid.get(r, c)
                    ),
                ));
            }
            covered.extend(reg.cells.iter().copied());
        }

        let mut missing = 0usize;
        let mut first_missing = None;
        for r in 0..grid.rows() {
            for c in 0..grid.cols() {
                let cell = grid.get(r, c);
                if boundary.contains(cell) {
                    if covered.contains(&(r, c)) {
                        errors.push(error(
                            "partition",
                            format!("Floor {}: boundary cell ({}, {}) is in a region", f, r, c),
                        ));
                    }
                } else if !covered.contains(&(r, c)) {
                    missing += 1;
                    first_missing.get_or_insert((r, c));
                }
            }
        }
        if let Some((r, c)) = first_missing {
            errors.push(error(
                "partition",
                format!(
                    "Floor {}: {} non-boundary cells in no region (e.g. ({}, {}))",
                    f, missing, r, c
                ),
            ));
        }
    }
    errors
}

// ── C. Room map and lookup grids ────────────────────────────────────────

/// Check that catalog, room map and lookup grids have the same floors, in
/// the same order, with matching grid sizes.
pub fn check_floor_alignment(
    catalog: &[FloorCatalog],
    room_map: &RoomMapDocument,
    room_ids: &RoomIdsDocument,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let (a, b, c) = (
        catalog.len(),
        room_map.floors.len(),
        room_ids.room_grids.len(),
    );
    if a != b || b != c {
        errors.push(error(
            "alignment",
            format!(
                "floor counts differ: catalog {}, room map {}, room ids {}",
                a, b, c
            ),
        ));
        return errors;
    }
    for (i, (cat, grid)) in catalog.iter().zip(&room_ids.room_grids).enumerate() {
        if [grid.rows(), grid.cols()] != cat.grid_size {
            errors.push(error(
                "alignment",
                format!(
                    "Floor {}: room-id grid is {}x{}, catalog says {}x{}",
                    i,
                    grid.rows(),
                    grid.cols(),
                    cat.rows(),
                    cat.cols()
                ),
            ));
        }
        if room_map.floors[i].label != cat.label {
            errors.push(warning(
                "alignment",
                format!(
                    "Floor {}: room map label {:?} differs from catalog label {:?}",
                    i, room_map.floors[i].label, cat.label
                ),
            ));
        }
    }
    errors
}

/// Check that every id in a lookup grid names exactly one room on that
/// floor and that each room's painted cell count equals its `cellCount`.
pub fn check_raster_consistency(
    room_map: &RoomMapDocument,
    room_ids: &RoomIdsDocument,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, (floor, grid)) in room_map.floors.iter().zip(&room_ids.room_grids).enumerate() {
        let mut expected: HashMap<&str, usize> = HashMap::new();
        for room in &floor.rooms {
            if expected.insert(room.id.as_str(), room.cell_count).is_some() {
                errors.push(error(
                    "raster",
                    format!("Floor {}: room id {} listed twice", i, room.id),
                ));
            }
        }

        let mut painted: HashMap<&str, usize> = HashMap::new();
        for (_, _, id) in grid.assigned() {
            *painted.entry(id).or_default() += 1;
        }

        for (id, count) in &painted {
            if !expected.contains_key(id) {
                errors.push(error(
                    "raster",
                    format!(
                        "Floor {}: {} cells carry id {} which is not in the room map",
                        i, count, id
                    ),
                ));
            }
        }
        for room in &floor.rooms {
            let got = painted.get(room.id.as_str()).copied().unwrap_or(0);
            if got != room.cell_count {
                errors.push(error(
                    "raster",
                    format!(
                        "Floor {}: room {} has cellCount {} but {} cells in the lookup grid",
                        i, room.id, room.cell_count, got
                    ),
                ));
            }
        }
    }
    errors
}

/// Check that every room's painted cells are exactly one catalog region
/// and that no region backs two rooms.
pub fn check_room_regions(
    catalog: &[FloorCatalog],
    room_map: &RoomMapDocument,
    room_ids: &RoomIdsDocument,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, (cat, grid)) in catalog.iter().zip(&room_ids.room_grids).enumerate() {
        let Some(floor) = room_map.floors.get(i) else {
            continue;
        };
        let mut bound: HashMap<usize, &str> = HashMap::new();
        for room in &floor.rooms {
            let cells: Vec<(usize, usize)> = grid
                .assigned()
                .filter(|&(_, _, id)| id == room.id)
                .map(|(r, c, _)| (r, c))
                .collect();
            let Some(&(r, c)) = cells.first() else {
                continue;
            };
            let Some(region) = cat.region_at(r, c) else {
                errors.push(error(
                    "exclusivity",
                    format!("Floor {}: room {} covers cells outside any region", i, room.id),
                ));
                continue;
            };
            let reg = &cat.regions[region];
            let members: HashSet<(usize, usize)> = reg.cells.iter().copied().collect();
            let same =
                reg.cell_count == cells.len() && cells.iter().all(|cell| members.contains(cell));
            if !same {
                errors.push(error(
                    "exclusivity",
                    format!(
                        "Floor {}: room {} does not match region #{} cell for cell",
                        i, room.id, region
                    ),
                ));
            }
            if let Some(other) = bound.insert(region, room.id.as_str()) {
                errors.push(error(
                    "exclusivity",
                    format!(
                        "Floor {}: region #{} backs both {} and {}",
                        i, region, other, room.id
                    ),
                ));
            }
        }
    }
    errors
}

/// Check that rooms bound from room seeds respect the seed's type, size
/// and distance limits. Area batch ids are checked for type and size.
pub fn check_assignment_soundness(
    catalog: &[FloorCatalog],
    room_map: &RoomMapDocument,
    seeds: &SeedDocument,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, (cat, floor)) in catalog.iter().zip(&room_map.floors).enumerate() {
        let Some(seed_floor) = seeds.floors.get(i) else {
            continue;
        };
        for room in &floor.rooms {
            let entry = seed_floor
                .entries
                .iter()
                .find(|e| e.ids().contains(&room.id.as_str()));
            let Some(entry) = entry else {
                errors.push(warning(
                    "soundness",
                    format!("Floor {}: room {} has no seed", i, room.id),
                ));
                continue;
            };
            let candidates: Vec<&Region> = cat
                .regions
                .iter()
                .filter(|r| r.centroid == room.centroid && r.cell_count == room.cell_count)
                .collect();
            let wrong_type = |ty: &str| {
                !candidates.is_empty() && candidates.iter().all(|r| r.cell_type != ty)
            };
            match entry {
                SeedEntry::Room(seed) => {
                    let dist = room.centroid.distance(&seed.centroid);
                    if dist > seed.max_dist {
                        errors.push(error(
                            "soundness",
                            format!(
                                "Floor {}: room {} is {:.1} from its seed (maxDist {})",
                                i, room.id, dist, seed.max_dist
                            ),
                        ));
                    }
                    if room.cell_count < seed.min_cells {
                        errors.push(error(
                            "soundness",
                            format!(
                                "Floor {}: room {} has {} cells (minCells {})",
                                i, room.id, room.cell_count, seed.min_cells
                            ),
                        ));
                    }
                    if wrong_type(&seed.cell_type) {
                        errors.push(error(
                            "soundness",
                            format!("Floor {}: room {} bound to a region of the wrong type", i, room.id),
                        ));
                    }
                }
                SeedEntry::Area(area) => {
                    if !area.accepts_size(room.cell_count) || !area.bbox.contains(&room.centroid) {
                        errors.push(error(
                            "soundness",
                            format!("Floor {}: room {} falls outside its area batch", i, room.id),
                        ));
                    }
                    if wrong_type(&area.cell_type) {
                        errors.push(error(
                            "soundness",
                            format!("Floor {}: room {} bound to a region of the wrong type", i, room.id),
                        ));
                    }
                }
            }
        }
    }
    errors
}

// ── Master validation ───────────────────────────────────────────────────

/// Optional inputs that enable the deeper checks.
#[derive(Default)]
pub struct Sources<'a> {
    pub floors: Option<&'a [Floor]>,
    pub boundary: Option<&'a BoundarySet>,
    pub seeds: Option<&'a SeedDocument>,
}

/// Run every applicable check and return combined results.
pub fn validate_all(
    catalog: &[FloorCatalog],
    room_map: &RoomMapDocument,
    room_ids: &RoomIdsDocument,
    sources: &Sources<'_>,
) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_region_stats(catalog));
    all.extend(check_catalog_order(catalog));
    all.extend(check_region_disjoint(catalog));
    all.extend(check_region_connectivity(catalog));
    if let Some(floors) = sources.floors {
        let default_boundary = BoundarySet::default();
        let boundary = sources.boundary.unwrap_or(&default_boundary);
        all.extend(check_partition_against_floors(catalog, floors, boundary));
    }
    all.extend(check_floor_alignment(catalog, room_map, room_ids));
    all.extend(check_raster_consistency(room_map, room_ids));
    all.extend(check_room_regions(catalog, room_map, room_ids));
    if let Some(seeds) = sources.seeds {
        all.extend(check_assignment_soundness(catalog, room_map, seeds));
    }
    all
}
