//! Room assignment. Binds seed descriptors to catalog regions.
//!
//! Each floor gets its own [`AssignmentSession`], which owns the set of
//! regions already claimed on that floor. Entries run in seed order; a
//! region, once claimed, is invisible to every later entry of the session.
//!
//! Matching a room seed:
//! 1. candidate type must equal the seed type
//! 2. candidate `cellCount >= minCells`
//! 3. Euclidean centroid distance `<= maxDist`
//! 4. nearest wins; on equal distance the earlier catalog region wins
//!
//! A seed with no surviving candidate is dropped with a warning.

use crate::catalog::FloorCatalog;
use crate::error::{GridError, GridResult};
use crate::seeds::{AreaOrder, AreaSeed, RoomSeed, SeedDocument, SeedEntry, SeedFloor};
use crate::segment::Centroid;

/// A seed bound to exactly one region.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub centroid: Centroid,
    pub cell_count: usize,
    pub cells: Vec<(usize, usize)>,
    /// Index of the bound region in the floor catalog.
    pub region: usize,
}

/// Result of one floor's assignment pass.
#[derive(Debug, Clone, PartialEq)]
pub struct FloorAssignment {
    pub floor: usize,
    pub label: String,
    pub grid_size: [usize; 2],
    /// Rooms in the order they were bound.
    pub rooms: Vec<Room>,
    /// Ids of seeds that found no region.
    pub unmatched: Vec<String>,
}

/// Per-floor matching state. Never shared across floors.
pub struct AssignmentSession<'a> {
    /// Position of the floor in the document.
    floor: usize,
    catalog: &'a FloorCatalog,
    used: Vec<bool>,
    rooms: Vec<Room>,
    unmatched: Vec<String>,
}

impl<'a> AssignmentSession<'a> {
    pub fn new(floor: usize, catalog: &'a FloorCatalog) -> Self {
        Self {
            floor,
            catalog,
            used: vec![false; catalog.regions.len()],
            rooms: Vec::new(),
            unmatched: Vec::new(),
        }
    }

    pub fn is_used(&self, region: usize) -> bool {
        self.used.get(region).copied().unwrap_or(false)
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    /// Nearest eligible unclaimed region and its distance, without claiming it.
    pub fn find_nearest(&self, seed: &RoomSeed) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (i, reg) in self.catalog.regions.iter().enumerate() {
            if self.used[i] || reg.cell_type != seed.cell_type || reg.cell_count < seed.min_cells
            {
                continue;
            }
            let dist = reg.centroid.distance(&seed.centroid);
            if dist > seed.max_dist {
                continue;
            }
            // strict: first-seen wins ties
            if best.map_or(true, |(_, d)| dist < d) {
                best = Some((i, dist));
            }
        }
        best
    }

    /// Bind a room seed to its nearest eligible region.
    pub fn pick(&mut self, seed: &RoomSeed) -> Option<&Room> {
        let Some((region, dist)) = self.find_nearest(seed) else {
            log::warn!(
                "could not map {} on floor {} ({})",
                seed.id,
                self.floor,
                self.catalog.label
            );
            self.unmatched.push(seed.id.clone());
            return None;
        };
        log::debug!("  {} -> region {} (dist {:.1})", seed.id, region, dist);
        self.claim(region, &seed.id, &seed.name);
        self.rooms.last()
    }

    /// Unclaimed regions eligible for an area batch, in id hand-out order.
    pub fn area_candidates(&self, area: &AreaSeed) -> Vec<usize> {
        let regions = &self.catalog.regions;
        let mut found: Vec<usize> = regions
            .iter()
            .enumerate()
            .filter(|&(i, reg)| {
                !self.used[i]
                    && reg.cell_type == area.cell_type
                    && area.accepts_size(reg.cell_count)
                    && area.bbox.contains(&reg.centroid)
            })
            .map(|(i, _)| i)
            .collect();

        let key = |i: &usize| regions[*i].centroid;
        match area.order {
            AreaOrder::Column => found.sort_by(|a, b| key(a).col.total_cmp(&key(b).col)),
            AreaOrder::ColumnThenRow => found.sort_by(|a, b| {
                let (a, b) = (key(a), key(b));
                a.col.total_cmp(&b.col).then(a.row.total_cmp(&b.row))
            }),
            AreaOrder::RowThenColumn => found.sort_by(|a, b| {
                let (a, b) = (key(a), key(b));
                a.row.total_cmp(&b.row).then(a.col.total_cmp(&b.col))
            }),
        }
        found
    }

    /// Bind an area batch. Returns how many ids were bound.
    ///
    /// Surplus regions stay unclaimed; surplus ids are unused. Neither is an error.
    pub fn pick_area(&mut self, area: &AreaSeed) -> usize {
        let found = self.area_candidates(area);
        let bound = found.len().min(area.ids.len());
        if found.len() > area.ids.len() {
            log::warn!(
                "area {} on floor {}: {} regions found, {} left unassigned",
                area.describe(),
                self.floor,
                found.len(),
                found.len() - area.ids.len()
            );
        } else if found.len() < area.ids.len() {
            log::warn!(
                "area {} on floor {}: only {} of {} ids used",
                area.describe(),
                self.floor,
                found.len(),
                area.ids.len()
            );
        }
        for (region, id) in found.into_iter().zip(&area.ids) {
            self.claim(region, id, &area.name);
        }
        bound
    }

    /// Run one seed entry.
    pub fn apply(&mut self, entry: &SeedEntry) {
        match entry {
            SeedEntry::Room(seed) => {
                self.pick(seed);
            }
            SeedEntry::Area(area) => {
                self.pick_area(area);
            }
        }
    }

    fn claim(&mut self, region: usize, id: &str, name: &str) {
        let reg = &self.catalog.regions[region];
        self.used[region] = true;
        self.rooms.push(Room {
            id: id.to_string(),
            name: name.to_string(),
            centroid: reg.centroid,
            cell_count: reg.cell_count,
            cells: reg.cells.clone(),
            region,
        });
    }

    /// Close the session, using `label` as the display name.
    pub fn finish(self, label: String) -> FloorAssignment {
        log::info!("{}: {} rooms mapped", label, self.rooms.len());
        for room in &self.rooms {
            log::debug!("  {} - {} ({} cells)", room.id, room.name, room.cell_count);
        }
        FloorAssignment {
            floor: self.floor,
            label,
            grid_size: self.catalog.grid_size,
            rooms: self.rooms,
            unmatched: self.unmatched,
        }
    }
}

/// Run every entry of a seed floor against one catalog floor. `floor` is
/// the floor's position in the document; the catalog's own `floor` field
/// is not trusted.
pub fn assign_floor(floor: usize, catalog: &FloorCatalog, seeds: &SeedFloor) -> FloorAssignment {
    let label = match &seeds.label {
        Some(label) if *label != catalog.label => {
            log::warn!(
                "floor {}: seed label {:?} differs from grid label {:?}",
                floor,
                label,
                catalog.label
            );
            label.clone()
        }
        Some(label) => label.clone(),
        None => catalog.label.clone(),
    };
    let mut session = AssignmentSession::new(floor, catalog);
    for entry in &seeds.entries {
        session.apply(entry);
    }
    session.finish(label)
}

/// Assign every floor. Seed floors must be index-aligned with the catalog.
pub fn assign_all(
    catalog: &[FloorCatalog],
    seeds: &SeedDocument,
) -> GridResult<Vec<FloorAssignment>> {
    if catalog.len() != seeds.floors.len() {
        return Err(GridError::FloorCountMismatch {
            catalog: catalog.len(),
            seeds: seeds.floors.len(),
        });
    }
    Ok(catalog
        .iter()
        .zip(&seeds.floors)
        .enumerate()
        .map(|(i, (cat, floor))| assign_floor(i, cat, floor))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::catalog_floor;
    use crate::codes::BoundarySet;
    use crate::grid::{Floor, Grid};
    use crate::seeds::AreaWindow;

    fn make_catalog(picture: &str) -> FloorCatalog {
        let floor = Floor {
            label: "Test".to_string(),
            grid: Grid::from_ascii(picture).unwrap(),
        };
        catalog_floor(0, &floor, &BoundarySet::default())
    }

    fn seed(id: &str, ty: &str, centroid: [f64; 2]) -> RoomSeed {
        RoomSeed::new(id, "Room", ty, centroid)
            .min_cells(1)
            .max_dist(50.0)
    }

    fn area(ty: &str, ids: &[&str], order: AreaOrder) -> AreaSeed {
        AreaSeed {
            name: "Office".to_string(),
            cell_type: ty.to_string(),
            bbox: AreaWindow {
                min_r: 0.0,
                max_r: 100.0,
                min_c: 0.0,
                max_c: 100.0,
            },
            min_cells: 1,
            max_cells: None,
            ids: ids.iter().map(|s| s.to_string()).collect(),
            order,
        }
    }

    #[test]
    fn test_single_row_example() {
        let mut rows = vec![vec![None; 10]; 10];
        for c in 2..=5 {
            rows[2][c] = Some("C".to_string());
        }
        let floor = Floor {
            label: "L1".into(),
            grid: Grid::from_rows(0, rows).unwrap(),
        };
        let cat = catalog_floor(0, &floor, &BoundarySet::default());
        let mut session = AssignmentSession::new(0, &cat);
        let room = session
            .pick(&RoomSeed::new("101", "Room", "C", [2.0, 3.0]).min_cells(1).max_dist(5.0))
            .unwrap();
        assert_eq!(room.id, "101");
        assert_eq!(room.centroid, Centroid::new(2.0, 3.5));
        assert_eq!(room.cell_count, 4);
    }

    #[test]
    fn test_nearest_wins() {
        let cat = make_catalog("CWWWWC");
        let mut session = AssignmentSession::new(0, &cat);
        let room = session.pick(&seed("a", "C", [0.0, 4.0])).unwrap();
        assert_eq!(room.cells, vec![(0, 5)]);
    }

    #[test]
    fn test_region_never_bound_twice() {
        let cat = make_catalog("CCCWC");
        let mut session = AssignmentSession::new(0, &cat);
        let first = session.pick(&seed("a", "C", [0.0, 1.0])).unwrap().region;
        let second = session.pick(&seed("b", "C", [0.0, 1.0])).unwrap().region;
        assert_ne!(first, second);
        assert!(session.pick(&seed("c", "C", [0.0, 1.0])).is_none());
        assert_eq!(session.rooms().len(), 2);
    }

    #[test]
    fn test_type_filter() {
        let cat = make_catalog("LLWC");
        let mut session = AssignmentSession::new(0, &cat);
        let room = session.pick(&seed("a", "C", [0.0, 0.0])).unwrap();
        assert_eq!(room.cells, vec![(0, 3)]);
    }

    #[test]
    fn test_min_cells_filter() {
        let cat = make_catalog("CWCCC");
        let mut session = AssignmentSession::new(0, &cat);
        let room = session.pick(&seed("a", "C", [0.0, 0.0]).min_cells(3)).unwrap();
        assert_eq!(room.cell_count, 3);
    }

    #[test]
    fn test_max_dist_is_inclusive() {
        let cat = make_catalog("CWWWW");
        let session = AssignmentSession::new(0, &cat);
        assert!(session.find_nearest(&seed("a", "C", [0.0, 4.0]).max_dist(4.0)).is_some());
        assert!(session.find_nearest(&seed("a", "C", [0.0, 4.0]).max_dist(3.9)).is_none());
    }

    #[test]
    fn test_tie_goes_to_first_in_catalog() {
        // regions at col 0 and col 4, seed halfway
        let cat = make_catalog("CWWWC");
        let session = AssignmentSession::new(0, &cat);
        let (region, dist) = session.find_nearest(&seed("a", "C", [0.0, 2.0])).unwrap();
        assert_eq!(region, 0);
        assert_eq!(dist, 2.0);
    }

    #[test]
    fn test_unmatched_is_dropped() {
        let cat = make_catalog("CC");
        let floor = SeedFloor {
            label: None,
            entries: vec![
                SeedEntry::Room(seed("missing", "L", [0.0, 0.0])),
                SeedEntry::Room(seed("found", "C", [0.0, 0.0])),
            ],
        };
        let result = assign_floor(0, &cat, &floor);
        assert_eq!(result.rooms.len(), 1);
        assert_eq!(result.rooms[0].id, "found");
        assert_eq!(result.unmatched, vec!["missing".to_string()]);
        assert_eq!(result.label, "Test");
    }

    #[test]
    fn test_area_column_order() {
        let cat = make_catalog(
            "
            GWGWG
            WWWWW
            ",
        );
        let mut session = AssignmentSession::new(0, &cat);
        let n = session.pick_area(&area("G", &["1", "2", "3"], AreaOrder::Column));
        assert_eq!(n, 3);
        let ids: Vec<(&str, usize)> = session
            .rooms()
            .iter()
            .map(|r| (r.id.as_str(), r.cells[0].1))
            .collect();
        assert_eq!(ids, vec![("1", 0), ("2", 2), ("3", 4)]);
    }

    #[test]
    fn test_area_column_then_row_order() {
        let cat = make_catalog(
            "
            .G
            W.
            G.
            .W
            .G
            ",
        );
        let mut session = AssignmentSession::new(0, &cat);
        session.pick_area(&area("G", &["a", "b", "c"], AreaOrder::ColumnThenRow));
        let cells: Vec<(usize, usize)> = session.rooms().iter().map(|r| r.cells[0]).collect();
        assert_eq!(cells, vec![(2, 0), (0, 1), (4, 1)]);
    }

    #[test]
    fn test_area_row_then_column_order() {
        let cat = make_catalog(
            "
            .G
            G.
            ",
        );
        let mut session = AssignmentSession::new(0, &cat);
        session.pick_area(&area("G", &["a", "b"], AreaOrder::RowThenColumn));
        assert_eq!(session.rooms()[0].cells, vec![(0, 1)]);
        assert_eq!(session.rooms()[1].cells, vec![(1, 0)]);
    }

    #[test]
    fn test_area_more_ids_than_regions() {
        let cat = make_catalog("GWG");
        let mut session = AssignmentSession::new(0, &cat);
        assert_eq!(session.pick_area(&area("G", &["1", "2", "3", "4"], AreaOrder::Column)), 2);
        assert_eq!(session.rooms().len(), 2);
    }

    #[test]
    fn test_area_more_regions_than_ids() {
        let cat = make_catalog("GWGWG");
        let mut session = AssignmentSession::new(0, &cat);
        assert_eq!(session.pick_area(&area("G", &["1"], AreaOrder::Column)), 1);
        assert_eq!(session.rooms()[0].cells, vec![(0, 0)]);
        assert!(!session.is_used(1));
        assert!(!session.is_used(2));
    }

    #[test]
    fn test_area_window_and_size_filter() {
        let cat = make_catalog("GGGWGWG");
        let mut a = area("G", &["1", "2", "3"], AreaOrder::Column);
        a.max_cells = Some(1);
        a.bbox.max_c = 5.0;
        let mut session = AssignmentSession::new(0, &cat);
        session.pick_area(&a);
        assert_eq!(session.rooms().len(), 1);
        assert_eq!(session.rooms()[0].cells, vec![(0, 4)]);
    }

    #[test]
    fn test_area_skips_claimed_regions() {
        let cat = make_catalog("GWGWG");
        let mut session = AssignmentSession::new(0, &cat);
        session.pick(&seed("corridor", "G", [0.0, 2.0])).unwrap();
        session.pick_area(&area("G", &["1", "2", "3"], AreaOrder::Column));
        let ids: Vec<&str> = session.rooms().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["corridor", "1", "2"]);
        let regions: std::collections::HashSet<usize> =
            session.rooms().iter().map(|r| r.region).collect();
        assert_eq!(regions.len(), 3);
    }

    #[test]
    fn test_seed_label_overrides_catalog_label() {
        let cat = make_catalog("C");
        let floor = SeedFloor {
            label: Some("Basement".to_string()),
            entries: vec![],
        };
        assert_eq!(assign_floor(0, &cat, &floor).label, "Basement");
    }

    #[test]
    fn test_floor_count_mismatch() {
        let cat = vec![make_catalog("C"), make_catalog("L")];
        let seeds = SeedDocument {
            floors: vec![SeedFloor::default()],
        };
        let err = assign_all(&cat, &seeds).unwrap_err();
        assert!(matches!(
            err,
            GridError::FloorCountMismatch {
                catalog: 2,
                seeds: 1
            }
        ));
    }

    #[test]
    fn test_sessions_are_per_floor() {
        let cat = vec![make_catalog("C"), make_catalog("C")];
        let seeds = SeedDocument {
            floors: vec![
                SeedFloor {
                    label: None,
                    entries: vec![SeedEntry::Room(seed("x", "C", [0.0, 0.0]))],
                },
                SeedFloor {
                    label: None,
                    entries: vec![SeedEntry::Room(seed("x", "C", [0.0, 0.0]))],
                },
            ],
        };
        let floors = assign_all(&cat, &seeds).unwrap();
        assert_eq!(floors[0].rooms.len(), 1);
        assert_eq!(floors[1].rooms.len(), 1);
    }
}
