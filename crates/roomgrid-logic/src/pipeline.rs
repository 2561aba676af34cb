//! End-to-end composition: floors → catalog → assignments → room map + lookup grids.
//!
//! Floors are processed one after another, so log output follows floor order.
//! Nothing here touches the filesystem; [`Artifacts::pending_files`] hands
//! the serialized documents to [`crate::artifacts::write_all`].

use std::path::Path;

use crate::artifacts::{
    JsonStyle, PendingFile, RoomIdsDocument, RoomMapDocument, REGIONS_FILE, ROOM_IDS_FILE,
    ROOM_MAP_FILE,
};
use crate::assign::{assign_all, FloorAssignment};
use crate::catalog::{build_catalog, FloorCatalog};
use crate::codes::BoundarySet;
use crate::error::GridResult;
use crate::grid::Floor;
use crate::raster::{floor_rooms, rasterize_floor};
use crate::seeds::SeedDocument;

/// Output of the assignment and rasterization stages.
#[derive(Debug, Clone)]
pub struct RoomOutputs {
    pub assignments: Vec<FloorAssignment>,
    pub room_map: RoomMapDocument,
    pub room_ids: RoomIdsDocument,
}

impl RoomOutputs {
    pub fn room_count(&self) -> usize {
        self.assignments.iter().map(|a| a.rooms.len()).sum()
    }

    /// `(floor, id)` for every seed that found no region.
    pub fn unmatched(&self) -> Vec<(usize, &str)> {
        self.assignments
            .iter()
            .flat_map(|a| a.unmatched.iter().map(move |id| (a.floor, id.as_str())))
            .collect()
    }

    /// Room map and lookup grids as pending writes.
    pub fn pending_files(&self, room_map: &Path, room_ids: &Path) -> GridResult<Vec<PendingFile>> {
        Ok(vec![
            PendingFile::new(room_map, &self.room_map, JsonStyle::Compact)?,
            PendingFile::new(room_ids, &self.room_ids, JsonStyle::Compact)?,
        ])
    }
}

/// Everything a full run produces.
#[derive(Debug, Clone)]
pub struct Artifacts {
    pub catalog: Vec<FloorCatalog>,
    pub rooms: RoomOutputs,
}

impl Artifacts {
    /// All three documents under `out_dir` with their standard names.
    pub fn pending_files(&self, out_dir: &Path) -> GridResult<Vec<PendingFile>> {
        let mut files = vec![PendingFile::new(
            out_dir.join(REGIONS_FILE),
            &self.catalog,
            JsonStyle::Pretty,
        )?];
        files.extend(
            self.rooms
                .pending_files(&out_dir.join(ROOM_MAP_FILE), &out_dir.join(ROOM_IDS_FILE))?,
        );
        Ok(files)
    }
}

/// Assignment and rasterization over an existing catalog.
pub fn map_rooms(catalog: &[FloorCatalog], seeds: &SeedDocument) -> GridResult<RoomOutputs> {
    let assignments = assign_all(catalog, seeds)?;
    let room_grids = assignments
        .iter()
        .map(rasterize_floor)
        .collect::<GridResult<Vec<_>>>()?;
    let room_map = RoomMapDocument {
        floors: assignments.iter().map(floor_rooms).collect(),
    };
    Ok(RoomOutputs {
        assignments,
        room_map,
        room_ids: RoomIdsDocument { room_grids },
    })
}

/// All stages.
pub fn run(floors: &[Floor], seeds: &SeedDocument, boundary: &BoundarySet) -> GridResult<Artifacts> {
    let catalog = build_catalog(floors, boundary);
    let rooms = map_rooms(&catalog, seeds)?;
    let unmatched = rooms.unmatched().len();
    if unmatched > 0 {
        log::warn!("{} seeds could not be mapped", unmatched);
    }
    Ok(Artifacts { catalog, rooms })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::seeds::{RoomSeed, SeedEntry, SeedFloor};

    fn make_floor(label: &str, picture: &str) -> Floor {
        Floor {
            label: label.to_string(),
            grid: Grid::from_ascii(picture).unwrap(),
        }
    }

    fn room(id: &str, ty: &str, centroid: [f64; 2]) -> SeedEntry {
        SeedEntry::Room(RoomSeed::new(id, id, ty, centroid).min_cells(1).max_dist(10.0))
    }

    #[test]
    fn test_run_two_floors() {
        let floors = vec![
            make_floor("Basement", "CCWLL\nCCWLL"),
            make_floor("First", "GGGGG\nWWWWW"),
        ];
        let seeds = SeedDocument {
            floors: vec![
                SeedFloor {
                    label: None,
                    entries: vec![room("B1", "C", [0.0, 0.0]), room("B2", "L", [0.0, 4.0])],
                },
                SeedFloor {
                    label: None,
                    entries: vec![room("C1", "G", [0.0, 2.0]), room("nope", "S", [0.0, 0.0])],
                },
            ],
        };
        let out = run(&floors, &seeds, &BoundarySet::default()).unwrap();
        assert_eq!(out.catalog.len(), 2);
        assert_eq!(out.rooms.room_count(), 3);
        assert_eq!(out.rooms.unmatched(), vec![(1, "nope")]);
        assert_eq!(out.rooms.room_map.floors[0].label, "Basement");
        let grid = &out.rooms.room_ids.room_grids[0];
        assert_eq!(grid.room_at(1, 1), Some("B1"));
        assert_eq!(grid.room_at(1, 2), None);
        assert_eq!(grid.room_at(0, 4), Some("B2"));
        let grid = &out.rooms.room_ids.room_grids[1];
        assert_eq!(grid.room_at(0, 4), Some("C1"));
        assert_eq!(grid.room_at(1, 4), None);
    }

    #[test]
    fn test_floor_index_comes_from_position() {
        let floors = vec![make_floor("Basement", "CC"), make_floor("First", "LL")];
        let catalog = build_catalog(&floors, &BoundarySet::default());
        let mut value = serde_json::to_value(&catalog).unwrap();
        for floor in value.as_array_mut().unwrap() {
            floor.as_object_mut().unwrap().remove("floor");
        }
        let catalog: Vec<FloorCatalog> = serde_json::from_value(value).unwrap();
        assert!(catalog.iter().all(|c| c.floor == 0));

        let seeds = SeedDocument {
            floors: vec![
                SeedFloor::default(),
                SeedFloor {
                    label: None,
                    entries: vec![room("nope", "S", [0.0, 0.0])],
                },
            ],
        };
        let out = map_rooms(&catalog, &seeds).unwrap();
        let indices: Vec<usize> = out.assignments.iter().map(|a| a.floor).collect();
        assert_eq!(indices, vec![0, 1]);
        assert_eq!(out.unmatched(), vec![(1, "nope")]);
    }

    #[test]
    fn test_pending_file_names() {
        let floors = vec![make_floor("L1", "C")];
        let seeds = SeedDocument {
            floors: vec![SeedFloor::default()],
        };
        let out = run(&floors, &seeds, &BoundarySet::default()).unwrap();
        let files = out.pending_files(Path::new("public")).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![REGIONS_FILE, ROOM_MAP_FILE, ROOM_IDS_FILE]);
    }

    #[test]
    fn test_misaligned_seeds_abort() {
        let floors = vec![make_floor("L1", "C"), make_floor("L2", "C")];
        let seeds = SeedDocument {
            floors: vec![SeedFloor::default()],
        };
        assert!(run(&floors, &seeds, &BoundarySet::default()).is_err());
    }
}
