//! Room seed descriptors: hand-authored expectations about where rooms are.
//!
//! A seed document lists, per floor, entries that run in order against one
//! assignment session:
//!
//! - a **room seed** binds one id to the nearest eligible region;
//! - an **area batch** binds a list of ids to every eligible region inside a
//!   centroid window, in a chosen spatial order.
//!
//! Documents are JSON or TOML; the loader picks by file extension.
//!
//! ```
//! use roomgrid_logic::seeds::{parse_seeds_json, SeedEntry};
//!
//! let doc = parse_seeds_json(r#"{
//!     "floors": [{ "label": "Basement", "entries": [
//!         { "id": "405", "name": "Auditorium", "type": "C", "centroid": [90, 112], "minCells": 600 }
//!     ]}]
//! }"#).unwrap();
//! assert!(matches!(doc.floors[0].entries[0], SeedEntry::Room(_)));
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GridError, GridResult};
use crate::segment::Centroid;

/// Default minimum region size for a room seed.
pub const DEFAULT_MIN_CELLS: usize = 15;
/// Default maximum centroid distance for a room seed, in cells.
pub const DEFAULT_MAX_DIST: f64 = 80.0;

fn default_min_cells() -> usize {
    DEFAULT_MIN_CELLS
}

fn default_max_dist() -> f64 {
    DEFAULT_MAX_DIST
}

fn default_area_min_cells() -> usize {
    1
}

/// One expected room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RoomSeed {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub cell_type: String,
    /// Approximate centroid, `[row, col]`.
    pub centroid: Centroid,
    #[serde(default = "default_min_cells")]
    pub min_cells: usize,
    #[serde(default = "default_max_dist")]
    pub max_dist: f64,
}

impl RoomSeed {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        cell_type: impl Into<String>,
        centroid: [f64; 2],
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            cell_type: cell_type.into(),
            centroid: centroid.into(),
            min_cells: DEFAULT_MIN_CELLS,
            max_dist: DEFAULT_MAX_DIST,
        }
    }

    pub fn min_cells(mut self, min_cells: usize) -> Self {
        self.min_cells = min_cells;
        self
    }

    pub fn max_dist(mut self, max_dist: f64) -> Self {
        self.max_dist = max_dist;
        self
    }

    fn validate(&self) -> GridResult<()> {
        if !(self.centroid.row.is_finite() && self.centroid.col.is_finite()) {
            return Err(invalid(&self.id, "centroid is not finite"));
        }
        if self.max_dist.is_nan() || self.max_dist < 0.0 {
            return Err(invalid(&self.id, "maxDist must be a non-negative number"));
        }
        Ok(())
    }
}

/// Centroid window for an area batch, inclusive on all sides.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AreaWindow {
    pub min_r: f64,
    pub max_r: f64,
    pub min_c: f64,
    pub max_c: f64,
}

impl AreaWindow {
    pub fn contains(&self, c: &Centroid) -> bool {
        c.row >= self.min_r && c.row <= self.max_r && c.col >= self.min_c && c.col <= self.max_c
    }
}

/// Order in which an area batch hands out its ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AreaOrder {
    /// Ascending centroid column; equal columns keep catalog order.
    #[default]
    Column,
    /// Ascending column, then ascending row.
    ColumnThenRow,
    /// Ascending row, then ascending column.
    RowThenColumn,
}

/// A strip of similar rooms assigned in one pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AreaSeed {
    pub name: String,
    #[serde(rename = "type")]
    pub cell_type: String,
    pub bbox: AreaWindow,
    #[serde(default = "default_area_min_cells")]
    pub min_cells: usize,
    #[serde(default)]
    pub max_cells: Option<usize>,
    /// Ids handed out in `order`.
    pub ids: Vec<String>,
    #[serde(default)]
    pub order: AreaOrder,
}

impl AreaSeed {
    /// Label used in logs and errors.
    pub fn describe(&self) -> String {
        match (self.ids.first(), self.ids.last()) {
            (Some(first), Some(last)) if first != last => format!("{}..{}", first, last),
            (Some(only), _) => only.clone(),
            _ => self.name.clone(),
        }
    }

    pub fn accepts_size(&self, cell_count: usize) -> bool {
        cell_count >= self.min_cells && self.max_cells.map_or(true, |max| cell_count <= max)
    }

    fn validate(&self) -> GridResult<()> {
        let id = self.describe();
        if self.ids.is_empty() {
            return Err(invalid(&id, "area batch has no ids"));
        }
        if let Some(max) = self.max_cells {
            if max < self.min_cells {
                return Err(invalid(&id, "maxCells is below minCells"));
            }
        }
        let b = &self.bbox;
        if b.min_r > b.max_r || b.min_c > b.max_c {
            return Err(invalid(&id, "bbox is inverted"));
        }
        Ok(())
    }
}

/// One step of a floor's assignment pass.
///
/// An entry with `bbox` or `ids` is an area batch, anything else a room
/// seed. Parse errors name the entry they came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SeedEntry {
    Area(AreaSeed),
    Room(RoomSeed),
}

impl<'de> Deserialize<'de> for SeedEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let is_area = value.get("bbox").is_some() || value.get("ids").is_some();
        let origin = value
            .get("id")
            .or_else(|| value.get("name"))
            .and_then(Value::as_str)
            .map(str::to_string);
        let parsed = if is_area {
            AreaSeed::deserialize(value).map(SeedEntry::Area)
        } else {
            RoomSeed::deserialize(value).map(SeedEntry::Room)
        };
        parsed.map_err(|e| match origin {
            Some(origin) => <D::Error as de::Error>::custom(format!("seed {}: {}", origin, e)),
            None => <D::Error as de::Error>::custom(e),
        })
    }
}

impl SeedEntry {
    /// Every id this entry could bind.
    pub fn ids(&self) -> Vec<&str> {
        match self {
            SeedEntry::Room(seed) => vec![seed.id.as_str()],
            SeedEntry::Area(area) => area.ids.iter().map(String::as_str).collect(),
        }
    }
}

/// Seeds for one floor, index-aligned with the catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedFloor {
    /// Display label; falls back to the catalog label when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub entries: Vec<SeedEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedDocument {
    pub floors: Vec<SeedFloor>,
}

impl SeedDocument {
    /// Reject seeds that could never match or that would make room ids
    /// ambiguous within a floor.
    pub fn validate(&self) -> GridResult<()> {
        for floor in &self.floors {
            let mut seen = HashSet::new();
            for entry in &floor.entries {
                match entry {
                    SeedEntry::Room(seed) => seed.validate()?,
                    SeedEntry::Area(area) => area.validate()?,
                }
                for id in entry.ids() {
                    if !seen.insert(id) {
                        return Err(invalid(id, "id appears twice on the same floor"));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn seed_count(&self) -> usize {
        self.floors
            .iter()
            .flat_map(|f| &f.entries)
            .map(|e| e.ids().len())
            .sum()
    }
}

fn invalid(id: &str, reason: &str) -> GridError {
    GridError::InvalidSeed {
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

fn from_json(text: &str, origin: &Path) -> GridResult<SeedDocument> {
    let doc: SeedDocument = serde_json::from_str(text).map_err(|e| GridError::json(origin, e))?;
    doc.validate()?;
    Ok(doc)
}

fn from_toml(text: &str, origin: &Path) -> GridResult<SeedDocument> {
    let doc: SeedDocument = toml::from_str(text).map_err(|e| GridError::Toml {
        path: origin.to_path_buf(),
        source: e,
    })?;
    doc.validate()?;
    Ok(doc)
}

/// Parse and validate a JSON seed document.
pub fn parse_seeds_json(json: &str) -> GridResult<SeedDocument> {
    from_json(json, Path::new("<seeds>"))
}

/// Parse and validate a TOML seed document.
pub fn parse_seeds_toml(text: &str) -> GridResult<SeedDocument> {
    from_toml(text, Path::new("<seeds>"))
}

/// Load a seed document; `.toml` files are TOML, anything else JSON.
pub fn load_seeds(path: &Path) -> GridResult<SeedDocument> {
    let raw = std::fs::read_to_string(path).map_err(|e| GridError::io(path, e))?;
    let is_toml = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));
    if is_toml {
        from_toml(&raw, path)
    } else {
        from_json(&raw, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_seed_defaults() {
        let doc = parse_seeds_json(
            r#"{ "floors": [{ "entries": [
                { "id": "STAIR1", "name": "Stair", "type": "R", "centroid": [26, 28] }
            ]}]}"#,
        )
        .unwrap();
        let SeedEntry::Room(seed) = &doc.floors[0].entries[0] else {
            panic!("expected room seed");
        };
        assert_eq!(seed.min_cells, DEFAULT_MIN_CELLS);
        assert_eq!(seed.max_dist, DEFAULT_MAX_DIST);
        assert_eq!(seed.centroid, Centroid::new(26.0, 28.0));
        assert_eq!(doc.floors[0].label, None);
    }

    #[test]
    fn test_area_entry_parses() {
        let doc = parse_seeds_json(
            r#"{ "floors": [{ "label": "Level 02", "entries": [
                { "name": "Research Office", "type": "G",
                  "bbox": { "minR": 0, "maxR": 25, "minC": 95, "maxC": 180 },
                  "minCells": 5, "maxCells": 100, "ids": ["2038", "2040"] }
            ]}]}"#,
        )
        .unwrap();
        let SeedEntry::Area(area) = &doc.floors[0].entries[0] else {
            panic!("expected area batch");
        };
        assert_eq!(area.order, AreaOrder::Column);
        assert_eq!(area.max_cells, Some(100));
        assert!(area.accepts_size(5));
        assert!(area.accepts_size(100));
        assert!(!area.accepts_size(101));
        assert_eq!(area.describe(), "2038..2040");
        assert_eq!(doc.seed_count(), 2);
    }

    #[test]
    fn test_area_order_names() {
        let order: AreaOrder = serde_json::from_str("\"column_then_row\"").unwrap();
        assert_eq!(order, AreaOrder::ColumnThenRow);
        let order: AreaOrder = serde_json::from_str("\"row_then_column\"").unwrap();
        assert_eq!(order, AreaOrder::RowThenColumn);
    }

    #[test]
    fn test_toml_seeds() {
        let doc = parse_seeds_toml(
            r#"
            [[floors]]
            label = "Basement"

            [[floors.entries]]
            id = "405"
            name = "Auditorium"
            type = "C"
            centroid = [90, 112]
            minCells = 600

            [[floors.entries]]
            name = "Office"
            type = "O"
            bbox = { minR = 0, maxR = 20, minC = 0, maxC = 100 }
            ids = ["5040", "5042"]
            order = "column_then_row"
            "#,
        )
        .unwrap();
        assert_eq!(doc.floors[0].entries.len(), 2);
        assert!(matches!(doc.floors[0].entries[0], SeedEntry::Room(ref s) if s.min_cells == 600));
        assert!(
            matches!(doc.floors[0].entries[1], SeedEntry::Area(ref a) if a.order == AreaOrder::ColumnThenRow)
        );
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let err = parse_seeds_json(
            r#"{ "floors": [{ "entries": [
                { "id": "1", "name": "a", "type": "C", "centroid": [0, 0] },
                { "name": "b", "type": "G", "bbox": { "minR": 0, "maxR": 1, "minC": 0, "maxC": 1 }, "ids": ["2", "1"] }
            ]}]}"#,
        )
        .unwrap_err();
        assert!(matches!(err, GridError::InvalidSeed { ref id, .. } if id == "1"));
    }

    #[test]
    fn test_same_id_on_different_floors_allowed() {
        let doc = parse_seeds_json(
            r#"{ "floors": [
                { "entries": [{ "id": "STAIR2", "name": "Stair", "type": "R", "centroid": [0, 0] }] },
                { "entries": [{ "id": "STAIR2", "name": "Stair", "type": "R", "centroid": [0, 0] }] }
            ]}"#,
        );
        assert!(doc.is_ok());
    }

    #[test]
    fn test_negative_max_dist_rejected() {
        let err = parse_seeds_json(
            r#"{ "floors": [{ "entries": [
                { "id": "x", "name": "x", "type": "C", "centroid": [0, 0], "maxDist": -1 }
            ]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("maxDist"));
    }

    #[test]
    fn test_inverted_area_rejected() {
        let err = parse_seeds_json(
            r#"{ "floors": [{ "entries": [
                { "name": "b", "type": "G", "bbox": { "minR": 5, "maxR": 1, "minC": 0, "maxC": 1 }, "ids": ["2"] }
            ]}]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("inverted"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let res = parse_seeds_json(
            r#"{ "floors": [{ "entries": [
                { "id": "x", "name": "x", "type": "C", "centroid": [0, 0], "minCell": 3 }
            ]}]}"#,
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_misspelled_field_named_in_error() {
        let err = parse_seeds_json(
            r#"{ "floors": [{ "entries": [
                { "id": "101", "name": "a", "type": "C", "centroid": [0, 0] },
                { "id": "102", "name": "b", "type": "C", "centriod": [0, 0] }
            ]}]}"#,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("seed 102"), "{}", msg);
        assert!(msg.contains("centriod"), "{}", msg);
    }

    #[test]
    fn test_area_error_names_batch() {
        let err = parse_seeds_json(
            r#"{ "floors": [{ "entries": [
                { "name": "Office", "type": "O", "ids": ["1"],
                  "bbox": { "minR": 0, "maxR": 1, "minC": 0 } }
            ]}]}"#,
        )
        .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("seed Office"), "{}", msg);
        assert!(msg.contains("maxC"), "{}", msg);
    }

    #[test]
    fn test_load_seeds_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_text = r#"
            [[floors]]
            [[floors.entries]]
            id = "STAIR1"
            name = "Stair"
            type = "R"
            centroid = [26, 28]
        "#;
        for name in ["seeds.toml", "seeds.TOML"] {
            let path = dir.path().join(name);
            std::fs::write(&path, toml_text).unwrap();
            let doc = load_seeds(&path).unwrap();
            assert_eq!(doc.seed_count(), 1, "{}", name);
        }

        // TOML text under a non-TOML name is read as JSON
        let path = dir.path().join("seeds.txt");
        std::fs::write(&path, toml_text).unwrap();
        let err = load_seeds(&path).unwrap_err();
        assert!(matches!(err, GridError::Json { path: ref p, .. } if *p == path));
    }

    #[test]
    fn test_load_seeds_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "floors = 3").unwrap();
        let err = load_seeds(&path).unwrap_err();
        assert!(err.to_string().contains("bad.toml"), "{}", err);
    }

    #[test]
    fn test_window_inclusive() {
        let w = AreaWindow {
            min_r: 0.0,
            max_r: 20.0,
            min_c: 90.0,
            max_c: 180.0,
        };
        assert!(w.contains(&Centroid::new(20.0, 90.0)));
        assert!(!w.contains(&Centroid::new(20.1, 90.0)));
    }

    #[test]
    fn test_builder_helpers() {
        let seed = RoomSeed::new("101", "Room", "C", [2.0, 3.0])
            .min_cells(1)
            .max_dist(5.0);
        assert_eq!(seed.min_cells, 1);
        assert_eq!(seed.max_dist, 5.0);
    }
}
