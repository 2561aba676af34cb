//! Output documents and how they reach disk.
//!
//! Three artifacts, index-aligned by floor position:
//!
//! | File | Shape |
//! |------|-------|
//! | `room-regions.json` | `[{ floor, label, gridSize, regionCount, regions }]` |
//! | `room-map.json` | `{ floors: [{ label, rooms: [{ id, name, centroid, cellCount }] }] }` |
//! | `room-ids.json` | `{ roomGrids: [[[id or null]]] }` |
//!
//! A set of artifacts is written all-or-nothing: every document is first
//! staged in a temporary file next to its target, and only when all of them
//! are staged are they persisted. A failed persist puts back whatever was
//! already published.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::catalog::FloorCatalog;
use crate::error::{GridError, GridResult};
use crate::raster::{FloorRooms, RoomIdGrid};

pub const REGIONS_FILE: &str = "room-regions.json";
pub const ROOM_MAP_FILE: &str = "room-map.json";
pub const ROOM_IDS_FILE: &str = "room-ids.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomMapDocument {
    pub floors: Vec<FloorRooms>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRoomIds")]
pub struct RoomIdsDocument {
    pub room_grids: Vec<RoomIdGrid>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRoomIds {
    room_grids: Vec<Vec<Vec<Option<String>>>>,
}

impl TryFrom<RawRoomIds> for RoomIdsDocument {
    type Error = GridError;

    fn try_from(raw: RawRoomIds) -> GridResult<Self> {
        let room_grids = raw
            .room_grids
            .into_iter()
            .enumerate()
            .map(|(floor, rows)| RoomIdGrid::from_rows(floor, rows))
            .collect::<GridResult<_>>()?;
        Ok(Self { room_grids })
    }
}

/// How a document is laid out on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonStyle {
    Pretty,
    /// Single line plus trailing newline.
    Compact,
}

/// A serialized document waiting to be written.
pub struct PendingFile {
    pub path: PathBuf,
    contents: String,
}

impl PendingFile {
    pub fn new<T: Serialize>(path: impl Into<PathBuf>, value: &T, style: JsonStyle) -> GridResult<Self> {
        let path = path.into();
        let mut contents = match style {
            JsonStyle::Pretty => serde_json::to_string_pretty(value),
            JsonStyle::Compact => serde_json::to_string(value),
        }
        .map_err(|e| GridError::json(&path, e))?;
        contents.push('\n');
        Ok(Self { path, contents })
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }
}

/// Stage a file's contents in a temp file in the target's directory.
fn stage(file: &PendingFile) -> GridResult<NamedTempFile> {
    let parent = file
        .path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| GridError::io(parent, e))?;
    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| GridError::io(parent, e))?;
    if let Err(e) = tmp.write_all(file.contents.as_bytes()) {
        return Err(GridError::io(tmp.path(), e));
    }
    // temp files are created owner-only; published artifacts are world-readable
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(e) = tmp.as_file().set_permissions(fs::Permissions::from_mode(0o644)) {
            return Err(GridError::io(tmp.path(), e));
        }
    }
    Ok(tmp)
}

/// A target that has been replaced, with what it held before.
struct Published<'a> {
    path: &'a Path,
    previous: Option<Vec<u8>>,
}

fn roll_back(published: &[Published<'_>]) {
    for entry in published.iter().rev() {
        let restored = match &entry.previous {
            Some(bytes) => fs::write(entry.path, bytes),
            None => fs::remove_file(entry.path),
        };
        if let Err(e) = restored {
            log::error!("Could not roll back {}: {}", entry.path.display(), e);
        }
    }
}

/// Write every file, or none of them.
///
/// Unpersisted temp files are removed when dropped, so an early return
/// leaves no staging debris behind.
pub fn write_all(files: &[PendingFile]) -> GridResult<()> {
    let staged = files.iter().map(stage).collect::<GridResult<Vec<_>>>()?;

    let mut published: Vec<Published<'_>> = Vec::with_capacity(files.len());
    for (file, tmp) in files.iter().zip(staged) {
        let previous = fs::read(&file.path).ok();
        if let Err(e) = tmp.persist(&file.path) {
            roll_back(&published);
            return Err(GridError::io(&file.path, e.error));
        }
        published.push(Published {
            path: &file.path,
            previous,
        });
    }

    for file in files {
        log::info!("Wrote {} ({} bytes)", file.path.display(), file.len());
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(path: &Path) -> GridResult<T> {
    let raw = fs::read_to_string(path).map_err(|e| GridError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| GridError::json(path, e))
}

pub fn load_catalog(path: &Path) -> GridResult<Vec<FloorCatalog>> {
    load_json(path)
}

pub fn load_room_map(path: &Path) -> GridResult<RoomMapDocument> {
    load_json(path)
}

pub fn load_room_ids(path: &Path) -> GridResult<RoomIdsDocument> {
    load_json(path)
}
