//! Error types for roomgrid-logic

use std::path::PathBuf;

use thiserror::Error;

/// Errors that abort a run. Unmatched room seeds are not errors.
#[derive(Debug, Error)]
pub enum GridError {
    /// File could not be read or written
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed JSON document
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Malformed TOML document
    #[error("invalid TOML in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A grid row whose length differs from the first row
    #[error("floor {floor}: row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        floor: usize,
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// A floor with no rows or no columns
    #[error("floor {floor}: grid is empty")]
    EmptyFloor { floor: usize },

    /// Declared gridW/gridH disagree with the grid itself
    #[error("floor {floor}: declared size {declared_rows}x{declared_cols}, grid is {rows}x{cols}")]
    SizeMismatch {
        floor: usize,
        declared_rows: usize,
        declared_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// Seed floors are not index-aligned with catalog floors
    #[error("seed document has {seeds} floors, catalog has {catalog}")]
    FloorCountMismatch { catalog: usize, seeds: usize },

    /// A room cell lies outside the floor grid
    #[error("floor {floor}: room {room} has cell ({row}, {col}) outside the grid")]
    CellOutOfBounds {
        floor: usize,
        room: String,
        row: usize,
        col: usize,
    },

    /// Two rooms claim the same cell
    #[error("floor {floor}: cell ({row}, {col}) claimed by {existing} and {incoming}")]
    CellConflict {
        floor: usize,
        row: usize,
        col: usize,
        existing: String,
        incoming: String,
    },

    /// Seed descriptor that can never match anything sensible
    #[error("invalid seed {id}: {reason}")]
    InvalidSeed { id: String, reason: String },

    /// Layout document that cannot be drawn
    #[error("invalid layout for {floor}: {reason}")]
    InvalidLayout { floor: String, reason: String },
}

/// Result type for roomgrid operations
pub type GridResult<T> = Result<T, GridError>;

impl GridError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GridError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        GridError::Json {
            path: path.into(),
            source,
        }
    }
}
