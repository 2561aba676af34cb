//! Floor-plan region extraction and room assignment.
//!
//! Turns per-floor grids of cell-type codes into a catalog of contiguous
//! regions, matches named room seeds to those regions, and rasterizes the
//! result into room-id lookup grids. Functions take plain data and return
//! results; only [`artifacts`], [`grid`], [`seeds`] and [`layout`] touch the
//! filesystem, and only through their `load_*` / `write_all` entry points.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`codes`] | Cell-type codes and the boundary set |
//! | [`error`] | `GridError` and `GridResult` |
//! | [`grid`] | Floor grids and the floors document |
//! | [`segment`] | 4-connected flood fill into regions with centroid and bbox |
//! | [`catalog`] | Per-floor region catalogs in canonical order |
//! | [`seeds`] | Room and area seed descriptors, JSON/TOML loading |
//! | [`assign`] | Nearest-centroid matching with per-floor exclusivity |
//! | [`raster`] | Room-id lookup grids and room-map metadata |
//! | [`artifacts`] | Output documents and all-or-nothing writes |
//! | [`pipeline`] | End-to-end composition of the stages |
//! | [`validate`] | Consistency checks over produced artifacts |
//! | [`layout`] | Schematic floor drawing from rectangle operations |

pub mod artifacts;
pub mod assign;
pub mod catalog;
pub mod codes;
pub mod error;
pub mod grid;
pub mod layout;
pub mod pipeline;
pub mod raster;
pub mod seeds;
pub mod segment;
pub mod validate;

pub use error::{GridError, GridResult};
