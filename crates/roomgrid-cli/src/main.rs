//! roomgrid - floor grid to room map batch tool
//!
//! Usage:
//!   roomgrid segment floors.json -o room-regions.json
//!   roomgrid assign room-regions.json seeds.json --room-map room-map.json --room-ids room-ids.json
//!   roomgrid run floors.json seeds.json --out-dir public/
//!   roomgrid check room-regions.json room-map.json room-ids.json [--floors f.json] [--seeds s.json]
//!   roomgrid draw layout.json -o floors.json

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use roomgrid_logic::artifacts::{
    self, JsonStyle, PendingFile, REGIONS_FILE, ROOM_IDS_FILE, ROOM_MAP_FILE,
};
use roomgrid_logic::catalog::{build_catalog, FloorCatalog};
use roomgrid_logic::codes::BoundarySet;
use roomgrid_logic::grid::{load_floors, Floor};
use roomgrid_logic::layout::{load_layout, render_document};
use roomgrid_logic::pipeline::{self, map_rooms, RoomOutputs};
use roomgrid_logic::seeds::{load_seeds, SeedDocument};
use roomgrid_logic::validate::{self, Severity, Sources, ValidationError};

#[derive(Parser)]
#[command(name = "roomgrid", version, about = "Floor grids to region catalogs, room maps and room-id grids")]
struct Cli {
    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Flood-fill every floor into a region catalog
    Segment {
        floors: PathBuf,
        #[arg(short, long, default_value = REGIONS_FILE)]
        output: PathBuf,
        #[command(flatten)]
        boundary: BoundaryArgs,
    },
    /// Match seeds against an existing catalog
    Assign {
        regions: PathBuf,
        seeds: PathBuf,
        #[arg(long, default_value = ROOM_MAP_FILE)]
        room_map: PathBuf,
        #[arg(long, default_value = ROOM_IDS_FILE)]
        room_ids: PathBuf,
    },
    /// Segment, assign and rasterize in one pass
    Run {
        floors: PathBuf,
        seeds: PathBuf,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
        #[command(flatten)]
        boundary: BoundaryArgs,
    },
    /// Verify that produced artifacts agree with each other
    Check {
        regions: PathBuf,
        room_map: PathBuf,
        room_ids: PathBuf,
        /// Source floors; enables partition and homogeneity checks
        #[arg(long)]
        floors: Option<PathBuf>,
        /// Seed document; enables assignment checks
        #[arg(long)]
        seeds: Option<PathBuf>,
        #[command(flatten)]
        boundary: BoundaryArgs,
    },
    /// Render a schematic layout into a floors document
    Draw {
        layout: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Args)]
struct BoundaryArgs {
    /// Cell code treated as a boundary (repeatable; default W and B)
    #[arg(long = "boundary", value_name = "CODE")]
    codes: Vec<String>,
}

impl BoundaryArgs {
    fn to_set(&self) -> BoundarySet {
        if self.codes.is_empty() {
            BoundarySet::default()
        } else {
            BoundarySet::new(&self.codes)
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn read_floors(path: &Path) -> Result<Vec<Floor>> {
    load_floors(path).with_context(|| format!("Failed to load floors from {}", path.display()))
}

fn read_seeds(path: &Path) -> Result<SeedDocument> {
    load_seeds(path).with_context(|| format!("Failed to load seeds from {}", path.display()))
}

fn report_rooms(rooms: &RoomOutputs) {
    for (floor, id) in rooms.unmatched() {
        log::debug!("unmatched: floor {} seed {}", floor, id);
    }
    println!(
        "{} rooms mapped, {} unmatched",
        rooms.room_count(),
        rooms.unmatched().len()
    );
}

fn cmd_segment(floors: &Path, output: &Path, boundary: &BoundarySet) -> Result<()> {
    let floors = read_floors(floors)?;
    let catalog = build_catalog(&floors, boundary);
    let file = PendingFile::new(output, &catalog, JsonStyle::Pretty)?;
    artifacts::write_all(&[file]).context("Failed to write region catalog")?;
    let regions: usize = catalog.iter().map(|f| f.region_count).sum();
    println!("{} floors, {} regions", catalog.len(), regions);
    Ok(())
}

fn cmd_assign(regions: &Path, seeds: &Path, room_map: &Path, room_ids: &Path) -> Result<()> {
    let catalog: Vec<FloorCatalog> = artifacts::load_catalog(regions)
        .with_context(|| format!("Failed to load catalog from {}", regions.display()))?;
    let seeds = read_seeds(seeds)?;
    let rooms = map_rooms(&catalog, &seeds)?;
    artifacts::write_all(&rooms.pending_files(room_map, room_ids)?)
        .context("Failed to write room map")?;
    report_rooms(&rooms);
    Ok(())
}

fn cmd_run(floors: &Path, seeds: &Path, out_dir: &Path, boundary: &BoundarySet) -> Result<()> {
    let floors = read_floors(floors)?;
    let seeds = read_seeds(seeds)?;
    let out = pipeline::run(&floors, &seeds, boundary)?;
    artifacts::write_all(&out.pending_files(out_dir)?).context("Failed to write artifacts")?;
    report_rooms(&out.rooms);
    Ok(())
}

const CATEGORIES: &[&str] = &[
    "catalog",
    "ordering",
    "partition",
    "connectivity",
    "homogeneity",
    "alignment",
    "raster",
    "exclusivity",
    "soundness",
];

fn print_findings(findings: &[ValidationError], verbose: bool) -> usize {
    let mut failed = 0;
    for category in CATEGORIES {
        let in_cat: Vec<_> = findings.iter().filter(|f| f.category == *category).collect();
        let errors = in_cat
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        let icon = if errors == 0 { "✓" } else { "✗" };
        println!("  {} {}: {} errors, {} warnings", icon, category, errors, in_cat.len() - errors);
        for f in &in_cat {
            if f.severity == Severity::Error || verbose {
                let tag = match f.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                };
                println!("      {}: {}", tag, f.message);
            }
        }
        if errors > 0 {
            failed += 1;
        }
    }
    failed
}

fn cmd_check(
    regions: &Path,
    room_map: &Path,
    room_ids: &Path,
    floors: Option<&Path>,
    seeds: Option<&Path>,
    boundary: &BoundarySet,
    verbose: bool,
) -> Result<bool> {
    let catalog = artifacts::load_catalog(regions)
        .with_context(|| format!("Failed to load catalog from {}", regions.display()))?;
    let map = artifacts::load_room_map(room_map)
        .with_context(|| format!("Failed to load room map from {}", room_map.display()))?;
    let ids = artifacts::load_room_ids(room_ids)
        .with_context(|| format!("Failed to load room ids from {}", room_ids.display()))?;
    let floors = floors.map(read_floors).transpose()?;
    let seeds = seeds.map(read_seeds).transpose()?;

    let sources = Sources {
        floors: floors.as_deref(),
        boundary: Some(boundary),
        seeds: seeds.as_ref(),
    };
    println!("=== roomgrid check ===\n");
    let findings = validate::validate_all(&catalog, &map, &ids, &sources);
    let failed = print_findings(&findings, verbose);
    let total = CATEGORIES.len();
    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        total - failed,
        total,
        failed
    );
    Ok(failed == 0)
}

fn cmd_draw(layout: &Path, output: &Path) -> Result<()> {
    let layout_doc = load_layout(layout)
        .with_context(|| format!("Failed to load layout from {}", layout.display()))?;
    let doc = render_document(&layout_doc)?;
    if doc.floors.is_empty() {
        bail!("layout {} has no floors", layout.display());
    }
    let file = PendingFile::new(output, &doc, JsonStyle::Compact)?;
    artifacts::write_all(&[file]).context("Failed to write floors document")?;
    println!("{} floors drawn", doc.floors.len());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Segment {
            floors,
            output,
            boundary,
        } => cmd_segment(&floors, &output, &boundary.to_set()),
        Command::Assign {
            regions,
            seeds,
            room_map,
            room_ids,
        } => cmd_assign(&regions, &seeds, &room_map, &room_ids),
        Command::Run {
            floors,
            seeds,
            out_dir,
            boundary,
        } => cmd_run(&floors, &seeds, &out_dir, &boundary.to_set()),
        Command::Check {
            regions,
            room_map,
            room_ids,
            floors,
            seeds,
            boundary,
        } => {
            let ok = cmd_check(
                &regions,
                &room_map,
                &room_ids,
                floors.as_deref(),
                seeds.as_deref(),
                &boundary.to_set(),
                cli.verbose,
            )?;
            if !ok {
                std::process::exit(1);
            }
            Ok(())
        }
        Command::Draw { layout, output } => cmd_draw(&layout, &output),
    }
}
