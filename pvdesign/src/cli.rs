//! Définition et implémentation des commandes CLI
//!
//! - `layout` : recalcul d'un projet
//! - `export` : projet → GeoJSON
//! - `import-pan` : fichiers PAN → catalogue de modules
//! - `new-segment` / `edit-segment` : saisie et édition de segments

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use pvlayout::edit::{azimuth_from_pointer, snap_to_bearing};
use pvlayout::layout::find_module;
use pvlayout::metrics;
use pvlayout::{FieldSegment, LatLng, LayoutError, Orientation, RackingType, SegmentUpdate};
use tracing::{info, warn};

use pvdesign::config::Config;
use pvdesign::export::export_to_geojson;
use pvdesign::project::{layout_project, recompute_segment};
use pvdesign::store::{JsonStore, ModuleCatalog, SegmentStore};

#[derive(Subcommand)]
pub enum Commands {
    /// Recompute every segment of a project and save the results
    Layout {
        /// Project id
        project: String,

        /// Write the JSON report to this file
        #[arg(long)]
        report: Option<PathBuf>,

        /// Save the project even when nothing changed
        #[arg(long)]
        force: bool,
    },

    /// Export a project to GeoJSON
    Export {
        /// Project id
        project: String,

        /// Output GeoJSON file
        #[arg(short, long)]
        output: PathBuf,

        /// Coordinate precision (decimal places, default from config)
        #[arg(long)]
        precision: Option<u8>,
    },

    /// Add or replace modules in the catalog from PVsyst .PAN files
    ImportPan {
        /// .PAN files (module id = file name without extension)
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Add a segment to a project from a drawn boundary
    NewSegment(NewSegmentArgs),

    /// Edit the boundary or parameters of a segment
    EditSegment(EditSegmentArgs),
}

#[derive(Args)]
pub struct NewSegmentArgs {
    /// Project id
    pub project: String,

    /// Boundary vertex as "lat,lng" (repeat, at least 3)
    #[arg(long = "point", required = true, allow_hyphen_values = true)]
    pub points: Vec<String>,

    /// Segment id (default: random UUID)
    #[arg(long)]
    pub id: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// Module id from the catalog
    #[arg(long)]
    pub module: Option<String>,

    /// Row azimuth in degrees (default: longest edge)
    #[arg(long)]
    pub azimuth: Option<f64>,

    /// Snap each edge to the configured bearing step
    #[arg(long)]
    pub snap: bool,
}

#[derive(Args)]
pub struct EditSegmentArgs {
    /// Project id
    pub project: String,

    /// Segment id
    pub segment: String,

    /// Move a vertex: "INDEX=lat,lng" (repeatable)
    #[arg(long = "move-vertex", allow_hyphen_values = true)]
    pub move_vertex: Vec<String>,

    /// Remove a vertex by index (repeatable)
    #[arg(long = "remove-vertex")]
    pub remove_vertex: Vec<usize>,

    /// Append a vertex "lat,lng" (repeatable)
    #[arg(long = "append-vertex", allow_hyphen_values = true)]
    pub append_vertex: Vec<String>,

    #[arg(long)]
    pub description: Option<String>,

    /// portrait | landscape
    #[arg(long)]
    pub orientation: Option<String>,

    #[arg(long)]
    pub row_spacing: Option<f64>,

    #[arg(long)]
    pub module_spacing: Option<f64>,

    #[arg(long)]
    pub setback: Option<f64>,

    #[arg(long, allow_hyphen_values = true, conflicts_with_all = ["auto_azimuth", "rotate_toward"])]
    pub azimuth: Option<f64>,

    /// Derive the azimuth from the longest edge again
    #[arg(long, conflicts_with = "rotate_toward")]
    pub auto_azimuth: bool,

    /// Point the rows toward "lat,lng" from the segment centre
    #[arg(long, allow_hyphen_values = true)]
    pub rotate_toward: Option<String>,

    #[arg(long, conflicts_with = "no_module")]
    pub module: Option<String>,

    /// Remove the module from the segment
    #[arg(long)]
    pub no_module: bool,

    #[arg(long)]
    pub tilt: Option<f64>,

    /// fixed-tilt | flush-mount
    #[arg(long)]
    pub racking: Option<String>,

    #[arg(long)]
    pub frame_up: Option<u32>,

    #[arg(long)]
    pub frame_wide: Option<u32>,
}

/// Exécute la commande layout
pub fn cmd_layout(
    store: &JsonStore,
    config: &Config,
    project: &str,
    report_path: Option<&Path>,
    force: bool,
) -> Result<()> {
    let report = layout_project(store, config, project, force)?;
    report.display();

    if let Some(path) = report_path {
        report.save_to_file(path)?;
        info!(path = %path.display(), "Report saved");
    }

    println!("{}", report.summary());
    Ok(())
}

/// Exécute la commande export
pub fn cmd_export(
    store: &JsonStore,
    config: &Config,
    project: &str,
    output: &Path,
    precision: Option<u8>,
) -> Result<()> {
    let segments = store.load(project)?;
    if segments.is_empty() {
        anyhow::bail!("Project '{}' has no segment to export", project);
    }

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .context(format!("Failed to create directory: {}", dir.display()))?;
    }

    let precision = precision.unwrap_or(config.precision);
    let features = export_to_geojson(&segments, precision, output)?;

    info!(
        project = project,
        features = features,
        output = %output.display(),
        "GeoJSON export done"
    );
    println!(
        "Export complete: {} segments, {} features to {}",
        segments.len(),
        features,
        output.display()
    );
    Ok(())
}

/// Exécute la commande import-pan
pub fn cmd_import_pan(store: &JsonStore, files: &[PathBuf]) -> Result<()> {
    let mut modules = Vec::new();
    for path in files {
        match pvlayout::parser::read_pan_module(path) {
            Ok(module) => {
                info!(
                    file = %path.display(),
                    module_id = %module.id,
                    power_w = module.power_w,
                    "Module parsed"
                );
                modules.push(module);
            }
            Err(e) => warn!(file = %path.display(), error = %e, "PAN file skipped"),
        }
    }

    if modules.is_empty() {
        anyhow::bail!("No valid module found in {} file(s)", files.len());
    }

    let (added, replaced) = store.upsert_modules(&modules)?;
    println!(
        "Catalog updated: {} added, {} replaced ({})",
        added,
        replaced,
        store.catalog_path().display()
    );
    Ok(())
}

/// Exécute la commande new-segment ; retourne l'id créé
pub fn cmd_new_segment(store: &JsonStore, config: &Config, args: &NewSegmentArgs) -> Result<String> {
    let mut points = args
        .points
        .iter()
        .map(|s| parse_point(s))
        .collect::<Result<Vec<_>>>()?;

    if args.snap {
        for i in 1..points.len() {
            points[i] = snap_to_bearing(points[i - 1], points[i], config.snap_step_deg);
        }
    }

    let id = args
        .id
        .clone()
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut segment =
        FieldSegment::new(id.clone(), points)?.with_params(config.segment_defaults.clone());
    segment = SegmentUpdate {
        description: args.description.clone(),
        azimuth: args.azimuth.map(Some),
        module_id: args.module.clone().map(Some),
        ..Default::default()
    }
    .apply(&segment);

    let mut segments = load_for_edit(store, &args.project)?;
    if segments.iter().any(|s| s.id == id) {
        anyhow::bail!("Segment '{}' already exists in project '{}'", id, args.project);
    }

    let catalog = store.list()?;
    check_module(&segment, &catalog)?;

    let segment = recompute_segment(&segment, &catalog, config);
    print_segment(&segment);
    segments.push(segment);
    store.save(&args.project, &segments)?;

    info!(project = %args.project, segment_id = %id, "Segment created");
    Ok(id)
}

/// Exécute la commande edit-segment
pub fn cmd_edit_segment(store: &JsonStore, config: &Config, args: &EditSegmentArgs) -> Result<()> {
    let mut segments = load_for_edit(store, &args.project)?;
    let index = segments
        .iter()
        .position(|s| s.id == args.segment)
        .ok_or_else(|| anyhow::anyhow!("Segment '{}' not found in project '{}'", args.segment, args.project))?;

    let original = segments[index].clone();
    let mut segment = original.clone();

    for spec in &args.move_vertex {
        let (i, point) = parse_vertex_move(spec)?;
        if i >= segment.points.len() {
            anyhow::bail!("Vertex index {} out of range (0..{})", i, segment.points.len());
        }
        segment = segment.with_point_moved(i, point);
    }

    let mut removals = args.remove_vertex.clone();
    removals.sort_unstable_by(|a, b| b.cmp(a));
    removals.dedup();
    for i in removals {
        if i >= segment.points.len() {
            anyhow::bail!("Vertex index {} out of range (0..{})", i, segment.points.len());
        }
        segment = segment.with_point_removed(i);
    }

    for spec in &args.append_vertex {
        segment = segment.with_point_appended(parse_point(spec)?);
    }

    let azimuth = if args.auto_azimuth {
        Some(None)
    } else if let Some(ref target) = args.rotate_toward {
        let pointer = parse_point(target)?;
        let projection = config.projection.build(&segment.points);
        let center = metrics::centroid(&segment.points, &projection)
            .ok_or_else(|| anyhow::anyhow!("Segment '{}' has no vertex", segment.id))?;
        let azimuth = azimuth_from_pointer(center, pointer)
            .ok_or_else(|| anyhow::anyhow!("Rotation target is the segment centre"))?;
        Some(Some(azimuth))
    } else {
        args.azimuth.map(Some)
    };

    let module_id = if args.no_module {
        Some(None)
    } else {
        args.module.clone().map(Some)
    };

    let update = SegmentUpdate {
        description: args.description.clone(),
        orientation: args.orientation.as_deref().map(parse_orientation).transpose()?,
        row_spacing_ft: non_negative("row spacing", args.row_spacing)?,
        module_spacing_ft: non_negative("module spacing", args.module_spacing)?,
        setback_ft: non_negative("setback", args.setback)?,
        azimuth,
        module_id,
        tilt_deg: args.tilt,
        racking: args.racking.as_deref().map(parse_racking).transpose()?,
        frame_size_up: args.frame_up,
        frame_size_wide: args.frame_wide,
    };
    segment = update.apply(&segment);

    if segment.points == original.points && update.is_empty() {
        anyhow::bail!("Nothing to change for segment '{}'", args.segment);
    }

    let catalog = store.list()?;
    check_module(&segment, &catalog)?;

    let segment = recompute_segment(&segment, &catalog, config);
    print_segment(&segment);
    segments[index] = segment;
    store.save(&args.project, &segments)?;

    info!(project = %args.project, segment_id = %args.segment, "Segment updated");
    Ok(())
}

/// Charge un projet pour modification ; refuse si des enregistrements sont invalides
fn load_for_edit(store: &JsonStore, project: &str) -> Result<Vec<FieldSegment>> {
    let loaded = store.load_checked(project)?;
    if !loaded.rejected.is_empty() {
        anyhow::bail!(
            "Project '{}' contains {} invalid record(s); fix {} before editing",
            project,
            loaded.rejected.len(),
            store.project_path(project).display()
        );
    }
    Ok(loaded.segments)
}

fn check_module(segment: &FieldSegment, catalog: &[pvlayout::Module]) -> Result<()> {
    if let Some(ref id) = segment.module_id {
        if find_module(segment, catalog).is_none() {
            return Err(LayoutError::UnknownModule(id.clone()).into());
        }
    }
    Ok(())
}

fn print_segment(segment: &FieldSegment) {
    let layout = &segment.layout;
    println!(
        "{}: {} points, {:.0} sq ft, {} modules, {:.2} kW, azimuth {:.1}",
        segment.id,
        segment.points.len(),
        layout.area_sq_ft,
        layout.module_count,
        layout.nameplate_kw,
        layout.azimuth
    );
}

/// Parse "lat,lng"
fn parse_point(s: &str) -> Result<LatLng> {
    let (lat, lng) = s
        .split_once(',')
        .ok_or_else(|| anyhow::anyhow!("Invalid point '{}'. Expected lat,lng", s))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid latitude in '{}'", s))?;
    let lng: f64 = lng
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid longitude in '{}'", s))?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
        anyhow::bail!("Point out of range: {}", s);
    }
    Ok(LatLng::new(lat, lng))
}

/// Parse "INDEX=lat,lng"
fn parse_vertex_move(s: &str) -> Result<(usize, LatLng)> {
    let (index, point) = s
        .split_once('=')
        .ok_or_else(|| anyhow::anyhow!("Invalid vertex move '{}'. Expected INDEX=lat,lng", s))?;
    let index: usize = index
        .trim()
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid vertex index in '{}'", s))?;
    Ok((index, parse_point(point)?))
}

fn parse_orientation(s: &str) -> Result<Orientation> {
    match s.to_ascii_lowercase().as_str() {
        "portrait" => Ok(Orientation::Portrait),
        "landscape" => Ok(Orientation::Landscape),
        _ => anyhow::bail!("Unknown orientation: {}. Use: portrait, landscape", s),
    }
}

fn parse_racking(s: &str) -> Result<RackingType> {
    match s.to_ascii_lowercase().as_str() {
        "fixed-tilt" | "fixed" => Ok(RackingType::FixedTilt),
        "flush-mount" | "flush" => Ok(RackingType::FlushMount),
        _ => anyhow::bail!("Unknown racking: {}. Use: fixed-tilt, flush-mount", s),
    }
}

fn non_negative(name: &str, value: Option<f64>) -> Result<Option<f64>> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            anyhow::bail!("{} must be a non-negative number, got {}", name, v)
        }
        v => Ok(v),
    }
}
