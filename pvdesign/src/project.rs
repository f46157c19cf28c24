//! Recalcul d'un projet complet
//!
//! Le catalogue est lu une fois, puis chaque segment est recalculé en
//! parallèle (les segments sont indépendants).

use anyhow::Result;
use pvlayout::layout::{find_module, recompute_with};
use pvlayout::{FieldSegment, LayoutError, Module};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::config::Config;
use crate::diff::{self, ChangeKind};
use crate::report::LayoutReport;
use crate::store::{JsonStore, ModuleCatalog, SegmentStore};

/// Recalcule un segment avec la projection configurée
pub fn recompute_segment(segment: &FieldSegment, catalog: &[Module], config: &Config) -> FieldSegment {
    let projection = config.projection.build(&segment.points);
    recompute_with(segment, find_module(segment, catalog), &projection)
}

/// Recalcule tous les segments (en parallèle, ordre conservé)
pub fn recompute_all(segments: &[FieldSegment], catalog: &[Module], config: &Config) -> Vec<FieldSegment> {
    segments
        .par_iter()
        .map(|segment| recompute_segment(segment, catalog, config))
        .collect()
}

/// Recalcule un projet, l'enregistre s'il a changé et retourne le rapport
///
/// Si des enregistrements invalides ont été ignorés à la lecture, le projet
/// n'est pas réécrit : ils seraient perdus.
pub fn layout_project(
    store: &JsonStore,
    config: &Config,
    project_id: &str,
    force: bool,
) -> Result<LayoutReport> {
    let start = std::time::Instant::now();
    let mut report = LayoutReport::new(project_id);

    let loaded = store.load_checked(project_id)?;
    if loaded.segments.is_empty() && loaded.rejected.is_empty() {
        anyhow::bail!("Project '{}' has no segment", project_id);
    }

    let catalog = store.list()?;
    info!(
        project = project_id,
        segments = loaded.segments.len(),
        modules = catalog.len(),
        projection = %config.projection.description(),
        "Recomputing project"
    );

    let recomputed = recompute_all(&loaded.segments, &catalog, config);

    for (before, after) in loaded.segments.iter().zip(&recomputed) {
        let mut change = diff::classify(&loaded.fingerprints, after);
        if change == ChangeKind::Unchanged && before.layout != after.layout {
            change = ChangeKind::Changed;
        }
        report.record_segment(after, change);

        if after.is_degenerate() {
            report.record_warning(&after.id, "boundary has fewer than 3 points");
            continue;
        }
        match after.module_id.as_deref() {
            Some(id) if find_module(after, &catalog).is_none() => {
                report.record_warning(&after.id, LayoutError::UnknownModule(id.to_string()).to_string());
            }
            Some(_) if after.layout.module_count == 0 => {
                report.record_warning(&after.id, "no module fits inside the buildable area");
            }
            None => report.record_warning(&after.id, "no module selected"),
            _ => {}
        }
    }

    for rejected in &loaded.rejected {
        report.record_skipped(format!("record {}: {}", rejected.index, rejected.reason));
    }

    if !loaded.rejected.is_empty() {
        warn!(
            project = project_id,
            rejected = loaded.rejected.len(),
            "Invalid records present, project file left untouched"
        );
    } else if force || report.has_changes() {
        store.save(project_id, &recomputed)?;
        info!(project = project_id, "Project saved");
    } else {
        info!(project = project_id, "No change, nothing written");
    }

    report.set_duration(start.elapsed());
    report.finalize();
    Ok(report)
}
