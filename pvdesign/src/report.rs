//! Rapport de calepinage d'un projet
//!
//! Collecte les résultats par segment, les totaux, les segments ignorés et
//! les avertissements, pour affichage console et sauvegarde JSON.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use pvlayout::FieldSegment;
use serde::Serialize;

use crate::diff::ChangeKind;

/// Statut global du calcul
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LayoutStatus {
    /// Tous les enregistrements ont été calculés
    Success,
    /// Calcul effectué, certains enregistrements ignorés
    PartialSuccess,
    /// Aucun segment exploitable
    Failed,
}

/// Résultat d'un segment
#[derive(Debug, Clone, Serialize)]
pub struct SegmentSummary {
    pub segment_id: String,
    pub module_id: Option<String>,
    pub module_count: usize,
    pub nameplate_kw: f64,
    pub area_sq_ft: f64,
    pub gcr: f64,
    pub azimuth: f64,
    pub change: &'static str,
}

/// Avertissement non bloquant
#[derive(Debug, Clone, Serialize)]
pub struct LayoutWarning {
    pub segment_id: Option<String>,
    pub message: String,
}

/// Rapport complet
#[derive(Debug, Clone, Serialize)]
pub struct LayoutReport {
    pub project_id: String,
    pub duration_secs: f64,
    pub status: LayoutStatus,

    pub segments_new: usize,
    pub segments_changed: usize,
    pub segments_unchanged: usize,
    pub segments_skipped: usize,

    pub total_modules: usize,
    pub total_nameplate_kw: f64,
    pub total_area_sq_ft: f64,

    pub segments: Vec<SegmentSummary>,
    pub warnings: Vec<LayoutWarning>,
}

impl LayoutReport {
    /// Crée un nouveau rapport pour un projet
    pub fn new(project_id: &str) -> Self {
        Self {
            project_id: project_id.to_string(),
            duration_secs: 0.0,
            status: LayoutStatus::Success,
            segments_new: 0,
            segments_changed: 0,
            segments_unchanged: 0,
            segments_skipped: 0,
            total_modules: 0,
            total_nameplate_kw: 0.0,
            total_area_sq_ft: 0.0,
            segments: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Enregistre un segment calculé
    pub fn record_segment(&mut self, segment: &FieldSegment, change: ChangeKind) {
        let change = match change {
            ChangeKind::New => {
                self.segments_new += 1;
                "new"
            }
            ChangeKind::Changed => {
                self.segments_changed += 1;
                "changed"
            }
            ChangeKind::Unchanged => {
                self.segments_unchanged += 1;
                "unchanged"
            }
        };

        let layout = &segment.layout;
        self.total_modules += layout.module_count;
        self.total_nameplate_kw += layout.nameplate_kw;
        self.total_area_sq_ft += layout.area_sq_ft;

        self.segments.push(SegmentSummary {
            segment_id: segment.id.clone(),
            module_id: segment.module_id.clone(),
            module_count: layout.module_count,
            nameplate_kw: layout.nameplate_kw,
            area_sq_ft: layout.area_sq_ft,
            gcr: layout.gcr,
            azimuth: layout.azimuth,
            change,
        });
    }

    /// Enregistre un enregistrement ignoré (invalide)
    pub fn record_skipped(&mut self, message: impl Into<String>) {
        self.segments_skipped += 1;
        self.warnings.push(LayoutWarning {
            segment_id: None,
            message: message.into(),
        });
    }

    /// Enregistre un avertissement sur un segment
    pub fn record_warning(&mut self, segment_id: &str, message: impl Into<String>) {
        self.warnings.push(LayoutWarning {
            segment_id: Some(segment_id.to_string()),
            message: message.into(),
        });
    }

    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Au moins un segment a été créé ou modifié
    pub fn has_changes(&self) -> bool {
        self.segments_new > 0 || self.segments_changed > 0
    }

    /// Détermine le statut final
    pub fn finalize(&mut self) {
        let computed = self.segments.len();
        self.status = match (computed, self.segments_skipped) {
            (0, s) if s > 0 => LayoutStatus::Failed,
            (_, 0) => LayoutStatus::Success,
            _ => LayoutStatus::PartialSuccess,
        };
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("LAYOUT REPORT - Project {}", self.project_id);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);

        println!("\n--- SUMMARY ---");
        println!(
            "Segments: {} new, {} changed, {} unchanged, {} skipped",
            self.segments_new, self.segments_changed, self.segments_unchanged, self.segments_skipped
        );
        println!(
            "Total: {} modules, {:.2} kW, {:.0} sq ft",
            self.total_modules, self.total_nameplate_kw, self.total_area_sq_ft
        );

        if !self.segments.is_empty() {
            println!("\n--- BY SEGMENT ---");
            for s in &self.segments {
                println!(
                    "  {} [{}]: {} modules, {:.2} kW, {:.0} sq ft, GCR {:.2}, azimuth {:.1}",
                    s.segment_id,
                    s.module_id.as_deref().unwrap_or("-"),
                    s.module_count,
                    s.nameplate_kw,
                    s.area_sq_ft,
                    s.gcr,
                    s.azimuth
                );
            }
        }

        if !self.warnings.is_empty() {
            println!("\n--- WARNINGS ({}) ---", self.warnings.len());
            for w in self.warnings.iter().take(20) {
                match &w.segment_id {
                    Some(id) => println!("  [{}] {}", id, w.message),
                    None => println!("  {}", w.message),
                }
            }
            if self.warnings.len() > 20 {
                println!("  ... and {} more", self.warnings.len() - 20);
            }
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Sauvegarde le rapport en JSON
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .context(format!("Failed to write report: {}", path.display()))?;
        Ok(())
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{}: {} segments, {} modules, {:.2} kW, {} skipped",
            self.project_id,
            self.segments.len(),
            self.total_modules,
            self.total_nameplate_kw,
            self.segments_skipped
        )
    }
}
