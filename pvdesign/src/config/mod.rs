//! Configuration du système

use std::path::Path;

use anyhow::{Context, Result};
use pvlayout::{LatLng, LayoutParams, Projection};
use serde::{Deserialize, Serialize};

/// Variable d'environnement : preset ou chemin du fichier de configuration
pub const CONFIG_ENV: &str = "PVDESIGN_CONFIG";

/// Configuration principale
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Paramètres appliqués aux nouveaux segments
    pub segment_defaults: LayoutParams,

    /// Repère de calcul des distances et surfaces
    pub projection: ProjectionMode,

    /// Précision des coordonnées exportées (décimales). 7 ≈ 1 cm
    pub precision: u8,

    /// Pas d'aimantation des caps lors du tracé (degrés)
    pub snap_step_deg: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            segment_defaults: LayoutParams::default(),
            projection: ProjectionMode::Local,
            precision: 7,
            snap_step_deg: 45.0,
        }
    }
}

/// Mode de projection
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum ProjectionMode {
    /// Plan tangent local centré sur le segment (mètres)
    Local,
    /// Pixels de la carte Web Mercator au zoom donné
    View { zoom: f64 },
}

impl ProjectionMode {
    /// Projection à utiliser pour un contour
    pub fn build(&self, points: &[LatLng]) -> Projection {
        match *self {
            Self::Local => Projection::for_points(points),
            Self::View { zoom } => Projection::view_for_points(zoom, points),
        }
    }

    pub fn description(&self) -> String {
        match self {
            Self::Local => "local tangent plane".to_string(),
            Self::View { zoom } => format!("web mercator view at zoom {}", zoom),
        }
    }
}

impl Config {
    /// Charge une configuration depuis un fichier
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    /// Charge une configuration depuis un preset embarqué
    pub fn from_preset(preset: &str) -> Result<Self> {
        match preset {
            "residential" => Self::load_embedded(include_str!("presets/residential.json")),
            "utility" => Self::load_embedded(include_str!("presets/utility.json")),
            _ => anyhow::bail!("Unknown preset: {}. Use: residential, utility", preset),
        }
    }

    fn load_embedded(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse embedded config")
    }

    /// Résout `--config` : preset, chemin, puis `PVDESIGN_CONFIG`, sinon défauts
    pub fn resolve(spec: Option<&str>) -> Result<Self> {
        let from_env = std::env::var(CONFIG_ENV).ok();
        match spec.or(from_env.as_deref()) {
            None => Ok(Self::default()),
            Some(name @ ("residential" | "utility")) => Self::from_preset(name),
            Some(path) => Self::load(Path::new(path)),
        }
    }
}
