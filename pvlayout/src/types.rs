//! Types de données pour le crate pvlayout

use geo::Coord;
use serde::{Deserialize, Serialize};

use crate::LayoutError;

/// Point géographique (degrés décimaux)
///
/// Persisté comme un tuple `[lat, lng]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    /// Latitude en degrés
    pub lat: f64,
    /// Longitude en degrés
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Coordonnée `geo` (x = longitude, y = latitude)
    pub fn to_coord(self) -> Coord {
        Coord {
            x: self.lng,
            y: self.lat,
        }
    }

    pub fn from_coord(c: Coord) -> Self {
        Self { lat: c.y, lng: c.x }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(p: LatLng) -> Self {
        [p.lat, p.lng]
    }
}

/// Orientation des modules dans la rangée
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Petit côté le long de la rangée
    #[default]
    Portrait,
    /// Grand côté le long de la rangée
    Landscape,
}

impl Orientation {
    /// Emprise (largeur le long de la rangée, profondeur de rangée)
    /// pour un module de dimensions physiques `width` × `height`
    pub fn footprint(self, width: f64, height: f64) -> (f64, f64) {
        match self {
            Self::Portrait => (width, height),
            Self::Landscape => (height, width),
        }
    }
}

/// Type de structure (métadonnée, sans effet sur le calepinage)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RackingType {
    #[default]
    #[serde(rename = "Fixed Tilt")]
    FixedTilt,
    #[serde(rename = "Flush Mount")]
    FlushMount,
}

/// Paramètres de calepinage d'un segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
    pub orientation: Orientation,

    /// Espacement entre rangées (pieds)
    pub row_spacing_ft: f64,

    /// Espacement entre modules d'une même rangée (pieds)
    pub module_spacing_ft: f64,

    /// Recul par rapport au contour (pieds)
    pub setback_ft: f64,

    /// Inclinaison (degrés) - métadonnée
    pub tilt_deg: f64,

    /// Type de structure - métadonnée
    pub racking: RackingType,

    /// Modules par cadre dans le sens de la pente - métadonnée
    pub frame_size_up: u32,

    /// Modules par cadre dans le sens de la rangée - métadonnée
    pub frame_size_wide: u32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            orientation: Orientation::Portrait,
            row_spacing_ft: 3.0,
            module_spacing_ft: 0.5,
            setback_ft: 0.0,
            tilt_deg: 20.0,
            racking: RackingType::FixedTilt,
            frame_size_up: 1,
            frame_size_wide: 1,
        }
    }
}

/// Caractéristiques électriques (hors calepinage)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricalRating {
    pub voc: Option<f64>,
    pub isc: Option<f64>,
    pub vmp: Option<f64>,
    pub imp: Option<f64>,
    pub cells_in_series: Option<u32>,
    pub cells_in_parallel: Option<u32>,
    pub diodes: Option<u32>,
}

/// Produit module PV (partagé, lecture seule)
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub id: String,
    pub model_name: String,
    pub manufacturer: Option<String>,
    pub technology: Option<String>,

    /// Largeur physique (mètres)
    pub width_m: f64,

    /// Hauteur physique (mètres)
    pub height_m: f64,

    /// Puissance nominale (W)
    pub power_w: f64,

    pub electrical: ElectricalRating,
}

impl Module {
    /// Dimensions exploitables pour le calepinage
    pub fn has_usable_dimensions(&self) -> bool {
        self.width_m.is_finite()
            && self.height_m.is_finite()
            && self.width_m > 0.0
            && self.height_m > 0.0
    }
}

/// Sorties calculées d'un segment (cache, jamais saisies)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOutput {
    /// Surface du contour (ft²)
    pub area_sq_ft: f64,

    /// Polygone constructible (contour en retrait du recul)
    pub buildable: Vec<LatLng>,

    /// Emprises des modules posés
    pub footprints: Vec<Vec<LatLng>>,

    pub module_count: usize,

    /// Puissance crête totale (kW)
    pub nameplate_kw: f64,

    /// Taux de couverture au sol
    pub gcr: f64,

    /// Azimut effectivement utilisé pour la grille (degrés)
    pub azimuth: f64,
}

/// Segment de terrain : contour dessiné + paramètres + sorties
///
/// Valeur immuable : les éditions retournent un nouveau segment
/// (voir [`crate::edit`]) et [`crate::layout::recompute`] retourne
/// un segment recalculé.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSegment {
    pub id: String,
    pub description: Option<String>,

    /// Contour (fermeture implicite, sans répétition du premier point)
    pub points: Vec<LatLng>,

    /// Azimut saisi (degrés depuis le nord, sens horaire).
    /// `None` : dérivé de l'arête la plus longue.
    pub azimuth: Option<f64>,

    pub module_id: Option<String>,
    pub params: LayoutParams,
    pub layout: LayoutOutput,
}

impl FieldSegment {
    /// Crée un segment depuis un contour terminé (≥ 3 sommets distincts)
    pub fn new(id: impl Into<String>, points: Vec<LatLng>) -> Result<Self, LayoutError> {
        let id = id.into();
        let points = normalize_ring(points);

        if points.iter().any(|p| !p.is_finite()) {
            return Err(LayoutError::invalid_segment(id, "non-finite coordinate"));
        }
        if points.len() < 3 {
            return Err(LayoutError::invalid_segment(
                id,
                format!("boundary needs at least 3 distinct points, got {}", points.len()),
            ));
        }

        Ok(Self {
            id,
            description: None,
            points,
            azimuth: None,
            module_id: None,
            params: LayoutParams::default(),
            layout: LayoutOutput::default(),
        })
    }

    pub fn with_params(mut self, params: LayoutParams) -> Self {
        self.params = params;
        self
    }

    /// Contour exploitable (≥ 3 points)
    pub fn is_degenerate(&self) -> bool {
        self.points.len() < 3
    }
}

/// Supprime les doublons consécutifs et le point de fermeture explicite
pub fn normalize_ring(points: Vec<LatLng>) -> Vec<LatLng> {
    let mut ring: Vec<LatLng> = Vec::with_capacity(points.len());
    for p in points {
        if ring.last().map_or(true, |last| !same_point(*last, p)) {
            ring.push(p);
        }
    }
    while ring.len() > 1 && same_point(ring[0], ring[ring.len() - 1]) {
        ring.pop();
    }
    ring
}

/// Compare deux points avec tolérance (~0.1 mm)
pub(crate) fn same_point(a: LatLng, b: LatLng) -> bool {
    const TOLERANCE: f64 = 1e-9;
    (a.lat - b.lat).abs() < TOLERANCE && (a.lng - b.lng).abs() < TOLERANCE
}
