//! Calepinage en grille orientée
//!
//! Balayage glouton d'une grille tournée selon l'azimut : les rangées sont
//! parcourues de haut en bas puis de gauche à droite dans le repère tourné,
//! et un module n'est retenu que si ses quatre coins sont dans le contour et
//! à au moins `setback` de chaque arête. Pas d'optimisation ni de retour
//! arrière : le résultat est déterministe et explicable.

pub mod scanline;

use geo::Coord;
use tracing::{debug, warn};

use crate::metrics;
use crate::planar;
use crate::projection::Projection;
use crate::types::{FieldSegment, LatLng, Module, Orientation};
use crate::units;

/// Nombre maximal de positions candidates par calepinage
pub const MAX_CANDIDATES: f64 = 5_000_000.0;

/// Tolérance plane (mètres)
const TOLERANCE_M: f64 = 1e-6;

/// Paramètres d'entrée du calepinage
#[derive(Debug, Clone, PartialEq)]
pub struct PackParams {
    pub module_width_m: f64,
    pub module_height_m: f64,
    pub orientation: Orientation,

    /// Azimut de la grille ; `None` : arête la plus longue
    pub azimuth: Option<f64>,

    pub row_spacing_ft: f64,
    pub module_spacing_ft: f64,
    pub setback_ft: f64,
}

impl PackParams {
    /// Paramètres courants d'un segment pour un module donné
    pub fn for_segment(segment: &FieldSegment, module: &Module) -> Self {
        Self {
            module_width_m: module.width_m,
            module_height_m: module.height_m,
            orientation: segment.params.orientation,
            azimuth: segment.azimuth,
            row_spacing_ft: segment.params.row_spacing_ft,
            module_spacing_ft: segment.params.module_spacing_ft,
            setback_ft: segment.params.setback_ft,
        }
    }

    /// Emprise d'un module dans le repère des rangées (mètres)
    pub fn footprint_m(&self) -> (f64, f64) {
        self.orientation
            .footprint(self.module_width_m, self.module_height_m)
    }
}

/// Résultat du calepinage
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackResult {
    /// Emprises retenues (4 coins, géographique), ordre ligne par ligne
    pub footprints: Vec<Vec<LatLng>>,
    pub count: usize,
    /// Azimut effectivement utilisé (degrés)
    pub azimuth: f64,
}

impl PackResult {
    fn empty(azimuth: f64) -> Self {
        Self {
            footprints: Vec::new(),
            count: 0,
            azimuth,
        }
    }
}

/// Grille exprimée en unités projetées
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSpec {
    /// Largeur d'emprise le long de la rangée
    pub footprint_width: f64,
    /// Profondeur d'emprise
    pub footprint_height: f64,
    pub step_x: f64,
    pub step_y: f64,
    pub setback: f64,
    pub tolerance: f64,
}

impl GridSpec {
    /// Convertit les paramètres (mètres / pieds) dans l'unité de la projection
    pub fn new(params: &PackParams, units_per_meter: f64) -> Option<Self> {
        let (fw_m, fh_m) = params.footprint_m();
        let tolerance = TOLERANCE_M * units_per_meter;

        let spec = Self {
            footprint_width: fw_m * units_per_meter,
            footprint_height: fh_m * units_per_meter,
            step_x: (fw_m + units::feet_to_meters(params.module_spacing_ft)) * units_per_meter,
            step_y: (fh_m + units::feet_to_meters(params.row_spacing_ft)) * units_per_meter,
            setback: units::feet_to_meters(params.setback_ft) * units_per_meter,
            tolerance,
        };

        let finite = [
            spec.footprint_width,
            spec.footprint_height,
            spec.step_x,
            spec.step_y,
            spec.setback,
        ]
        .iter()
        .all(|v| v.is_finite());

        let usable = finite
            && spec.footprint_width > 0.0
            && spec.footprint_height > 0.0
            && spec.step_x > tolerance
            && spec.step_y > tolerance;

        usable.then_some(spec)
    }
}

/// Calepine le contour `points` et retourne les emprises géographiques
///
/// Toute géométrie dégénérée (moins de 3 points, surface nulle, module plus
/// grand que le contour, dimensions nulles) donne un résultat vide.
pub fn pack(points: &[LatLng], params: &PackParams, projection: &Projection) -> PackResult {
    let ring = projection.project_ring(points);
    let azimuth = effective_azimuth_planar(&ring, params.azimuth);

    if ring.len() < 3 {
        return PackResult::empty(azimuth);
    }

    let Some(grid) = GridSpec::new(params, projection.units_per_meter()) else {
        debug!("Unusable module footprint or spacing, empty layout");
        return PackResult::empty(azimuth);
    };

    if metrics::planar_area(&ring) <= grid.tolerance * grid.tolerance {
        return PackResult::empty(azimuth);
    }

    let rects = pack_ring(&ring, azimuth, &grid);
    let footprints: Vec<Vec<LatLng>> = rects
        .iter()
        .map(|rect| projection.unproject_ring(rect))
        .collect();

    PackResult {
        count: footprints.len(),
        footprints,
        azimuth,
    }
}

/// Calepinage d'un anneau projeté ; emprises retournées en coordonnées projetées
pub fn pack_ring(ring: &[Coord], azimuth_deg: f64, grid: &GridSpec) -> Vec<[Coord; 4]> {
    if ring.len() < 3 {
        return Vec::new();
    }

    // Repère des rangées : rotation de -angle autour du premier sommet
    let origin = ring[0];
    let angle = (90.0 - azimuth_deg).to_radians();
    let zero = Coord { x: 0.0, y: 0.0 };
    let local: Vec<Coord> = ring
        .iter()
        .map(|&c| planar::rotate(c - origin, zero, -angle))
        .collect();

    let Some((min, max)) = planar::bounding_box(&local) else {
        return Vec::new();
    };

    let rows = ((max.y - min.y) / grid.step_y).floor() + 1.0;
    let cols = ((max.x - min.x) / grid.step_x).floor() + 1.0;
    if rows * cols > MAX_CANDIDATES {
        warn!(
            rows = rows,
            cols = cols,
            "Too many candidate positions, skipping layout"
        );
        return Vec::new();
    }

    let mut accepted = Vec::new();
    let mut candidates = 0usize;
    let mut row = 0usize;

    loop {
        let y = min.y + row as f64 * grid.step_y;
        if y > max.y + grid.tolerance {
            break;
        }
        row += 1;

        // Ligne de balayage avec moins de 2 intersections : rangée ignorée
        let Some((start, end)) =
            scanline::row_span(&local, y, grid.footprint_height, grid.tolerance)
        else {
            continue;
        };

        let mut col = 0usize;
        loop {
            let x = start + col as f64 * grid.step_x;
            if x + grid.footprint_width > end + grid.tolerance {
                break;
            }
            col += 1;
            candidates += 1;

            let corners = [
                Coord { x, y },
                Coord {
                    x: x + grid.footprint_width,
                    y,
                },
                Coord {
                    x: x + grid.footprint_width,
                    y: y + grid.footprint_height,
                },
                Coord {
                    x,
                    y: y + grid.footprint_height,
                },
            ];

            if corners.iter().all(|&c| corner_fits(&local, c, grid)) {
                accepted.push(corners.map(|c| planar::rotate(c, zero, angle) + origin));
            }
        }
    }

    debug!(
        rows = row,
        candidates = candidates,
        accepted = accepted.len(),
        azimuth = azimuth_deg,
        "Grid packing done"
    );

    accepted
}

/// Coin dans le contour et à distance réglementaire de chaque arête
fn corner_fits(ring: &[Coord], corner: Coord, grid: &GridSpec) -> bool {
    if !planar::contains_with_tolerance(ring, corner, grid.tolerance) {
        return false;
    }
    grid.setback <= 0.0 || planar::distance_to_boundary(ring, corner) >= grid.setback - grid.tolerance
}

/// Azimut de l'arête la plus longue (degrés, depuis le nord, sens horaire)
pub fn longest_edge_azimuth(points: &[LatLng], projection: &Projection) -> Option<f64> {
    longest_edge_azimuth_planar(&projection.project_ring(points))
}

fn longest_edge_azimuth_planar(ring: &[Coord]) -> Option<f64> {
    if ring.len() < 2 {
        return None;
    }

    let mut best: Option<(f64, Coord)> = None;
    for edge in planar::edges(ring) {
        let delta = edge.delta();
        let len = delta.x.hypot(delta.y);
        if best.map_or(true, |(best_len, _)| len > best_len) {
            best = Some((len, delta));
        }
    }

    let (len, delta) = best?;
    if len <= 0.0 {
        return None;
    }
    let angle = delta.y.atan2(delta.x);
    Some(normalize_azimuth(90.0 - angle.to_degrees()))
}

/// Azimut utilisé : celui du segment s'il est défini et fini, sinon l'arête la plus longue
fn effective_azimuth_planar(ring: &[Coord], azimuth: Option<f64>) -> f64 {
    azimuth
        .filter(|a| a.is_finite())
        .map(normalize_azimuth)
        .or_else(|| longest_edge_azimuth_planar(ring))
        .unwrap_or(0.0)
}

/// Azimut effectif d'un contour géographique
pub fn effective_azimuth(points: &[LatLng], azimuth: Option<f64>, projection: &Projection) -> f64 {
    effective_azimuth_planar(&projection.project_ring(points), azimuth)
}

/// Ramène un angle dans [0, 360)
pub fn normalize_azimuth(deg: f64) -> f64 {
    let a = deg.rem_euclid(360.0);
    // rem_euclid peut retourner 360.0 pour de très petits négatifs
    if a >= 360.0 {
        0.0
    } else {
        a
    }
}
