//! Éditions d'un segment (contour et paramètres)
//!
//! Chaque édition retourne un nouveau segment ; les sorties calculées ne sont
//! pas mises à jour ici, l'appelant enchaîne avec [`crate::layout::recompute`].

use geo::Coord;

use crate::pack::normalize_azimuth;
use crate::projection::{LocalTangentPlane, Projection};
use crate::types::{same_point, FieldSegment, LatLng, LayoutParams, Orientation, RackingType};

/// Mise à jour partielle des paramètres d'un segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SegmentUpdate {
    pub description: Option<String>,
    pub orientation: Option<Orientation>,
    pub row_spacing_ft: Option<f64>,
    pub module_spacing_ft: Option<f64>,
    pub setback_ft: Option<f64>,
    /// `Some(None)` : revenir à l'azimut de l'arête la plus longue
    pub azimuth: Option<Option<f64>>,
    /// `Some(None)` : retirer le module
    pub module_id: Option<Option<String>>,
    pub tilt_deg: Option<f64>,
    pub racking: Option<RackingType>,
    pub frame_size_up: Option<u32>,
    pub frame_size_wide: Option<u32>,
}

impl SegmentUpdate {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applique la mise à jour et retourne le nouveau segment
    pub fn apply(&self, segment: &FieldSegment) -> FieldSegment {
        let mut next = segment.clone();
        let p: &mut LayoutParams = &mut next.params;

        if let Some(v) = self.orientation {
            p.orientation = v;
        }
        if let Some(v) = self.row_spacing_ft {
            p.row_spacing_ft = v;
        }
        if let Some(v) = self.module_spacing_ft {
            p.module_spacing_ft = v;
        }
        if let Some(v) = self.setback_ft {
            p.setback_ft = v;
        }
        if let Some(v) = self.tilt_deg {
            p.tilt_deg = v;
        }
        if let Some(v) = self.racking {
            p.racking = v;
        }
        if let Some(v) = self.frame_size_up {
            p.frame_size_up = v;
        }
        if let Some(v) = self.frame_size_wide {
            p.frame_size_wide = v;
        }
        if let Some(ref v) = self.description {
            next.description = Some(v.clone());
        }
        if let Some(v) = self.azimuth {
            next.azimuth = v.map(normalize_azimuth);
        }
        if let Some(ref v) = self.module_id {
            next.module_id = v.clone();
        }

        next
    }
}

impl FieldSegment {
    /// Ajoute un sommet en fin de contour (ignoré s'il répète le dernier)
    pub fn with_point_appended(&self, point: LatLng) -> FieldSegment {
        let mut next = self.clone();
        if next.points.last().map_or(true, |last| !same_point(*last, point)) {
            next.points.push(point);
        }
        next
    }

    /// Déplace le sommet `index` ; sans effet si l'index est hors contour
    /// ou si le déplacement crée un doublon consécutif
    pub fn with_point_moved(&self, index: usize, point: LatLng) -> FieldSegment {
        let mut next = self.clone();
        let n = next.points.len();
        if index >= n {
            return next;
        }

        let prev = next.points[(index + n - 1) % n];
        let following = next.points[(index + 1) % n];
        let collides = n > 1 && (same_point(prev, point) || same_point(following, point));
        if !collides {
            next.points[index] = point;
        }
        next
    }

    /// Supprime le sommet `index` ; sans effet si l'index est hors contour
    pub fn with_point_removed(&self, index: usize) -> FieldSegment {
        let mut next = self.clone();
        if index < next.points.len() {
            next.points.remove(index);
            next.points = crate::types::normalize_ring(next.points);
        }
        next
    }

    /// Remplace tout le contour
    pub fn with_points(&self, points: Vec<LatLng>) -> FieldSegment {
        FieldSegment {
            points: crate::types::normalize_ring(points),
            ..self.clone()
        }
    }
}

/// Aimante `target` sur le cap multiple de `step_deg` le plus proche depuis `anchor`
///
/// La distance à `anchor` est conservée (tracé avec Maj enfoncée).
pub fn snap_to_bearing(anchor: LatLng, target: LatLng, step_deg: f64) -> LatLng {
    if !step_deg.is_finite() || step_deg <= 0.0 {
        return target;
    }

    let plane = LocalTangentPlane::new(anchor);
    let c = plane.project(target);
    let dist = c.x.hypot(c.y);
    if dist == 0.0 {
        return target;
    }

    let step = step_deg.to_radians();
    let angle = (c.y.atan2(c.x) / step).round() * step;
    plane.unproject(Coord {
        x: dist * angle.cos(),
        y: dist * angle.sin(),
    })
}

/// Azimut désigné par la poignée de rotation : direction centre → pointeur
pub fn azimuth_from_pointer(center: LatLng, pointer: LatLng) -> Option<f64> {
    let projection = Projection::Local(LocalTangentPlane::new(center));
    let c = projection.project(pointer);
    if c.x == 0.0 && c.y == 0.0 {
        return None;
    }
    Some(normalize_azimuth(90.0 - c.y.atan2(c.x).to_degrees()))
}
