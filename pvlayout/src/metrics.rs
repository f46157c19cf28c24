//! Métriques de polygone : surface, longueurs d'arêtes, milieu, centroïde

use geo::{Area, Coord, HaversineDistance, LineString, Point, Polygon};

use crate::projection::Projection;
use crate::types::LatLng;
use crate::units;

/// Longueur d'une arête, pour l'étiquetage côté carte
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLength {
    /// Longueur (pieds)
    pub length_ft: f64,
    /// Milieu de l'arête (position de l'étiquette)
    pub midpoint: LatLng,
}

/// Surface du polygone (ft²), formule du lacet sur les coordonnées projetées
///
/// Un contour de moins de 3 points a une surface nulle.
pub fn area_sq_ft(points: &[LatLng], projection: &Projection) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }

    let upm = projection.units_per_meter();
    let ring: Vec<Coord> = projection.project_ring(points);
    let area_units = Polygon::new(LineString::new(ring), vec![]).unsigned_area();

    units::sq_meters_to_sq_feet(area_units / (upm * upm))
}

/// Surface plane (unités projetées²) d'un anneau déjà projeté
pub fn planar_area(ring: &[Coord]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    Polygon::new(LineString::new(ring.to_vec()), vec![]).unsigned_area()
}

/// Distance orthodromique entre deux points (pieds)
pub fn segment_length_ft(p1: LatLng, p2: LatLng) -> f64 {
    let a = Point::new(p1.lng, p1.lat);
    let b = Point::new(p2.lng, p2.lat);
    units::meters_to_feet(a.haversine_distance(&b))
}

/// Milieu (moyenne arithmétique en géographique)
pub fn midpoint(p1: LatLng, p2: LatLng) -> LatLng {
    LatLng::new((p1.lat + p2.lat) / 2.0, (p1.lng + p2.lng) / 2.0)
}

/// Centroïde des sommets (moyenne des points projetés, dé-projetée)
pub fn centroid(points: &[LatLng], projection: &Projection) -> Option<LatLng> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let sum = points
        .iter()
        .map(|&p| projection.project(p))
        .fold(Coord { x: 0.0, y: 0.0 }, |acc, c| Coord {
            x: acc.x + c.x,
            y: acc.y + c.y,
        });
    Some(projection.unproject(Coord {
        x: sum.x / n,
        y: sum.y / n,
    }))
}

/// Longueur de chaque arête, y compris l'arête de fermeture
pub fn edge_lengths(points: &[LatLng]) -> Vec<EdgeLength> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    // Un segment ouvert de 2 points n'a pas d'arête de fermeture distincte
    let count = if n == 2 { 1 } else { n };

    (0..count)
        .map(|i| {
            let (p1, p2) = (points[i], points[(i + 1) % n]);
            EdgeLength {
                length_ft: segment_length_ft(p1, p2),
                midpoint: midpoint(p1, p2),
            }
        })
        .collect()
}

/// Périmètre (pieds)
pub fn perimeter_ft(points: &[LatLng]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    edge_lengths(points).iter().map(|e| e.length_ft).sum()
}
