//! Adaptateur de projection géographique ↔ plan local
//!
//! Toute la géométrie euclidienne (distances, surfaces, retraits, rotation)
//! se fait dans un plan localement métrique. L'échelle est une entrée
//! explicite : aucune fonction ne dépend d'un état global de carte.
//!
//! Deux variantes :
//! - [`LocalTangentPlane`] : plan tangent centré sur le polygone (mètres)
//! - [`WebMercatorView`] : pixels d'une vue cartographique à un zoom donné

mod ellipsoid;
mod local;
mod mercator;

pub use ellipsoid::WGS84;
pub use local::LocalTangentPlane;
pub use mercator::{geographic_to_web_mercator, web_mercator_to_geographic, WebMercatorView};

use geo::Coord;

use crate::types::LatLng;

/// Projection utilisée par le moteur de calepinage
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Plan tangent local (mètres)
    Local(LocalTangentPlane),
    /// Pixels d'une vue cartographique
    View(WebMercatorView),
}

impl Projection {
    /// Plan tangent local centré sur la moyenne des sommets
    pub fn for_points(points: &[LatLng]) -> Self {
        Self::Local(LocalTangentPlane::new(mean_point(points)))
    }

    /// Vue cartographique dont l'échelle est prise à la latitude des sommets
    pub fn view_for_points(zoom: f64, points: &[LatLng]) -> Self {
        Self::View(WebMercatorView::new(zoom, mean_point(points).lat))
    }

    /// Géographique → plan
    pub fn project(&self, p: LatLng) -> Coord {
        match self {
            Self::Local(plane) => plane.project(p),
            Self::View(view) => view.project(p),
        }
    }

    /// Plan → géographique
    pub fn unproject(&self, c: Coord) -> LatLng {
        match self {
            Self::Local(plane) => plane.unproject(c),
            Self::View(view) => view.unproject(c),
        }
    }

    /// Unités planes par mètre au sol
    pub fn units_per_meter(&self) -> f64 {
        match self {
            Self::Local(_) => 1.0,
            Self::View(view) => view.pixels_per_meter(),
        }
    }

    pub fn project_ring(&self, points: &[LatLng]) -> Vec<Coord> {
        points.iter().map(|&p| self.project(p)).collect()
    }

    pub fn unproject_ring(&self, coords: &[Coord]) -> Vec<LatLng> {
        coords.iter().map(|&c| self.unproject(c)).collect()
    }
}

/// Moyenne arithmétique des sommets (origine (0, 0) si vide)
pub(crate) fn mean_point(points: &[LatLng]) -> LatLng {
    if points.is_empty() {
        return LatLng::new(0.0, 0.0);
    }
    let n = points.len() as f64;
    let (lat, lng) = points
        .iter()
        .fold((0.0, 0.0), |(lat, lng), p| (lat + p.lat, lng + p.lng));
    LatLng::new(lat / n, lng / n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<LatLng> {
        vec![
            LatLng::new(40.0, -105.0),
            LatLng::new(40.0, -104.999),
            LatLng::new(40.001, -104.999),
            LatLng::new(40.001, -105.0),
        ]
    }

    #[test]
    fn test_local_is_centered() {
        let proj = Projection::for_points(&square());
        let Projection::Local(plane) = proj else {
            panic!("expected local plane");
        };
        assert!((plane.origin().lat - 40.0005).abs() < 1e-12);
        assert!((plane.origin().lng - -104.9995).abs() < 1e-12);
        assert_eq!(proj.units_per_meter(), 1.0);
    }

    #[test]
    fn test_ring_roundtrip_both_variants() {
        let ring = square();
        for proj in [
            Projection::for_points(&ring),
            Projection::view_for_points(20.0, &ring),
        ] {
            let back = proj.unproject_ring(&proj.project_ring(&ring));
            for (a, b) in ring.iter().zip(&back) {
                assert!((a.lat - b.lat).abs() < 1e-9, "{:?}", proj);
                assert!((a.lng - b.lng).abs() < 1e-9, "{:?}", proj);
            }
        }
    }

    #[test]
    fn test_view_scale_is_consistent_with_local() {
        // Une arête de ~85 m mesure la même longueur dans les deux plans,
        // à l'écart sphère/ellipsoïde de Web Mercator près (< 0.5 %)
        let ring = square();
        let local = Projection::for_points(&ring);
        let view = Projection::view_for_points(18.0, &ring);

        let len = |proj: &Projection| {
            let a = proj.project(ring[0]);
            let b = proj.project(ring[1]);
            ((b.x - a.x).powi(2) + (b.y - a.y).powi(2)).sqrt() / proj.units_per_meter()
        };

        let rel = (len(&local) - len(&view)).abs() / len(&local);
        assert!(rel < 0.005, "local={} view={}", len(&local), len(&view));
    }
}
