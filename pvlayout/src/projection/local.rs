//! Plan tangent local (équirectangulaire centré sur une origine)
//!
//! Les distances sont en mètres. La distorsion reste négligeable pour des
//! parcelles de moins d'un kilomètre autour de l'origine.

use geo::Coord;

use super::ellipsoid::WGS84;
use crate::types::LatLng;

/// Latitude maximale de l'origine (évite cos(lat) = 0 aux pôles)
const MAX_ORIGIN_LAT: f64 = 89.9;

/// Projection plane locale autour d'une origine
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTangentPlane {
    origin: LatLng,
    meters_per_deg_lat: f64,
    meters_per_deg_lng: f64,
}

impl LocalTangentPlane {
    pub fn new(origin: LatLng) -> Self {
        let lat = origin
            .lat
            .clamp(-MAX_ORIGIN_LAT, MAX_ORIGIN_LAT)
            .to_radians();

        Self {
            origin,
            meters_per_deg_lat: WGS84::meridional_radius(lat) * 1f64.to_radians(),
            meters_per_deg_lng: WGS84::prime_vertical_radius(lat) * lat.cos() * 1f64.to_radians(),
        }
    }

    pub fn origin(&self) -> LatLng {
        self.origin
    }

    /// Géographique → plan (mètres, x vers l'est, y vers le nord)
    pub fn project(&self, p: LatLng) -> Coord {
        Coord {
            x: (p.lng - self.origin.lng) * self.meters_per_deg_lng,
            y: (p.lat - self.origin.lat) * self.meters_per_deg_lat,
        }
    }

    /// Plan → géographique
    pub fn unproject(&self, c: Coord) -> LatLng {
        LatLng {
            lat: self.origin.lat + c.y / self.meters_per_deg_lat,
            lng: self.origin.lng + c.x / self.meters_per_deg_lng,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_maps_to_zero() {
        let plane = LocalTangentPlane::new(LatLng::new(45.19, 5.72));
        let c = plane.project(LatLng::new(45.19, 5.72));
        assert_eq!((c.x, c.y), (0.0, 0.0));
    }

    #[test]
    fn test_roundtrip() {
        let plane = LocalTangentPlane::new(LatLng::new(37.77, -122.42));
        let p = LatLng::new(37.7712345, -122.4187654);
        let back = plane.unproject(plane.project(p));
        assert!((back.lat - p.lat).abs() < 1e-9, "lat={}", back.lat);
        assert!((back.lng - p.lng).abs() < 1e-9, "lng={}", back.lng);
    }

    #[test]
    fn test_east_offset_is_metric() {
        // 0.001° de longitude à l'équateur ≈ 111.3 m
        let plane = LocalTangentPlane::new(LatLng::new(0.0, 0.0));
        let c = plane.project(LatLng::new(0.0, 0.001));
        assert!((c.x - 111.32).abs() < 0.05, "x={}", c.x);
        assert!(c.y.abs() < 1e-12);
    }
}
