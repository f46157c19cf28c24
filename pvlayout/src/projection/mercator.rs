//! Espace pixel de la carte (Web Mercator, EPSG:3857)
//!
//! Reproduit l'échelle d'une vue cartographique à un niveau de zoom donné :
//! le monde fait 256·2^zoom pixels de large. L'axe y est orienté vers le nord
//! pour que les angles restent des azimuts géographiques.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use geo::Coord;

use super::ellipsoid::WGS84;
use crate::types::LatLng;

/// Taille d'une tuile en pixels
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limite de Web Mercator
const MAX_LAT: f64 = 85.0;

/// Convertit coordonnées géographiques vers Web Mercator (mètres)
pub fn geographic_to_web_mercator(p: LatLng) -> (f64, f64) {
    // Web Mercator utilise un modèle sphérique avec le rayon équatorial
    let r = WGS84::A;

    // Limiter la latitude pour éviter l'infini
    let lat = p.lat.clamp(-MAX_LAT, MAX_LAT).to_radians();

    let x = r * p.lng.to_radians();
    let y = r * (FRAC_PI_4 + lat / 2.0).tan().ln();

    (x, y)
}

/// Convertit Web Mercator (mètres) vers coordonnées géographiques
pub fn web_mercator_to_geographic(x: f64, y: f64) -> LatLng {
    let r = WGS84::A;

    let lng = (x / r).to_degrees();
    let lat = (2.0 * (y / r).exp().atan() - FRAC_PI_2).to_degrees();

    LatLng { lat, lng }
}

/// Vue cartographique : pixels à un niveau de zoom
///
/// L'échelle au sol est sphérique (rayon `WGS84::A`), comme celle du fond
/// de carte. Elle diffère de celle du plan tangent local (rayons de
/// l'ellipsoïde) d'environ 0,1 à 0,3 % selon la latitude : une même
/// distance en pieds ne donne pas exactement le même nombre de pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercatorView {
    zoom: f64,
    /// Latitude de référence pour l'échelle (centre de la vue)
    reference_lat: f64,
}

impl WebMercatorView {
    pub fn new(zoom: f64, reference_lat: f64) -> Self {
        Self {
            zoom,
            reference_lat: reference_lat.clamp(-MAX_LAT, MAX_LAT),
        }
    }

    /// Pixels par mètre projeté (Web Mercator)
    fn pixels_per_mercator_meter(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom) / (2.0 * PI * WGS84::A)
    }

    pub fn project(&self, p: LatLng) -> Coord {
        let (x, y) = geographic_to_web_mercator(p);
        let k = self.pixels_per_mercator_meter();
        Coord { x: x * k, y: y * k }
    }

    pub fn unproject(&self, c: Coord) -> LatLng {
        let k = self.pixels_per_mercator_meter();
        web_mercator_to_geographic(c.x / k, c.y / k)
    }

    /// Pixels par mètre au sol (sphère), à la latitude de référence
    pub fn pixels_per_meter(&self) -> f64 {
        // Facteur d'échelle de Mercator : 1 / cos(lat)
        self.pixels_per_mercator_meter() / self.reference_lat.to_radians().cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paris_to_web_mercator() {
        // Paris: 2.35°E, 48.85°N
        let (x, y) = geographic_to_web_mercator(LatLng::new(48.85, 2.35));

        // X ≈ 261600, Y ≈ 6250000
        assert!((x - 261600.0).abs() < 1000.0, "x={}", x);
        assert!((y - 6250000.0).abs() < 10000.0, "y={}", y);
    }

    #[test]
    fn test_view_roundtrip() {
        let view = WebMercatorView::new(19.0, 48.85);
        let p = LatLng::new(48.8512, 2.3498);
        let back = view.unproject(view.project(p));
        assert!((back.lat - p.lat).abs() < 1e-9, "lat={}", back.lat);
        assert!((back.lng - p.lng).abs() < 1e-9, "lng={}", back.lng);
    }

    #[test]
    fn test_pixels_per_meter_at_equator() {
        // Zoom 0 : 256 px pour la circonférence équatoriale
        let view = WebMercatorView::new(0.0, 0.0);
        let expected = 256.0 / (2.0 * PI * WGS84::A);
        assert!((view.pixels_per_meter() - expected).abs() < 1e-15);
    }

    #[test]
    fn test_pixels_per_meter_is_spherical() {
        let view = WebMercatorView::new(19.0, 45.0);
        let expected = 256.0 * 2f64.powf(19.0) / (2.0 * PI * WGS84::A) / 45f64.to_radians().cos();
        assert!((view.pixels_per_meter() / expected - 1.0).abs() < 1e-12);
    }
}
