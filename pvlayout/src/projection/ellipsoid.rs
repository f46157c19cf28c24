//! Ellipsoïde de référence

/// Ellipsoïde WGS84
pub struct WGS84;

impl WGS84 {
    /// Demi-grand axe (rayon équatorial) en mètres
    pub const A: f64 = 6378137.0;

    /// Aplatissement
    pub const F: f64 = 1.0 / 298.257223563;

    /// Première excentricité au carré
    pub const E2: f64 = 2.0 * Self::F - Self::F * Self::F;

    /// Rayon de courbure du méridien à la latitude `lat` (radians)
    pub fn meridional_radius(lat: f64) -> f64 {
        let s = lat.sin();
        Self::A * (1.0 - Self::E2) / (1.0 - Self::E2 * s * s).powf(1.5)
    }

    /// Grand normal (rayon de courbure du premier vertical)
    pub fn prime_vertical_radius(lat: f64) -> f64 {
        let s = lat.sin();
        Self::A / (1.0 - Self::E2 * s * s).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_radii_at_equator() {
        // Au niveau de l'équateur, N = a et M = a(1-e²)
        assert!((WGS84::prime_vertical_radius(0.0) - WGS84::A).abs() < 1e-6);
        assert!((WGS84::meridional_radius(0.0) - WGS84::A * (1.0 - WGS84::E2)).abs() < 1e-6);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        // ~111.1 km par degré de latitude à 45°
        let m = WGS84::meridional_radius(45f64.to_radians()) * 1f64.to_radians();
        assert!((m - 111_132.0).abs() < 10.0, "m={}", m);
    }
}
