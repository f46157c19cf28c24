//! Conversions d'unités (le modèle persiste en pieds, la géométrie travaille en mètres)

/// Pieds par mètre
pub const FEET_PER_METER: f64 = 3.28084;

/// Convertit des pieds en mètres
pub fn feet_to_meters(feet: f64) -> f64 {
    feet / FEET_PER_METER
}

/// Convertit des mètres en pieds
pub fn meters_to_feet(meters: f64) -> f64 {
    meters * FEET_PER_METER
}

/// Convertit des m² en ft²
pub fn sq_meters_to_sq_feet(sq_meters: f64) -> f64 {
    sq_meters * FEET_PER_METER * FEET_PER_METER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feet_roundtrip() {
        let m = feet_to_meters(100.0);
        assert!((m - 30.48).abs() < 1e-4, "m={}", m);
        assert!((meters_to_feet(m) - 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_square_feet() {
        assert!((sq_meters_to_sq_feet(1.0) - 10.7639).abs() < 1e-4);
    }
}
