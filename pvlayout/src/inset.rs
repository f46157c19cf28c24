//! Retrait du contour (setback) : polygone constructible
//!
//! Chaque arête est décalée vers l'intérieur d'une distance fixe, puis chaque
//! sommet est remplacé par l'intersection des deux arêtes décalées adjacentes.
//! Le résultat est valide pour un polygone convexe et un retrait modéré ; un
//! polygone concave ou un retrait qui fait s'effondrer la forme peut donner un
//! anneau auto-intersectant (limite acceptée).

use geo::Coord;
use tracing::debug;

use crate::planar;
use crate::projection::Projection;
use crate::types::LatLng;
use crate::units;

/// Polygone en retrait de `distance_ft` pieds (coordonnées géographiques)
///
/// - distance nulle : contour inchangé
/// - distance négative ou non finie, ou moins de 3 points : résultat vide
pub fn inset(points: &[LatLng], distance_ft: f64, projection: &Projection) -> Vec<LatLng> {
    if points.len() < 3 || !distance_ft.is_finite() || distance_ft < 0.0 {
        return Vec::new();
    }
    if distance_ft == 0.0 {
        return points.to_vec();
    }

    let distance = units::feet_to_meters(distance_ft) * projection.units_per_meter();
    let ring = projection.project_ring(points);
    projection.unproject_ring(&inset_ring(&ring, distance))
}

/// Retrait d'un anneau projeté (distance en unités projetées)
pub fn inset_ring(ring: &[Coord], distance: f64) -> Vec<Coord> {
    let n = ring.len();
    if n < 3 || !distance.is_finite() || distance < 0.0 {
        return Vec::new();
    }
    if distance == 0.0 {
        return ring.to_vec();
    }

    let scale = planar::extent(ring).max(distance);
    let offsets: Vec<(Coord, Coord)> = (0..n)
        .map(|i| {
            let (a, b) = (ring[i], ring[(i + 1) % n]);
            let normal = inward_normal(ring, a, b, scale);
            (
                Coord {
                    x: a.x + normal.x * distance,
                    y: a.y + normal.y * distance,
                },
                Coord {
                    x: b.x + normal.x * distance,
                    y: b.y + normal.y * distance,
                },
            )
        })
        .collect();

    // Tolérance du déterminant relative à l'échelle du polygone
    let eps = scale * scale * 1e-12;

    (0..n)
        .map(|i| {
            let prev = offsets[(i + n - 1) % n];
            let next = offsets[i];
            match planar::line_intersection(prev.0, prev.1, next.0, next.1, eps) {
                Some(p) => p,
                None => {
                    // Arêtes parallèles (sommet colinéaire) : reprendre l'extrémité décalée
                    debug!(vertex = i, "Parallel offset edges, reusing offset endpoint");
                    next.0
                }
            }
        })
        .collect()
}

/// Normale unitaire de l'arête (a, b) orientée vers l'intérieur du polygone
///
/// Le côté est déterminé par lancer de rayon depuis un point sondé juste à
/// côté du milieu de l'arête, ce qui rend le calcul indépendant du sens de
/// parcours.
fn inward_normal(ring: &[Coord], a: Coord, b: Coord, scale: f64) -> Coord {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len <= f64::EPSILON * scale {
        return Coord { x: 0.0, y: 0.0 };
    }

    let normal = Coord {
        x: -dy / len,
        y: dx / len,
    };
    let nudge = (scale * 1e-7).max(f64::MIN_POSITIVE);
    let test = Coord {
        x: (a.x + b.x) / 2.0 + normal.x * nudge,
        y: (a.y + b.y) / 2.0 + normal.y * nudge,
    };

    if planar::ray_cast_contains(ring, test) {
        normal
    } else {
        Coord {
            x: -normal.x,
            y: -normal.y,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::LocalTangentPlane;

    fn hexagon() -> Vec<Coord> {
        (0..6)
            .map(|i| {
                let a = (i as f64) * std::f64::consts::PI / 3.0;
                Coord {
                    x: 50.0 * a.cos(),
                    y: 50.0 * a.sin(),
                }
            })
            .collect()
    }

    #[test]
    fn test_zero_distance_is_identity() {
        let ring = hexagon();
        assert_eq!(inset_ring(&ring, 0.0), ring);
    }

    #[test]
    fn test_negative_or_degenerate_is_empty() {
        let ring = hexagon();
        assert!(inset_ring(&ring, -1.0).is_empty());
        assert!(inset_ring(&ring[..2], 1.0).is_empty());
    }

    #[test]
    fn test_square_inset() {
        let square = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 10.0, y: 0.0 },
            Coord { x: 10.0, y: 10.0 },
            Coord { x: 0.0, y: 10.0 },
        ];
        let inner = inset_ring(&square, 1.0);
        assert_eq!(inner.len(), 4);
        assert!((inner[0].x - 1.0).abs() < 1e-9 && (inner[0].y - 1.0).abs() < 1e-9);
        assert!((inner[2].x - 9.0).abs() < 1e-9 && (inner[2].y - 9.0).abs() < 1e-9);
    }

    #[test]
    fn test_convex_inset_is_inside_and_clear_of_edges() {
        let ring = hexagon();
        let d = 2.5;
        for candidate in [ring.clone(), ring.iter().rev().copied().collect()] {
            let inner = inset_ring(&candidate, d);
            assert_eq!(inner.len(), candidate.len());
            for p in &inner {
                assert!(planar::ray_cast_contains(&candidate, *p));
                assert!(planar::distance_to_boundary(&candidate, *p) > d * 0.99);
            }
        }
    }

    #[test]
    fn test_collinear_vertex_fallback() {
        // Sommet colinéaire au milieu de l'arête du bas
        let ring = vec![
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 5.0, y: 0.0 },
            Coord { x: 10.0, y: 0.0 },
            Coord { x: 10.0, y: 10.0 },
            Coord { x: 0.0, y: 10.0 },
        ];
        let inner = inset_ring(&ring, 1.0);
        assert_eq!(inner.len(), 5);
        assert!((inner[1].x - 5.0).abs() < 1e-9 && (inner[1].y - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_geographic_inset() {
        let proj = Projection::Local(LocalTangentPlane::new(LatLng::new(35.0, -80.0)));
        let pts: Vec<LatLng> = [(0.0, 0.0), (30.48, 0.0), (30.48, 15.24), (0.0, 15.24)]
            .iter()
            .map(|&(x, y)| proj.unproject(Coord { x, y }))
            .collect();

        // 5 ft ≈ 1.524 m
        let inner = inset(&pts, 5.0, &proj);
        let first = proj.project(inner[0]);
        assert!((first.x - 1.524).abs() < 1e-3, "x={}", first.x);
        assert!((first.y - 1.524).abs() < 1e-3, "y={}", first.y);
        assert_eq!(inset(&pts, 0.0, &proj), pts);
    }
}
