//! Primitives de géométrie plane (anneaux en coordonnées projetées)
//!
//! Les anneaux sont fermés implicitement : l'arête `i` relie `ring[i]` à
//! `ring[(i + 1) % n]`. Aucun sens de parcours n'est supposé.

use geo::{BoundingRect, Coord, EuclideanDistance, Line, LineString, Point};

/// Itère sur les arêtes d'un anneau fermé implicitement
pub fn edges(ring: &[Coord]) -> impl Iterator<Item = Line> + '_ {
    let n = ring.len();
    (0..n).map(move |i| Line::new(ring[i], ring[(i + 1) % n]))
}

/// Test d'appartenance par lancer de rayon (règle de parité)
///
/// Le résultat sur le contour lui-même dépend du côté : utiliser
/// [`contains_with_tolerance`] quand le contour doit compter comme intérieur.
pub fn ray_cast_contains(ring: &[Coord], p: Coord) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (a, b) = (ring[i], ring[j]);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x;
            if p.x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Distance minimale d'un point à l'ensemble des arêtes
pub fn distance_to_boundary(ring: &[Coord], p: Coord) -> f64 {
    let point = Point::from(p);
    edges(ring)
        .map(|edge| point.euclidean_distance(&edge))
        .fold(f64::INFINITY, f64::min)
}

/// Intérieur au sens large : lancer de rayon, ou sur le contour à `tolerance` près
pub fn contains_with_tolerance(ring: &[Coord], p: Coord, tolerance: f64) -> bool {
    ray_cast_contains(ring, p) || distance_to_boundary(ring, p) <= tolerance
}

/// Intersection de deux droites (p1, p2) et (p3, p4)
///
/// Retourne `None` si les droites sont parallèles (déterminant nul à `eps` près).
pub fn line_intersection(p1: Coord, p2: Coord, p3: Coord, p4: Coord, eps: f64) -> Option<Coord> {
    let d = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if d.abs() <= eps {
        return None;
    }

    let a = p1.x * p2.y - p1.y * p2.x;
    let b = p3.x * p4.y - p3.y * p4.x;

    Some(Coord {
        x: (a * (p3.x - p4.x) - (p1.x - p2.x) * b) / d,
        y: (a * (p3.y - p4.y) - (p1.y - p2.y) * b) / d,
    })
}

/// Rotation d'un point autour d'une origine (angle en radians, sens trigonométrique)
pub fn rotate(p: Coord, origin: Coord, angle: f64) -> Coord {
    let (sin, cos) = angle.sin_cos();
    let dx = p.x - origin.x;
    let dy = p.y - origin.y;
    Coord {
        x: origin.x + dx * cos - dy * sin,
        y: origin.y + dx * sin + dy * cos,
    }
}

/// Boîte englobante `(min, max)` d'un anneau
pub fn bounding_box(ring: &[Coord]) -> Option<(Coord, Coord)> {
    let rect = LineString::new(ring.to_vec()).bounding_rect()?;
    Some((rect.min(), rect.max()))
}

/// Plus grande étendue de la boîte englobante (échelle des tolérances relatives)
pub fn extent(ring: &[Coord]) -> f64 {
    bounding_box(ring)
        .map(|(min, max)| (max.x - min.x).max(max.y - min.y))
        .unwrap_or(0.0)
}
