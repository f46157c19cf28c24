//! Intersections de lignes de balayage horizontales avec un anneau

use geo::Coord;

/// Abscisses (triées) des intersections de la droite `y` avec les arêtes
///
/// Les arêtes parallèles à la ligne de balayage sont ignorées. Un sommet
/// partagé par deux arêtes peut produire deux abscisses identiques.
pub fn intersections(ring: &[Coord], y: f64, tolerance: f64) -> Vec<f64> {
    let n = ring.len();
    let mut xs = Vec::new();

    for i in 0..n {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        let dy = b.y - a.y;
        if dy.abs() <= tolerance {
            continue;
        }
        if y < a.y.min(b.y) - tolerance || y > a.y.max(b.y) + tolerance {
            continue;
        }
        let t = ((y - a.y) / dy).clamp(0.0, 1.0);
        xs.push(a.x + t * (b.x - a.x));
    }

    xs.sort_by(|a, b| a.total_cmp(b));
    xs
}

/// Intervalle horizontal exploitable pour une rangée de profondeur `depth`
///
/// Intersection des intervalles des lignes haute (`y`) et basse (`y + depth`).
/// `None` si l'une des deux lignes coupe le contour moins de deux fois.
pub fn row_span(ring: &[Coord], y: f64, depth: f64, tolerance: f64) -> Option<(f64, f64)> {
    let top = intersections(ring, y, tolerance);
    let bottom = intersections(ring, y + depth, tolerance);
    if top.len() < 2 || bottom.len() < 2 {
        return None;
    }

    let start = top[0].max(bottom[0]);
    let end = top[top.len() - 1].min(bottom[bottom.len() - 1]);
    Some((start, end))
}
