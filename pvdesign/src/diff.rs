//! Empreinte de segment pour détecter les modifications
//!
//! L'empreinte couvre les entrées du calepinage : contour, azimut, module et
//! paramètres. Les sommets sont pris dans l'ordre du tracé, le premier sommet
//! fixant l'origine de la grille.

use std::collections::HashMap;

use blake3::Hasher;
use pvlayout::{FieldSegment, LatLng, LayoutParams, Orientation, RackingType};

/// État d'un segment par rapport à la version enregistrée
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    New,
    Changed,
    Unchanged,
}

/// Calcule l'empreinte blake3 des entrées d'un segment
pub fn segment_hash(segment: &FieldSegment) -> [u8; 32] {
    let mut hasher = Hasher::new();

    hasher.update(b"RING");
    hasher.update(&(segment.points.len() as u64).to_le_bytes());
    for p in &segment.points {
        hash_point(&mut hasher, *p);
    }

    hasher.update(b"AZ");
    match segment.azimuth {
        Some(a) => {
            hasher.update(&[1]);
            hasher.update(&a.to_bits().to_le_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }

    hasher.update(b"MOD");
    if let Some(ref id) = segment.module_id {
        hasher.update(id.as_bytes());
    }
    hasher.update(&[0]);

    hash_params(&mut hasher, &segment.params);

    *hasher.finalize().as_bytes()
}

/// Empreinte hexadécimale (forme persistée)
pub fn segment_fingerprint(segment: &FieldSegment) -> String {
    hex::encode(segment_hash(segment))
}

/// Compare un segment aux empreintes enregistrées (clé : id du segment)
pub fn classify(previous: &HashMap<String, String>, segment: &FieldSegment) -> ChangeKind {
    match previous.get(&segment.id) {
        None => ChangeKind::New,
        Some(stored) if *stored == segment_fingerprint(segment) => ChangeKind::Unchanged,
        Some(_) => ChangeKind::Changed,
    }
}

/// Hash un point avec arrondi à 1e-9 degré
fn hash_point(hasher: &mut Hasher, p: LatLng) {
    let lat = (p.lat * 1e9).round() as i64;
    let lng = (p.lng * 1e9).round() as i64;
    hasher.update(&lat.to_le_bytes());
    hasher.update(&lng.to_le_bytes());
}

fn hash_params(hasher: &mut Hasher, params: &LayoutParams) {
    hasher.update(b"PARAMS");
    hasher.update(match params.orientation {
        Orientation::Portrait => b"P",
        Orientation::Landscape => b"L",
    });
    hasher.update(match params.racking {
        RackingType::FixedTilt => b"FT",
        RackingType::FlushMount => b"FM",
    });
    for v in [
        params.row_spacing_ft,
        params.module_spacing_ft,
        params.setback_ft,
        params.tilt_deg,
    ] {
        hasher.update(&v.to_bits().to_le_bytes());
    }
    hasher.update(&params.frame_size_up.to_le_bytes());
    hasher.update(&params.frame_size_wide.to_le_bytes());
}
