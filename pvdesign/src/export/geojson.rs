//! Export vers GeoJSON avec geozero (streaming)
//!
//! Trois types de features par segment : contour (`boundary`), polygone
//! constructible (`buildable`) et emprise de chaque module (`module`).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use geo::{Coord, Geometry, LineString, Polygon};
use geozero::geojson::GeoJsonWriter;
use geozero::GeozeroGeometry;
use pvlayout::{metrics, FieldSegment, LatLng};
use serde_json::{json, Value};

/// Exporte les segments d'un projet en FeatureCollection GeoJSON
///
/// `precision` : nombre de décimales des coordonnées.
pub fn export_to_geojson(segments: &[FieldSegment], precision: u8, output_path: &Path) -> Result<usize> {
    let file = File::create(output_path)
        .context(format!("Failed to create file: {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);
    let count = write_collection(&mut writer, segments, precision)?;
    writer.flush()?;
    Ok(count)
}

/// Écrit la FeatureCollection ; retourne le nombre de features
pub fn write_collection<W: Write>(writer: &mut W, segments: &[FieldSegment], precision: u8) -> Result<usize> {
    write!(writer, r#"{{"type":"FeatureCollection","features":["#)?;

    let mut count = 0;
    for segment in segments {
        if segment.points.len() < 3 {
            continue;
        }

        let layout = &segment.layout;
        let edge_lengths_ft: Vec<f64> = metrics::edge_lengths(&segment.points)
            .iter()
            .map(|e| e.length_ft)
            .collect();
        let boundary = json!({
            "kind": "boundary",
            "segment_id": segment.id,
            "description": segment.description,
            "module_id": segment.module_id,
            "area_sq_ft": layout.area_sq_ft,
            "perimeter_ft": metrics::perimeter_ft(&segment.points),
            "edge_lengths_ft": edge_lengths_ft,
            "module_count": layout.module_count,
            "nameplate_kw": layout.nameplate_kw,
            "gcr": layout.gcr,
            "azimuth": layout.azimuth,
            "orientation": segment.params.orientation,
            "row_spacing_ft": segment.params.row_spacing_ft,
            "module_spacing_ft": segment.params.module_spacing_ft,
            "setback_ft": segment.params.setback_ft,
            "tilt_deg": segment.params.tilt_deg,
            "racking": segment.params.racking,
        });
        write_feature(writer, count, &segment.id, &segment.points, precision, &boundary)?;
        count += 1;

        if layout.buildable.len() >= 3 && segment.params.setback_ft > 0.0 {
            let props = json!({ "kind": "buildable", "segment_id": segment.id });
            let id = format!("{}/buildable", segment.id);
            write_feature(writer, count, &id, &layout.buildable, precision, &props)?;
            count += 1;
        }

        for (i, footprint) in layout.footprints.iter().enumerate() {
            let props = json!({ "kind": "module", "segment_id": segment.id, "index": i });
            let id = format!("{}/module/{}", segment.id, i);
            write_feature(writer, count, &id, footprint, precision, &props)?;
            count += 1;
        }
    }

    write!(writer, "]}}")?;
    Ok(count)
}

/// Écrit une feature polygone
fn write_feature<W: Write>(
    writer: &mut W,
    position: usize,
    id: &str,
    ring: &[LatLng],
    precision: u8,
    properties: &Value,
) -> Result<()> {
    if position > 0 {
        write!(writer, ",")?;
    }
    write!(writer, r#"{{"type":"Feature","id":"{}","#, escape_json(id))?;

    write!(writer, r#""geometry":"#)?;
    let mut geom_buf = Vec::new();
    let mut geom_writer = GeoJsonWriter::new(&mut geom_buf);
    to_polygon(ring, precision).process_geom(&mut geom_writer)?;
    writer.write_all(&geom_buf)?;

    write!(writer, r#","properties":"#)?;
    serde_json::to_writer(&mut *writer, properties)?;
    write!(writer, "}}")?;

    Ok(())
}

/// Polygone `geo` (x = lng, y = lat), coordonnées arrondies
fn to_polygon(ring: &[LatLng], precision: u8) -> Geometry<f64> {
    let factor = 10f64.powi(i32::from(precision.min(15)));
    let coords: Vec<Coord> = ring
        .iter()
        .map(|p| Coord {
            x: (p.lng * factor).round() / factor,
            y: (p.lat * factor).round() / factor,
        })
        .collect();
    // Polygon::new ferme l'anneau
    Geometry::Polygon(Polygon::new(LineString::new(coords), vec![]))
}

/// Échappe une chaîne pour JSON
fn escape_json(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}
