//! Enregistrements bruts persistés (JSON) et leur validation
//!
//! Les champs sont optionnels à la lecture : un enregistrement incomplet est
//! rejeté à la conversion plutôt qu'à la désérialisation, pour pouvoir le
//! signaler et continuer avec les autres.

use pvlayout::{
    ElectricalRating, FieldSegment, LatLng, LayoutError, LayoutOutput, LayoutParams, Module,
};
use serde::{Deserialize, Serialize};

use crate::diff;

/// Fichier projet `<data>/projects/<id>.json`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ProjectFile {
    pub id: String,
    #[serde(default)]
    pub segments: Vec<SegmentRecord>,
}

/// Segment tel que persisté
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SegmentRecord {
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Contour : liste de `[lat, lng]`
    #[serde(default)]
    pub points: Vec<[f64; 2]>,

    #[serde(default)]
    pub azimuth: Option<f64>,

    #[serde(default)]
    pub module_id: Option<String>,

    #[serde(default)]
    pub params: LayoutParams,

    /// Sorties du dernier calcul
    #[serde(default)]
    pub layout: LayoutOutput,

    /// Empreinte des entrées au moment de l'enregistrement
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

impl From<&FieldSegment> for SegmentRecord {
    fn from(segment: &FieldSegment) -> Self {
        Self {
            id: Some(segment.id.clone()),
            description: segment.description.clone(),
            points: segment.points.iter().map(|&p| p.into()).collect(),
            azimuth: segment.azimuth,
            module_id: segment.module_id.clone(),
            params: segment.params.clone(),
            layout: segment.layout.clone(),
            fingerprint: Some(diff::segment_fingerprint(segment)),
        }
    }
}

impl TryFrom<SegmentRecord> for FieldSegment {
    type Error = LayoutError;

    fn try_from(record: SegmentRecord) -> Result<Self, Self::Error> {
        let id = match record.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(LayoutError::invalid_segment("<unknown>", "missing id")),
        };

        let points: Vec<LatLng> = record.points.into_iter().map(LatLng::from).collect();
        if points.iter().any(|p| !p.is_finite()) {
            return Err(LayoutError::invalid_segment(id, "non-finite coordinate"));
        }
        if let Some(bad) = points
            .iter()
            .find(|p| p.lat.abs() > 90.0 || p.lng.abs() > 180.0)
        {
            return Err(LayoutError::invalid_segment(
                id,
                format!("coordinate out of range: [{}, {}]", bad.lat, bad.lng),
            ));
        }

        if record.azimuth.is_some_and(|a| !a.is_finite()) {
            return Err(LayoutError::invalid_segment(id, "non-finite azimuth"));
        }

        let params = record.params;
        for (name, value) in [
            ("row_spacing_ft", params.row_spacing_ft),
            ("module_spacing_ft", params.module_spacing_ft),
            ("setback_ft", params.setback_ft),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::invalid_segment(
                    id,
                    format!("{} must be a non-negative number, got {}", name, value),
                ));
            }
        }

        // Un contour en cours de tracé (< 3 points) reste valide
        Ok(FieldSegment {
            id,
            description: record.description,
            points: pvlayout::types::normalize_ring(points),
            azimuth: record.azimuth,
            module_id: record.module_id.filter(|m| !m.is_empty()),
            params,
            layout: record.layout,
        })
    }
}

/// Module tel que persisté dans `<data>/modules.json`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModuleRecord {
    pub id: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub technology: Option<String>,
    pub width_m: Option<f64>,
    pub height_m: Option<f64>,
    pub power_w: Option<f64>,
    #[serde(default)]
    pub electrical: ElectricalRating,
}

impl From<&Module> for ModuleRecord {
    fn from(module: &Module) -> Self {
        Self {
            id: Some(module.id.clone()),
            model_name: Some(module.model_name.clone()),
            manufacturer: module.manufacturer.clone(),
            technology: module.technology.clone(),
            width_m: Some(module.width_m),
            height_m: Some(module.height_m),
            power_w: Some(module.power_w),
            electrical: module.electrical.clone(),
        }
    }
}

impl TryFrom<ModuleRecord> for Module {
    type Error = LayoutError;

    fn try_from(record: ModuleRecord) -> Result<Self, Self::Error> {
        let id = match record.id {
            Some(id) if !id.trim().is_empty() => id,
            _ => return Err(LayoutError::invalid_module("<unknown>", "missing id")),
        };

        let positive = |name: &str, value: Option<f64>| match value {
            Some(v) if v.is_finite() && v > 0.0 => Ok(v),
            Some(v) => Err(LayoutError::invalid_module(
                id.clone(),
                format!("{} must be positive, got {}", name, v),
            )),
            None => Err(LayoutError::invalid_module(id.clone(), format!("missing {}", name))),
        };

        let width_m = positive("width_m", record.width_m)?;
        let height_m = positive("height_m", record.height_m)?;
        let power_w = positive("power_w", record.power_w)?;

        Ok(Module {
            model_name: record.model_name.unwrap_or_else(|| id.clone()),
            manufacturer: record.manufacturer,
            technology: record.technology,
            width_m,
            height_m,
            power_w,
            electrical: record.electrical,
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_record_validation() {
        let record: SegmentRecord = serde_json::from_str(
            r#"{"id":"s1","points":[[45.0,5.0],[45.0,5.001],[45.001,5.001],[45.0,5.0]],"module_id":""}"#,
        )
        .unwrap();
        let seg = FieldSegment::try_from(record).unwrap();
        // Point de fermeture retiré, module vide ignoré, paramètres par défaut
        assert_eq!(seg.points.len(), 3);
        assert!(seg.module_id.is_none());
        assert_eq!(seg.params, LayoutParams::default());
    }

    #[test]
    fn test_segment_record_rejections() {
        let missing_id = SegmentRecord::default();
        assert!(FieldSegment::try_from(missing_id).is_err());

        let out_of_range = SegmentRecord {
            id: Some("s2".to_string()),
            points: vec![[95.0, 5.0]],
            ..Default::default()
        };
        assert!(matches!(
            FieldSegment::try_from(out_of_range),
            Err(LayoutError::InvalidSegment { .. })
        ));

        let mut negative = SegmentRecord {
            id: Some("s3".to_string()),
            ..Default::default()
        };
        negative.params.setback_ft = -2.0;
        assert!(FieldSegment::try_from(negative).is_err());
    }

    #[test]
    fn test_drawing_in_progress_is_kept() {
        let record = SegmentRecord {
            id: Some("s4".to_string()),
            points: vec![[45.0, 5.0], [45.0, 5.001]],
            ..Default::default()
        };
        let seg = FieldSegment::try_from(record).unwrap();
        assert!(seg.is_degenerate());
    }

    #[test]
    fn test_module_record_validation() {
        let record: ModuleRecord = serde_json::from_str(
            r#"{"id":"m1","width_m":1.0,"height_m":1.7,"power_w":400,"electrical":{"voc":49.5}}"#,
        )
        .unwrap();
        let module = Module::try_from(record).unwrap();
        assert_eq!(module.model_name, "m1");
        assert_eq!(module.electrical.voc, Some(49.5));

        let no_power: ModuleRecord =
            serde_json::from_str(r#"{"id":"m2","width_m":1.0,"height_m":1.7}"#).unwrap();
        assert!(matches!(
            Module::try_from(no_power),
            Err(LayoutError::InvalidModule { .. })
        ));
    }
}
