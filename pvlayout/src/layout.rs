//! Agrégation du calepinage : surface, emprises, nombre de modules, puissance, GCR
//!
//! `recompute` est une fonction pure : elle prend un segment complet et
//! retourne un nouveau segment recalculé intégralement. L'appelant décide
//! quand l'invoquer (fin de geste, validation d'une saisie) et persiste le
//! résultat.

use tracing::debug;

use crate::inset;
use crate::metrics;
use crate::pack::{self, PackParams};
use crate::projection::Projection;
use crate::types::{FieldSegment, LayoutOutput, Module};
use crate::units;

/// Recalcule un segment dans son plan tangent local
pub fn recompute(segment: &FieldSegment, module: Option<&Module>) -> FieldSegment {
    let projection = Projection::for_points(&segment.points);
    recompute_with(segment, module, &projection)
}

/// Recalcule un segment avec une projection explicite (ex. échelle de la vue)
pub fn recompute_with(
    segment: &FieldSegment,
    module: Option<&Module>,
    projection: &Projection,
) -> FieldSegment {
    let area_sq_ft = metrics::area_sq_ft(&segment.points, projection);
    let buildable = inset::inset(&segment.points, segment.params.setback_ft, projection);
    let azimuth = pack::effective_azimuth(&segment.points, segment.azimuth, projection);

    let layout = match module {
        None => LayoutOutput {
            area_sq_ft,
            buildable,
            azimuth,
            ..LayoutOutput::default()
        },
        Some(module) => {
            let params = PackParams::for_segment(segment, module);
            let packed = pack::pack(&segment.points, &params, projection);
            let nameplate_kw = nameplate_kw(packed.count, module.power_w);

            debug!(
                segment_id = %segment.id,
                module_id = %module.id,
                count = packed.count,
                nameplate_kw = nameplate_kw,
                "Layout recomputed"
            );

            LayoutOutput {
                area_sq_ft,
                buildable,
                module_count: packed.count,
                footprints: packed.footprints,
                nameplate_kw,
                gcr: ground_coverage_ratio(&params),
                azimuth: packed.azimuth,
            }
        }
    };

    FieldSegment {
        layout,
        ..segment.clone()
    }
}

/// Recalcule un segment en résolvant son module dans un catalogue
pub fn recompute_from_catalog(segment: &FieldSegment, catalog: &[Module]) -> FieldSegment {
    recompute(segment, find_module(segment, catalog))
}

/// Module référencé par le segment, s'il existe dans le catalogue
pub fn find_module<'a>(segment: &FieldSegment, catalog: &'a [Module]) -> Option<&'a Module> {
    let id = segment.module_id.as_deref()?;
    catalog.iter().find(|m| m.id == id)
}

/// Puissance crête (kW) : `count * power_w / 1000`
pub fn nameplate_kw(count: usize, power_w: f64) -> f64 {
    if !power_w.is_finite() || power_w <= 0.0 {
        return 0.0;
    }
    count as f64 * power_w / 1000.0
}

/// Taux de couverture au sol : profondeur d'emprise / pas entre rangées
pub fn ground_coverage_ratio(params: &PackParams) -> f64 {
    let (_, depth) = params.footprint_m();
    let pitch = depth + units::feet_to_meters(params.row_spacing_ft);
    if !depth.is_finite() || depth <= 0.0 || !pitch.is_finite() || pitch <= 0.0 {
        return 0.0;
    }
    depth / pitch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ElectricalRating, LatLng, Orientation};

    fn module() -> Module {
        Module {
            id: "m1".to_string(),
            model_name: "Test 400".to_string(),
            manufacturer: None,
            technology: None,
            width_m: 1.0,
            height_m: 1.7,
            power_w: 400.0,
            electrical: ElectricalRating::default(),
        }
    }

    fn segment() -> FieldSegment {
        FieldSegment::new(
            "s1",
            vec![
                LatLng::new(33.4484, -112.0740),
                LatLng::new(33.4484, -112.0735),
                LatLng::new(33.4488, -112.0735),
                LatLng::new(33.4488, -112.0740),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_without_module_clears_layout() {
        let mut seg = segment();
        seg.layout.module_count = 12;
        seg.layout.nameplate_kw = 4.8;
        seg.layout.footprints = vec![vec![LatLng::new(0.0, 0.0)]];

        let out = recompute(&seg, None);
        assert_eq!(out.layout.module_count, 0);
        assert_eq!(out.layout.nameplate_kw, 0.0);
        assert!(out.layout.footprints.is_empty());
        assert!(out.layout.area_sq_ft > 0.0);
    }

    #[test]
    fn test_nameplate_is_exact() {
        let seg = segment();
        let m = module();
        let out = recompute(&seg, Some(&m));
        assert!(out.layout.module_count > 0);
        assert_eq!(
            out.layout.nameplate_kw,
            out.layout.module_count as f64 * 400.0 / 1000.0
        );
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let seg = segment();
        let m = module();
        let once = recompute(&seg, Some(&m));
        let twice = recompute(&once, Some(&m));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_gcr() {
        let params = PackParams {
            module_width_m: 1.0,
            module_height_m: 1.7,
            orientation: Orientation::Portrait,
            azimuth: None,
            row_spacing_ft: 0.0,
            module_spacing_ft: 0.0,
            setback_ft: 0.0,
        };
        assert!((ground_coverage_ratio(&params) - 1.0).abs() < 1e-12);

        let spaced = PackParams {
            row_spacing_ft: units::meters_to_feet(1.7),
            ..params
        };
        assert!((ground_coverage_ratio(&spaced) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_find_module() {
        let mut seg = segment();
        let catalog = vec![module()];
        assert!(find_module(&seg, &catalog).is_none());

        seg.module_id = Some("m1".to_string());
        assert_eq!(find_module(&seg, &catalog).map(|m| m.power_w), Some(400.0));

        seg.module_id = Some("missing".to_string());
        let out = recompute_from_catalog(&seg, &catalog);
        assert_eq!(out.layout.module_count, 0);
    }
}
