//! Scénarios de calepinage de bout en bout

use geo::Coord;
use pvlayout::projection::{LocalTangentPlane, Projection};
use pvlayout::units::feet_to_meters;
use pvlayout::{inset, metrics, pack, planar, recompute};
use pvlayout::{ElectricalRating, FieldSegment, LatLng, LayoutOutput, LayoutParams, Module, Orientation};

const CENTER: LatLng = LatLng {
    lat: 33.4484,
    lng: -112.0740,
};

/// Rectangle aligné sur les axes, centré sur `CENTER` (dimensions en pieds)
fn rectangle_ft(width_ft: f64, height_ft: f64) -> Vec<LatLng> {
    let plane = LocalTangentPlane::new(CENTER);
    let (hw, hh) = (feet_to_meters(width_ft) / 2.0, feet_to_meters(height_ft) / 2.0);
    [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)]
        .iter()
        .map(|&(x, y)| plane.unproject(Coord { x, y }))
        .collect()
}

fn module_1x17() -> Module {
    Module {
        id: "m-400".to_string(),
        model_name: "Test 400".to_string(),
        manufacturer: None,
        technology: None,
        width_m: 1.0,
        height_m: 1.7,
        power_w: 400.0,
        electrical: ElectricalRating::default(),
    }
}

fn segment_100x50() -> FieldSegment {
    let mut seg = FieldSegment::new("s-100x50", rectangle_ft(100.0, 50.0))
        .unwrap()
        .with_params(LayoutParams {
            orientation: Orientation::Portrait,
            row_spacing_ft: 3.0,
            module_spacing_ft: 0.5,
            setback_ft: 0.0,
            ..LayoutParams::default()
        });
    seg.azimuth = Some(180.0);
    seg.module_id = Some("m-400".to_string());
    seg
}

#[test]
fn test_rectangle_100x50_count() {
    let seg = recompute(&segment_100x50(), Some(&module_1x17()));

    // Azimut 180 : rangées le long de l'axe nord-sud.
    // Largeur utile 15.24 m, pas 1.1524 m : floor((15.24 - 1.0) / 1.1524) + 1 = 13
    // Profondeur utile 30.48 m, pas 2.6144 m : floor((30.48 - 1.7) / 2.6144) + 1 = 12
    assert_eq!(seg.layout.module_count, 13 * 12);
    assert_eq!(seg.layout.footprints.len(), seg.layout.module_count);
    assert!((seg.layout.area_sq_ft - 5000.0).abs() < 0.5, "area={}", seg.layout.area_sq_ft);
    assert_eq!(seg.layout.nameplate_kw, 156.0 * 400.0 / 1000.0);
    assert_eq!(seg.layout.azimuth, 180.0);
}

#[test]
fn test_layout_is_reproducible() {
    let module = module_1x17();
    let a = recompute(&segment_100x50(), Some(&module));
    let b = recompute(&segment_100x50(), Some(&module));
    assert_eq!(a.layout, b.layout);
}

#[test]
fn test_two_point_polygon() {
    let mut seg = segment_100x50();
    seg.points.truncate(2);
    let projection = Projection::for_points(&seg.points);

    assert_eq!(metrics::area_sq_ft(&seg.points, &projection), 0.0);

    let params = pack::PackParams::for_segment(&seg, &module_1x17());
    let packed = pack::pack(&seg.points, &params, &projection);
    assert_eq!(packed.count, 0);
    assert!(packed.footprints.is_empty());

    let out = recompute(&seg, Some(&module_1x17()));
    assert_eq!(out.layout.module_count, 0);
    assert_eq!(out.layout.nameplate_kw, 0.0);
}

#[test]
fn test_no_module_keeps_area() {
    let module = module_1x17();
    let laid_out = recompute(&segment_100x50(), Some(&module));
    assert!(laid_out.layout.module_count > 0);

    // Contour modifié puis module retiré
    let mut edited = laid_out.with_points(rectangle_ft(80.0, 50.0));
    edited.module_id = None;
    let out = recompute(&edited, None);

    assert_eq!(out.layout.module_count, 0);
    assert!(out.layout.footprints.is_empty());
    assert_eq!(out.layout.nameplate_kw, 0.0);
    assert!((out.layout.area_sq_ft - 4000.0).abs() < 0.5);
}

#[test]
fn test_zero_drag_is_idempotent() {
    let module = module_1x17();
    let before = recompute(&segment_100x50(), Some(&module));
    let dragged = before.with_point_moved(2, before.points[2]);
    let after = recompute(&dragged, Some(&module));
    assert_eq!(after, before);
}

#[test]
fn test_larger_spacing_never_adds_modules() {
    let module = module_1x17();
    let mut previous = usize::MAX;
    for row_spacing_ft in [0.0, 1.0, 3.0, 6.0, 12.0] {
        let mut seg = segment_100x50();
        seg.params.row_spacing_ft = row_spacing_ft;
        let count = recompute(&seg, Some(&module)).layout.module_count;
        assert!(count <= previous, "spacing {} gave {} > {}", row_spacing_ft, count, previous);
        previous = count;
    }

    let mut previous = usize::MAX;
    for module_spacing_ft in [0.0, 0.5, 2.0, 5.0] {
        let mut seg = segment_100x50();
        seg.params.module_spacing_ft = module_spacing_ft;
        let count = recompute(&seg, Some(&module)).layout.module_count;
        assert!(count <= previous);
        previous = count;
    }
}

/// Quadrilatère quelconque, retrait de 8 ft
fn quad_with_setback(module: &Module, azimuth: f64) -> FieldSegment {
    let mut seg = FieldSegment::new(
        "s-quad",
        vec![
            LatLng::new(33.4480, -112.0745),
            LatLng::new(33.4481, -112.0731),
            LatLng::new(33.4492, -112.0733),
            LatLng::new(33.4490, -112.0746),
        ],
    )
    .unwrap();
    seg.params.setback_ft = 8.0;
    seg.azimuth = Some(azimuth);
    seg.module_id = Some(module.id.clone());
    seg
}

#[test]
fn test_larger_spacing_never_adds_modules_on_rotated_quad() {
    let module = module_1x17();
    for azimuth in [0.0, 37.0, 90.0, 200.0, 315.0] {
        let mut previous = usize::MAX;
        for row_spacing_ft in [0.0, 1.0, 3.0, 6.0, 12.0] {
            let mut seg = quad_with_setback(&module, azimuth);
            seg.params.row_spacing_ft = row_spacing_ft;
            let count = recompute(&seg, Some(&module)).layout.module_count;
            assert!(
                count <= previous,
                "azimuth {} row spacing {} gave {} > {}",
                azimuth,
                row_spacing_ft,
                count,
                previous
            );
            previous = count;
        }

        let mut previous = usize::MAX;
        for module_spacing_ft in [0.0, 0.5, 2.0, 5.0] {
            let mut seg = quad_with_setback(&module, azimuth);
            seg.params.module_spacing_ft = module_spacing_ft;
            let count = recompute(&seg, Some(&module)).layout.module_count;
            assert!(
                count <= previous,
                "azimuth {} module spacing {} gave {} > {}",
                azimuth,
                module_spacing_ft,
                count,
                previous
            );
            previous = count;
        }
        assert!(previous > 0, "azimuth {} packed nothing", azimuth);
    }
}

#[test]
fn test_footprints_inside_buildable_area() {
    let module = module_1x17();
    let seg = quad_with_setback(&module, 200.0);

    let out = recompute(&seg, Some(&module));
    assert!(out.layout.module_count > 0);

    let projection = Projection::for_points(&out.points);
    let buildable = inset::inset(&out.points, 8.0, &projection);
    assert_eq!(buildable, out.layout.buildable);
    let ring = projection.project_ring(&buildable);

    for footprint in &out.layout.footprints {
        assert_eq!(footprint.len(), 4);
        for corner in footprint {
            let c = projection.project(*corner);
            assert!(
                planar::contains_with_tolerance(&ring, c, 1e-4),
                "corner {:?} outside buildable area",
                corner
            );
        }
    }
}

#[test]
fn test_degenerate_module_gives_empty_layout() {
    let mut module = module_1x17();
    module.width_m = 0.0;
    let out = recompute(&segment_100x50(), Some(&module));
    assert_eq!(out.layout.module_count, 0);
    assert!(out.layout.area_sq_ft > 0.0);
}

#[test]
fn test_landscape_changes_footprint() {
    let module = module_1x17();
    let mut seg = segment_100x50();
    seg.params.orientation = Orientation::Landscape;
    let out = recompute(&seg, Some(&module));
    // Largeur 15.24 m, pas 1.8524 : 8 colonnes ; profondeur 30.48 m, pas 1.9144 : 16 rangées
    assert_eq!(out.layout.module_count, 8 * 16);
    assert_ne!(out.layout, LayoutOutput::default());
}
