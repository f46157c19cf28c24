//! Tests d'intégration du stockage JSON et du recalcul de projet

use pvdesign::config::Config;
use pvdesign::project::layout_project;
use pvdesign::store::{JsonStore, ModuleCatalog, SegmentStore};
use pvdesign::LayoutStatus;
use pvlayout::{recompute, ElectricalRating, FieldSegment, LatLng, Module};

fn module(id: &str) -> Module {
    Module {
        id: id.to_string(),
        model_name: format!("{} model", id),
        manufacturer: Some("Acme Solar".to_string()),
        technology: None,
        width_m: 1.0,
        height_m: 1.7,
        power_w: 400.0,
        electrical: ElectricalRating {
            voc: Some(49.5),
            ..Default::default()
        },
    }
}

fn segment(id: &str, module_id: Option<&str>) -> FieldSegment {
    let mut seg = FieldSegment::new(
        id,
        vec![
            LatLng::new(33.4484, -112.0740),
            LatLng::new(33.4484, -112.0735),
            LatLng::new(33.4488, -112.0735),
            LatLng::new(33.4488, -112.0740),
        ],
    )
    .unwrap();
    seg.module_id = module_id.map(str::to_string);
    seg
}

#[test]
fn test_segments_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());
    let m = module("m1");

    let segments = vec![
        recompute(&segment("a", Some("m1")), Some(&m)),
        recompute(&segment("b", None), None),
    ];
    store.save("site-a", &segments).unwrap();

    let loaded = store.load("site-a").unwrap();
    assert_eq!(loaded, segments);
    assert!(store.project_path("site-a").exists());
}

#[test]
fn test_missing_project_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());
    assert!(store.load("nothing").unwrap().is_empty());
    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_catalog_upsert_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());

    assert_eq!(store.upsert_modules(&[module("m1"), module("m2")]).unwrap(), (2, 0));

    let mut bigger = module("m2");
    bigger.power_w = 450.0;
    assert_eq!(store.upsert_modules(&[bigger]).unwrap(), (0, 1));

    let modules = store.list().unwrap();
    assert_eq!(modules.len(), 2);
    assert_eq!(modules[1].power_w, 450.0);
    assert_eq!(modules[0].electrical.voc, Some(49.5));
}

#[test]
fn test_catalog_rejects_invalid_module() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());
    store.upsert_modules(&[module("m1")]).unwrap();

    let mut flat = module("m2");
    flat.width_m = 0.0;
    assert!(store.upsert_modules(&[flat]).is_err());

    let mut negative = module("m1");
    negative.power_w = -5.0;
    assert!(store.upsert_modules(&[negative]).is_err());

    // Le catalogue n'a pas été réécrit
    let modules = store.list().unwrap();
    assert_eq!(modules.len(), 1);
    assert_eq!(modules[0].id, "m1");
    assert_eq!(modules[0].power_w, 400.0);
}

#[test]
fn test_invalid_records_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());
    let path = store.project_path("site-b");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{"id":"site-b","segments":[
            {"id":"ok","points":[[45.0,5.0],[45.0,5.001],[45.001,5.001]]},
            {"points":[[45.0,5.0]]},
            {"id":"bad","points":[[45.0,5.0]],"params":{"setback_ft":-3.0}}
        ]}"#,
    )
    .unwrap();

    let loaded = store.load_checked("site-b").unwrap();
    assert_eq!(loaded.segments.len(), 1);
    assert_eq!(loaded.segments[0].id, "ok");
    assert_eq!(loaded.rejected.len(), 2);
    assert_eq!(loaded.rejected[0].index, 1);

    // Le projet n'est pas réécrit tant que des enregistrements sont invalides
    let before = std::fs::read_to_string(&path).unwrap();
    let report = layout_project(&store, &Config::default(), "site-b", true).unwrap();
    assert_eq!(report.status, LayoutStatus::PartialSuccess);
    assert_eq!(report.segments_skipped, 2);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_layout_project_detects_changes() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());
    store.upsert_modules(&[module("m1")]).unwrap();

    // Segment jamais calculé : sorties vides, pas d'empreinte
    let mut raw = segment("a", Some("m1"));
    raw.layout = Default::default();
    store.save("site-c", &[raw]).unwrap();

    let config = Config::default();
    let first = layout_project(&store, &config, "site-c", false).unwrap();
    assert_eq!(first.status, LayoutStatus::Success);
    assert_eq!(first.segments_changed, 1);
    assert!(first.total_modules > 0);
    assert_eq!(
        first.total_nameplate_kw,
        first.total_modules as f64 * 400.0 / 1000.0
    );

    let saved = store.load("site-c").unwrap();
    assert_eq!(saved[0].layout.module_count, first.total_modules);

    // Deuxième passe : rien ne change
    let second = layout_project(&store, &config, "site-c", false).unwrap();
    assert_eq!(second.segments_unchanged, 1);
    assert!(!second.has_changes());
}

#[test]
fn test_unknown_module_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonStore::new(dir.path());
    store.save("site-d", &[segment("a", Some("ghost"))]).unwrap();

    let report = layout_project(&store, &Config::default(), "site-d", false).unwrap();
    assert_eq!(report.total_modules, 0);
    assert!(report
        .warnings
        .iter()
        .any(|w| w.message.contains("ghost")));
}
