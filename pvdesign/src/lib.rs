//! # pvdesign
//!
//! Application hôte du moteur `pvlayout` : stockage des segments, catalogue
//! de modules, recalcul de projets et export.
//!
//! ## Features
//!
//! - Stockage JSON des projets et du catalogue, validé à la lecture
//! - Recalcul parallèle des segments d'un projet
//! - Détection des modifications par empreinte blake3
//! - Export GeoJSON (contours, zones constructibles, emprises de modules)
//! - Import de modules depuis des fichiers PVsyst `.PAN`
//!
//! ## Usage CLI
//!
//! ```bash
//! pvdesign import-pan ./modules/*.PAN
//! pvdesign new-segment site-a --point 33.4484,-112.0740 --point 33.4484,-112.0735 \
//!     --point 33.4488,-112.0735 --point 33.4488,-112.0740 --module acme-400
//! pvdesign layout site-a --report report.json
//! pvdesign export site-a --output site-a.geojson
//! ```

pub mod config;
pub mod diff;
pub mod export;
pub mod project;
pub mod report;
pub mod store;

pub use config::Config;
pub use report::{LayoutReport, LayoutStatus};
pub use store::{JsonStore, ModuleCatalog, SegmentStore};
