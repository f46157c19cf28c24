//! # pvlayout
//!
//! Moteur géométrique de calepinage pour segments de terrain photovoltaïques.
//!
//! ## Features
//!
//! - Projection locale (plan tangent) ou vue Web Mercator
//! - Surface, longueurs d'arêtes et centroïde d'un contour
//! - Contour constructible par retrait (setback)
//! - Calepinage glouton en grille orientée selon l'azimut
//! - Parser de fichiers PAN pour le catalogue de modules
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pvlayout::{recompute, FieldSegment, LatLng};
//!
//! let segment = FieldSegment::new("s1", points)?;
//! let segment = recompute(&segment, Some(&module));
//! println!("{} modules, {:.2} kW", segment.layout.module_count, segment.layout.nameplate_kw);
//! ```

pub mod edit;
pub mod error;
pub mod inset;
pub mod layout;
pub mod metrics;
pub mod pack;
pub mod parser;
pub mod planar;
pub mod projection;
pub mod types;
pub mod units;

pub use edit::SegmentUpdate;
pub use error::LayoutError;
pub use layout::{recompute, recompute_from_catalog, recompute_with};
pub use pack::{pack, PackParams, PackResult};
pub use projection::Projection;
pub use types::{
    ElectricalRating, FieldSegment, LatLng, LayoutOutput, LayoutParams, Module, Orientation,
    RackingType,
};
