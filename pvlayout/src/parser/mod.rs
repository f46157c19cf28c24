//! Parsers des fichiers de définition de modules

pub mod pan;

use std::path::Path;

use crate::types::Module;
use crate::LayoutError;

pub use pan::{PanFile, PanValue};

/// Lit un fichier `.pan` et construit le module correspondant
///
/// L'identifiant du module est le nom du fichier sans extension.
pub fn read_pan_module(path: &Path) -> Result<Module, LayoutError> {
    let data = std::fs::read(path)?;
    let pan = pan::parse(&data);
    if pan.is_empty() {
        return Err(LayoutError::parse_error(
            path.display().to_string(),
            "no key/value pair found",
        ));
    }

    let id = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| LayoutError::parse_error(path.display().to_string(), "invalid file name"))?;

    Module::from_pan(id, &pan)
}
