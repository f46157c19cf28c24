//! Parser pour les fichiers PAN (définition de module PVsyst)
//!
//! Format texte `clé=valeur`, avec des blocs imbriqués `PVObject_...` /
//! `End of PVObject` et un bloc de remarques `Remarks, Count=N` composé de
//! lignes `Str_i=...`. Les fichiers sont souvent encodés en Windows-1252.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{ElectricalRating, Module};
use crate::LayoutError;

/// Valeur d'un champ PAN
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PanValue {
    Number(f64),
    Text(String),
}

impl PanValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Number(_) => None,
        }
    }
}

/// Contenu d'un fichier PAN (clés canoniques)
pub type PanFile = BTreeMap<String, PanValue>;

/// Mappe les variantes de clés (en minuscules) vers le nom canonique
fn canonical_key(raw: &str) -> Option<&'static str> {
    let key = match raw.to_ascii_lowercase().as_str() {
        "model" => "Model",
        "manufacturer" => "Manufacturer",
        "technol" => "Technol",
        "ncels" => "NCelS",
        "ncelp" => "NCelP",
        "ndiode" => "NDiode",
        "pnom" => "PNom",
        "pnomtollow" => "PNomTolLow",
        "pnomtolup" => "PNomTolUp",
        "isc" => "Isc",
        "voc" => "Voc",
        "imp" => "Imp",
        "vmp" => "Vmp",
        // mA/°C dans le fichier
        "muisc" => "mu_Isc",
        // mV/°C dans le fichier
        "muvocspec" => "muVocSpec",
        "mupmpreq" => "muPmpReq",
        "gamma" => "gamma_ref",
        "mugamma" => "mu_gamma",
        "rserie" | "r_s" => "R_s",
        "rshunt" | "r_sh_ref" => "R_sh_ref",
        "rp_0" => "R_sh_0",
        "rp_exp" => "R_sh_exp",
        "width" => "Width",
        "height" => "Height",
        "datasource" => "DataSource",
        "i_l_ref" => "I_L_ref",
        "i_o_ref" => "I_o_ref",
        _ => return None,
    };
    Some(key)
}

fn remark_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^Str_\d+=(.*)$").expect("static regex"))
}

/// Décode le contenu brut : UTF-8 si valide, sinon Windows-1252
pub fn decode(data: &[u8]) -> String {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    match simdutf8::basic::from_utf8(data) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(data);
            decoded.into_owned()
        }
    }
}

/// Parse un fichier PAN (octets bruts)
pub fn parse(data: &[u8]) -> PanFile {
    parse_str(&decode(data))
}

/// Parse un fichier PAN déjà décodé
pub fn parse_str(content: &str) -> PanFile {
    let mut data = PanFile::new();
    let mut remarks: Vec<String> = Vec::new();
    let mut in_remarks = false;

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty()
            || line.starts_with("//")
            || line.starts_with("PVObject_")
            || line.starts_with("End of PVObject")
        {
            continue;
        }

        if line.starts_with("Remarks, Count=") {
            in_remarks = true;
            continue;
        }

        if line.starts_with("End of Remarks") {
            in_remarks = false;
            data.insert("Remarks".to_string(), PanValue::Text(remarks.join("\n")));
            continue;
        }

        if in_remarks {
            if let Some(caps) = remark_regex().captures(line) {
                let text = caps.get(1).map_or("", |m| m.as_str());
                if !text.is_empty() {
                    remarks.push(text.to_string());
                }
            }
            continue;
        }

        let Some((raw_key, value)) = line.split_once('=') else {
            continue;
        };
        let raw_key = raw_key.trim();
        let key = canonical_key(raw_key).unwrap_or(raw_key);
        data.insert(key.to_string(), parse_value(value.trim()));
    }

    data
}

/// Valeur numérique seulement si tout le jeton est un nombre
fn parse_value(value: &str) -> PanValue {
    match fast_float::parse::<f64, _>(value) {
        Ok(n) if n.is_finite() => PanValue::Number(n),
        _ => PanValue::Text(value.to_string()),
    }
}

impl Module {
    /// Construit un module depuis un fichier PAN
    ///
    /// `Width`, `Height` (mètres) et `PNom` (W) sont requis et strictement positifs.
    pub fn from_pan(id: impl Into<String>, pan: &PanFile) -> Result<Self, LayoutError> {
        let id = id.into();
        let number = |key: &str| pan.get(key).and_then(PanValue::as_f64);
        let text = |key: &str| {
            pan.get(key).map(|v| match v {
                PanValue::Text(s) => s.clone(),
                PanValue::Number(n) => n.to_string(),
            })
        };
        let count = |key: &str| number(key).filter(|n| *n >= 0.0).map(|n| n as u32);

        let require = |key: &str| match number(key) {
            Some(v) if v.is_finite() && v > 0.0 => Ok(v),
            Some(v) => Err(LayoutError::invalid_module(
                id.clone(),
                format!("{} must be positive, got {}", key, v),
            )),
            None => Err(LayoutError::invalid_module(id.clone(), format!("missing {}", key))),
        };

        let width_m = require("Width")?;
        let height_m = require("Height")?;
        let power_w = require("PNom")?;

        Ok(Module {
            model_name: text("Model").unwrap_or_else(|| id.clone()),
            manufacturer: text("Manufacturer"),
            technology: text("Technol"),
            width_m,
            height_m,
            power_w,
            electrical: ElectricalRating {
                voc: number("Voc"),
                isc: number("Isc"),
                vmp: number("Vmp"),
                imp: number("Imp"),
                cells_in_series: count("NCelS"),
                cells_in_parallel: count("NCelP"),
                diodes: count("NDiode"),
            },
            id,
        })
    }
}
