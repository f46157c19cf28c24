//! Types d'erreurs pour le crate pvlayout
//!
//! Les fonctions géométriques ne retournent jamais d'erreur : une géométrie
//! dégénérée donne un résultat vide. Ces erreurs ne concernent que les
//! frontières (validation des enregistrements, fichiers PAN).

use thiserror::Error;

/// Erreurs pouvant survenir à la frontière du moteur de calepinage
#[derive(Debug, Error)]
pub enum LayoutError {
    /// Erreur d'I/O lors de la lecture d'un fichier
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Erreur de parsing d'un fichier
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// Segment invalide (enregistrement incomplet ou contour inutilisable)
    #[error("Invalid segment {segment_id}: {reason}")]
    InvalidSegment { segment_id: String, reason: String },

    /// Module invalide (champ requis manquant)
    #[error("Invalid module {module_id}: {reason}")]
    InvalidModule { module_id: String, reason: String },

    /// Module référencé absent du catalogue
    #[error("Unknown module: {0}")]
    UnknownModule(String),
}

impl LayoutError {
    /// Crée une erreur de parsing avec contexte
    pub fn parse_error(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de segment invalide
    pub fn invalid_segment(segment_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSegment {
            segment_id: segment_id.into(),
            reason: reason.into(),
        }
    }

    /// Crée une erreur de module invalide
    pub fn invalid_module(module_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidModule {
            module_id: module_id.into(),
            reason: reason.into(),
        }
    }
}
