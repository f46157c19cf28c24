//! Stockage des segments et catalogue de modules (fichiers JSON)
//!
//! Arborescence :
//! - `<data>/projects/<id>.json` : segments d'un projet
//! - `<data>/modules.json` : catalogue de modules

pub mod record;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pvlayout::{FieldSegment, Module};
use tracing::{debug, warn};

pub use record::{ModuleRecord, ProjectFile, SegmentRecord};

/// Variable d'environnement : répertoire de données
pub const DATA_DIR_ENV: &str = "PVDESIGN_DATA_DIR";

/// Répertoire de données par défaut
pub const DEFAULT_DATA_DIR: &str = "data";

/// Accès aux segments d'un projet
pub trait SegmentStore {
    fn load(&self, project_id: &str) -> Result<Vec<FieldSegment>>;
    fn save(&self, project_id: &str, segments: &[FieldSegment]) -> Result<()>;
}

/// Accès au catalogue de modules
pub trait ModuleCatalog {
    fn list(&self) -> Result<Vec<Module>>;
}

/// Enregistrement rejeté à la lecture
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    /// Position dans le fichier
    pub index: usize,
    pub reason: String,
}

/// Projet chargé avec le détail de la validation
#[derive(Debug, Clone, Default)]
pub struct LoadedProject {
    pub segments: Vec<FieldSegment>,
    /// Empreintes enregistrées, par id de segment
    pub fingerprints: HashMap<String, String>,
    pub rejected: Vec<Rejected>,
}

/// Stockage JSON sur disque
#[derive(Debug, Clone)]
pub struct JsonStore {
    root: PathBuf,
}

impl JsonStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Répertoire depuis `--data-dir`, sinon `PVDESIGN_DATA_DIR`, sinon `./data`
    pub fn from_env(data_dir: Option<PathBuf>) -> Self {
        let root = data_dir
            .or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        Self::new(root)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_path(&self, project_id: &str) -> PathBuf {
        self.root.join("projects").join(format!("{}.json", project_id))
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.root.join("modules.json")
    }

    /// Charge un projet ; les enregistrements invalides sont signalés et ignorés
    ///
    /// Un projet absent est vide.
    pub fn load_checked(&self, project_id: &str) -> Result<LoadedProject> {
        validate_project_id(project_id)?;
        let path = self.project_path(project_id);
        if !path.exists() {
            debug!(project = project_id, "Project file not found, starting empty");
            return Ok(LoadedProject::default());
        }

        let content = std::fs::read_to_string(&path)
            .context(format!("Failed to read project file: {}", path.display()))?;
        let file: ProjectFile = serde_json::from_str(&content)
            .context(format!("Failed to parse project file: {}", path.display()))?;

        let mut loaded = LoadedProject::default();
        for (index, record) in file.segments.into_iter().enumerate() {
            let fingerprint = record.fingerprint.clone();
            match FieldSegment::try_from(record) {
                Ok(segment) => {
                    if loaded.segments.iter().any(|s| s.id == segment.id) {
                        warn!(project = project_id, segment_id = %segment.id, "Duplicate segment id, record skipped");
                        loaded.rejected.push(Rejected {
                            index,
                            reason: format!("duplicate segment id {}", segment.id),
                        });
                        continue;
                    }
                    if let Some(fp) = fingerprint {
                        loaded.fingerprints.insert(segment.id.clone(), fp);
                    }
                    loaded.segments.push(segment);
                }
                Err(e) => {
                    warn!(project = project_id, index = index, error = %e, "Invalid segment record skipped");
                    loaded.rejected.push(Rejected {
                        index,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok(loaded)
    }

    /// Ajoute ou remplace des modules dans le catalogue (par id)
    ///
    /// Retourne (ajoutés, remplacés).
    pub fn upsert_modules(&self, modules: &[Module]) -> Result<(usize, usize)> {
        let mut records = self.read_catalog_records()?;
        let (mut added, mut replaced) = (0, 0);

        for module in modules {
            let record = ModuleRecord::from(module);
            // Même validation qu'à la lecture : rien d'invalide n'est écrit
            Module::try_from(record.clone())
                .context(format!("Refusing to store module {}", module.id))?;
            match records
                .iter_mut()
                .find(|r| r.id.as_deref() == Some(module.id.as_str()))
            {
                Some(existing) => {
                    *existing = record;
                    replaced += 1;
                }
                None => {
                    records.push(record);
                    added += 1;
                }
            }
        }

        let json = serde_json::to_string_pretty(&records)?;
        write_file(&self.catalog_path(), &json)?;
        Ok((added, replaced))
    }

    fn read_catalog_records(&self) -> Result<Vec<ModuleRecord>> {
        let path = self.catalog_path();
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&path)
            .context(format!("Failed to read module catalog: {}", path.display()))?;
        serde_json::from_str(&content)
            .context(format!("Failed to parse module catalog: {}", path.display()))
    }
}

impl SegmentStore for JsonStore {
    fn load(&self, project_id: &str) -> Result<Vec<FieldSegment>> {
        Ok(self.load_checked(project_id)?.segments)
    }

    fn save(&self, project_id: &str, segments: &[FieldSegment]) -> Result<()> {
        validate_project_id(project_id)?;
        let file = ProjectFile {
            id: project_id.to_string(),
            segments: segments.iter().map(SegmentRecord::from).collect(),
        };
        let json = serde_json::to_string_pretty(&file)?;
        write_file(&self.project_path(project_id), &json)?;
        debug!(project = project_id, segments = segments.len(), "Project saved");
        Ok(())
    }
}

impl ModuleCatalog for JsonStore {
    fn list(&self) -> Result<Vec<Module>> {
        let mut modules = Vec::new();
        for record in self.read_catalog_records()? {
            match Module::try_from(record) {
                Ok(module) => modules.push(module),
                Err(e) => warn!(error = %e, "Invalid module record skipped"),
            }
        }
        Ok(modules)
    }
}

/// Écrit via un fichier temporaire puis renomme
fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .context(format!("Failed to create directory: {}", dir.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content).context(format!("Failed to write file: {}", tmp.display()))?;
    std::fs::rename(&tmp, path).context(format!("Failed to replace file: {}", path.display()))?;
    Ok(())
}

/// Un id de projet devient un nom de fichier
fn validate_project_id(project_id: &str) -> Result<()> {
    let valid = !project_id.is_empty()
        && project_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if !valid {
        anyhow::bail!(
            "Invalid project id: '{}'. Use letters, digits, '-' or '_'",
            project_id
        );
    }
    Ok(())
}
