//! File-backed template persistence.

use std::path::{Path, PathBuf};

use super::model::Template;
use super::save::SavePayload;

// =============================================================================
// Errors
// =============================================================================

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("template '{0}' not found")]
    NotFound(String),

    #[error("invalid template id '{0}': only letters, digits, '-' and '_' are allowed")]
    InvalidId(String),

    #[error("failed to access template store at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read or write template JSON: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// TemplateStore
// =============================================================================

/// Where templates are loaded from and saved to.
pub trait TemplateStore {
    /// Load a template by id, migrating legacy fields.
    fn load(&self, id: &str) -> Result<Template, StoreError>;

    /// Persist a payload, returning the id it was stored under.
    fn save(&self, payload: &SavePayload) -> Result<String, StoreError>;
}

/// Stores each template as `<dir>/<id>.json`.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        if !is_valid_id(id) {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.json")))
    }
}

impl TemplateStore for FileStore {
    fn load(&self, id: &str) -> Result<Template, StoreError> {
        let path = self.path_for(id)?;
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(source) => return Err(StoreError::Io { path, source }),
        };

        let mut template = Template::from_json(&json)?;
        if template.id.is_none() {
            template.id = Some(id.to_string());
        }
        tracing::debug!(id, "loaded template");
        Ok(template)
    }

    fn save(&self, payload: &SavePayload) -> Result<String, StoreError> {
        let id = match payload.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        let path = self.path_for(&id)?;

        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;

        let record = SavePayload {
            id: Some(id.clone()),
            ..payload.clone()
        };
        let json = serde_json::to_string_pretty(&record)?;
        std::fs::write(&path, json).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(id = %id, path = %path.display(), "saved template");
        Ok(id)
    }
}

fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
