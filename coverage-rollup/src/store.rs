//! Loading project snapshots written by the instrumentation stage.
use crate::model::Project;
use log::{debug, info};
use sha2::{Digest, Sha256};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Content derived key identifying a stored project root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RootKey(String);

impl RootKey {
    /// Lowercase hex SHA-256 of the project name.
    pub fn for_project(name: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(name.as_bytes());
        Self(format!("{:x}", hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RootKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no snapshot stored for key {0}")]
    NotFound(RootKey),
    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid JSON snapshot: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid YAML snapshot: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Source of fully populated project trees.
pub trait ProjectStore {
    fn load(&self, key: &RootKey) -> Result<Project, StoreError>;
}

/// Snapshot directory holding one `<key>.json` or `<key>.yaml` per project.
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Write `project` as JSON under its content derived key.
    pub fn save(&self, project: &Project) -> Result<RootKey, StoreError> {
        let key = RootKey::for_project(&project.name);
        let path = self.dir.join(format!("{}.json", key));
        let body = serde_json::to_string_pretty(project)?;
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        fs::write(&path, body).map_err(|source| StoreError::Io { path, source })?;
        debug!("saved project {} as {}", project.name, key);
        Ok(key)
    }
}

impl ProjectStore for DirStore {
    fn load(&self, key: &RootKey) -> Result<Project, StoreError> {
        for ext in ["json", "yaml"] {
            let path = self.dir.join(format!("{}.{}", key, ext));
            if path.exists() {
                return load_snapshot(&path);
            }
        }
        Err(StoreError::NotFound(key.clone()))
    }
}

/// Read one snapshot file. `.yaml` and `.yml` files are parsed as YAML,
/// anything else as JSON.
pub fn load_snapshot<P: AsRef<Path>>(path: P) -> Result<Project, StoreError> {
    let path = path.as_ref();
    info!("reading snapshot {}", path.display());
    let body = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );
    let project = if yaml {
        serde_yaml::from_str(&body)?
    } else {
        serde_json::from_str(&body)?
    };
    Ok(project)
}
