//! JSON artifacts exchanged between pipeline stages

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tracing::info;

use crate::shared::errors::AppError;

pub const SIGNATURES_FILE: &str = "signature-slot.json";
pub const SANDWICHES_FILE: &str = "filtered_sandwiches.json";
pub const SLOT_LEADERS_FILE: &str = "slot-leader.json";
pub const ANALYSIS_FILE: &str = "validator-analysis.json";

/// Reads and writes stage outputs in the working data directory
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    data_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Write `value` as 4-space indented JSON, replacing any previous file
    pub fn save<T: Serialize>(&self, name: &str, value: &T) -> Result<PathBuf, AppError> {
        fs::create_dir_all(&self.data_dir).map_err(|e| {
            AppError::StorageError(format!("Failed to create {}: {}", self.data_dir.display(), e))
        })?;

        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        value
            .serialize(&mut serializer)
            .map_err(|e| AppError::StorageError(format!("Failed to serialize {}: {}", name, e)))?;

        let path = self.path(name);
        fs::write(&path, buffer)
            .map_err(|e| AppError::StorageError(format!("Failed to write {}: {}", path.display(), e)))?;

        info!("Saved {}", path.display());
        Ok(path)
    }

    /// Load a prior stage's output; a missing file is a hard error
    pub fn load<T: DeserializeOwned>(&self, name: &str) -> Result<T, AppError> {
        let path = self.path(name);
        if !path.exists() {
            return Err(AppError::StorageError(format!(
                "Required file not found: {}. Make sure to run all previous steps successfully.",
                name
            )));
        }

        let contents = fs::read_to_string(&path)
            .map_err(|e| AppError::StorageError(format!("Failed to read {}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| AppError::StorageError(format!("Failed to parse {}: {}", path.display(), e)))
    }
}
