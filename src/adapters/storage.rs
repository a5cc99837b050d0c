use crate::core::Storage;
use crate::utils::error::{FetchError, Result};
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    /// Replaces the whole file; nothing from a previous run is kept.
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

/// Persistence writer: pretty-printed UTF-8 JSON on top of any `Storage`.
#[derive(Debug, Clone)]
pub struct JsonWriter<S: Storage> {
    storage: S,
}

impl<S: Storage> JsonWriter<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn write_json(&self, destination: &str, payload: &Value) -> Result<()> {
        let mut bytes = serde_json::to_vec_pretty(payload)?;
        bytes.push(b'\n');

        self.storage
            .write_file(destination, &bytes)
            .await
            .map_err(|e| match e {
                FetchError::IoError(source) => FetchError::PersistenceError {
                    destination: destination.to_string(),
                    source,
                },
                other => other,
            })?;

        tracing::info!("💾 Saved {} ({} bytes)", destination, bytes.len());
        Ok(())
    }
}
