//! Preferences persisted as a JSON file.
//!
//! ```text
//! {root}/
//! └── preferences.json      # {"key": "value", ...}
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::{AppError, Result};
use crate::storage::PreferenceStore;

const FILE_NAME: &str = "preferences.json";

type Preferences = BTreeMap<String, String>;

/// File-backed preference store.
#[derive(Debug)]
pub struct LocalPreferences {
    path: PathBuf,
    // Serializes read-modify-write cycles
    lock: Mutex<()>,
}

impl LocalPreferences {
    /// Store preferences in `root_dir/preferences.json`.
    pub fn new(root_dir: impl AsRef<Path>) -> Self {
        Self {
            path: root_dir.as_ref().join(FILE_NAME),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Preferences> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Preferences::new()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write to a temporary file, then rename over the old one.
    async fn write_all(&self, preferences: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(preferences)?;
        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for LocalPreferences {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut preferences = self.read_all().await?;
        preferences.insert(key.to_string(), value.to_string());
        self.write_all(&preferences).await?;
        log::debug!("Saved preference {key}");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut preferences = self.read_all().await?;
        if preferences.remove(key).is_some() {
            self.write_all(&preferences).await?;
            log::debug!("Removed preference {key}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_and_get() {
        let tmp = TempDir::new().unwrap();
        let store = LocalPreferences::new(tmp.path());

        store.set("theme", "dark").await.unwrap();
        assert_eq!(store.get("theme").await.unwrap().as_deref(), Some("dark"));
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let tmp = TempDir::new().unwrap();
        let store = LocalPreferences::new(tmp.path().join("nested"));
        assert!(store.get("theme").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_values_survive_a_new_instance() {
        let tmp = TempDir::new().unwrap();
        LocalPreferences::new(tmp.path())
            .set("a", "1")
            .await
            .unwrap();

        let reopened = LocalPreferences::new(tmp.path());
        assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("1"));
        reopened.remove("a").await.unwrap();
        assert!(reopened.get("a").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(FILE_NAME), "not json").unwrap();
        let store = LocalPreferences::new(tmp.path());
        assert!(store.get("a").await.is_err());
    }
}
