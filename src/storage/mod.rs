//! Persisted user preferences.
//!
//! The only preference the client itself depends on is the consent to load
//! external content ([`EXTERNAL_CONTENT_CONSENT`]). No consent is recorded
//! until the user grants it, and an unreadable store counts as "not
//! consented".

pub mod local;

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalPreferences;

/// Key of the persisted external content consent.
pub const EXTERNAL_CONTENT_CONSENT: &str = "allowExternalContent";

const CONSENT_GRANTED: &str = "true";

/// Trait for preference storage backends.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;
}

/// Whether the user has consented to third-party images and embeds.
pub async fn external_content_allowed(store: &dyn PreferenceStore) -> bool {
    match store.get(EXTERNAL_CONTENT_CONSENT).await {
        Ok(value) => value.as_deref() == Some(CONSENT_GRANTED),
        Err(e) => {
            log::warn!("Could not read external content consent: {e}");
            false
        }
    }
}

/// Record or revoke the external content consent.
pub async fn set_external_content_allowed(
    store: &dyn PreferenceStore,
    allowed: bool,
) -> Result<()> {
    if allowed {
        store.set(EXTERNAL_CONTENT_CONSENT, CONSENT_GRANTED).await
    } else {
        store.remove(EXTERNAL_CONTENT_CONSENT).await
    }
}

/// In-memory preference store.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferences {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        self.values.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    struct BrokenStore;

    #[async_trait]
    impl PreferenceStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(AppError::config("store unavailable"))
        }

        async fn set(&self, _key: &str, _value: &str) -> Result<()> {
            Err(AppError::config("store unavailable"))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Err(AppError::config("store unavailable"))
        }
    }

    #[tokio::test]
    async fn test_consent_defaults_to_denied() {
        assert!(!external_content_allowed(&MemoryPreferences::new()).await);
    }

    #[tokio::test]
    async fn test_consent_round_trip() {
        let store = MemoryPreferences::new();
        set_external_content_allowed(&store, true).await.unwrap();
        assert!(external_content_allowed(&store).await);
        set_external_content_allowed(&store, false).await.unwrap();
        assert!(!external_content_allowed(&store).await);
    }

    #[tokio::test]
    async fn test_unreadable_store_means_no_consent() {
        assert!(!external_content_allowed(&BrokenStore).await);
    }
}
