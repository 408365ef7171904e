//! Artifact persistence.
//!
//! The browser keeps its bearer token in local storage; this trait is that
//! seam for native clients. Session-mode deployments don't go through it at
//! all - their artifact is a cookie owned by the HTTP client's cookie jar.

use parking_lot::Mutex;
use thiserror::Error;

/// Error from an artifact store implementation.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct StoreError(pub String);

/// Durable storage for the auth artifact between application runs.
pub trait ArtifactStore: Send + Sync {
    /// Load the stored artifact, if any.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing storage cannot be read.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Persist an artifact, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing storage cannot be written.
    fn save(&self, artifact: &str) -> Result<(), StoreError>;

    /// Remove the stored artifact.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing storage cannot be written.
    fn clear(&self) -> Result<(), StoreError>;
}

impl<T: ArtifactStore + ?Sized> ArtifactStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<String>, StoreError> {
        (**self).load()
    }

    fn save(&self, artifact: &str) -> Result<(), StoreError> {
        (**self).save(artifact)
    }

    fn clear(&self) -> Result<(), StoreError> {
        (**self).clear()
    }
}

/// In-memory artifact store.
///
/// The artifact lives exactly as long as the process; suitable for tests
/// and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    slot: Mutex<Option<String>>,
}

impl ArtifactStore for MemoryArtifactStore {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, artifact: &str) -> Result<(), StoreError> {
        *self.slot.lock() = Some(artifact.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.slot.lock() = None;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryArtifactStore::default();
        assert_eq!(store.load().unwrap(), None);

        store.save("token-1").unwrap();
        assert_eq!(store.load().unwrap(), Some("token-1".to_owned()));

        store.save("token-2").unwrap();
        assert_eq!(store.load().unwrap(), Some("token-2".to_owned()));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }
}
