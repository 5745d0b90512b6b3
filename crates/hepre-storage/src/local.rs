//! Local filesystem storage backend

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tokio::fs;

use crate::error::{StorageError, StorageResult};
use crate::traits::{ArtifactKind, KeyRef, KeyStorage};

/// Key files as base64 text
///
/// Structure: `{root}/{principal}.{sk|pk|swk}`, one base64 line per file.
/// Writes go through a temporary file and a rename, so readers never see a
/// half-written key. Each write gets its own temporary name, so concurrent
/// writers of one key never share a file.
pub struct LocalKeyStorage {
    root: PathBuf,
    writes: AtomicU64,
}

impl LocalKeyStorage {
    /// Create storage at the given root directory
    ///
    /// Creates the directory if it doesn't exist.
    pub async fn new(root: impl AsRef<Path>) -> StorageResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self {
            root,
            writes: AtomicU64::new(0),
        })
    }

    fn key_path(&self, key: &KeyRef) -> PathBuf {
        self.root.join(key.to_string())
    }

    /// Dot-prefixed, so `list` never mistakes it for a key
    fn temp_path(&self, key: &KeyRef) -> PathBuf {
        let n = self.writes.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(".{key}.{}.{n}.tmp", std::process::id()))
    }
}

#[async_trait]
impl KeyStorage for LocalKeyStorage {
    async fn put(&self, key: &KeyRef, blob: &[u8]) -> StorageResult<()> {
        let path = self.key_path(key);
        let tmp = self.temp_path(key);

        let mut encoded = STANDARD.encode(blob);
        encoded.push('\n');
        fs::write(&tmp, encoded.as_bytes()).await?;

        #[cfg(unix)]
        if key.kind() == ArtifactKind::SecretKey {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, std::fs::Permissions::from_mode(0o600)).await?;
        }

        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        tracing::debug!(key = %key, "key blob written");
        Ok(())
    }

    async fn get(&self, key: &KeyRef) -> StorageResult<Vec<u8>> {
        let path = self.key_path(key);
        match fs::read_to_string(&path).await {
            Ok(text) => STANDARD
                .decode(text.trim_end_matches(['\n', '\r']))
                .map_err(|e| StorageError::Corrupt {
                    name: key.to_string(),
                    reason: e.to_string(),
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::InvalidData => Err(StorageError::Corrupt {
                name: key.to_string(),
                reason: "not UTF-8 text".to_string(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, key: &KeyRef) -> StorageResult<bool> {
        Ok(fs::try_exists(self.key_path(key)).await?)
    }

    async fn delete(&self, key: &KeyRef) -> StorageResult<()> {
        match fs::remove_file(self.key_path(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self) -> StorageResult<Vec<KeyRef>> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            if let Some(key) = entry.file_name().to_str().and_then(KeyRef::from_file_name) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }
}
