//! In-memory storage backend (for testing)

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::traits::{KeyRef, KeyStorage};

/// In-memory key storage
///
/// Thread-safe via `RwLock`. Not persistent: data is lost on drop.
#[derive(Default)]
pub struct InMemoryKeyStorage {
    blobs: RwLock<HashMap<KeyRef, Vec<u8>>>,
}

impl InMemoryKeyStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored blobs
    pub fn len(&self) -> usize {
        self.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> StorageResult<RwLockReadGuard<'_, HashMap<KeyRef, Vec<u8>>>> {
        self.blobs
            .read()
            .map_err(|_| StorageError::Backend("key store lock poisoned".into()))
    }

    fn write(&self) -> StorageResult<RwLockWriteGuard<'_, HashMap<KeyRef, Vec<u8>>>> {
        self.blobs
            .write()
            .map_err(|_| StorageError::Backend("key store lock poisoned".into()))
    }
}

#[async_trait]
impl KeyStorage for InMemoryKeyStorage {
    async fn put(&self, key: &KeyRef, blob: &[u8]) -> StorageResult<()> {
        self.write()?.insert(key.clone(), blob.to_vec());
        Ok(())
    }

    async fn get(&self, key: &KeyRef) -> StorageResult<Vec<u8>> {
        self.read()?
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn exists(&self, key: &KeyRef) -> StorageResult<bool> {
        Ok(self.read()?.contains_key(key))
    }

    async fn delete(&self, key: &KeyRef) -> StorageResult<()> {
        self.write()?.remove(key);
        Ok(())
    }

    async fn list(&self) -> StorageResult<Vec<KeyRef>> {
        let mut keys: Vec<KeyRef> = self.read()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ArtifactKind;

    fn key(principal: &str, kind: ArtifactKind) -> KeyRef {
        KeyRef::new(principal, kind).unwrap()
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let storage = InMemoryKeyStorage::new();
        let pk = key("alice", ArtifactKind::PublicKey);

        storage.put(&pk, b"public bytes").await.unwrap();
        assert_eq!(storage.get(&pk).await.unwrap(), b"public bytes");
        assert_eq!(storage.len(), 1);
    }

    #[tokio::test]
    async fn test_kinds_are_separate() {
        let storage = InMemoryKeyStorage::new();
        storage
            .put(&key("alice", ArtifactKind::PublicKey), b"pk")
            .await
            .unwrap();

        let result = storage.get(&key("alice", ArtifactKind::SecretKey)).await;
        assert!(matches!(result, Err(StorageError::NotFound(name)) if name == "alice.sk"));
    }

    #[tokio::test]
    async fn test_put_replaces() {
        let storage = InMemoryKeyStorage::new();
        let sk = key("bob", ArtifactKind::SecretKey);
        storage.put(&sk, b"old").await.unwrap();
        storage.put(&sk, b"new").await.unwrap();
        assert_eq!(storage.get(&sk).await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_delete_idempotent() {
        let storage = InMemoryKeyStorage::new();
        let swk = key("bob", ArtifactKind::SwitchingKey);

        storage.delete(&swk).await.unwrap();
        storage.put(&swk, b"swk").await.unwrap();
        assert!(storage.exists(&swk).await.unwrap());
        storage.delete(&swk).await.unwrap();
        assert!(!storage.exists(&swk).await.unwrap());
        assert!(storage.is_empty());
    }

    #[tokio::test]
    async fn test_list_sorted() {
        let storage = InMemoryKeyStorage::new();
        let b = key("bob", ArtifactKind::PublicKey);
        let a = key("alice", ArtifactKind::SecretKey);
        storage.put(&b, b"1").await.unwrap();
        storage.put(&a, b"2").await.unwrap();
        assert_eq!(storage.list().await.unwrap(), vec![a, b]);
    }
}
