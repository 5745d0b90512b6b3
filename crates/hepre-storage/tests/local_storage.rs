//! Integration tests for LocalKeyStorage

use hepre_storage::{ArtifactKind, KeyRef, KeyStorage, LocalKeyStorage, StorageError};
use tempfile::TempDir;

fn key(principal: &str, kind: ArtifactKind) -> KeyRef {
    KeyRef::new(principal, kind).unwrap()
}

#[tokio::test]
async fn test_local_roundtrip() {
    let temp = TempDir::new().unwrap();
    let storage = LocalKeyStorage::new(temp.path()).await.unwrap();
    let pk = key("alice", ArtifactKind::PublicKey);

    let blob: Vec<u8> = (0..=255).collect();
    storage.put(&pk, &blob).await.unwrap();
    assert_eq!(storage.get(&pk).await.unwrap(), blob);
}

#[tokio::test]
async fn test_files_are_base64_text() {
    let temp = TempDir::new().unwrap();
    let storage = LocalKeyStorage::new(temp.path()).await.unwrap();

    storage
        .put(&key("alice", ArtifactKind::SecretKey), b"hello")
        .await
        .unwrap();

    let text = std::fs::read_to_string(temp.path().join("alice.sk")).unwrap();
    assert_eq!(text, "aGVsbG8=\n");
}

#[tokio::test]
async fn test_reads_files_written_by_hand() {
    let temp = TempDir::new().unwrap();
    // No trailing newline, as produced by other tools
    std::fs::write(temp.path().join("bob.pk"), "d29ybGQ=").unwrap();

    let storage = LocalKeyStorage::new(temp.path()).await.unwrap();
    assert_eq!(
        storage
            .get(&key("bob", ArtifactKind::PublicKey))
            .await
            .unwrap(),
        b"world"
    );
}

#[tokio::test]
async fn test_local_persistence() {
    let temp = TempDir::new().unwrap();
    let swk = key("bob", ArtifactKind::SwitchingKey);

    // Write with one instance
    {
        let storage = LocalKeyStorage::new(temp.path()).await.unwrap();
        storage.put(&swk, b"switching").await.unwrap();
    }

    // Read with new instance
    {
        let storage = LocalKeyStorage::new(temp.path()).await.unwrap();
        assert_eq!(storage.get(&swk).await.unwrap(), b"switching");
    }
}

#[tokio::test]
async fn test_local_list_ignores_foreign_files() {
    let temp = TempDir::new().unwrap();
    let storage = LocalKeyStorage::new(temp.path()).await.unwrap();

    storage
        .put(&key("alice", ArtifactKind::PublicKey), b"a")
        .await
        .unwrap();
    storage
        .put(&key("alice", ArtifactKind::SecretKey), b"b")
        .await
        .unwrap();
    storage
        .put(&key("bob", ArtifactKind::SwitchingKey), b"c")
        .await
        .unwrap();
    std::fs::write(temp.path().join("README.txt"), "not a key").unwrap();

    let listed = storage.list().await.unwrap();
    assert_eq!(
        listed,
        vec![
            key("alice", ArtifactKind::SecretKey),
            key("alice", ArtifactKind::PublicKey),
            key("bob", ArtifactKind::SwitchingKey),
        ]
    );
}

#[tokio::test]
async fn test_local_not_found_and_corrupt() {
    let temp = TempDir::new().unwrap();
    let storage = LocalKeyStorage::new(temp.path()).await.unwrap();

    let missing = storage.get(&key("nobody", ArtifactKind::PublicKey)).await;
    assert!(matches!(missing, Err(StorageError::NotFound(_))));

    std::fs::write(temp.path().join("eve.pk"), "!!! not base64 !!!").unwrap();
    let corrupt = storage.get(&key("eve", ArtifactKind::PublicKey)).await;
    assert!(matches!(corrupt, Err(StorageError::Corrupt { .. })));
}

#[tokio::test]
async fn test_local_delete() {
    let temp = TempDir::new().unwrap();
    let storage = LocalKeyStorage::new(temp.path()).await.unwrap();
    let sk = key("carol", ArtifactKind::SecretKey);

    storage.put(&sk, b"secret").await.unwrap();
    assert!(storage.exists(&sk).await.unwrap());
    storage.delete(&sk).await.unwrap();
    assert!(!storage.exists(&sk).await.unwrap());
    storage.delete(&sk).await.unwrap();
}

#[cfg(unix)]
#[tokio::test]
async fn test_secret_keys_are_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let temp = TempDir::new().unwrap();
    let storage = LocalKeyStorage::new(temp.path()).await.unwrap();
    storage
        .put(&key("carol", ArtifactKind::SecretKey), b"secret")
        .await
        .unwrap();

    let mode = std::fs::metadata(temp.path().join("carol.sk"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_rejects_path_traversal() {
    assert!(matches!(
        KeyRef::new("../escape", ArtifactKind::SecretKey),
        Err(StorageError::InvalidPrincipal(_))
    ));
}

#[tokio::test]
async fn test_concurrent_writes_to_one_key() {
    let temp = TempDir::new().unwrap();
    let storage = std::sync::Arc::new(LocalKeyStorage::new(temp.path()).await.unwrap());
    let pk = key("dave", ArtifactKind::PublicKey);

    let writers: Vec<_> = (0..8u8)
        .map(|i| {
            let storage = storage.clone();
            let pk = pk.clone();
            tokio::spawn(async move { storage.put(&pk, &[i; 32]).await })
        })
        .collect();
    for writer in writers {
        writer.await.unwrap().unwrap();
    }

    // One complete blob wins and no temporary files are left over
    let blob = storage.get(&pk).await.unwrap();
    assert_eq!(blob.len(), 32);
    assert!(blob.iter().all(|&b| b == blob[0]));
    let names: Vec<_> = std::fs::read_dir(temp.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec!["dave.pk".to_string()]);
}
