//! Storage trait definitions

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};

const MAX_PRINCIPAL_LEN: usize = 128;

/// Which key artifact a blob holds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    SecretKey,
    PublicKey,
    SwitchingKey,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [Self::SecretKey, Self::PublicKey, Self::SwitchingKey];

    /// File extension used for this kind
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::SecretKey => "sk",
            ArtifactKind::PublicKey => "pk",
            ArtifactKind::SwitchingKey => "swk",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ArtifactKind {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.extension() == s)
            .ok_or_else(|| StorageError::Backend(format!("unknown artifact kind: {s}")))
    }
}

/// Check that a principal name is safe to use as a file stem.
///
/// 1 to 128 characters from `[A-Za-z0-9_.-]`, not starting with a dot.
pub fn validate_principal(principal: &str) -> StorageResult<()> {
    let valid = !principal.is_empty()
        && principal.len() <= MAX_PRINCIPAL_LEN
        && !principal.starts_with('.')
        && principal
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidPrincipal(principal.to_string()))
    }
}

/// Address of one stored blob
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyRef {
    principal: String,
    kind: ArtifactKind,
}

impl KeyRef {
    pub fn new(principal: impl Into<String>, kind: ArtifactKind) -> StorageResult<Self> {
        let principal = principal.into();
        validate_principal(&principal)?;
        Ok(Self { principal, kind })
    }

    pub fn principal(&self) -> &str {
        &self.principal
    }

    pub fn kind(&self) -> ArtifactKind {
        self.kind
    }

    /// Parse a `principal.ext` file name
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (principal, ext) = name.rsplit_once('.')?;
        let kind = ext.parse().ok()?;
        Self::new(principal, kind).ok()
    }
}

impl fmt::Display for KeyRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.principal, self.kind)
    }
}

/// Key blob storage
///
/// Blobs are opaque bytes keyed by [`KeyRef`]. Writes replace any existing
/// blob under the same reference.
#[async_trait]
pub trait KeyStorage: Send + Sync {
    /// Store a blob, replacing any previous one
    async fn put(&self, key: &KeyRef, blob: &[u8]) -> StorageResult<()>;

    /// Retrieve a blob
    ///
    /// Returns `StorageError::NotFound` if nothing is stored under `key`.
    async fn get(&self, key: &KeyRef) -> StorageResult<Vec<u8>>;

    async fn exists(&self, key: &KeyRef) -> StorageResult<bool>;

    /// Delete a blob
    ///
    /// Returns `Ok(())` even if the blob didn't exist (idempotent).
    async fn delete(&self, key: &KeyRef) -> StorageResult<()>;

    /// List every stored reference
    async fn list(&self) -> StorageResult<Vec<KeyRef>>;
}
