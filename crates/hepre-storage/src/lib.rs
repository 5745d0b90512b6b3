//! hepre-storage: key blob persistence
//!
//! One blob per key artifact, named by the owning principal and the
//! artifact kind: `alice.pk`, `alice.sk`, `bob.swk`. Blobs are opaque here;
//! decoding them is the crypto layer's job.
//!
//! ## Backends
//!
//! | Backend              | Use Case                          |
//! |----------------------|-----------------------------------|
//! | `InMemoryKeyStorage` | Unit tests, ephemeral deployments |
//! | `LocalKeyStorage`    | Base64 text files in a directory  |
//!
//! ## Example
//!
//! ```rust
//! use hepre_storage::{ArtifactKind, InMemoryKeyStorage, KeyRef, KeyStorage};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryKeyStorage::new();
//! let key = KeyRef::new("alice", ArtifactKind::PublicKey)?;
//!
//! storage.put(&key, b"opaque key bytes").await?;
//! assert_eq!(storage.get(&key).await?, b"opaque key bytes");
//! assert_eq!(key.to_string(), "alice.pk");
//! # Ok(())
//! # }
//! ```

mod error;
mod traits;

mod local;
mod memory;

pub use error::{StorageError, StorageResult};
pub use traits::{ArtifactKind, KeyRef, KeyStorage, validate_principal};

pub use local::LocalKeyStorage;
pub use memory::InMemoryKeyStorage;
