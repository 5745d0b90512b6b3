//! # hepre-core: proxy re-encryption over BFV
//!
//! A publisher encrypts once under its own public key. A proxy holding only
//! a switching key turns that ciphertext into one the subscriber decrypts
//! with its own secret key, without seeing the plaintext.
//!
//! ## Components
//!
//! - [`CryptoContext`]: scheme parameters and the raw operations
//! - [`KeyStoreManager`]: issues key pairs and switching keys
//! - [`ReEncryptionPipeline`]: encrypt, re-encrypt, decrypt
//! - [`MessageState`]: where a message is in that flow
//!
//! ## Example
//!
//! ```rust
//! use hepre_core::{CryptoContext, KeyStoreManager, ReEncryptionPipeline};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let ctx = CryptoContext::initialize("PN11QP54")?;
//! let keys = KeyStoreManager::new(&ctx);
//! let pipeline = ReEncryptionPipeline::new(&ctx);
//!
//! let publisher = keys.generate_publisher_keys()?;
//! // Subscriber keys and the switching key come from one trusted step
//! let grant = keys.issue_subscriber(&publisher.secret)?;
//!
//! let ct = pipeline.encrypt_for_publisher(b"hello FHE", &publisher.public)?;
//! let ct = pipeline.re_encrypt(&ct, &grant.switching_key)?;
//! let pt = pipeline.decrypt_for_subscriber(&ct, &grant.key_pair.secret)?;
//! assert_eq!(&pt[..], b"hello FHE");
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod error;
pub mod keys;
pub mod keystore;
pub mod pipeline;
pub mod state;

pub use context::CryptoContext;
pub use error::{CoreError, CoreResult};
pub use keys::{Ciphertext, KeyPair, PublicKey, SecretKey, SwitchingKey};
pub use keystore::{KeyStoreManager, Role, SubscriberGrant};
pub use pipeline::ReEncryptionPipeline;
pub use state::{MessageState, Transition};

pub use hepre_bfv::{BfvParameters, DecompositionBaseLog, ParameterSet, Plaintext};
