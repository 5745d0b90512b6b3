//! BFV encryption with key switching
//!
//! Ring arithmetic, batching, encryption and decryption come from the
//! [`fhe`] / [`fhe_math`] stack. This crate adds what proxy re-encryption
//! needs on top of it:
//!
//! 1. **Named presets** with a parameter fingerprint bound into every artifact
//! 2. **Switching keys**: a key derived from two secret keys that moves a
//!    ciphertext from the first key to the second without decrypting it
//! 3. **Key switching**: digit decomposition of `c1` against that key
//! 4. **A tagged binary codec** for keys, ciphertexts and plaintexts
//!
//! There is no ciphertext-ciphertext multiplication or relinearization.
//!
//! # Example
//!
//! ```
//! use hepre_bfv::{BatchEncoder, BfvContext, BfvPublicKey, BfvSecretKey, BfvSwitchingKey};
//! use hepre_bfv::{ParameterSet, decrypt, encrypt, key_switch};
//! use rand_chacha::ChaCha20Rng;
//! use rand_core::SeedableRng;
//!
//! let ctx = BfvContext::new(ParameterSet::Pn11Qp54.parameters()?)?;
//! let mut rng = ChaCha20Rng::seed_from_u64(7);
//!
//! let alice = BfvSecretKey::generate(&ctx, &mut rng);
//! let alice_pk = BfvPublicKey::generate(&ctx, &alice, &mut rng)?;
//! let bob = BfvSecretKey::generate(&ctx, &mut rng);
//!
//! let encoder = BatchEncoder::new(&ctx);
//! let ct = encrypt(&ctx, &alice_pk, &encoder.encode_bytes(b"hi bob")?, &mut rng)?;
//!
//! let swk = BfvSwitchingKey::generate(
//!     &ctx, &alice, &bob, ctx.params().decomposition_base_log(), &mut rng,
//! )?;
//! let for_bob = key_switch(&ctx, &ct, &swk)?;
//!
//! assert_eq!(encoder.decode_bytes(&decrypt(&ctx, &bob, &for_bob)?), b"hi bob");
//! # Ok::<(), hepre_bfv::BfvError>(())
//! ```

pub mod ciphertext;
pub mod codec;
pub mod context;
pub mod decrypt;
pub mod encoding;
pub mod encrypt;
pub mod error;
pub mod keys;
pub mod keyswitch;
pub mod params;
pub mod plaintext;
pub mod sampling;

pub use ciphertext::BfvCiphertext;
pub use codec::BlobKind;
pub use context::BfvContext;
pub use decrypt::decrypt;
pub use encoding::BatchEncoder;
pub use encrypt::encrypt;
pub use error::{BfvError, BfvResult};
pub use keys::{BfvPublicKey, BfvSecretKey, BfvSwitchingKey};
pub use keyswitch::key_switch;
pub use params::{BfvParameters, DecompositionBaseLog, ParameterFingerprint, ParameterSet};
pub use plaintext::Plaintext;
pub use sampling::fresh_rng;
