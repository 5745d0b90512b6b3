//! Randomness for secret keys
//!
//! Masks and errors are sampled inside `fhe` / `fhe_math`; only the secret
//! key coefficients are drawn here, since they are stored in our own format.

use rand::Rng;
use rand::rngs::OsRng;
use rand_chacha::ChaCha20Rng;
use rand_core::{CryptoRng, RngCore, SeedableRng, TryRngCore};

/// A fresh ChaCha20 generator seeded from the operating system
pub fn fresh_rng() -> ChaCha20Rng {
    let mut seed = <ChaCha20Rng as SeedableRng>::Seed::default();
    OsRng.unwrap_err().fill_bytes(&mut seed);
    ChaCha20Rng::from_seed(seed)
}

/// Coefficients drawn uniformly from {-1, 0, 1}
pub(crate) fn ternary<R: RngCore + CryptoRng>(degree: usize, rng: &mut R) -> Vec<i64> {
    (0..degree).map(|_| rng.gen_range(-1i64..=1)).collect()
}
