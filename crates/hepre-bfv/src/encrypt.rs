//! Public-key encryption

use fhe_traits::FheEncrypter;
use rand_core::{CryptoRng, RngCore};

use crate::ciphertext::BfvCiphertext;
use crate::context::BfvContext;
use crate::error::BfvResult;
use crate::keys::BfvPublicKey;
use crate::plaintext::Plaintext;

/// Encrypt `plaintext` under `public`.
///
/// Probabilistic: two encryptions of the same slots differ.
pub fn encrypt<R: RngCore + CryptoRng>(
    ctx: &BfvContext,
    public: &BfvPublicKey,
    plaintext: &Plaintext,
    rng: &mut R,
) -> BfvResult<BfvCiphertext> {
    let pt = plaintext.to_scheme(ctx)?;
    Ok(BfvCiphertext {
        inner: public.inner.try_encrypt(&pt, rng)?,
    })
}
