//! Secret-key decryption

use fhe_traits::FheDecrypter;

use crate::ciphertext::BfvCiphertext;
use crate::context::BfvContext;
use crate::error::BfvResult;
use crate::keys::BfvSecretKey;
use crate::plaintext::Plaintext;

/// Decrypt with `secret`.
///
/// There is no integrity check: a key the ciphertext is not bound to yields
/// an unrelated plaintext rather than an error.
pub fn decrypt(
    ctx: &BfvContext,
    secret: &BfvSecretKey,
    ciphertext: &BfvCiphertext,
) -> BfvResult<Plaintext> {
    let sk = secret.to_scheme(ctx);
    let pt = sk.try_decrypt(&ciphertext.inner)?;
    Plaintext::from_scheme(&pt)
}
