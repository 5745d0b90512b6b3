//! BFV public key

use fhe::bfv::PublicKey;
use fhe_traits::{DeserializeParametrized, Serialize};
use rand_core::{CryptoRng, RngCore};

use super::secret::BfvSecretKey;
use crate::codec::{BlobKind, Reader, Writer};
use crate::context::BfvContext;
use crate::error::{BfvError, BfvResult};

/// An encryption of zero under the secret key, `(-(a * s + e), a)`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BfvPublicKey {
    pub(crate) inner: PublicKey,
}

impl BfvPublicKey {
    pub fn generate<R: RngCore + CryptoRng>(
        ctx: &BfvContext,
        secret: &BfvSecretKey,
        rng: &mut R,
    ) -> BfvResult<Self> {
        let sk = secret.to_scheme(ctx);
        Ok(Self {
            inner: PublicKey::new(&sk, rng),
        })
    }

    pub fn to_bytes(&self, ctx: &BfvContext) -> Vec<u8> {
        let body = self.inner.to_bytes();
        let mut w = Writer::new(BlobKind::PublicKey, ctx.fingerprint(), body.len());
        w.bytes(&body);
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8], ctx: &BfvContext) -> BfvResult<Self> {
        let mut r = Reader::new(bytes, BlobKind::PublicKey, ctx)?;
        let inner = PublicKey::from_bytes(r.rest(), ctx.scheme())
            .map_err(|e| BfvError::Deserialization(format!("public key body: {e}")))?;
        r.finish()?;
        Ok(Self { inner })
    }
}
