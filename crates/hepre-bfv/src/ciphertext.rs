//! BFV ciphertexts

use fhe::bfv::Ciphertext;
use fhe_math::rq::Poly;
use fhe_traits::{DeserializeParametrized, Serialize};

use crate::codec::{BlobKind, Reader, Writer};
use crate::context::BfvContext;
use crate::error::{BfvError, BfvResult};

/// `(c0, c1)` with `c0 + c1 * s = floor(Q/t) * m + e`, at the top of the chain
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BfvCiphertext {
    pub(crate) inner: Ciphertext,
}

impl BfvCiphertext {
    pub(crate) fn from_parts(ctx: &BfvContext, c0: Poly, c1: Poly) -> BfvResult<Self> {
        Ok(Self {
            inner: Ciphertext::new(vec![c0, c1], ctx.scheme())?,
        })
    }

    pub fn to_bytes(&self, ctx: &BfvContext) -> Vec<u8> {
        let body = self.inner.to_bytes();
        let mut w = Writer::new(BlobKind::Ciphertext, ctx.fingerprint(), body.len());
        w.bytes(&body);
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8], ctx: &BfvContext) -> BfvResult<Self> {
        let mut r = Reader::new(bytes, BlobKind::Ciphertext, ctx)?;
        let inner = Ciphertext::from_bytes(r.rest(), ctx.scheme())
            .map_err(|e| BfvError::Deserialization(format!("ciphertext body: {e}")))?;
        r.finish()?;

        // Key switching only handles fresh two-component ciphertexts
        if inner.len() != 2 {
            return Err(BfvError::Deserialization(format!(
                "ciphertext has {} components, expected 2",
                inner.len()
            )));
        }
        if inner[0].coefficients().nrows() != ctx.params().moduli().len() {
            return Err(BfvError::Deserialization(
                "ciphertext was switched down the modulus chain".to_string(),
            ));
        }
        Ok(Self { inner })
    }
}
