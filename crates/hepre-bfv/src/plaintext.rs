//! Plaintext slot vectors

use fhe::bfv::{self, Encoding};
use fhe_traits::{FheDecoder, FheEncoder};

use crate::codec::{BlobKind, Reader, Writer};
use crate::context::BfvContext;
use crate::error::{BfvError, BfvResult};

/// One value in `[0, t)` per batching slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plaintext {
    pub(crate) slots: Vec<u64>,
}

impl Plaintext {
    pub fn slots(&self) -> &[u64] {
        &self.slots
    }

    /// SIMD-encode into an `fhe` plaintext
    pub(crate) fn to_scheme(&self, ctx: &BfvContext) -> BfvResult<bfv::Plaintext> {
        Ok(bfv::Plaintext::try_encode(
            &self.slots,
            Encoding::simd(),
            ctx.scheme(),
        )?)
    }

    pub(crate) fn from_scheme(pt: &bfv::Plaintext) -> BfvResult<Self> {
        Ok(Self {
            slots: Vec::<u64>::try_decode(pt, Encoding::simd())?,
        })
    }

    pub fn to_bytes(&self, ctx: &BfvContext) -> Vec<u8> {
        let mut w = Writer::new(BlobKind::Plaintext, ctx.fingerprint(), self.slots.len() * 8);
        for &c in &self.slots {
            w.u64(c);
        }
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8], ctx: &BfvContext) -> BfvResult<Self> {
        let mut r = Reader::new(bytes, BlobKind::Plaintext, ctx)?;
        let t = ctx.params().plaintext_modulus();
        let mut slots = Vec::with_capacity(ctx.slot_count());
        for _ in 0..ctx.slot_count() {
            let c = r.u64()?;
            if c >= t {
                return Err(BfvError::Deserialization(format!(
                    "plaintext slot {c} not below {t}"
                )));
            }
            slots.push(c);
        }
        r.finish()?;
        Ok(Self { slots })
    }
}
