//! BFV secret key

use std::fmt;

use fhe::bfv::SecretKey;
use fhe_math::rq::traits::TryConvertFrom;
use fhe_math::rq::{Poly, Representation};
use rand_core::{CryptoRng, RngCore};
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::codec::{BlobKind, Reader, Writer};
use crate::context::BfvContext;
use crate::error::{BfvError, BfvResult};
use crate::sampling;

/// Ternary secret polynomial, zeroized on drop
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BfvSecretKey {
    coefficients: Vec<i64>,
}

impl BfvSecretKey {
    pub fn generate<R: RngCore + CryptoRng>(ctx: &BfvContext, rng: &mut R) -> Self {
        Self {
            coefficients: sampling::ternary(ctx.degree(), rng),
        }
    }

    /// The same key as an `fhe` secret key, for encryption and decryption
    pub(crate) fn to_scheme(&self, ctx: &BfvContext) -> SecretKey {
        SecretKey::new(self.coefficients.clone(), ctx.scheme())
    }

    /// The key lifted to every chain modulus, in NTT form
    pub(crate) fn to_ntt(&self, ctx: &BfvContext) -> BfvResult<Zeroizing<Poly>> {
        let mut s = Zeroizing::new(Poly::try_convert_from(
            self.coefficients.as_slice(),
            ctx.ring(),
            false,
            Representation::PowerBasis,
        )?);
        s.change_representation(Representation::Ntt);
        Ok(s)
    }

    /// Serialize as one signed byte per coefficient
    pub fn to_bytes(&self, ctx: &BfvContext) -> Vec<u8> {
        let mut w = Writer::new(BlobKind::SecretKey, ctx.fingerprint(), self.coefficients.len());
        for &c in &self.coefficients {
            w.u8(c as i8 as u8);
        }
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8], ctx: &BfvContext) -> BfvResult<Self> {
        let mut r = Reader::new(bytes, BlobKind::SecretKey, ctx)?;
        let raw = r.bytes(ctx.degree())?;
        r.finish()?;

        let coefficients = raw
            .iter()
            .map(|&b| match b as i8 {
                c @ -1..=1 => Ok(c as i64),
                other => Err(BfvError::Deserialization(format!(
                    "secret key coefficient {other} is not ternary"
                ))),
            })
            .collect::<BfvResult<Vec<_>>>()?;
        Ok(Self { coefficients })
    }
}

impl fmt::Debug for BfvSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BfvSecretKey")
            .field("degree", &self.coefficients.len())
            .finish_non_exhaustive()
    }
}
