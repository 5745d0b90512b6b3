//! Key switching keys
//!
//! A switching key from `s_from` to `s_to` holds, for every chain modulus
//! `i` and digit `k`, an encryption under `s_to` of `g_ik * s_from`, where
//! `g_ik` is `2^(base_log * k)` on modulus `i` and zero on the others.
//! Digit `k` of a ciphertext's residue mod `q_i` multiplied against entry
//! `(i, k)` and summed reconstructs `c1 * s_from` under `s_to`.

use fhe_math::rq::traits::TryConvertFrom;
use fhe_math::rq::{Poly, Representation};
use rand_core::{CryptoRng, RngCore};

use super::secret::BfvSecretKey;
use crate::codec::{self, BlobKind, Reader, Writer};
use crate::context::BfvContext;
use crate::error::{BfvError, BfvResult};
use crate::params::{DecompositionBaseLog, ERROR_VARIANCE, MAX_MODULUS_BITS};

/// Directional key switching material, stored in NTT form
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BfvSwitchingKey {
    base_log: DecompositionBaseLog,
    /// One `(b, a)` pair per (modulus, digit), modulus-major
    pub(crate) entries: Vec<(Poly, Poly)>,
}

impl BfvSwitchingKey {
    /// Derive a key that moves ciphertexts from `from` to `to`.
    ///
    /// Needs both secret keys; whoever runs this learns both.
    pub fn generate<R: RngCore + CryptoRng>(
        ctx: &BfvContext,
        from: &BfvSecretKey,
        to: &BfvSecretKey,
        base_log: DecompositionBaseLog,
        rng: &mut R,
    ) -> BfvResult<Self> {
        ctx.check_decomposition(base_log)?;

        let ring = ctx.ring();
        let s_from = from.to_ntt(ctx)?;
        let s_to = to.to_ntt(ctx)?;
        let levels = ctx.decomposition_levels(base_log);
        let mut entries = Vec::with_capacity(levels.iter().sum());

        for (i, (&level_count, q)) in levels.iter().zip(ctx.moduli()).enumerate() {
            for k in 0..level_count {
                let gadget = if base_log.is_rns_only() {
                    1
                } else {
                    q.reduce(1u64 << (base_log.0 * k))
                };
                let factor = gadget_poly(ctx, i, gadget)?;

                let a = Poly::random(ring, Representation::Ntt, rng);
                let e = Poly::small(ring, Representation::Ntt, ERROR_VARIANCE, rng)?;
                // b = e - a * s_to + g_ik * s_from
                let b = &(&e - &(&a * &*s_to)) + &(&factor * &*s_from);
                entries.push((b, a));
            }
        }

        Ok(Self { base_log, entries })
    }

    pub fn base_log(&self) -> DecompositionBaseLog {
        self.base_log
    }

    /// Total number of (modulus, digit) entries
    pub fn level_count(&self) -> usize {
        self.entries.len()
    }

    pub fn to_bytes(&self, ctx: &BfvContext) -> Vec<u8> {
        let mut w = Writer::new(
            BlobKind::SwitchingKey,
            ctx.fingerprint(),
            5 + 2 * self.entries.len() * codec::poly_len(ctx),
        );
        w.u8(self.base_log.0 as u8);
        w.u32(self.entries.len() as u32);
        for (b, a) in &self.entries {
            w.poly(b);
            w.poly(a);
        }
        w.finish()
    }

    pub fn from_bytes(bytes: &[u8], ctx: &BfvContext) -> BfvResult<Self> {
        let mut r = Reader::new(bytes, BlobKind::SwitchingKey, ctx)?;
        let base_log = DecompositionBaseLog(r.u8()? as usize);
        if base_log.0 > MAX_MODULUS_BITS as usize {
            return Err(BfvError::Deserialization(format!(
                "switching key base log {} out of range",
                base_log.0
            )));
        }
        let count = r.u32()? as usize;

        let expected: usize = ctx.decomposition_levels(base_log).iter().sum();
        if count != expected {
            return Err(BfvError::Deserialization(format!(
                "switching key has {count} entries, decomposition {base_log} needs {expected}"
            )));
        }

        let mut entries = Vec::with_capacity(count);
        for _ in 0..count {
            let b = r.poly(ctx, Representation::Ntt)?;
            let a = r.poly(ctx, Representation::Ntt)?;
            entries.push((b, a));
        }
        r.finish()?;
        Ok(Self { base_log, entries })
    }
}

/// The constant `value` on chain modulus `modulus` and zero on the others.
///
/// A constant polynomial has the same value at every NTT evaluation point,
/// so the NTT form is filled directly.
fn gadget_poly(ctx: &BfvContext, modulus: usize, value: u64) -> BfvResult<Poly> {
    let degree = ctx.degree();
    let mut residues = vec![0u64; ctx.moduli().len() * degree];
    residues[modulus * degree..(modulus + 1) * degree].fill(value);
    Ok(Poly::try_convert_from(
        residues,
        ctx.ring(),
        true,
        Representation::Ntt,
    )?)
}
