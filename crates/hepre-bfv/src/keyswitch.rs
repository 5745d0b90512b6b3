//! Key switching: re-target a ciphertext from one secret key to another

use fhe_math::rq::traits::TryConvertFrom;
use fhe_math::rq::{Poly, Representation};

use crate::ciphertext::BfvCiphertext;
use crate::context::BfvContext;
use crate::error::BfvResult;
use crate::keys::BfvSwitchingKey;

/// Apply `key` to `ciphertext`.
///
/// Deterministic and secret-free. `c1` is split into digits per chain
/// modulus, each digit is multiplied against the matching key entry, and
/// the accumulated pair replaces `c1 * s_from` with an encryption under
/// `s_to`. A key derived for a different source yields garbage, not an error.
pub fn key_switch(
    ctx: &BfvContext,
    ciphertext: &BfvCiphertext,
    key: &BfvSwitchingKey,
) -> BfvResult<BfvCiphertext> {
    let ring = ctx.ring();
    let base_log = key.base_log();
    let levels = ctx.decomposition_levels(base_log);
    let mask = if base_log.is_rns_only() {
        u64::MAX
    } else {
        (1u64 << base_log.0) - 1
    };

    let mut c1 = ciphertext.inner[1].clone();
    c1.change_representation(Representation::PowerBasis);
    let residues = c1.coefficients();

    let mut acc_b = Poly::zero(ring, Representation::Ntt);
    let mut acc_a = Poly::zero(ring, Representation::Ntt);
    let mut entries = key.entries.iter();

    for (i, &level_count) in levels.iter().enumerate() {
        let source = residues.row(i);
        for k in 0..level_count {
            let shift = base_log.0 * k;
            // The digit is a small integer; lift it to every chain modulus
            let mut digits = Vec::with_capacity(ctx.moduli().len() * ctx.degree());
            for q in ctx.moduli() {
                digits.extend(source.iter().map(|&c| q.reduce((c >> shift) & mask)));
            }
            let mut digit =
                Poly::try_convert_from(digits, ring, true, Representation::PowerBasis)?;
            digit.change_representation(Representation::Ntt);

            // Entry count matches the levels; checked on deserialization
            if let Some((b, a)) = entries.next() {
                acc_b += &(&digit * b);
                acc_a += &(&digit * a);
            }
        }
    }

    let c0 = &ciphertext.inner[0] + &acc_b;
    BfvCiphertext::from_parts(ctx, c0, acc_a)
}
