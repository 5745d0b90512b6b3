//! Scheme state shared by every BFV operation

use std::sync::Arc;

use fhe::bfv::{self, BfvParametersBuilder, Encoding};
use fhe_math::rq;
use fhe_math::zq::Modulus;
use fhe_traits::FheEncoder;

use crate::error::{BfvError, BfvResult};
use crate::params::{BfvParameters, DecompositionBaseLog, MAX_MODULUS_BITS, ParameterFingerprint};

/// Noise headroom, in bits, kept in reserve when accepting a decomposition
const KEY_SWITCH_MARGIN_BITS: f64 = 2.0;

/// Immutable, thread-safe scheme context.
///
/// Wraps the `fhe` parameters used for encryption and decryption together
/// with the ring context the switching-key arithmetic runs in.
#[derive(Clone, Debug)]
pub struct BfvContext {
    params: BfvParameters,
    fingerprint: ParameterFingerprint,
    scheme: Arc<bfv::BfvParameters>,
    ring: Arc<rq::Context>,
    moduli: Vec<Modulus>,
}

impl BfvContext {
    pub fn new(params: BfvParameters) -> BfvResult<Self> {
        let invalid = |e: &dyn std::fmt::Display| BfvError::InvalidParameters(e.to_string());

        let scheme = BfvParametersBuilder::new()
            .set_degree(params.ring_degree())
            .set_plaintext_modulus(params.plaintext_modulus())
            .set_moduli(params.moduli())
            .build_arc()
            .map_err(|e| invalid(&e))?;
        let ring = Arc::new(
            rq::Context::new(params.moduli(), params.ring_degree()).map_err(|e| invalid(&e))?,
        );
        let moduli = params
            .moduli()
            .iter()
            .map(|&q| Modulus::new(q))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| invalid(&e))?;

        // A composite t passes the shape checks but cannot batch
        let zeros = vec![0u64; params.slot_count()];
        bfv::Plaintext::try_encode(&zeros, Encoding::simd(), &scheme).map_err(|e| {
            BfvError::InvalidParameters(format!(
                "plaintext modulus {} does not support batching: {e}",
                params.plaintext_modulus()
            ))
        })?;

        Ok(Self {
            fingerprint: params.fingerprint(),
            params,
            scheme,
            ring,
            moduli,
        })
    }

    pub fn params(&self) -> &BfvParameters {
        &self.params
    }

    pub fn fingerprint(&self) -> ParameterFingerprint {
        self.fingerprint
    }

    pub fn degree(&self) -> usize {
        self.params.ring_degree()
    }

    pub fn slot_count(&self) -> usize {
        self.params.slot_count()
    }

    pub(crate) fn scheme(&self) -> &Arc<bfv::BfvParameters> {
        &self.scheme
    }

    /// `Z_Q[X]/(X^N + 1)` over the full chain
    pub(crate) fn ring(&self) -> &Arc<rq::Context> {
        &self.ring
    }

    pub(crate) fn moduli(&self) -> &[Modulus] {
        &self.moduli
    }

    /// Digits per chain modulus under the given decomposition
    pub fn decomposition_levels(&self, base_log: DecompositionBaseLog) -> Vec<usize> {
        self.params
            .moduli()
            .iter()
            .map(|&q| {
                if base_log.is_rns_only() {
                    1
                } else {
                    (u64::BITS - q.leading_zeros()).div_ceil(base_log.0 as u32) as usize
                }
            })
            .collect()
    }

    /// Reject decompositions whose key-switching noise would overrun the budget.
    ///
    /// The estimate is `B * sqrt(L * N) * 6 sigma` for digit bound `B` over
    /// `L` digits, which tracks the measured growth within a bit or two.
    pub fn check_decomposition(&self, base_log: DecompositionBaseLog) -> BfvResult<()> {
        if base_log.0 > MAX_MODULUS_BITS as usize {
            return Err(BfvError::Decomposition(format!(
                "base log {} exceeds the widest modulus",
                base_log.0
            )));
        }
        let max_bits = self
            .params
            .moduli()
            .iter()
            .map(|q| (u64::BITS - q.leading_zeros()) as usize)
            .max()
            .unwrap_or(0);

        let digit_bits = if base_log.is_rns_only() {
            max_bits
        } else {
            base_log.0.min(max_bits)
        } as f64;
        let levels: usize = self.decomposition_levels(base_log).iter().sum();
        let sigma = self.params.noise_std_dev();
        let estimate = digit_bits
            + 0.5 * ((levels * self.degree()) as f64).log2()
            + (6.0 * sigma).log2()
            + KEY_SWITCH_MARGIN_BITS;
        let budget = self.params.noise_budget_bits();

        if estimate > budget {
            return Err(BfvError::Decomposition(format!(
                "decomposition {base_log} needs about {estimate:.1} bits of noise budget, {budget:.1} available"
            )));
        }
        Ok(())
    }
}
