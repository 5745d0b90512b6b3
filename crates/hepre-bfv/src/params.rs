//! BFV scheme parameters and named presets

use std::fmt;
use std::str::FromStr;

use crate::error::{BfvError, BfvResult};

/// Variance of the centered binomial error distribution, as sampled by `fhe`
pub const ERROR_VARIANCE: usize = 10;

/// Widest chain modulus the ring arithmetic accepts
pub const MAX_MODULUS_BITS: u32 = 62;

/// Smallest ring degree accepted
pub const MIN_RING_DEGREE: usize = 16;
/// Largest ring degree accepted
pub const MAX_RING_DEGREE: usize = 1 << 15;

/// Minimum headroom, in bits, between the plaintext and ciphertext moduli
const MIN_NOISE_BUDGET_BITS: f64 = 20.0;

/// Bits per digit when decomposing ciphertexts for key switching.
///
/// `DecompositionBaseLog(0)` decomposes along the RNS chain only: one digit
/// per modulus, each as wide as the modulus itself.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DecompositionBaseLog(pub usize);

impl DecompositionBaseLog {
    pub const RNS_ONLY: Self = Self(0);

    pub fn is_rns_only(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for DecompositionBaseLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_rns_only() {
            write!(f, "rns-only")
        } else {
            write!(f, "{} bits", self.0)
        }
    }
}

/// Named parameter presets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ParameterSet {
    /// N = 2048, one 54-bit modulus
    Pn11Qp54,
    /// N = 4096, two 55-bit moduli
    #[default]
    Pn12Qp109,
    /// N = 8192, four 55-bit moduli
    Pn13Qp218,
}

impl ParameterSet {
    pub const ALL: [ParameterSet; 3] = [Self::Pn11Qp54, Self::Pn12Qp109, Self::Pn13Qp218];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Pn11Qp54 => "PN11QP54",
            Self::Pn12Qp109 => "PN12QP109",
            Self::Pn13Qp218 => "PN13QP218",
        }
    }

    pub fn parameters(&self) -> BfvResult<BfvParameters> {
        match self {
            Self::Pn11Qp54 => BfvParameters::new(2048, 67084289, vec![18014398509404161])
                .map(|p| p.with_decomposition_base_log(DecompositionBaseLog(8))),
            Self::Pn12Qp109 => BfvParameters::new(
                4096,
                67084289,
                vec![36028797018652673, 36028797018529793],
            ),
            Self::Pn13Qp218 => BfvParameters::new(
                8192,
                65537,
                vec![
                    36028797018652673,
                    36028797017571329,
                    36028797017456641,
                    36028797017276417,
                ],
            ),
        }
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ParameterSet {
    type Err = BfvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|set| set.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| BfvError::UnknownParameterSet(s.to_string()))
    }
}

/// Shape-checked BFV parameters.
///
/// Primality and NTT support of the moduli are checked by the ring library
/// when a [`BfvContext`](crate::BfvContext) is built from them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BfvParameters {
    ring_degree: usize,
    plaintext_modulus: u64,
    moduli: Vec<u64>,
    decomposition_base_log: DecompositionBaseLog,
}

impl BfvParameters {
    /// Build and validate parameters with RNS-only decomposition
    pub fn new(ring_degree: usize, plaintext_modulus: u64, moduli: Vec<u64>) -> BfvResult<Self> {
        let params = Self {
            ring_degree,
            plaintext_modulus,
            moduli,
            decomposition_base_log: DecompositionBaseLog::RNS_ONLY,
        };
        params.validate()?;
        Ok(params)
    }

    /// Set the default decomposition used when deriving switching keys
    pub fn with_decomposition_base_log(mut self, base_log: DecompositionBaseLog) -> Self {
        self.decomposition_base_log = base_log;
        self
    }

    pub fn ring_degree(&self) -> usize {
        self.ring_degree
    }

    pub fn plaintext_modulus(&self) -> u64 {
        self.plaintext_modulus
    }

    pub fn moduli(&self) -> &[u64] {
        &self.moduli
    }

    pub fn decomposition_base_log(&self) -> DecompositionBaseLog {
        self.decomposition_base_log
    }

    /// Number of plaintext slots, equal to the ring degree
    pub fn slot_count(&self) -> usize {
        self.ring_degree
    }

    /// Standard deviation of the error distribution
    pub fn noise_std_dev(&self) -> f64 {
        (ERROR_VARIANCE as f64).sqrt()
    }

    /// log2 of the ciphertext modulus product
    pub fn log_modulus(&self) -> f64 {
        self.moduli.iter().map(|&q| (q as f64).log2()).sum()
    }

    /// log2(Q / 2t): largest tolerable noise magnitude, in bits
    pub fn noise_budget_bits(&self) -> f64 {
        self.log_modulus() - (self.plaintext_modulus as f64).log2() - 1.0
    }

    /// Short digest identifying every parameter that affects artifact compatibility
    pub fn fingerprint(&self) -> ParameterFingerprint {
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"hepre-bfv/parameters/v1");
        hasher.update(&(self.ring_degree as u64).to_le_bytes());
        hasher.update(&self.plaintext_modulus.to_le_bytes());
        hasher.update(&(self.moduli.len() as u64).to_le_bytes());
        for q in &self.moduli {
            hasher.update(&q.to_le_bytes());
        }
        let digest = hasher.finalize();
        let mut out = [0u8; ParameterFingerprint::LEN];
        out.copy_from_slice(&digest.as_bytes()[..ParameterFingerprint::LEN]);
        ParameterFingerprint(out)
    }

    fn validate(&self) -> BfvResult<()> {
        let n = self.ring_degree;
        if !n.is_power_of_two() || !(MIN_RING_DEGREE..=MAX_RING_DEGREE).contains(&n) {
            return Err(BfvError::InvalidParameters(format!(
                "ring degree {n} must be a power of two in [{MIN_RING_DEGREE}, {MAX_RING_DEGREE}]"
            )));
        }
        let order = 2 * n as u64;

        let t = self.plaintext_modulus;
        if t <= u8::MAX as u64 + 1 {
            return Err(BfvError::InvalidParameters(format!(
                "plaintext modulus {t} cannot hold a byte per slot"
            )));
        }
        if (t - 1) % order != 0 {
            return Err(BfvError::InvalidParameters(format!(
                "plaintext modulus {t} does not support batching at ring degree {n} (needs t = 1 mod {order})"
            )));
        }

        if self.moduli.is_empty() {
            return Err(BfvError::InvalidParameters(
                "ciphertext modulus chain is empty".to_string(),
            ));
        }
        for (i, &q) in self.moduli.iter().enumerate() {
            if q >> MAX_MODULUS_BITS != 0 {
                return Err(BfvError::InvalidParameters(format!(
                    "modulus {q} exceeds {MAX_MODULUS_BITS} bits"
                )));
            }
            if q < 2 || (q - 1) % order != 0 {
                return Err(BfvError::InvalidParameters(format!(
                    "modulus {q} is not an NTT-friendly prime for ring degree {n}"
                )));
            }
            if q == t {
                return Err(BfvError::InvalidParameters(format!(
                    "modulus {q} equals the plaintext modulus"
                )));
            }
            if self.moduli[..i].contains(&q) {
                return Err(BfvError::InvalidParameters(format!(
                    "modulus {q} appears twice in the chain"
                )));
            }
        }

        if self.noise_budget_bits() < MIN_NOISE_BUDGET_BITS {
            return Err(BfvError::InvalidParameters(format!(
                "plaintext modulus {t} leaves only {:.1} bits of noise budget",
                self.noise_budget_bits()
            )));
        }

        Ok(())
    }
}

/// First bytes of a blake3 digest over the compatibility-relevant parameters
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParameterFingerprint(pub [u8; ParameterFingerprint::LEN]);

impl ParameterFingerprint {
    pub const LEN: usize = 8;
}

impl fmt::Display for ParameterFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for ParameterFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParameterFingerprint({self})")
    }
}
