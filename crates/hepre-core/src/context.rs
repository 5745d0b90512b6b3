//! The crypto context: the only component that talks to the BFV layer

use hepre_bfv::{
    BatchEncoder, BfvCiphertext, BfvContext, BfvParameters, BfvPublicKey, BfvSecretKey,
    BfvSwitchingKey, DecompositionBaseLog, ParameterSet, Plaintext,
};
use rand_core::{CryptoRng, RngCore};

use crate::error::CoreResult;
use crate::keys::{Ciphertext, KeyPair, PublicKey, SecretKey, SwitchingKey};

/// Immutable scheme context.
///
/// Built once from a parameter set and shared (by reference or `Arc`) by
/// every operation; there is no process-wide instance. All methods take
/// their key material as arguments and keep no state between calls, so a
/// context can serve concurrent requests from many threads.
#[derive(Debug)]
pub struct CryptoContext {
    parameter_set: Option<ParameterSet>,
    bfv: BfvContext,
}

impl CryptoContext {
    /// Build a context from a named preset such as `"PN12QP109"`
    pub fn initialize(parameter_set_id: &str) -> CoreResult<Self> {
        let set: ParameterSet = parameter_set_id.parse()?;
        let bfv = BfvContext::new(set.parameters()?)?;
        tracing::debug!(
            parameter_set = %set,
            fingerprint = %bfv.fingerprint(),
            "crypto context initialized"
        );
        Ok(Self {
            parameter_set: Some(set),
            bfv,
        })
    }

    /// Build a context from explicit parameters
    pub fn from_parameters(params: BfvParameters) -> CoreResult<Self> {
        Ok(Self {
            parameter_set: None,
            bfv: BfvContext::new(params)?,
        })
    }

    /// The preset this context was initialized from, if any
    pub fn parameter_set(&self) -> Option<ParameterSet> {
        self.parameter_set
    }

    pub fn parameters(&self) -> &BfvParameters {
        self.bfv.params()
    }

    /// Largest byte payload a single ciphertext carries
    pub fn slot_capacity(&self) -> usize {
        self.bfv.slot_count()
    }

    pub fn default_decomposition(&self) -> DecompositionBaseLog {
        self.bfv.params().decomposition_base_log()
    }

    /// Fail if switching keys at `decomposition` would exhaust the noise
    /// budget of a single key switch
    pub fn check_decomposition(&self, decomposition: DecompositionBaseLog) -> CoreResult<()> {
        Ok(self.bfv.check_decomposition(decomposition)?)
    }

    /// Encode bytes into a plaintext, one byte per slot.
    ///
    /// Payloads longer than [`slot_capacity`](Self::slot_capacity) are
    /// rejected rather than truncated.
    pub fn encode(&self, bytes: &[u8]) -> CoreResult<Plaintext> {
        Ok(BatchEncoder::new(&self.bfv).encode_bytes(bytes)?)
    }

    /// Inverse of [`encode`](Self::encode)
    pub fn decode(&self, plaintext: &Plaintext) -> Vec<u8> {
        BatchEncoder::new(&self.bfv).decode_bytes(plaintext)
    }

    /// Encode raw slot values, each below the plaintext modulus
    pub fn encode_slots(&self, values: &[u64]) -> CoreResult<Plaintext> {
        Ok(BatchEncoder::new(&self.bfv).encode(values)?)
    }

    pub fn decode_slots(&self, plaintext: &Plaintext) -> Vec<u64> {
        BatchEncoder::new(&self.bfv).decode(plaintext)
    }

    pub fn generate_key_pair<R: RngCore + CryptoRng>(&self, rng: &mut R) -> CoreResult<KeyPair> {
        let sk = BfvSecretKey::generate(&self.bfv, rng);
        let pk = BfvPublicKey::generate(&self.bfv, &sk, rng)?;
        Ok(KeyPair {
            public: PublicKey {
                bytes: pk.to_bytes(&self.bfv),
            },
            secret: SecretKey {
                bytes: sk.to_bytes(&self.bfv),
            },
        })
    }

    /// Derive a key that moves ciphertexts from `from` to `to`
    pub fn generate_switching_key<R: RngCore + CryptoRng>(
        &self,
        from: &SecretKey,
        to: &SecretKey,
        decomposition: DecompositionBaseLog,
        rng: &mut R,
    ) -> CoreResult<SwitchingKey> {
        let from = BfvSecretKey::from_bytes(from.as_bytes(), &self.bfv)?;
        let to = BfvSecretKey::from_bytes(to.as_bytes(), &self.bfv)?;
        let key = BfvSwitchingKey::generate(&self.bfv, &from, &to, decomposition, rng)?;
        Ok(SwitchingKey {
            bytes: key.to_bytes(&self.bfv),
        })
    }

    /// Probabilistic public-key encryption; the result is at level 0
    pub fn encrypt<R: RngCore + CryptoRng>(
        &self,
        plaintext: &Plaintext,
        public: &PublicKey,
        rng: &mut R,
    ) -> CoreResult<Ciphertext> {
        let pk = BfvPublicKey::from_bytes(public.as_bytes(), &self.bfv)?;
        let ct = hepre_bfv::encrypt(&self.bfv, &pk, plaintext, rng)?;
        Ok(Ciphertext::new(0, ct.to_bytes(&self.bfv)))
    }

    /// Deterministic key switch; raises the ciphertext level by one.
    ///
    /// Nothing checks that `key` was derived for the ciphertext's current
    /// key: a mismatched pair silently produces an undecryptable result.
    pub fn switch_key(&self, ciphertext: &Ciphertext, key: &SwitchingKey) -> CoreResult<Ciphertext> {
        let ct = BfvCiphertext::from_bytes(&ciphertext.bytes, &self.bfv)?;
        let swk = BfvSwitchingKey::from_bytes(key.as_bytes(), &self.bfv)?;
        let switched = hepre_bfv::key_switch(&self.bfv, &ct, &swk)?;
        Ok(Ciphertext::new(
            ciphertext.level.saturating_add(1),
            switched.to_bytes(&self.bfv),
        ))
    }

    /// Decrypt; a key the ciphertext is not bound to yields garbage
    pub fn decrypt(&self, ciphertext: &Ciphertext, secret: &SecretKey) -> CoreResult<Plaintext> {
        let ct = BfvCiphertext::from_bytes(&ciphertext.bytes, &self.bfv)?;
        let sk = BfvSecretKey::from_bytes(secret.as_bytes(), &self.bfv)?;
        Ok(hepre_bfv::decrypt(&self.bfv, &sk, &ct)?)
    }

    /// Check that a public key blob decodes under this context
    pub fn validate_public_key(&self, public: &PublicKey) -> CoreResult<()> {
        BfvPublicKey::from_bytes(public.as_bytes(), &self.bfv)?;
        Ok(())
    }

    pub fn plaintext_to_bytes(&self, plaintext: &Plaintext) -> Vec<u8> {
        plaintext.to_bytes(&self.bfv)
    }

    pub fn plaintext_from_bytes(&self, bytes: &[u8]) -> CoreResult<Plaintext> {
        Ok(Plaintext::from_bytes(bytes, &self.bfv)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use rand_chacha::ChaCha20Rng;
    use rand_core::SeedableRng;

    #[test]
    fn test_unknown_preset_is_configuration_error() {
        assert!(matches!(
            CryptoContext::initialize("PN0QP0"),
            Err(CoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_inconsistent_parameters_are_configuration_errors() {
        // 65539 is prime but not 1 mod 4096, so it has no slots at N = 2048
        let err = BfvParameters::new(2048, 65539, vec![18014398509404161]).unwrap_err();
        assert!(matches!(CoreError::from(err), CoreError::Configuration(_)));
    }

    #[test]
    fn test_check_decomposition() {
        let ctx = CryptoContext::initialize("PN11QP54").unwrap();
        assert!(ctx.check_decomposition(ctx.default_decomposition()).is_ok());
        // One 54-bit digit swamps the single-modulus budget
        assert!(matches!(
            ctx.check_decomposition(DecompositionBaseLog::RNS_ONLY),
            Err(CoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_encode_rejects_oversized() {
        let ctx = CryptoContext::initialize("PN11QP54").unwrap();
        let too_big = vec![7u8; ctx.slot_capacity() + 1];
        assert!(matches!(
            ctx.encode(&too_big),
            Err(CoreError::PayloadTooLarge { size, max }) if size == 2049 && max == 2048
        ));
    }

    #[test]
    fn test_slot_values_above_modulus_are_invalid() {
        let ctx = CryptoContext::initialize("PN11QP54").unwrap();
        assert!(matches!(
            ctx.encode_slots(&[u64::MAX]),
            Err(CoreError::InvalidPlaintext(_))
        ));
    }

    #[test]
    fn test_level_tracking() {
        let ctx = CryptoContext::initialize("PN11QP54").unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(21);
        let alice = ctx.generate_key_pair(&mut rng).unwrap();
        let bob = ctx.generate_key_pair(&mut rng).unwrap();
        let swk = ctx
            .generate_switching_key(
                &alice.secret,
                &bob.secret,
                ctx.default_decomposition(),
                &mut rng,
            )
            .unwrap();

        let ct0 = ctx
            .encrypt(&ctx.encode(b"levels").unwrap(), &alice.public, &mut rng)
            .unwrap();
        assert_eq!(ct0.level(), 0);
        let ct1 = ctx.switch_key(&ct0, &swk).unwrap();
        assert_eq!(ct1.level(), 1);
        assert_eq!(
            ctx.decode(&ctx.decrypt(&ct1, &bob.secret).unwrap()),
            b"levels"
        );
    }

    #[test]
    fn test_explicit_parameters_match_the_preset() {
        let params = ParameterSet::Pn11Qp54.parameters().unwrap();
        let ctx = CryptoContext::from_parameters(params).unwrap();
        assert_eq!(ctx.parameter_set(), None);

        let preset = CryptoContext::initialize("PN11QP54").unwrap();
        assert_eq!(ctx.parameters(), preset.parameters());
        assert_eq!(ctx.default_decomposition(), preset.default_decomposition());

        // Keys from one decode under the other
        let mut rng = ChaCha20Rng::seed_from_u64(5);
        let pair = preset.generate_key_pair(&mut rng).unwrap();
        ctx.validate_public_key(&pair.public).unwrap();
        let ct = ctx
            .encrypt(&ctx.encode(b"explicit").unwrap(), &pair.public, &mut rng)
            .unwrap();
        assert_eq!(
            preset.decode(&preset.decrypt(&ct, &pair.secret).unwrap()),
            b"explicit"
        );
    }

    #[test]
    fn test_slot_values_survive_encryption() {
        let ctx = CryptoContext::initialize("PN11QP54").unwrap();
        let t = ctx.parameters().plaintext_modulus();
        let values = [0, 1, t / 2, t - 1];

        let pt = ctx.encode_slots(&values).unwrap();
        let slots = ctx.decode_slots(&pt);
        assert_eq!(slots.len(), ctx.slot_capacity());
        assert_eq!(&slots[..values.len()], &values);
        assert!(slots[values.len()..].iter().all(|&v| v == 0));

        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let pair = ctx.generate_key_pair(&mut rng).unwrap();
        let ct = ctx.encrypt(&pt, &pair.public, &mut rng).unwrap();
        let decrypted = ctx.decrypt(&ct, &pair.secret).unwrap();
        assert_eq!(ctx.decode_slots(&decrypted), slots);
    }

    #[test]
    fn test_plaintext_blob_round_trip() {
        let ctx = CryptoContext::initialize("PN11QP54").unwrap();
        let pt = ctx.encode(b"blob").unwrap();
        let restored = ctx
            .plaintext_from_bytes(&ctx.plaintext_to_bytes(&pt))
            .unwrap();
        assert_eq!(restored, pt);
    }
}
