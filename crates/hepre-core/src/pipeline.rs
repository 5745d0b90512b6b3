//! Encrypt, re-encrypt and decrypt as independent stages
//!
//! Every stage is a pure function of its inputs: nothing is cached between
//! calls, so each can be retried or run on another thread.

use hepre_bfv::fresh_rng;
use rand_core::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::context::CryptoContext;
use crate::error::{CoreError, CoreResult};
use crate::keys::{Ciphertext, PublicKey, SecretKey, SwitchingKey};
use crate::state::{MessageState, Transition};

/// Check a stage against the message state machine
fn advance(from: MessageState, transition: Transition) -> CoreResult<MessageState> {
    from.apply(transition)
        .ok_or(CoreError::InvalidTransition { from, transition })
}

pub struct ReEncryptionPipeline<'a> {
    context: &'a CryptoContext,
}

impl<'a> ReEncryptionPipeline<'a> {
    pub fn new(context: &'a CryptoContext) -> Self {
        Self { context }
    }

    /// Maximum plaintext size in bytes
    pub fn capacity(&self) -> usize {
        self.context.slot_capacity()
    }

    /// Encrypt a payload under the publisher's public key
    pub fn encrypt_for_publisher(
        &self,
        plaintext: &[u8],
        publisher_public: &PublicKey,
    ) -> CoreResult<Ciphertext> {
        self.encrypt_for_publisher_with_rng(plaintext, publisher_public, &mut fresh_rng())
    }

    pub fn encrypt_for_publisher_with_rng<R: RngCore + CryptoRng>(
        &self,
        plaintext: &[u8],
        publisher_public: &PublicKey,
        rng: &mut R,
    ) -> CoreResult<Ciphertext> {
        let next = advance(MessageState::Plaintext, Transition::Encrypt)?;
        let max = self.capacity();
        if plaintext.len() > max {
            return Err(CoreError::PayloadTooLarge {
                size: plaintext.len(),
                max,
            });
        }
        let encoded = self.context.encode(plaintext)?;
        let ciphertext = self.context.encrypt(&encoded, publisher_public, rng)?;
        debug_assert_eq!(ciphertext.state(), next);
        tracing::debug!(size = plaintext.len(), state = %next, "payload encrypted");
        Ok(ciphertext)
    }

    /// Re-target a ciphertext with a switching key; needs no secret key
    pub fn re_encrypt(
        &self,
        ciphertext: &Ciphertext,
        switching_key: &SwitchingKey,
    ) -> CoreResult<Ciphertext> {
        let next = advance(ciphertext.state(), Transition::ReEncrypt)?;
        let switched = self.context.switch_key(ciphertext, switching_key)?;
        tracing::debug!(
            level = switched.level(),
            state = %next,
            "ciphertext re-encrypted"
        );
        Ok(switched)
    }

    /// Decrypt with the subscriber's secret key.
    ///
    /// A key the ciphertext is not bound to returns unrelated bytes.
    pub fn decrypt_for_subscriber(
        &self,
        ciphertext: &Ciphertext,
        subscriber_secret: &SecretKey,
    ) -> CoreResult<Zeroizing<Vec<u8>>> {
        let next = advance(ciphertext.state(), Transition::Decrypt)?;
        let plaintext = self.context.decrypt(ciphertext, subscriber_secret)?;
        let bytes = Zeroizing::new(self.context.decode(&plaintext));
        tracing::debug!(level = ciphertext.level(), state = %next, "ciphertext decrypted");
        Ok(bytes)
    }
}
