//! Issuing key pairs and switching keys
//!
//! # Deployment contract
//!
//! A switching key can only be derived by a party holding *both* secret
//! keys, and whoever derives it learns both. Two orderings exist:
//!
//! - **Single generating party** ([`KeyStoreManager::issue_subscriber`]):
//!   the environment that already holds the publisher's secret key
//!   generates the subscriber's key pair and the switching key in one step,
//!   then hands the subscriber its secret key and the proxy only the
//!   switching key. No party that should not see a secret key ever does.
//!
//! - **Independent issuance** ([`KeyStoreManager::derive_switching_key`]):
//!   publisher and subscriber keys are generated separately and later fed
//!   together into derivation. This is only sound where both parties trust
//!   the deriving environment. It must not run on a proxy that is supposed
//!   to stay blind to plaintexts.

use hepre_bfv::{DecompositionBaseLog, fresh_rng};
use rand_core::{CryptoRng, RngCore};

use crate::context::CryptoContext;
use crate::error::CoreResult;
use crate::keys::{KeyPair, SecretKey, SwitchingKey};

/// Who a key pair is issued to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Publisher,
    Subscriber,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Publisher => f.write_str("publisher"),
            Role::Subscriber => f.write_str("subscriber"),
        }
    }
}

/// A subscriber's key pair together with the switching key that lets a
/// proxy re-encrypt the publisher's ciphertexts for it
pub struct SubscriberGrant {
    pub key_pair: KeyPair,
    pub switching_key: SwitchingKey,
}

pub struct KeyStoreManager<'a> {
    context: &'a CryptoContext,
    decomposition: DecompositionBaseLog,
}

impl<'a> KeyStoreManager<'a> {
    /// Manager using the context's default decomposition
    pub fn new(context: &'a CryptoContext) -> Self {
        Self {
            context,
            decomposition: context.default_decomposition(),
        }
    }

    pub fn with_decomposition(mut self, decomposition: DecompositionBaseLog) -> Self {
        self.decomposition = decomposition;
        self
    }

    pub fn decomposition(&self) -> DecompositionBaseLog {
        self.decomposition
    }

    pub fn generate_publisher_keys(&self) -> CoreResult<KeyPair> {
        self.generate_publisher_keys_with_rng(&mut fresh_rng())
    }

    pub fn generate_publisher_keys_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> CoreResult<KeyPair> {
        self.generate(Role::Publisher, rng)
    }

    pub fn generate_subscriber_keys(&self) -> CoreResult<KeyPair> {
        self.generate_subscriber_keys_with_rng(&mut fresh_rng())
    }

    pub fn generate_subscriber_keys_with_rng<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> CoreResult<KeyPair> {
        self.generate(Role::Subscriber, rng)
    }

    /// Derive the publisher-to-subscriber switching key from both secrets.
    ///
    /// See the module docs: the caller vouches that this runs somewhere
    /// both parties trust.
    pub fn derive_switching_key(
        &self,
        publisher_secret: &SecretKey,
        subscriber_secret: &SecretKey,
    ) -> CoreResult<SwitchingKey> {
        self.derive_switching_key_with_rng(publisher_secret, subscriber_secret, &mut fresh_rng())
    }

    pub fn derive_switching_key_with_rng<R: RngCore + CryptoRng>(
        &self,
        publisher_secret: &SecretKey,
        subscriber_secret: &SecretKey,
        rng: &mut R,
    ) -> CoreResult<SwitchingKey> {
        self.derive_switching_key_with_decomposition(
            publisher_secret,
            subscriber_secret,
            self.decomposition,
            rng,
        )
    }

    /// Derive with an explicit digit size instead of the manager's default.
    ///
    /// The decomposition is checked against the noise budget of the context
    /// before any key material is sampled.
    pub fn derive_switching_key_with_decomposition<R: RngCore + CryptoRng>(
        &self,
        publisher_secret: &SecretKey,
        subscriber_secret: &SecretKey,
        decomposition: DecompositionBaseLog,
        rng: &mut R,
    ) -> CoreResult<SwitchingKey> {
        let key = self.context.generate_switching_key(
            publisher_secret,
            subscriber_secret,
            decomposition,
            rng,
        )?;
        tracing::debug!(
            %decomposition,
            size = key.as_bytes().len(),
            "switching key derived"
        );
        Ok(key)
    }

    /// Generate a subscriber key pair and its switching key in one step
    pub fn issue_subscriber(&self, publisher_secret: &SecretKey) -> CoreResult<SubscriberGrant> {
        self.issue_subscriber_with_rng(publisher_secret, &mut fresh_rng())
    }

    pub fn issue_subscriber_with_rng<R: RngCore + CryptoRng>(
        &self,
        publisher_secret: &SecretKey,
        rng: &mut R,
    ) -> CoreResult<SubscriberGrant> {
        let key_pair = self.generate(Role::Subscriber, rng)?;
        let switching_key =
            self.derive_switching_key_with_rng(publisher_secret, &key_pair.secret, rng)?;
        Ok(SubscriberGrant {
            key_pair,
            switching_key,
        })
    }

    fn generate<R: RngCore + CryptoRng>(&self, role: Role, rng: &mut R) -> CoreResult<KeyPair> {
        let pair = self.context.generate_key_pair(rng)?;
        tracing::debug!(%role, "key pair generated");
        Ok(pair)
    }
}
