//! Transport-agnostic request handling
//!
//! Each operation loads its key material from storage, runs the crypto on
//! the blocking pool, and persists what it issues. Keys and ciphertexts
//! cross this boundary as base64 strings.

use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hepre_core::{
    Ciphertext, CoreError, CoreResult, CryptoContext, DecompositionBaseLog, KeyStoreManager,
    MessageState, PublicKey, ReEncryptionPipeline, SecretKey, SwitchingKey,
};
use hepre_storage::{ArtifactKind, KeyRef, KeyStorage, StorageError};
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use zeroize::Zeroizing;

/// Per-request failures, each with a stable numeric code
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Malformed blob: {0}")]
    Malformed(String),

    #[error("Parameter mismatch: {0}")]
    ParameterMismatch(String),

    #[error("Payload of {size} bytes exceeds the {max}-byte capacity of one ciphertext")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type GatewayResult<T> = Result<T, GatewayError>;

impl GatewayError {
    /// Response code; 0 is reserved for success
    pub fn code(&self) -> i32 {
        match self {
            GatewayError::InvalidRequest(_) => -1,
            GatewayError::NotFound(_) => -2,
            GatewayError::Malformed(_) => -3,
            GatewayError::ParameterMismatch(_) => -4,
            GatewayError::PayloadTooLarge { .. } => -5,
            GatewayError::Forbidden(_) => -6,
            GatewayError::Internal(_) => -7,
            GatewayError::Conflict(_) => -8,
        }
    }
}

impl From<CoreError> for GatewayError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Configuration(msg) => GatewayError::Internal(msg),
            CoreError::Deserialization(msg) => GatewayError::Malformed(msg),
            CoreError::ParameterMismatch(msg) => GatewayError::ParameterMismatch(msg),
            CoreError::PayloadTooLarge { size, max } => GatewayError::PayloadTooLarge { size, max },
            CoreError::InvalidPlaintext(msg) => GatewayError::InvalidRequest(msg),
            err @ CoreError::InvalidTransition { .. } => {
                GatewayError::InvalidRequest(err.to_string())
            }
            CoreError::Scheme(msg) => GatewayError::Internal(msg),
        }
    }
}

impl From<StorageError> for GatewayError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(name) => GatewayError::NotFound(name),
            err @ StorageError::InvalidPrincipal(_) => GatewayError::InvalidRequest(err.to_string()),
            err @ StorageError::Corrupt { .. } => GatewayError::Malformed(err.to_string()),
            err @ (StorageError::Io(_) | StorageError::Backend(_)) => {
                GatewayError::Internal(err.to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedKeys {
    pub username: String,
    pub public_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IssuedSwitchingKey {
    pub publisher: String,
    pub subscriber: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CiphertextOutput {
    pub ciphertext: String,
    pub level: u8,
    pub state: MessageState,
}

impl From<&Ciphertext> for CiphertextOutput {
    fn from(ct: &Ciphertext) -> Self {
        Self {
            ciphertext: ct.to_base64(),
            level: ct.level(),
            state: ct.state(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlaintextOutput {
    pub plaintext: String,
}

/// Strip a trailing `.sk`, `.pk` or `.swk`, so a key file name also works
/// as a reference to its owner
fn principal_of(reference: &str) -> &str {
    ArtifactKind::ALL
        .iter()
        .find_map(|kind| {
            reference
                .strip_suffix(kind.extension())
                .and_then(|rest| rest.strip_suffix('.'))
        })
        .unwrap_or(reference)
}

/// Reject names that `principal_of` would rewrite, so every issued
/// principal can be referenced by its bare name
fn check_username(username: &str) -> GatewayResult<()> {
    if principal_of(username) == username {
        Ok(())
    } else {
        Err(GatewayError::InvalidRequest(format!(
            "username {username:?} must not end in .sk, .pk or .swk"
        )))
    }
}

pub struct RequestGateway {
    context: Arc<CryptoContext>,
    storage: Arc<dyn KeyStorage>,
    decomposition: DecompositionBaseLog,
    allow_proxy_key_derivation: bool,
    // Held from the existence check until the last write of an issuance
    issuing: Mutex<()>,
}

impl RequestGateway {
    /// Gateway using the context's default decomposition, with proxy-side
    /// derivation disabled
    pub fn new(context: Arc<CryptoContext>, storage: Arc<dyn KeyStorage>) -> Self {
        let decomposition = context.default_decomposition();
        Self {
            context,
            storage,
            decomposition,
            allow_proxy_key_derivation: false,
            issuing: Mutex::new(()),
        }
    }

    pub fn with_decomposition(mut self, decomposition: DecompositionBaseLog) -> Self {
        self.decomposition = decomposition;
        self
    }

    pub fn with_proxy_key_derivation(mut self, allowed: bool) -> Self {
        self.allow_proxy_key_derivation = allowed;
        self
    }

    pub fn context(&self) -> &CryptoContext {
        &self.context
    }

    /// Generate and store `{username}.sk` and `{username}.pk`.
    ///
    /// Fails with [`GatewayError::Conflict`] if anything is already stored
    /// under `username`; issued keys are never replaced.
    pub async fn issue_publisher_keys(&self, username: &str) -> GatewayResult<IssuedKeys> {
        check_username(username)?;
        let sk_ref = KeyRef::new(username, ArtifactKind::SecretKey)?;
        let pk_ref = KeyRef::new(username, ArtifactKind::PublicKey)?;

        let _issuing = self.issuing.lock().await;
        self.ensure_unissued(username).await?;

        let pair = self
            .blocking(|ctx| KeyStoreManager::new(ctx).generate_publisher_keys())
            .await?;

        self.persist(&[
            (&sk_ref, pair.secret.as_bytes()),
            (&pk_ref, pair.public.as_bytes()),
        ])
        .await?;
        tracing::info!(principal = username, "publisher keys issued");

        Ok(IssuedKeys {
            username: username.to_string(),
            public_key: pair.public.to_base64(),
        })
    }

    /// Generate a subscriber key pair plus its switching key from the
    /// publisher's stored secret; stores `{username}.sk|pk|swk`.
    ///
    /// The switching key is written last, so a proxy never holds a key for
    /// a subscriber whose key pair failed to persist. Same conflict rule as
    /// [`issue_publisher_keys`](Self::issue_publisher_keys).
    pub async fn issue_subscriber_keys(
        &self,
        username: &str,
        publisher: &str,
    ) -> GatewayResult<IssuedKeys> {
        check_username(username)?;
        let publisher = principal_of(publisher);
        if username == publisher {
            return Err(GatewayError::InvalidRequest(format!(
                "{username} cannot subscribe to itself"
            )));
        }
        let sk_ref = KeyRef::new(username, ArtifactKind::SecretKey)?;
        let pk_ref = KeyRef::new(username, ArtifactKind::PublicKey)?;
        let swk_ref = KeyRef::new(username, ArtifactKind::SwitchingKey)?;

        let _issuing = self.issuing.lock().await;
        self.ensure_unissued(username).await?;
        let publisher_secret = self.load_secret(publisher).await?;

        let decomposition = self.decomposition;
        let grant = self
            .blocking(move |ctx| {
                KeyStoreManager::new(ctx)
                    .with_decomposition(decomposition)
                    .issue_subscriber(&publisher_secret)
            })
            .await?;

        self.persist(&[
            (&sk_ref, grant.key_pair.secret.as_bytes()),
            (&pk_ref, grant.key_pair.public.as_bytes()),
            (&swk_ref, grant.switching_key.as_bytes()),
        ])
        .await?;
        tracing::info!(principal = username, publisher, "subscriber keys issued");

        Ok(IssuedKeys {
            username: username.to_string(),
            public_key: grant.key_pair.public.to_base64(),
        })
    }

    /// Derive `{subscriber}.swk` from two independently issued secret keys.
    ///
    /// Refused unless enabled: this process sees both secrets.
    pub async fn derive_switching_key(
        &self,
        publisher: &str,
        subscriber: &str,
    ) -> GatewayResult<IssuedSwitchingKey> {
        if !self.allow_proxy_key_derivation {
            return Err(GatewayError::Forbidden(
                "proxy-side switching key derivation is disabled".into(),
            ));
        }
        let publisher = principal_of(publisher);
        let subscriber = principal_of(subscriber);
        tracing::warn!(
            publisher,
            subscriber,
            "deriving switching key from two secret keys held by the proxy"
        );

        let swk_ref = KeyRef::new(subscriber, ArtifactKind::SwitchingKey)?;
        let publisher_secret = self.load_secret(publisher).await?;
        let subscriber_secret = self.load_secret(subscriber).await?;

        let decomposition = self.decomposition;
        let key = self
            .blocking(move |ctx| {
                KeyStoreManager::new(ctx)
                    .with_decomposition(decomposition)
                    .derive_switching_key(&publisher_secret, &subscriber_secret)
            })
            .await?;
        self.storage.put(&swk_ref, key.as_bytes()).await?;

        Ok(IssuedSwitchingKey {
            publisher: publisher.to_string(),
            subscriber: subscriber.to_string(),
        })
    }

    /// Encrypt a base64 payload under the publisher's public key
    pub async fn encrypt(
        &self,
        publisher: &str,
        plaintext_b64: &str,
    ) -> GatewayResult<CiphertextOutput> {
        let plaintext = Zeroizing::new(
            STANDARD
                .decode(plaintext_b64.trim())
                .map_err(|e| GatewayError::InvalidRequest(format!("plaintext is not base64: {e}")))?,
        );
        let public = PublicKey::from_bytes(
            &self
                .load(principal_of(publisher), ArtifactKind::PublicKey)
                .await?,
        )?;

        let ct = self
            .blocking(move |ctx| {
                ReEncryptionPipeline::new(ctx).encrypt_for_publisher(&plaintext, &public)
            })
            .await?;
        tracing::info!(
            publisher = principal_of(publisher),
            level = ct.level(),
            "payload encrypted"
        );
        Ok(CiphertextOutput::from(&ct))
    }

    /// Re-target a ciphertext with the switching key stored for `subscriber`
    pub async fn re_encrypt(
        &self,
        subscriber: &str,
        ciphertext_b64: &str,
    ) -> GatewayResult<CiphertextOutput> {
        let ciphertext = Ciphertext::from_base64(ciphertext_b64.trim())?;
        let key = SwitchingKey::from_bytes(
            &self
                .load(principal_of(subscriber), ArtifactKind::SwitchingKey)
                .await?,
        )?;

        let ct = self
            .blocking(move |ctx| ReEncryptionPipeline::new(ctx).re_encrypt(&ciphertext, &key))
            .await?;
        tracing::info!(
            subscriber = principal_of(subscriber),
            level = ct.level(),
            "ciphertext re-encrypted"
        );
        Ok(CiphertextOutput::from(&ct))
    }

    /// Decrypt with the subscriber's stored secret key
    pub async fn decrypt(
        &self,
        subscriber: &str,
        ciphertext_b64: &str,
    ) -> GatewayResult<PlaintextOutput> {
        let ciphertext = Ciphertext::from_base64(ciphertext_b64.trim())?;
        let secret = self.load_secret(principal_of(subscriber)).await?;

        let plaintext = self
            .blocking(move |ctx| {
                ReEncryptionPipeline::new(ctx).decrypt_for_subscriber(&ciphertext, &secret)
            })
            .await?;
        tracing::info!(subscriber = principal_of(subscriber), "ciphertext decrypted");

        Ok(PlaintextOutput {
            plaintext: STANDARD.encode(&*plaintext),
        })
    }

    async fn ensure_unissued(&self, principal: &str) -> GatewayResult<()> {
        for kind in ArtifactKind::ALL {
            let key = KeyRef::new(principal, kind)?;
            if self.storage.exists(&key).await? {
                return Err(GatewayError::Conflict(format!(
                    "{key} already exists; keys for {principal} were issued before"
                )));
            }
        }
        Ok(())
    }

    /// Write blobs in order. On failure, delete the ones already written
    /// and return the original error.
    async fn persist(&self, blobs: &[(&KeyRef, &[u8])]) -> GatewayResult<()> {
        for (written, (key, blob)) in blobs.iter().enumerate() {
            if let Err(err) = self.storage.put(key, blob).await {
                for (done, _) in &blobs[..written] {
                    if let Err(cleanup) = self.storage.delete(done).await {
                        tracing::error!(key = %done, error = %cleanup, "rollback failed");
                    }
                }
                tracing::warn!(key = %key, error = %err, "issuance rolled back");
                return Err(err.into());
            }
        }
        Ok(())
    }

    async fn load(&self, principal: &str, kind: ArtifactKind) -> GatewayResult<Vec<u8>> {
        let key = KeyRef::new(principal, kind)?;
        Ok(self.storage.get(&key).await?)
    }

    async fn load_secret(&self, principal: &str) -> GatewayResult<SecretKey> {
        let raw = Zeroizing::new(self.load(principal, ArtifactKind::SecretKey).await?);
        Ok(SecretKey::from_bytes(&raw)?)
    }

    /// Run a crypto operation on the blocking pool
    async fn blocking<T, F>(&self, op: F) -> GatewayResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&CryptoContext) -> CoreResult<T> + Send + 'static,
    {
        let context = Arc::clone(&self.context);
        tokio::task::spawn_blocking(move || op(&context))
            .await
            .map_err(|e| GatewayError::Internal(format!("crypto task failed: {e}")))?
            .map_err(GatewayError::from)
    }
}
