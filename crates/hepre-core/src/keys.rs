//! Key material and ciphertexts as opaque, serializable blobs
//!
//! Each type wraps the binary form produced by the BFV layer. Construction
//! only checks the artifact kind; the parameter fingerprint and the full
//! structure are checked when a [`CryptoContext`](crate::CryptoContext)
//! decodes the blob for use.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hepre_bfv::BlobKind;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CoreError, CoreResult};
use crate::state::MessageState;

fn check_kind(bytes: &[u8], expected: BlobKind) -> CoreResult<()> {
    let found = BlobKind::peek(bytes)?;
    if found != expected {
        return Err(CoreError::Deserialization(format!(
            "expected {expected:?} blob, found {found:?}"
        )));
    }
    Ok(())
}

fn decode_base64(encoded: &str, what: &str) -> CoreResult<Vec<u8>> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| CoreError::Deserialization(format!("invalid base64 {what}: {e}")))
}

/// A principal's public key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    pub(crate) bytes: Vec<u8>,
}

impl PublicKey {
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        check_kind(bytes, BlobKind::PublicKey)?;
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn from_base64(encoded: &str) -> CoreResult<Self> {
        Self::from_bytes(&decode_base64(encoded, "public key")?)
    }
}

/// A principal's secret key (zeroized on drop)
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SecretKey {
    pub(crate) bytes: Vec<u8>,
}

impl SecretKey {
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        check_kind(bytes, BlobKind::SecretKey)?;
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn from_base64(encoded: &str) -> CoreResult<Self> {
        let mut raw = decode_base64(encoded, "secret key")?;
        let key = Self::from_bytes(&raw);
        raw.zeroize();
        key
    }
}

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

/// A key pair generated together
pub struct KeyPair {
    pub public: PublicKey,
    pub secret: SecretKey,
}

/// Moves ciphertexts from one secret key to another.
///
/// Bound to exactly one ordered (source, destination) pair. The binding is
/// not recorded in the key: applying it to a ciphertext for another source
/// yields garbage, so callers track which key serves which pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchingKey {
    pub(crate) bytes: Vec<u8>,
}

impl SwitchingKey {
    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        check_kind(bytes, BlobKind::SwitchingKey)?;
        Ok(Self {
            bytes: bytes.to_vec(),
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    pub fn from_base64(encoded: &str) -> CoreResult<Self> {
        Self::from_bytes(&decode_base64(encoded, "switching key")?)
    }
}

/// A BFV ciphertext plus the number of key switches applied to it.
///
/// The level is bookkeeping, not cryptography. It travels in the clear as
/// the first serialized byte and nothing binds it to the ciphertext body, so
/// anyone relaying the blob can rewrite it. [`state`](Self::state) is
/// therefore advisory: it tells an honest pipeline where a message stands,
/// and it never decides which secret key can decrypt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    pub(crate) level: u8, // 0 = as encrypted, 1+ = re-encrypted
    pub(crate) bytes: Vec<u8>,
}

impl Ciphertext {
    pub(crate) fn new(level: u8, bytes: Vec<u8>) -> Self {
        Self { level, bytes }
    }

    pub fn level(&self) -> u8 {
        self.level
    }

    pub fn state(&self) -> MessageState {
        if self.level == 0 {
            MessageState::EncryptedForPublisher
        } else {
            MessageState::EncryptedForSubscriber
        }
    }

    /// Serialize with the level prepended, unauthenticated
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(1 + self.bytes.len());
        out.push(self.level);
        out.extend_from_slice(&self.bytes);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let (&level, body) = bytes
            .split_first()
            .ok_or_else(|| CoreError::Deserialization("empty ciphertext".into()))?;
        check_kind(body, BlobKind::Ciphertext)?;
        Ok(Self {
            level,
            bytes: body.to_vec(),
        })
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    pub fn from_base64(encoded: &str) -> CoreResult<Self> {
        Self::from_bytes(&decode_base64(encoded, "ciphertext")?)
    }
}
