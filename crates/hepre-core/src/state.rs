//! Lifecycle of a single message through the pipeline

use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a message is on its way from publisher to subscriber.
///
/// `Plaintext -> EncryptedForPublisher -> EncryptedForSubscriber -> DecryptedPlaintext`.
/// Re-encrypting an `EncryptedForSubscriber` message again (a further hop)
/// leaves it in `EncryptedForSubscriber`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageState {
    Plaintext,
    EncryptedForPublisher,
    EncryptedForSubscriber,
    DecryptedPlaintext,
}

/// Pipeline stages that move a message between states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Encrypt,
    ReEncrypt,
    Decrypt,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Transition::Encrypt => "encrypt",
            Transition::ReEncrypt => "re-encrypt",
            Transition::Decrypt => "decrypt",
        })
    }
}

impl MessageState {
    /// State reached by applying `transition`, or `None` if it does not apply
    pub fn apply(self, transition: Transition) -> Option<MessageState> {
        use MessageState::*;
        match (self, transition) {
            (Plaintext, Transition::Encrypt) => Some(EncryptedForPublisher),
            (EncryptedForPublisher | EncryptedForSubscriber, Transition::ReEncrypt) => {
                Some(EncryptedForSubscriber)
            }
            (EncryptedForPublisher | EncryptedForSubscriber, Transition::Decrypt) => {
                Some(DecryptedPlaintext)
            }
            _ => None,
        }
    }
}

impl fmt::Display for MessageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageState::Plaintext => "plaintext",
            MessageState::EncryptedForPublisher => "encrypted_for_publisher",
            MessageState::EncryptedForSubscriber => "encrypted_for_subscriber",
            MessageState::DecryptedPlaintext => "decrypted_plaintext",
        };
        f.write_str(name)
    }
}
