use hepre_bfv::BfvError;
use thiserror::Error;

use crate::state::{MessageState, Transition};

/// Failure categories surfaced by the re-encryption core.
///
/// There is no "wrong key" variant: decrypting or switching
/// with a key the ciphertext is not bound to produces garbage output, which
/// the scheme cannot detect.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Unknown or inconsistent scheme parameters; fatal at startup
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A blob is not a well-formed serialized artifact
    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    /// A blob was produced under a different parameter set
    #[error("Parameter mismatch: {0}")]
    ParameterMismatch(String),

    #[error("Payload of {size} bytes exceeds the {max}-byte capacity of one ciphertext")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Invalid plaintext: {0}")]
    InvalidPlaintext(String),

    /// A pipeline stage was applied to a message in the wrong state
    #[error("Cannot {transition} a message that is {from}")]
    InvalidTransition {
        from: MessageState,
        transition: Transition,
    },

    /// The lattice library refused an operation on well-formed inputs
    #[error("Scheme error: {0}")]
    Scheme(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

impl From<BfvError> for CoreError {
    fn from(err: BfvError) -> Self {
        match err {
            BfvError::InvalidParameters(msg) => CoreError::Configuration(msg),
            BfvError::UnknownParameterSet(id) => {
                CoreError::Configuration(format!("unknown parameter set '{id}'"))
            }
            BfvError::Decomposition(msg) => CoreError::Configuration(msg),
            BfvError::PayloadTooLarge { len, capacity } => CoreError::PayloadTooLarge {
                size: len,
                max: capacity,
            },
            err @ BfvError::SlotOutOfRange { .. } => CoreError::InvalidPlaintext(err.to_string()),
            BfvError::Deserialization(msg) => CoreError::Deserialization(msg),
            BfvError::ParameterMismatch { expected, found } => CoreError::ParameterMismatch(
                format!("artifact built for parameters {found}, context uses {expected}"),
            ),
            err @ (BfvError::Scheme(_) | BfvError::Ring(_)) => CoreError::Scheme(err.to_string()),
        }
    }
}
