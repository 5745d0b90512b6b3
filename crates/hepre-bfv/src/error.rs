//! Error types for BFV operations

#[derive(Debug, thiserror::Error)]
pub enum BfvError {
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Unknown parameter set: {0}")]
    UnknownParameterSet(String),

    #[error("Unsupported decomposition: {0}")]
    Decomposition(String),

    #[error("Payload of {len} slots exceeds capacity of {capacity}")]
    PayloadTooLarge { len: usize, capacity: usize },

    #[error("Slot value {value} at index {index} is not below the plaintext modulus {modulus}")]
    SlotOutOfRange {
        index: usize,
        value: u64,
        modulus: u64,
    },

    #[error("Deserialization failed: {0}")]
    Deserialization(String),

    #[error("Parameter mismatch: artifact built for {found}, context uses {expected}")]
    ParameterMismatch { expected: String, found: String },

    #[error("Scheme operation failed: {0}")]
    Scheme(#[from] fhe::Error),

    #[error("Ring arithmetic failed: {0}")]
    Ring(#[from] fhe_math::Error),
}

pub type BfvResult<T> = Result<T, BfvError>;
