//! BFV key types

mod public;
mod secret;
mod switching;

pub use public::BfvPublicKey;
pub use secret::BfvSecretKey;
pub use switching::BfvSwitchingKey;
