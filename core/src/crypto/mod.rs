pub mod types;
pub mod keys;
pub mod sealed;

pub use types::*;
pub use keys::*;
pub use sealed::*;

pub use crypto_box::{PublicKey, SecretKey};
