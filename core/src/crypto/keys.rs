// ## src/crypto/keys.rs

//! crypto/keys.rs
//! X25519 key pairs and public-key derivation.
//!
//! Design:
//! - Keys are plain 32-byte X25519 values, matching NaCl box keys.
//! - `derive_public_key` is a pure function; callers that need it repeatedly
//!   memoize the result themselves (see `DecryptReader`).
//! - Base64 (standard alphabet, padded) is the text form used at the process boundary.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use crypto_box::{PublicKey, SecretKey};
use rand::rngs::OsRng;

use crate::constants::KEY_LEN;
use crate::crypto::types::CryptoError;

/// X25519 keypair for sealed boxes
#[derive(Clone)]
pub struct KeyPair {
    secret: SecretKey,
    public: PublicKey,
}

impl KeyPair {
    /// Generate a new random keypair
    pub fn generate() -> Self {
        let secret = SecretKey::generate(&mut OsRng);
        let public = secret.public_key();
        Self { secret, public }
    }

    /// Create keypair from existing secret key bytes
    pub fn from_secret_bytes(secret_bytes: [u8; KEY_LEN]) -> Self {
        let secret = SecretKey::from(secret_bytes);
        let public = secret.public_key();
        Self { secret, public }
    }

    pub fn secret_bytes(&self) -> [u8; KEY_LEN] {
        self.secret.to_bytes()
    }

    pub fn public_bytes(&self) -> [u8; KEY_LEN] {
        *self.public.as_bytes()
    }

    pub fn secret(&self) -> &SecretKey {
        &self.secret
    }

    pub fn public(&self) -> &PublicKey {
        &self.public
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &hex::encode(self.public.as_bytes()))
            .finish_non_exhaustive()
    }
}

fn key_array(bytes: &[u8]) -> Result<[u8; KEY_LEN], CryptoError> {
    bytes.try_into().map_err(|_| CryptoError::InvalidKeyLen {
        expected: KEY_LEN,
        actual: bytes.len(),
    })
}

/// Derive the X25519 public key belonging to `secret`.
///
/// Pure and deterministic. Fails with `CryptoError::KeyDerivation` when the
/// private key is not exactly 32 bytes.
pub fn derive_public_key(secret: &[u8]) -> Result<[u8; KEY_LEN], CryptoError> {
    let bytes = key_array(secret).map_err(|e| CryptoError::KeyDerivation(e.to_string()))?;
    Ok(*SecretKey::from(bytes).public_key().as_bytes())
}

/// Parse a recipient public key.
pub fn public_key_from_bytes(bytes: &[u8]) -> Result<PublicKey, CryptoError> {
    Ok(PublicKey::from(key_array(bytes)?))
}

/// Parse a private key.
pub fn secret_key_from_bytes(bytes: &[u8]) -> Result<SecretKey, CryptoError> {
    Ok(SecretKey::from(key_array(bytes)?))
}

/// Encode key bytes as standard base64.
pub fn encode_key_b64(key: &[u8]) -> String {
    STANDARD.encode(key)
}

/// Decode a base64 key and check its length.
pub fn decode_key_b64(text: &str) -> Result<[u8; KEY_LEN], CryptoError> {
    let bytes = STANDARD
        .decode(text.trim())
        .map_err(|e| CryptoError::KeyEncoding(e.to_string()))?;
    key_array(&bytes)
}
