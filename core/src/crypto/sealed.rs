// ## 📂 File: `src/crypto/sealed.rs`

//! src/crypto/sealed.rs
//! Chunk sealer / opener over the NaCl anonymous sealed box.
//!
//! Design notes:
//! - X25519 + XSalsa20-Poly1305, libsodium `crypto_box_seal` layout:
//!   `[ephemeral_pk:32][ciphertext][tag:16]`.
//! - Every call draws a fresh ephemeral key, so chunks share no nonce state.
//! - Tag verification fails closed: no partial plaintext is ever returned.

use crypto_box::{PublicKey, SecretKey};
use rand::rngs::OsRng;
use tracing::trace;

use crate::constants::SEAL_OVERHEAD;
use crate::crypto::keys::{derive_public_key, public_key_from_bytes, secret_key_from_bytes};
use crate::crypto::types::CryptoError;

/// Seal one plaintext chunk for `recipient`.
///
/// Output length is `plaintext.len() + SEAL_OVERHEAD`.
///
/// # Panics
/// If the sealing primitive itself fails. That only happens when the cipher
/// rejects the input or the system randomness source is broken; neither is a
/// condition the stream can recover from.
pub fn seal_chunk(recipient: &PublicKey, plaintext: &[u8]) -> Vec<u8> {
    let sealed = recipient
        .seal(&mut OsRng, plaintext)
        .unwrap_or_else(|e| panic!("sealed box encryption failed: {e}"));
    debug_assert_eq!(sealed.len(), plaintext.len() + SEAL_OVERHEAD);
    trace!(plaintext_len = plaintext.len(), sealed_len = sealed.len(), "sealed chunk");
    sealed
}

/// Open one sealed chunk with the recipient's key pair.
///
/// `recipient_public` must be the public half of `recipient_secret`; a
/// mismatching key is indistinguishable from a wrong key and fails the same way.
pub fn open_chunk(
    recipient_public: &PublicKey,
    recipient_secret: &SecretKey,
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    if ciphertext.len() < SEAL_OVERHEAD {
        return Err(CryptoError::AuthenticationFailed);
    }
    if recipient_secret.public_key().as_bytes() != recipient_public.as_bytes() {
        return Err(CryptoError::AuthenticationFailed);
    }

    let plaintext = recipient_secret
        .unseal(ciphertext)
        .map_err(|_| CryptoError::AuthenticationFailed)?;
    trace!(sealed_len = ciphertext.len(), plaintext_len = plaintext.len(), "opened chunk");
    Ok(plaintext)
}

/// Seal a short message in a single box (no framing).
pub fn seal_message(public_key: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let pk = public_key_from_bytes(public_key)?;
    Ok(seal_chunk(&pk, plaintext))
}

/// Open a single box using only the private key; the public key is derived.
pub fn open_message(private_key: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let public_key = derive_public_key(private_key)?;
    open_message_with_public_key(&public_key, private_key, ciphertext)
}

/// Open a single box with an explicitly supplied key pair.
pub fn open_message_with_public_key(
    public_key: &[u8],
    private_key: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let pk = public_key_from_bytes(public_key)?;
    let sk = secret_key_from_bytes(private_key)?;
    open_chunk(&pk, &sk, ciphertext)
}
