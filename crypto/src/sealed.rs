//! Authenticated-encryption envelope channel.
//!
//! XChaCha20-Poly1305 over a Blake2b-derived key, with a fresh random
//! 24-byte nonce per message. The AEAD key is domain-separated from the raw
//! Diffie-Hellman output so the same shared secret can never be misused in
//! another context.

use crate::error::CryptoError;
use crate::hash::blake2b_256_multi;
use crate::keys::SharedSecret;
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Nonce length for XChaCha20-Poly1305.
pub const NONCE_LEN: usize = 24;

/// Domain separation tag for envelope keys.
const CHANNEL_CONTEXT: &[u8] = b"agora-wallet-link-v1";

fn channel_cipher(secret: &SharedSecret) -> XChaCha20Poly1305 {
    let key = blake2b_256_multi(&[secret.as_bytes(), CHANNEL_CONTEXT]);
    XChaCha20Poly1305::new_from_slice(&key).expect("valid key length")
}

/// Serialize and encrypt a payload under the shared secret.
///
/// Returns the fresh nonce and the authenticated ciphertext. A nonce is
/// never reused under the same secret: it is drawn from OsRng per call.
pub fn seal<T: Serialize>(
    payload: &T,
    secret: &SharedSecret,
) -> Result<([u8; NONCE_LEN], Vec<u8>), CryptoError> {
    let plaintext = serde_json::to_vec(payload).map_err(|_| CryptoError::Serialization)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = XNonce::from(nonce_bytes);

    let ciphertext = channel_cipher(secret)
        .encrypt(&nonce, plaintext.as_ref())
        .expect("encryption should not fail");
    Ok((nonce_bytes, ciphertext))
}

/// Decrypt and deserialize a sealed payload.
///
/// Any authentication failure (wrong secret, tampered ciphertext, or a
/// nonce that does not match the ciphertext) yields the same opaque
/// `DecryptionFailed`. There is no partial or garbage success path.
pub fn open<T: DeserializeOwned>(
    ciphertext: &[u8],
    nonce: &[u8; NONCE_LEN],
    secret: &SharedSecret,
) -> Result<T, CryptoError> {
    let nonce = XNonce::from(*nonce);
    let plaintext = channel_cipher(secret)
        .decrypt(&nonce, ciphertext)
        .map_err(|_| CryptoError::DecryptionFailed)?;
    serde_json::from_slice(&plaintext).map_err(|_| CryptoError::Serialization)
}
