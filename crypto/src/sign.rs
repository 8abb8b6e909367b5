//! Ed25519 ownership-proof signatures.
//!
//! The wallet's private key never leaves the client; the backend only ever
//! verifies. `sign_message` exists for the connector crate and tests.

use agora_types::{PublicKey, Signature};
use ed25519_dalek::{Signer, SigningKey, Verifier, VerifyingKey};

/// Sign a message with a 32-byte Ed25519 seed, returning the signature.
pub fn sign_message(message: &[u8], secret: &[u8; 32]) -> Signature {
    let signing_key = SigningKey::from_bytes(secret);
    Signature(signing_key.sign(message).to_bytes())
}

/// Verify a detached signature against a message and public key.
///
/// Returns `false`, never an error, on a malformed public key or an
/// invalid signature. The cause is logged for operators; callers only see
/// the boolean.
pub fn verify_signature(message: &[u8], signature: &Signature, public_key: &PublicKey) -> bool {
    let verifying_key = match VerifyingKey::from_bytes(public_key.as_bytes()) {
        Ok(key) => key,
        Err(e) => {
            tracing::debug!("ownership proof rejected: malformed public key: {e}");
            return false;
        }
    };
    let sig = ed25519_dalek::Signature::from_bytes(signature.as_bytes());
    match verifying_key.verify(message, &sig) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!("ownership proof rejected: signature check failed: {e}");
            false
        }
    }
}
