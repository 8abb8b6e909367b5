//! X25519 ephemeral key agreement.
//!
//! Each side of a link attempt generates a fresh key pair; the two public
//! halves cross on the wire and both sides derive the same shared secret.
//! Secrets are zeroized on drop and never serialized.

use crate::error::CryptoError;
use rand::rngs::OsRng;
use rand::RngCore;
use x25519_dalek::{PublicKey as X25519Public, StaticSecret};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// An ephemeral X25519 key pair, regenerated per link attempt.
pub struct EphemeralKeyPair {
    /// Public half, advertised to the peer.
    pub public: [u8; 32],
    secret: SecretBytes,
}

/// The derived Diffie-Hellman secret. As sensitive as a private key; its
/// lifetime is bounded to one handshake session.
pub struct SharedSecret(SecretBytes);

#[derive(Zeroize, ZeroizeOnDrop)]
struct SecretBytes([u8; 32]);

/// Generate a fresh ephemeral key pair from the OS random source.
pub fn generate_keypair() -> EphemeralKeyPair {
    let mut seed = [0u8; 32];
    OsRng.fill_bytes(&mut seed);
    let secret = StaticSecret::from(seed);
    seed.zeroize();
    let public = X25519Public::from(&secret);
    EphemeralKeyPair {
        public: *public.as_bytes(),
        secret: SecretBytes(secret.to_bytes()),
    }
}

/// Derive the shared secret from the peer's public key and our secret key.
///
/// Symmetric: `derive(a_pub, b_sec) == derive(b_pub, a_sec)`. Rejects
/// non-contributory peer keys (small-order points whose DH output is all
/// zeros) with `InvalidKeyMaterial`.
pub fn derive_shared_secret(
    peer_public: &[u8; 32],
    own: &EphemeralKeyPair,
) -> Result<SharedSecret, CryptoError> {
    let secret = StaticSecret::from(own.secret.0);
    let peer = X25519Public::from(*peer_public);
    let shared = secret.diffie_hellman(&peer);
    if !shared.was_contributory() {
        return Err(CryptoError::InvalidKeyMaterial);
    }
    Ok(SharedSecret(SecretBytes(*shared.as_bytes())))
}

impl SharedSecret {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0 .0
    }
}

impl std::fmt::Debug for EphemeralKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EphemeralKeyPair(public: {}..)", self.public[0])
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret(..)")
    }
}
