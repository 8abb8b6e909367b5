//! Cryptographic primitives for the wallet-linking handshake.
//!
//! - **X25519** for ephemeral Diffie-Hellman key agreement
//! - **XChaCha20-Poly1305** for the authenticated envelope channel
//! - **Ed25519** for wallet ownership proofs (detached signatures)
//! - **Blake2b** for key derivation and replay-cache keys
//!
//! Everything here is a pure transform over byte slices; session lifecycle
//! and wire encoding live in the `agora-handshake` crate.

pub mod challenge;
pub mod error;
pub mod hash;
pub mod keys;
pub mod sealed;
pub mod sign;

pub use challenge::{Challenge, ReplayCache, CHALLENGE_TAG};
pub use error::CryptoError;
pub use hash::{blake2b_256, blake2b_256_multi};
pub use keys::{derive_shared_secret, generate_keypair, EphemeralKeyPair, SharedSecret};
pub use sealed::{open, seal, NONCE_LEN};
pub use sign::{sign_message, verify_signature};
