use thiserror::Error;

#[derive(Debug, Error)]
pub enum CryptoError {
    /// A public or secret key is not usable key material. Hard reject; no
    /// best-effort fallback.
    #[error("invalid key material")]
    InvalidKeyMaterial,

    /// Authentication failed on a sealed payload. Deliberately opaque:
    /// wrong secret, tampered ciphertext, and mismatched nonce are
    /// indistinguishable to the caller.
    #[error("decryption failed")]
    DecryptionFailed,

    /// A payload could not be serialized before sealing, or an
    /// authenticated plaintext was not valid for the expected shape.
    #[error("payload serialization failed")]
    Serialization,
}
