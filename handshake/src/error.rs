use agora_crypto::CryptoError;
use agora_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HandshakeError {
    /// The envelope or a field inside it is not decodable. Covers bad
    /// base58, wrong field lengths, and unparseable payload JSON.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Key agreement or envelope decryption failed.
    #[error(transparent)]
    Crypto(#[from] CryptoError),

    /// The ownership proof did not hold: bad signature, foreign or stale
    /// challenge, or a replayed (key, message) pair.
    #[error("ownership proof rejected")]
    ProofRejected,

    /// A connect envelope arrived for a user with no link attempt in
    /// progress (or the attempt already timed out).
    #[error("no link attempt in progress")]
    NoPendingLink,

    #[error("session not found")]
    SessionNotFound,

    #[error("session expired")]
    SessionExpired,

    /// The external submitter refused or failed to broadcast a signed
    /// transaction.
    #[error("transaction submission failed: {0}")]
    Submission(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
