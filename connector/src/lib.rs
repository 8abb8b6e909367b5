//! Client side of the wallet-link handshake.
//!
//! The browser connector runs this exact flow in the user's wallet UI:
//! mint an ephemeral encryption key pair, derive the shared secret from the
//! backend's advertised public key, sign the link challenge with the wallet
//! key, and seal the result into an envelope. The wallet's private key
//! never crosses the wire.
//!
//! In this repository the crate exists for integration tests and local
//! tooling; it produces byte-for-byte the same envelopes the browser does.

use agora_crypto::{
    derive_shared_secret, generate_keypair, seal, sign_message, Challenge, CryptoError,
    EphemeralKeyPair, SharedSecret,
};
use agora_handshake::{Envelope, Payload};
use agora_types::{PublicKey, SessionId, Timestamp, UserId, WalletAddress};
use ed25519_dalek::SigningKey;
use rand::rngs::OsRng;
use rand::RngCore;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// One connector instance = one link attempt. Key material is regenerated
/// every time, exactly like the browser reopening the wallet-link page.
pub struct Connector {
    wallet_seed: [u8; 32],
    wallet_public: PublicKey,
    dapp_keys: EphemeralKeyPair,
    shared: SharedSecret,
    session: SessionId,
}

impl Connector {
    /// Open a connector for a wallet against the backend's advertised
    /// encryption public key.
    pub fn new(wallet_seed: [u8; 32], backend_public: &[u8; 32]) -> Result<Self, ConnectorError> {
        let dapp_keys = generate_keypair();
        let shared = derive_shared_secret(backend_public, &dapp_keys)?;

        let mut session_bytes = [0u8; 32];
        OsRng.fill_bytes(&mut session_bytes);
        let session = SessionId::new(bs58::encode(session_bytes).into_string());

        let wallet_public = PublicKey(SigningKey::from_bytes(&wallet_seed).verifying_key().to_bytes());
        Ok(Self {
            wallet_seed,
            wallet_public,
            dapp_keys,
            shared,
            session,
        })
    }

    pub fn wallet_address(&self) -> WalletAddress {
        WalletAddress::from_public_key(&self.wallet_public)
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session
    }

    /// Build the connect envelope: sign the link challenge and seal it.
    pub fn connect_envelope(
        &self,
        user_id: &UserId,
        now: Timestamp,
    ) -> Result<Envelope, ConnectorError> {
        let message = Challenge::build(user_id, now);
        self.connect_envelope_with_message(&message)
    }

    /// Like [`Self::connect_envelope`] but with a caller-supplied message.
    /// Tests use this to exercise the backend's challenge validation.
    pub fn connect_envelope_with_message(&self, message: &str) -> Result<Envelope, ConnectorError> {
        let signature = sign_message(message.as_bytes(), &self.wallet_seed);
        self.sealed_envelope(&Payload::Connect {
            public_key: bs58::encode(self.wallet_public.as_bytes()).into_string(),
            signature: bs58::encode(signature.as_bytes()).into_string(),
            message: message.to_string(),
            session: self.session.to_string(),
        })
    }

    pub fn disconnect_envelope(&self) -> Result<Envelope, ConnectorError> {
        self.sealed_envelope(&Payload::Disconnect)
    }

    pub fn transaction_envelope(&self, tx_bytes: &[u8]) -> Result<Envelope, ConnectorError> {
        self.sealed_envelope(&Payload::SignAndSendTransaction {
            session: self.session.to_string(),
            transaction: bs58::encode(tx_bytes).into_string(),
        })
    }

    fn sealed_envelope(&self, payload: &Payload) -> Result<Envelope, ConnectorError> {
        let (nonce, ciphertext) = seal(payload, &self.shared)?;
        Ok(Envelope {
            dapp_encryption_public_key: bs58::encode(&self.dapp_keys.public).into_string(),
            nonce: bs58::encode(nonce).into_string(),
            payload: bs58::encode(ciphertext).into_string(),
        })
    }
}
