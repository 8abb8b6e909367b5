//! The wallet linker — server side of the handshake.
//!
//! Consumes envelopes delivered out-of-band, validates ownership proofs,
//! and owns the pending-link and session state. Validation strictly
//! precedes persistence: nothing is written until the proof has fully
//! held, so a failed attempt leaves no trace and the user simply retries
//! from the beginning.

use crate::envelope::{decode_bytes, decode_public_key, decode_signature, DecodedEnvelope, Envelope, Payload};
use crate::error::HandshakeError;
use crate::session::{HandshakeSession, PendingLinks, SessionStore};
use agora_crypto::{
    derive_shared_secret, generate_keypair, open, verify_signature, Challenge, ReplayCache,
};
use agora_store::GovernanceStore;
use agora_types::{SessionId, Timestamp, TransactionSubmitter, UserId, WalletAddress};
use std::sync::Arc;

#[derive(Clone, Copy, Debug)]
pub struct LinkerConfig {
    /// How long an established session stays usable.
    pub session_ttl_secs: u64,
    /// How long a link attempt waits for its connect envelope.
    pub link_ttl_secs: u64,
    /// Two-sided freshness window for challenge timestamps.
    pub challenge_window_secs: u64,
}

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            session_ttl_secs: 3600,
            link_ttl_secs: 600,
            challenge_window_secs: 300,
        }
    }
}

/// What a successfully handled envelope did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkEvent {
    WalletLinked {
        wallet: WalletAddress,
        session_id: SessionId,
    },
    Disconnected,
    TransactionSubmitted {
        wallet: WalletAddress,
    },
}

pub struct WalletLinker {
    store: Arc<dyn GovernanceStore>,
    submitter: Arc<dyn TransactionSubmitter>,
    pending: PendingLinks,
    sessions: SessionStore,
    replay: ReplayCache,
    challenge_window_secs: u64,
    session_ttl_secs: u64,
}

impl WalletLinker {
    pub fn new(
        store: Arc<dyn GovernanceStore>,
        submitter: Arc<dyn TransactionSubmitter>,
        config: LinkerConfig,
    ) -> Self {
        Self {
            store,
            submitter,
            pending: PendingLinks::new(config.link_ttl_secs),
            sessions: SessionStore::new(),
            replay: ReplayCache::new(config.challenge_window_secs),
            challenge_window_secs: config.challenge_window_secs,
            session_ttl_secs: config.session_ttl_secs,
        }
    }

    /// Start a link attempt for a user: mint a fresh backend key pair and
    /// return the public half for the connector URL. Replaces any attempt
    /// already in flight.
    pub fn begin_link(&self, user_id: &UserId, now: Timestamp) -> [u8; 32] {
        self.pending.begin(user_id, generate_keypair(), now)
    }

    /// Handle one envelope from the connector.
    pub async fn handle_envelope(
        &self,
        user_id: &UserId,
        envelope: &Envelope,
        now: Timestamp,
    ) -> Result<LinkEvent, HandshakeError> {
        let decoded = envelope.decode()?;
        let payload = self.open_payload(user_id, &decoded, now)?;

        match payload {
            Payload::Connect {
                public_key,
                signature,
                message,
                session,
            } => {
                self.handle_connect(user_id, &decoded, &public_key, &signature, &message, session, now)
                    .await
            }
            Payload::Disconnect => Ok(self.handle_disconnect(user_id, &decoded)),
            Payload::SignAndSendTransaction {
                session,
                transaction,
            } => {
                self.handle_sign_and_send(user_id, SessionId::new(session), &transaction, now)
                    .await
            }
        }
    }

    /// Decrypt an envelope's payload. A fresh link attempt decrypts with
    /// the pending key pair; anything after connect decrypts with the
    /// session secret, routed by the connector key the envelope carries.
    fn open_payload(
        &self,
        user_id: &UserId,
        decoded: &DecodedEnvelope,
        now: Timestamp,
    ) -> Result<Payload, HandshakeError> {
        if let Some(result) = self.pending.with_keypair(user_id, now, |keypair| {
            let secret = derive_shared_secret(&decoded.dapp_public, keypair)?;
            Ok(open::<Payload>(&decoded.ciphertext, &decoded.nonce, &secret)?)
        }) {
            return result;
        }

        let session_id = self
            .sessions
            .session_id_for_dapp_key(&decoded.dapp_public)
            .ok_or(HandshakeError::SessionNotFound)?;
        self.sessions.with_session(&session_id, now, |session| {
            Ok(open::<Payload>(
                &decoded.ciphertext,
                &decoded.nonce,
                &session.shared_secret,
            )?)
        })?
    }

    #[allow(clippy::too_many_arguments)]
    async fn handle_connect(
        &self,
        user_id: &UserId,
        decoded: &DecodedEnvelope,
        public_key: &str,
        signature: &str,
        message: &str,
        session: String,
        now: Timestamp,
    ) -> Result<LinkEvent, HandshakeError> {
        let wallet_key = decode_public_key(public_key)?;
        let signature = decode_signature(signature)?;

        let Some(challenge) = Challenge::parse(message) else {
            tracing::debug!(user = %user_id, "connect rejected: unparseable challenge");
            return Err(HandshakeError::ProofRejected);
        };
        if challenge.user_id != *user_id {
            tracing::debug!(user = %user_id, "connect rejected: challenge bound to another user");
            return Err(HandshakeError::ProofRejected);
        }
        if !challenge.is_fresh(now, self.challenge_window_secs) {
            tracing::debug!(user = %user_id, issued_at = %challenge.issued_at, "connect rejected: challenge outside freshness window");
            return Err(HandshakeError::ProofRejected);
        }
        if !verify_signature(message.as_bytes(), &signature, &wallet_key) {
            return Err(HandshakeError::ProofRejected);
        }
        if !self.replay.check_and_insert(&wallet_key, message, now) {
            tracing::warn!(user = %user_id, "connect rejected: replayed challenge");
            return Err(HandshakeError::ProofRejected);
        }

        let secret = self
            .pending
            .with_keypair(user_id, now, |keypair| {
                derive_shared_secret(&decoded.dapp_public, keypair)
            })
            .ok_or(HandshakeError::NoPendingLink)??;

        // Proof held; only now touch persistent state.
        let wallet = WalletAddress::from_public_key(&wallet_key);
        self.store.upsert_wallet(user_id, &wallet).await?;

        let session_id = SessionId::new(session);
        self.sessions.insert(HandshakeSession {
            session_id: session_id.clone(),
            user_id: user_id.clone(),
            wallet: wallet.clone(),
            shared_secret: secret,
            dapp_public: decoded.dapp_public,
            created_at: now,
            expires_at: now.plus_secs(self.session_ttl_secs),
        });
        self.pending.clear(user_id);

        tracing::info!(user = %user_id, wallet = %wallet, "wallet linked");
        Ok(LinkEvent::WalletLinked { wallet, session_id })
    }

    fn handle_disconnect(&self, user_id: &UserId, decoded: &DecodedEnvelope) -> LinkEvent {
        if let Some(session_id) = self.sessions.session_id_for_dapp_key(&decoded.dapp_public) {
            self.sessions.remove(&session_id);
        }
        self.pending.clear(user_id);
        tracing::info!(user = %user_id, "handshake session disconnected");
        LinkEvent::Disconnected
    }

    async fn handle_sign_and_send(
        &self,
        user_id: &UserId,
        session_id: SessionId,
        transaction: &str,
        now: Timestamp,
    ) -> Result<LinkEvent, HandshakeError> {
        let (wallet, session_user) = self
            .sessions
            .with_session(&session_id, now, |s| (s.wallet.clone(), s.user_id.clone()))?;
        if session_user != *user_id {
            return Err(HandshakeError::SessionNotFound);
        }

        let tx_bytes = decode_bytes(transaction, "transaction")?;
        self.submitter
            .submit(&wallet, &tx_bytes)
            .await
            .map_err(|e| HandshakeError::Submission(e.to_string()))?;

        // The session has served its dependent signed action.
        self.sessions.remove(&session_id);
        tracing::info!(user = %user_id, wallet = %wallet, "signed transaction forwarded");
        Ok(LinkEvent::TransactionSubmitted { wallet })
    }

    /// Whether a user currently has a link attempt awaiting its envelope.
    pub fn has_pending_link(&self, user_id: &UserId, now: Timestamp) -> bool {
        self.pending.with_keypair(user_id, now, |_| ()).is_some()
    }

    /// Reclaim timed-out link attempts and sessions. Returns
    /// (links purged, sessions purged).
    pub fn purge_expired(&self, now: Timestamp) -> (usize, usize) {
        (
            self.pending.purge_expired(now),
            self.sessions.purge_expired(now),
        )
    }
}
