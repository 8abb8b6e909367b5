//! Keyed, expiring handshake state.
//!
//! Two maps: link attempts in flight (keyed by user, holding the backend's
//! ephemeral key pair) and established sessions (keyed by session id,
//! holding the shared secret). Both enforce expiry lazily on every lookup,
//! so a timed-out entry behaves as terminal even if no sweep has run; the
//! periodic purge only reclaims memory.
//!
//! Secret material lives inside the map values and is zeroized when an
//! entry is removed; no decrypt capability survives teardown.

use crate::error::HandshakeError;
use agora_crypto::{EphemeralKeyPair, SharedSecret};
use agora_types::{SessionId, Timestamp, UserId, WalletAddress};
use dashmap::DashMap;

/// A server-side record of a completed connect.
pub struct HandshakeSession {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub wallet: WalletAddress,
    pub shared_secret: SharedSecret,
    /// The connector's encryption public key, used to route later
    /// envelopes (which carry it in the clear) back to this session.
    pub dapp_public: [u8; 32],
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
}

impl HandshakeSession {
    fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// Link attempts awaiting their connect envelope.
pub struct PendingLinks {
    ttl_secs: u64,
    pending: DashMap<UserId, PendingLink>,
}

struct PendingLink {
    keypair: EphemeralKeyPair,
    created_at: Timestamp,
}

impl PendingLinks {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            pending: DashMap::new(),
        }
    }

    /// Start (or restart) a link attempt for a user, replacing any prior
    /// one. Returns the backend public key to advertise to the connector.
    pub fn begin(&self, user_id: &UserId, keypair: EphemeralKeyPair, now: Timestamp) -> [u8; 32] {
        let public = keypair.public;
        self.pending.insert(
            user_id.clone(),
            PendingLink {
                keypair,
                created_at: now,
            },
        );
        public
    }

    /// Run `f` with the pending key pair for a user. A timed-out attempt is
    /// removed and reads as absent.
    pub fn with_keypair<R>(
        &self,
        user_id: &UserId,
        now: Timestamp,
        f: impl FnOnce(&EphemeralKeyPair) -> R,
    ) -> Option<R> {
        if let Some(entry) = self.pending.get(user_id) {
            if !entry.created_at.has_expired(self.ttl_secs, now) {
                return Some(f(&entry.keypair));
            }
        } else {
            return None;
        }
        // Expired: drop the read guard before removing.
        self.pending.remove(user_id);
        None
    }

    /// Tear down a link attempt (after success or an explicit disconnect).
    pub fn clear(&self, user_id: &UserId) {
        self.pending.remove(user_id);
    }

    /// Drop timed-out attempts. Returns how many were reclaimed.
    pub fn purge_expired(&self, now: Timestamp) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|_, link| !link.created_at.has_expired(self.ttl_secs, now));
        before - self.pending.len()
    }
}

/// Established sessions, keyed by session id with a secondary index on the
/// connector's encryption public key. Expiry lives on each session record;
/// the store enforces it on lookup.
pub struct SessionStore {
    sessions: DashMap<SessionId, HandshakeSession>,
    by_dapp_key: DashMap<[u8; 32], SessionId>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
            by_dapp_key: DashMap::new(),
        }
    }

    pub fn insert(&self, session: HandshakeSession) {
        self.by_dapp_key
            .insert(session.dapp_public, session.session_id.clone());
        self.sessions.insert(session.session_id.clone(), session);
    }

    /// Run `f` against a live session. Expiry is enforced here: an expired
    /// entry is torn down and reported as [`HandshakeError::SessionExpired`].
    pub fn with_session<R>(
        &self,
        session_id: &SessionId,
        now: Timestamp,
        f: impl FnOnce(&HandshakeSession) -> R,
    ) -> Result<R, HandshakeError> {
        match self.sessions.get(session_id) {
            None => return Err(HandshakeError::SessionNotFound),
            Some(entry) if !entry.is_expired(now) => return Ok(f(&entry)),
            Some(_) => {} // expired: fall through once the read guard drops
        }
        self.remove(session_id);
        Err(HandshakeError::SessionExpired)
    }

    /// Resolve a session id from the connector key carried in an envelope.
    pub fn session_id_for_dapp_key(&self, dapp_public: &[u8; 32]) -> Option<SessionId> {
        self.by_dapp_key.get(dapp_public).map(|id| id.clone())
    }

    /// Tear a session down, dropping its secret material.
    pub fn remove(&self, session_id: &SessionId) {
        if let Some((_, session)) = self.sessions.remove(session_id) {
            self.by_dapp_key.remove(&session.dapp_public);
        }
    }

    /// Drop expired sessions. Returns how many were reclaimed.
    pub fn purge_expired(&self, now: Timestamp) -> usize {
        let expired: Vec<SessionId> = self
            .sessions
            .iter()
            .filter(|entry| entry.is_expired(now))
            .map(|entry| entry.session_id.clone())
            .collect();
        let count = expired.len();
        for id in expired {
            self.remove(&id);
        }
        count
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_crypto::{derive_shared_secret, generate_keypair};

    fn session(id: &str, dapp_byte: u8, created: u64, expires: u64) -> HandshakeSession {
        let ours = generate_keypair();
        let theirs = generate_keypair();
        HandshakeSession {
            session_id: SessionId::new(id),
            user_id: UserId::new("u1"),
            wallet: WalletAddress::from_public_key(&agora_types::PublicKey([9u8; 32])),
            shared_secret: derive_shared_secret(&theirs.public, &ours).unwrap(),
            dapp_public: [dapp_byte; 32],
            created_at: Timestamp::new(created),
            expires_at: Timestamp::new(expires),
        }
    }

    #[test]
    fn lookup_enforces_expiry_lazily() {
        let store = SessionStore::new();
        store.insert(session("s1", 1, 1000, 2000));

        let user = store
            .with_session(&SessionId::new("s1"), Timestamp::new(1500), |s| {
                s.user_id.clone()
            })
            .unwrap();
        assert_eq!(user, UserId::new("u1"));

        let err = store
            .with_session(&SessionId::new("s1"), Timestamp::new(2000), |_| ())
            .unwrap_err();
        assert!(matches!(err, HandshakeError::SessionExpired));

        // The expired entry was torn down; a retry now reads as missing.
        let err = store
            .with_session(&SessionId::new("s1"), Timestamp::new(2000), |_| ())
            .unwrap_err();
        assert!(matches!(err, HandshakeError::SessionNotFound));
    }

    #[test]
    fn dapp_key_index_follows_removal() {
        let store = SessionStore::new();
        store.insert(session("s1", 7, 1000, 2000));
        assert_eq!(
            store.session_id_for_dapp_key(&[7u8; 32]),
            Some(SessionId::new("s1"))
        );
        store.remove(&SessionId::new("s1"));
        assert_eq!(store.session_id_for_dapp_key(&[7u8; 32]), None);
    }

    #[test]
    fn purge_reclaims_only_expired() {
        let store = SessionStore::new();
        store.insert(session("s1", 1, 0, 100));
        store.insert(session("s2", 2, 0, 10_000));
        assert_eq!(store.purge_expired(Timestamp::new(500)), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn pending_links_replace_and_expire() {
        let links = PendingLinks::new(600);
        let user = UserId::new("u1");

        let first = links.begin(&user, generate_keypair(), Timestamp::new(1000));
        let second = links.begin(&user, generate_keypair(), Timestamp::new(1001));
        assert_ne!(first, second);

        let seen = links.with_keypair(&user, Timestamp::new(1200), |kp| kp.public);
        assert_eq!(seen, Some(second));

        assert_eq!(links.with_keypair(&user, Timestamp::new(1601), |kp| kp.public), None);
        assert_eq!(links.purge_expired(Timestamp::new(1601)), 0);
    }
}
