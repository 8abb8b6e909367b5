//! Link challenges and replay protection.
//!
//! A challenge is the one artifact that proves wallet control: the client
//! signs it with the wallet key and the backend verifies the detached
//! signature. The embedded timestamp bounds how long a signed challenge
//! stays acceptable, and the replay cache ensures no signed challenge is
//! accepted twice within that window.

use crate::hash::blake2b_256;
use agora_types::{PublicKey, Timestamp, UserId};
use std::collections::HashMap;
use std::sync::Mutex;

/// Application tag embedded in every challenge message.
pub const CHALLENGE_TAG: &str = "agora-governance";

/// A parsed link challenge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Challenge {
    pub user_id: UserId,
    pub issued_at: Timestamp,
}

impl Challenge {
    /// Render the challenge message the wallet signs.
    ///
    /// Format: `agora-governance v1 | user=<id> | ts=<unix-seconds>`.
    /// Human-readable so wallet UIs can display what is being signed.
    pub fn build(user_id: &UserId, issued_at: Timestamp) -> String {
        format!(
            "{CHALLENGE_TAG} v1 | user={} | ts={}",
            user_id,
            issued_at.as_secs()
        )
    }

    /// Parse a challenge message back into its fields.
    ///
    /// Returns `None` for anything that does not match the exact `build`
    /// format: prefix, version, field order, and integer timestamp.
    pub fn parse(message: &str) -> Option<Challenge> {
        let mut parts = message.split(" | ");
        let head = parts.next()?;
        if head != format!("{CHALLENGE_TAG} v1") {
            return None;
        }
        let user = parts.next()?.strip_prefix("user=")?;
        let ts = parts.next()?.strip_prefix("ts=")?;
        if parts.next().is_some() || user.is_empty() {
            return None;
        }
        let secs: u64 = ts.parse().ok()?;
        Some(Challenge {
            user_id: UserId::new(user),
            issued_at: Timestamp::new(secs),
        })
    }

    /// Whether the embedded timestamp lies within the freshness window.
    ///
    /// Two-sided: a challenge from the future is as suspect as a stale one
    /// (client clock skew beyond the window is a hard reject).
    pub fn is_fresh(&self, now: Timestamp, window_secs: u64) -> bool {
        self.issued_at.abs_diff(now) <= window_secs
    }
}

/// Tracks accepted (public key, message) pairs so a captured envelope
/// cannot be replayed. Entries are pruned once they are two windows old:
/// a challenge future-dated by up to one window stays fresh for up to one
/// window past its acceptance, so pruning after a single window would
/// reopen the replay.
pub struct ReplayCache {
    window_secs: u64,
    seen: Mutex<HashMap<([u8; 32], [u8; 32]), Timestamp>>,
}

impl ReplayCache {
    pub fn new(window_secs: u64) -> Self {
        Self {
            window_secs,
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Record an accepted proof. Returns `false` if the same (key, message)
    /// pair was already accepted; the caller must reject the attempt.
    pub fn check_and_insert(&self, public_key: &PublicKey, message: &str, now: Timestamp) -> bool {
        let entry = (*public_key.as_bytes(), blake2b_256(message.as_bytes()));
        let mut seen = self.seen.lock().expect("replay cache lock poisoned");
        let retention = self.window_secs.saturating_mul(2);
        seen.retain(|_, accepted_at| !accepted_at.has_expired(retention, now));
        if seen.contains_key(&entry) {
            return false;
        }
        seen.insert(entry, now);
        true
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.seen.lock().unwrap().len()
    }
}
