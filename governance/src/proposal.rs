//! Governance proposals and their lifecycle.

use agora_types::{ProposalId, Timestamp, UserId};
use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Stored proposal status.
///
/// `Active` is what gets persisted at creation; `Closed` is persisted by
/// the close sweep. Readers must not trust the stored value alone: use
/// [`Proposal::status_at`] so a proposal whose voting period elapsed is
/// treated as closed even before the sweep has run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProposalStatus {
    Active,
    Closed,
}

/// A governance proposal.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    pub creator_id: UserId,
    pub voting_period_hours: u32,
    pub created_at: Timestamp,
    pub status: ProposalStatus,
}

/// The fields a completed CreateProposal wizard hands to the store.
#[derive(Clone, Debug)]
pub struct NewProposal {
    pub title: String,
    pub description: String,
    pub creator_id: UserId,
    pub voting_period_hours: u32,
    pub created_at: Timestamp,
}

impl Proposal {
    /// When the voting period ends.
    pub fn closes_at(&self) -> Timestamp {
        self.created_at.plus_hours(self.voting_period_hours as u64)
    }

    /// Effective status at `now`: stored-Closed wins, otherwise the clock
    /// decides.
    pub fn status_at(&self, now: Timestamp) -> ProposalStatus {
        if self.status == ProposalStatus::Closed || now >= self.closes_at() {
            ProposalStatus::Closed
        } else {
            ProposalStatus::Active
        }
    }
}

/// Mint a fresh proposal id: 128 random bits, hex-encoded.
///
/// The id space makes collisions unrealistic; the store still refuses a
/// duplicate id rather than silently overwriting.
pub fn generate_proposal_id() -> ProposalId {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    ProposalId::new(hex::encode(bytes))
}

/// Parse a voting period entered in chat: a positive integer number of
/// hours. Anything else ("abc", "-5", "0") is invalid input.
pub fn parse_voting_period(input: &str) -> Option<u32> {
    match input.trim().parse::<u32>() {
        Ok(hours) if hours > 0 => Some(hours),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proposal(created: u64, hours: u32, status: ProposalStatus) -> Proposal {
        Proposal {
            id: ProposalId::new("p1"),
            title: "T".into(),
            description: "D".into(),
            creator_id: UserId::new("u1"),
            voting_period_hours: hours,
            created_at: Timestamp::new(created),
            status,
        }
    }

    #[test]
    fn active_until_period_elapses() {
        let p = proposal(0, 24, ProposalStatus::Active);
        assert_eq!(p.status_at(Timestamp::new(86_399)), ProposalStatus::Active);
        assert_eq!(p.status_at(Timestamp::new(86_400)), ProposalStatus::Closed);
    }

    #[test]
    fn stored_closed_wins_over_clock() {
        let p = proposal(0, 24, ProposalStatus::Closed);
        assert_eq!(p.status_at(Timestamp::new(1)), ProposalStatus::Closed);
    }

    #[test]
    fn generated_ids_are_distinct_and_hex() {
        let a = generate_proposal_id();
        let b = generate_proposal_id();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), 32);
        assert!(a.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn voting_period_accepts_positive_integers() {
        assert_eq!(parse_voting_period("24"), Some(24));
        assert_eq!(parse_voting_period(" 1 "), Some(1));
    }

    #[test]
    fn voting_period_rejects_everything_else() {
        for bad in ["abc", "-5", "0", "", "1.5", "24h"] {
            assert_eq!(parse_voting_period(bad), None, "input {bad:?}");
        }
    }
}
