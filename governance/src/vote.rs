//! Weighted votes and tallying.

use agora_types::{ProposalId, UserId};
use serde::{Deserialize, Serialize};

/// A single user's vote on a proposal. Unique per (proposal, user): a later
/// vote replaces the earlier one wholesale, weight included.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: ProposalId,
    pub user_id: UserId,
    /// `true` = yes, `false` = no.
    pub choice: bool,
    /// Token balance at the moment the vote was cast.
    pub weight: u64,
}

/// Aggregated result of a proposal's votes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    pub yes_weight: u64,
    pub no_weight: u64,
    pub voters: u32,
}

impl Tally {
    pub fn passed(&self) -> bool {
        self.yes_weight > self.no_weight
    }
}

/// Sum vote weights per choice. Assumes the store already collapsed
/// duplicates, so every entry counts.
pub fn tally(votes: &[Vote]) -> Tally {
    let mut result = Tally::default();
    for vote in votes {
        if vote.choice {
            result.yes_weight = result.yes_weight.saturating_add(vote.weight);
        } else {
            result.no_weight = result.no_weight.saturating_add(vote.weight);
        }
        result.voters += 1;
    }
    result
}

/// Parse a chat vote choice: `yes` or `no`, case-insensitively.
pub fn parse_choice(input: &str) -> Option<bool> {
    match input.trim().to_lowercase().as_str() {
        "yes" => Some(true),
        "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vote(user: &str, choice: bool, weight: u64) -> Vote {
        Vote {
            proposal_id: ProposalId::new("p1"),
            user_id: UserId::new(user),
            choice,
            weight,
        }
    }

    #[test]
    fn tally_sums_weights_per_choice() {
        let t = tally(&[vote("a", true, 50), vote("b", false, 70), vote("c", true, 30)]);
        assert_eq!(t.yes_weight, 80);
        assert_eq!(t.no_weight, 70);
        assert_eq!(t.voters, 3);
        assert!(t.passed());
    }

    #[test]
    fn empty_tally_does_not_pass() {
        assert!(!tally(&[]).passed());
    }

    #[test]
    fn choice_is_case_insensitive() {
        assert_eq!(parse_choice("YES"), Some(true));
        assert_eq!(parse_choice("Yes"), Some(true));
        assert_eq!(parse_choice(" no "), Some(false));
        assert_eq!(parse_choice("nah"), None);
        assert_eq!(parse_choice(""), None);
    }
}
