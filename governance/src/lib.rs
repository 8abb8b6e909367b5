//! Governance domain: proposals, weighted votes, and the authorization gate.
//!
//! Weight is the token balance at the time an action is taken, read live
//! from the oracle, never cached. A proposal is open for a fixed number of
//! hours from creation; its effective status is computed from the clock on
//! every read, so correctness never depends on a background sweep running.

pub mod gate;
pub mod proposal;
pub mod vote;

pub use gate::{AuthorizationGate, Decision, GateConfig};
pub use proposal::{generate_proposal_id, parse_voting_period, NewProposal, Proposal, ProposalStatus};
pub use vote::{parse_choice, tally, Tally, Vote};
