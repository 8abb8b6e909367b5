//! Abstract persistence for the governance bot.
//!
//! The bot depends only on this trait; the storage engine behind it is
//! deliberately unspecified. Uniqueness constraints (one wallet per user,
//! one vote per (proposal, user)) are enforced here, server-side, never by
//! callers checking first. An in-memory reference backend is provided for
//! tests and single-process deployments.

pub mod error;
pub mod identity;
pub mod memory;

pub use error::StoreError;
pub use identity::WalletIdentity;
pub use memory::MemoryStore;

use agora_governance::{NewProposal, Proposal, ProposalStatus, Vote};
use agora_types::{ProposalId, UserId, WalletAddress};
use async_trait::async_trait;

/// Narrow CRUD surface consumed by the dialog engine and the wallet linker.
#[async_trait]
pub trait GovernanceStore: Send + Sync {
    /// Look up a user's wallet identity. Absent means the user has never
    /// completed a link attempt.
    async fn get_user(&self, user_id: &UserId) -> Result<Option<WalletIdentity>, StoreError>;

    /// Bind a wallet to a user. An upsert: works with or without a prior
    /// record, and replaces any previously linked wallet.
    async fn upsert_wallet(
        &self,
        user_id: &UserId,
        wallet: &WalletAddress,
    ) -> Result<(), StoreError>;

    /// Persist a new proposal, assigning its id. Fails with
    /// [`StoreError::Duplicate`] only if the generated id collides.
    async fn create_proposal(&self, new: NewProposal) -> Result<Proposal, StoreError>;

    /// Fetch a proposal. A malformed or unknown id is `Ok(None)`, not an
    /// error.
    async fn get_proposal(&self, id: &ProposalId) -> Result<Option<Proposal>, StoreError>;

    /// All proposals whose *stored* status is `Active`. Callers apply
    /// [`Proposal::status_at`] for the clock-derived effective status.
    async fn list_active_proposals(&self) -> Result<Vec<Proposal>, StoreError>;

    /// Persist a status transition (used by the close sweep).
    async fn set_proposal_status(
        &self,
        id: &ProposalId,
        status: ProposalStatus,
    ) -> Result<(), StoreError>;

    /// Record a vote. Atomic idempotent upsert keyed on
    /// (proposal, user): concurrent submissions from the same user collapse
    /// to the later write, never two records.
    async fn record_vote(&self, vote: Vote) -> Result<(), StoreError>;

    /// All votes for a proposal, at most one per user.
    async fn list_votes(&self, proposal_id: &ProposalId) -> Result<Vec<Vote>, StoreError>;
}
