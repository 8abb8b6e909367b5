//! In-memory reference backend.
//!
//! Thread-safe maps behind mutexes; every uniqueness constraint is a
//! single-lock map operation, so upserts are atomic. Suitable for tests
//! and single-process deployments.

use crate::{GovernanceStore, StoreError, WalletIdentity};
use agora_governance::{generate_proposal_id, NewProposal, Proposal, ProposalStatus, Vote};
use agora_types::{ProposalId, UserId, WalletAddress};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryStore {
    users: Mutex<HashMap<UserId, WalletIdentity>>,
    proposals: Mutex<HashMap<ProposalId, Proposal>>,
    votes: Mutex<HashMap<(ProposalId, UserId), Vote>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl GovernanceStore for MemoryStore {
    async fn get_user(&self, user_id: &UserId) -> Result<Option<WalletIdentity>, StoreError> {
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }

    async fn upsert_wallet(
        &self,
        user_id: &UserId,
        wallet: &WalletAddress,
    ) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        users
            .entry(user_id.clone())
            .or_insert_with(|| WalletIdentity::unlinked(user_id.clone()))
            .wallet_address = Some(wallet.clone());
        Ok(())
    }

    async fn create_proposal(&self, new: NewProposal) -> Result<Proposal, StoreError> {
        let proposal = Proposal {
            id: generate_proposal_id(),
            title: new.title,
            description: new.description,
            creator_id: new.creator_id,
            voting_period_hours: new.voting_period_hours,
            created_at: new.created_at,
            status: ProposalStatus::Active,
        };
        let mut proposals = self.proposals.lock().unwrap();
        if proposals.contains_key(&proposal.id) {
            return Err(StoreError::Duplicate(proposal.id.to_string()));
        }
        proposals.insert(proposal.id.clone(), proposal.clone());
        Ok(proposal)
    }

    async fn get_proposal(&self, id: &ProposalId) -> Result<Option<Proposal>, StoreError> {
        Ok(self.proposals.lock().unwrap().get(id).cloned())
    }

    async fn list_active_proposals(&self) -> Result<Vec<Proposal>, StoreError> {
        Ok(self
            .proposals
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.status == ProposalStatus::Active)
            .cloned()
            .collect())
    }

    async fn set_proposal_status(
        &self,
        id: &ProposalId,
        status: ProposalStatus,
    ) -> Result<(), StoreError> {
        let mut proposals = self.proposals.lock().unwrap();
        let proposal = proposals
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        proposal.status = status;
        Ok(())
    }

    async fn record_vote(&self, vote: Vote) -> Result<(), StoreError> {
        let key = (vote.proposal_id.clone(), vote.user_id.clone());
        self.votes.lock().unwrap().insert(key, vote);
        Ok(())
    }

    async fn list_votes(&self, proposal_id: &ProposalId) -> Result<Vec<Vote>, StoreError> {
        Ok(self
            .votes
            .lock()
            .unwrap()
            .iter()
            .filter(|((pid, _), _)| pid == proposal_id)
            .map(|(_, vote)| vote.clone())
            .collect())
    }
}
