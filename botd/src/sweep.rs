//! Proposal close sweep.
//!
//! Effective proposal status is computed from the clock on every read, so
//! votes are refused the moment a voting period elapses regardless of this
//! sweep. The sweep exists for the outward half: persisting the `Closed`
//! status and announcing the tally to the group. It also reclaims expired
//! handshake state.

use agora_governance::{tally, ProposalStatus};
use agora_handshake::WalletLinker;
use agora_store::{GovernanceStore, StoreError};
use agora_types::{ChatSender, ChatTarget, GroupId, Timestamp};
use std::sync::Arc;
use std::time::Duration;

/// Close every stored-active proposal whose voting period has elapsed and
/// announce its result. Returns how many were closed.
pub async fn sweep_once(
    store: &dyn GovernanceStore,
    chat: &dyn ChatSender,
    group: &GroupId,
    now: Timestamp,
) -> Result<usize, StoreError> {
    let mut closed = 0;
    for proposal in store.list_active_proposals().await? {
        if proposal.status_at(now) != ProposalStatus::Closed {
            continue;
        }
        store
            .set_proposal_status(&proposal.id, ProposalStatus::Closed)
            .await?;
        closed += 1;

        let votes = store.list_votes(&proposal.id).await?;
        let totals = tally(&votes);
        let verdict = if totals.passed() { "passed" } else { "was rejected" };
        let text = format!(
            "Voting has ended for \"{}\". Yes {} / no {} ({} voters). The proposal {}.",
            proposal.title, totals.yes_weight, totals.no_weight, totals.voters, verdict
        );
        if let Err(e) = chat.send(&ChatTarget::Group(group.clone()), &text).await {
            tracing::warn!(proposal = %proposal.id, "close announcement failed: {e}");
        }
        tracing::info!(proposal = %proposal.id, verdict, "proposal closed");
    }
    Ok(closed)
}

/// Periodic sweep loop, run as a background task until aborted.
pub async fn run_sweeper(
    store: Arc<dyn GovernanceStore>,
    chat: Arc<dyn ChatSender>,
    linker: Arc<WalletLinker>,
    group: GroupId,
    interval_secs: u64,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        let now = Timestamp::now();

        if let Err(e) = sweep_once(store.as_ref(), chat.as_ref(), &group, now).await {
            tracing::error!("proposal sweep failed: {e}");
        }
        let (links, sessions) = linker.purge_expired(now);
        if links + sessions > 0 {
            tracing::debug!(links, sessions, "expired handshake state reclaimed");
        }
    }
}
