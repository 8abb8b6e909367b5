//! The voting wizard: proposal id → yes/no choice → weighted record.

use crate::engine::{require_wallet, WizardDeps};
use crate::step::{Draft, EnterOutcome, StepOutcome, VoteDraft};
use agora_governance::{parse_choice, ProposalStatus, Vote};
use agora_store::StoreError;
use agora_types::{ProposalId, Timestamp, UserId};

pub(crate) async fn enter(
    deps: &WizardDeps,
    user_id: &UserId,
    _now: Timestamp,
) -> Result<EnterOutcome, StoreError> {
    let wallet = match require_wallet(deps, user_id).await? {
        Ok(wallet) => wallet,
        Err(reply) => return Ok(EnterOutcome::Refused { reply }),
    };

    let decision = deps.gate.authorize(&wallet).await;
    if !decision.authorized {
        return Ok(EnterOutcome::Refused {
            reply: "You need to hold governance tokens to vote.".to_string(),
        });
    }

    Ok(EnterOutcome::Started {
        reply: "Please enter the proposal ID you want to vote on:".to_string(),
        draft: Draft::Vote(VoteDraft::default()),
    })
}

pub(crate) async fn step(
    deps: &WizardDeps,
    user_id: &UserId,
    step: usize,
    input: &str,
    draft: &mut Draft,
    now: Timestamp,
) -> Result<StepOutcome, StoreError> {
    let Draft::Vote(draft) = draft else {
        return Err(StoreError::Backend("draft kind mismatch".to_string()));
    };
    let text = input.trim();

    match step {
        0 => {
            let id = ProposalId::new(text);
            let Some(proposal) = deps.store.get_proposal(&id).await? else {
                return Ok(StepOutcome::stay("Invalid proposal ID."));
            };
            if proposal.status_at(now) != ProposalStatus::Active {
                return Ok(StepOutcome::stay(
                    "This proposal is not active. Please enter another proposal ID.",
                ));
            }

            draft.proposal_id = Some(id);
            Ok(StepOutcome::advance(format!(
                "Proposal: {}\n\nPlease vote by replying with either 'yes' or 'no'.",
                proposal.title
            )))
        }
        _ => {
            let Some(choice) = parse_choice(text) else {
                return Ok(StepOutcome::stay("Invalid vote. Please vote \"yes\" or \"no\"."));
            };
            let Some(proposal_id) = draft.proposal_id.clone() else {
                return Err(StoreError::Backend("vote draft missing proposal".to_string()));
            };

            // The proposal may have closed while the user was deciding.
            let still_active = deps
                .store
                .get_proposal(&proposal_id)
                .await?
                .map(|p| p.status_at(now) == ProposalStatus::Active)
                .unwrap_or(false);
            if !still_active {
                return Ok(StepOutcome::done(
                    "This proposal is no longer active; your vote was not recorded.",
                ));
            }

            // Weight is the balance at vote time, not at wizard entry. The
            // wallet is re-read too; it may have been re-linked meanwhile.
            let wallet = match require_wallet(deps, user_id).await? {
                Ok(wallet) => wallet,
                Err(reply) => return Ok(StepOutcome::done(reply)),
            };
            let decision = deps.gate.authorize(&wallet).await;

            deps.store
                .record_vote(Vote {
                    proposal_id,
                    user_id: user_id.clone(),
                    choice,
                    weight: decision.weight,
                })
                .await?;

            Ok(StepOutcome::done("Your vote has been recorded successfully."))
        }
    }
}
