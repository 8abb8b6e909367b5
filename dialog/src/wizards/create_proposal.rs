//! The proposal-creation wizard: title → description → voting period.

use crate::engine::{require_wallet, WizardDeps};
use crate::step::{Draft, EnterOutcome, ProposalDraft, StepOutcome};
use agora_governance::{parse_voting_period, NewProposal};
use agora_store::StoreError;
use agora_types::{ChatTarget, Timestamp, UserId};

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
            reply: "You need to hold governance tokens to create a proposal.".to_string(),
        });
    }

    Ok(EnterOutcome::Started {
        reply: "Please enter the proposal title:".to_string(),
        draft: Draft::CreateProposal(ProposalDraft::default()),
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
    let Draft::CreateProposal(draft) = draft else {
        // Session corruption; the engine tears the dialog down.
        return Err(StoreError::Backend("draft kind mismatch".to_string()));
    };
    let text = input.trim();

    match step {
        0 => {
            if text.is_empty() {
                return Ok(StepOutcome::stay("Please enter a valid title."));
            }
            draft.title = Some(text.to_string());
            Ok(StepOutcome::advance("Please enter the proposal description:"))
        }
        1 => {
            if text.is_empty() {
                return Ok(StepOutcome::stay("Please enter a valid description."));
            }
            draft.description = Some(text.to_string());
            Ok(StepOutcome::advance(
                "Please enter the voting period in hours:",
            ))
        }
        _ => {
            let Some(hours) = parse_voting_period(text) else {
                return Ok(StepOutcome::stay(
                    "Invalid voting period. Please enter a positive number of hours.",
                ));
            };

            let proposal = deps
                .store
                .create_proposal(NewProposal {
                    title: draft.title.clone().unwrap_or_default(),
                    description: draft.description.clone().unwrap_or_default(),
                    creator_id: user_id.clone(),
                    voting_period_hours: hours,
                    created_at: now,
                })
                .await?;

            // Announce to the group. Delivery failure never rolls the
            // already-persisted proposal back.
            let announcement = format!(
                "New proposal created!\n\nTitle: {}\n\nUse /vote {} to cast your vote.",
                proposal.title, proposal.id
            );
            if let Err(e) = deps
                .chat
                .send(&ChatTarget::Group(deps.group.clone()), &announcement)
                .await
            {
                tracing::warn!(proposal = %proposal.id, "group announcement failed: {e}");
            }

            Ok(StepOutcome::done(format!(
                "Proposal created successfully! Proposal ID: {}",
                proposal.id
            )))
        }
    }
}
