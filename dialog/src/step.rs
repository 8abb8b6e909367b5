//! Step outcomes and per-wizard draft records.
//!
//! Drafts are plain data. A step handler may only mutate the draft when it
//! accepts the input; on invalid input it returns [`Transition::Stay`] and
//! the draft is untouched, which makes every step idempotent under
//! repeated bad input.

use agora_types::ProposalId;

/// What entering a wizard produced.
pub enum EnterOutcome {
    /// A precondition failed; the reply explains why. No session exists.
    Refused { reply: String },
    /// The wizard started; the reply is the first prompt.
    Started { reply: String, draft: Draft },
}

/// What one step invocation produced.
pub struct StepOutcome {
    pub reply: Option<String>,
    pub transition: Transition,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// Input rejected: re-prompt, same step, draft untouched.
    Stay,
    /// Input accepted: move to the next step.
    Advance,
    /// Terminal step ran (or the wizard refused to continue); destroy the
    /// session.
    Done,
}

impl StepOutcome {
    pub fn stay(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            transition: Transition::Stay,
        }
    }

    pub fn advance(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            transition: Transition::Advance,
        }
    }

    pub fn done(reply: impl Into<String>) -> Self {
        Self {
            reply: Some(reply.into()),
            transition: Transition::Done,
        }
    }
}

/// The draft record carried across a wizard's steps.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Draft {
    /// Wallet linking keeps no chat-side draft; handshake progress lives
    /// in the linker.
    LinkWallet,
    CreateProposal(ProposalDraft),
    Vote(VoteDraft),
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProposalDraft {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VoteDraft {
    pub proposal_id: Option<ProposalId>,
}
