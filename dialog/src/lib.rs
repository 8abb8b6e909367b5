//! Multi-step chat dialogs.
//!
//! A wizard is an ordered sequence of steps over a draft record. The engine
//! owns session lifecycle and the rules every wizard shares: preconditions
//! run before a session exists, invalid input re-prompts without advancing,
//! and the terminal step tears the session down no matter how it went. The
//! wizards themselves are a closed set (link wallet, create proposal,
//! vote), dispatched by tag, not a class hierarchy.

pub mod engine;
pub mod step;
mod wizards;

pub use engine::{DialogEngine, DialogSession, WizardDeps, WizardKind};
pub use step::{Draft, EnterOutcome, ProposalDraft, StepOutcome, Transition, VoteDraft};
