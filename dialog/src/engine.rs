//! The dialog engine: per-user session lifecycle and step dispatch.

use crate::step::{Draft, EnterOutcome, Transition};
use crate::wizards;
use agora_governance::AuthorizationGate;
use agora_handshake::WalletLinker;
use agora_store::{GovernanceStore, StoreError};
use agora_types::{ChatSender, ChatTarget, GroupId, Timestamp, UserId};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The closed set of wizards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WizardKind {
    LinkWallet,
    CreateProposal,
    Vote,
}

/// One user's dialog in progress.
#[derive(Clone, Debug)]
pub struct DialogSession {
    pub kind: WizardKind,
    pub step: usize,
    pub draft: Draft,
}

/// Collaborators every wizard step may call.
pub struct WizardDeps {
    pub store: Arc<dyn GovernanceStore>,
    pub gate: AuthorizationGate,
    pub chat: Arc<dyn ChatSender>,
    pub linker: Arc<WalletLinker>,
    /// Group channel for proposal announcements.
    pub group: GroupId,
    /// Base URL of the hosted wallet connector page.
    pub connector_url: String,
}

/// Drives all wizards for all users.
///
/// Inputs for one user are strictly serialized: the per-user mutex is held
/// across the whole step, awaits included. Different users never share a
/// lock.
pub struct DialogEngine {
    deps: WizardDeps,
    sessions: DashMap<UserId, Arc<Mutex<Option<DialogSession>>>>,
}

impl DialogEngine {
    pub fn new(deps: WizardDeps) -> Self {
        Self {
            deps,
            sessions: DashMap::new(),
        }
    }

    fn slot(&self, user_id: &UserId) -> Arc<Mutex<Option<DialogSession>>> {
        self.sessions
            .entry(user_id.clone())
            .or_default()
            .clone()
    }

    /// Enter a wizard. Any dialog already in progress for this user is
    /// implicitly terminated; no orphaned state may block a fresh entry.
    /// Preconditions run first; if one fails, the user gets an explanatory
    /// reply and no session is created.
    pub async fn enter(&self, kind: WizardKind, user_id: &UserId, now: Timestamp) {
        let slot = self.slot(user_id);
        let mut session = slot.lock().await;
        if session.take().is_some() {
            tracing::debug!(user = %user_id, "prior dialog replaced by new wizard entry");
        }

        let outcome = match kind {
            WizardKind::LinkWallet => wizards::link_wallet::enter(&self.deps, user_id, now).await,
            WizardKind::CreateProposal => {
                wizards::create_proposal::enter(&self.deps, user_id, now).await
            }
            WizardKind::Vote => wizards::vote::enter(&self.deps, user_id, now).await,
        };

        match outcome {
            Ok(EnterOutcome::Refused { reply }) => self.reply(user_id, &reply).await,
            Ok(EnterOutcome::Started { reply, draft }) => {
                *session = Some(DialogSession {
                    kind,
                    step: 0,
                    draft,
                });
                self.reply(user_id, &reply).await;
            }
            Err(e) => {
                tracing::error!(user = %user_id, ?kind, "wizard entry failed: {e}");
                self.reply(user_id, "Something went wrong. Please try again.")
                    .await;
            }
        }
    }

    /// Feed one chat message into the user's active wizard. Returns `false`
    /// when no dialog is in progress (the caller falls back to command
    /// handling).
    pub async fn input(&self, user_id: &UserId, text: &str, now: Timestamp) -> bool {
        let slot = self.slot(user_id);
        let mut guard = slot.lock().await;
        let Some(session) = guard.as_mut() else {
            return false;
        };

        let result = match session.kind {
            WizardKind::LinkWallet => {
                wizards::link_wallet::step(&self.deps, user_id, session.step, text, &mut session.draft, now).await
            }
            WizardKind::CreateProposal => {
                wizards::create_proposal::step(&self.deps, user_id, session.step, text, &mut session.draft, now)
                    .await
            }
            WizardKind::Vote => {
                wizards::vote::step(&self.deps, user_id, session.step, text, &mut session.draft, now).await
            }
        };

        let outcome = match result {
            Ok(outcome) => outcome,
            Err(e) => {
                // A collaborator failed mid-wizard. Report, tear down, done:
                // the user must never be stuck in a half-dead dialog.
                tracing::error!(user = %user_id, step = session.step, "wizard step failed: {e}");
                *guard = None;
                self.reply(user_id, "Something went wrong. The dialog has ended, please try again.")
                    .await;
                return true;
            }
        };

        match outcome.transition {
            Transition::Stay => {}
            Transition::Advance => session.step += 1,
            Transition::Done => *guard = None,
        }
        if let Some(reply) = outcome.reply {
            self.reply(user_id, &reply).await;
        }
        true
    }

    /// Explicitly leave the active dialog, if any. Returns whether there
    /// was one.
    pub async fn leave(&self, user_id: &UserId) -> bool {
        let slot = self.slot(user_id);
        let result = slot.lock().await.take().is_some();
        result
    }

    /// Whether the user currently has a dialog in progress.
    pub async fn in_dialog(&self, user_id: &UserId) -> bool {
        let slot = self.slot(user_id);
        let result = slot.lock().await.is_some();
        result
    }

    pub fn deps(&self) -> &WizardDeps {
        &self.deps
    }

    async fn reply(&self, user_id: &UserId, text: &str) {
        let target = ChatTarget::User(user_id.clone());
        if let Err(e) = self.deps.chat.send(&target, text).await {
            tracing::warn!(user = %user_id, "reply delivery failed: {e}");
        }
    }
}

/// Shared precondition for governance wizards: the user must have a linked
/// wallet. Returns the wallet or the refusal reply.
pub(crate) async fn require_wallet(
    deps: &WizardDeps,
    user_id: &UserId,
) -> Result<Result<agora_types::WalletAddress, String>, StoreError> {
    let identity = deps.store.get_user(user_id).await?;
    Ok(match identity.and_then(|i| i.wallet_address) {
        Some(wallet) => Ok(wallet),
        None => Err("You need to link your wallet first. Use /linkwallet to do so.".to_string()),
    })
}
