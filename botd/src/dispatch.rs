//! Chat update dispatcher.
//!
//! Routes top-level commands, feeds free text into the active wizard, and
//! turns wallet-link envelopes into chat confirmations. A top-level command
//! always wins over an in-progress dialog: entering a wizard implicitly
//! abandons the previous one, so no orphaned state can block a user.

use agora_dialog::{DialogEngine, WizardKind};
use agora_governance::{tally, ProposalStatus};
use agora_handshake::{Envelope, HandshakeError, LinkEvent, WalletLinker};
use agora_store::GovernanceStore;
use agora_types::{ChatSender, ChatTarget, ProposalId, Timestamp, UserId};
use std::sync::Arc;

const WELCOME: &str = "\
Welcome to the Governance Bot!

This bot lets you take part in on-chain governance:

- Link your wallet
- Create proposals
- Vote on active proposals

Use /menu to see available options.";

const MENU: &str = "\
What would you like to do?

/linkwallet - Link your wallet
/createproposal - Create a new proposal
/vote - Vote on a proposal
/proposals - View active proposals
/results <id> - View a proposal's results
/cancel - Leave the current dialog
/help - Help";

const HELP: &str = "\
Available commands:
/menu - Show main menu
/linkwallet - Link your wallet
/createproposal - Create a new proposal
/vote - Vote on an existing proposal
/proposals - List active proposals
/results <id> - Show vote totals for a proposal
/cancel - Leave the current dialog";

pub struct Dispatcher {
    engine: DialogEngine,
    linker: Arc<WalletLinker>,
    store: Arc<dyn GovernanceStore>,
    chat: Arc<dyn ChatSender>,
}

impl Dispatcher {
    pub fn new(
        engine: DialogEngine,
        linker: Arc<WalletLinker>,
        store: Arc<dyn GovernanceStore>,
        chat: Arc<dyn ChatSender>,
    ) -> Self {
        Self {
            engine,
            linker,
            store,
            chat,
        }
    }

    /// Handle one inbound chat message from a user.
    pub async fn handle_update(&self, user_id: &UserId, text: &str, now: Timestamp) {
        let text = text.trim();
        let (command, arg) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (text, ""),
        };

        match command {
            "/start" => self.reply(user_id, WELCOME).await,
            "/menu" => self.reply(user_id, MENU).await,
            "/help" => self.reply(user_id, HELP).await,
            "/linkwallet" => self.engine.enter(WizardKind::LinkWallet, user_id, now).await,
            "/createproposal" => {
                self.engine
                    .enter(WizardKind::CreateProposal, user_id, now)
                    .await
            }
            "/vote" => {
                self.engine.enter(WizardKind::Vote, user_id, now).await;
                // `/vote <id>` pre-fills the first step, matching the
                // announcement text.
                if !arg.is_empty() && self.engine.in_dialog(user_id).await {
                    self.engine.input(user_id, arg, now).await;
                }
            }
            "/proposals" => self.list_proposals(user_id, now).await,
            "/results" => self.show_results(user_id, arg, now).await,
            "/cancel" => {
                let left = self.engine.leave(user_id).await;
                let reply = if left {
                    "Dialog cancelled."
                } else {
                    "There is no dialog in progress."
                };
                self.reply(user_id, reply).await;
            }
            _ if command.starts_with('/') => {
                self.reply(user_id, "Unknown command. Use /menu to see available options.")
                    .await
            }
            _ => {
                if !self.engine.input(user_id, text, now).await {
                    self.reply(user_id, "Use /menu to see available options.")
                        .await;
                }
            }
        }
    }

    /// Handle a wallet-link envelope delivered out-of-band.
    pub async fn handle_envelope(
        &self,
        user_id: &UserId,
        envelope: &Envelope,
        now: Timestamp,
    ) -> Result<LinkEvent, HandshakeError> {
        let result = self.linker.handle_envelope(user_id, envelope, now).await;
        match &result {
            Ok(LinkEvent::WalletLinked { wallet, .. }) => {
                // The link wizard, if still open, has done its job.
                self.engine.leave(user_id).await;
                let balance = self.engine.deps().gate.authorize(wallet).await.weight;
                self.reply(
                    user_id,
                    &format!(
                        "Wallet {wallet} successfully linked to your account.\nYour current token balance is: {balance}"
                    ),
                )
                .await;
            }
            Ok(LinkEvent::Disconnected) => {
                self.reply(user_id, "Wallet session disconnected.").await;
            }
            Ok(LinkEvent::TransactionSubmitted { .. }) => {
                self.reply(user_id, "Your transaction has been submitted.")
                    .await;
            }
            Err(e) => {
                tracing::warn!(user = %user_id, "envelope rejected: {e}");
                self.reply(user_id, envelope_failure_reply(e)).await;
            }
        }
        result
    }

    async fn list_proposals(&self, user_id: &UserId, now: Timestamp) {
        match self.store.list_active_proposals().await {
            Ok(proposals) => {
                let open: Vec<String> = proposals
                    .iter()
                    .filter(|p| p.status_at(now) == ProposalStatus::Active)
                    .map(|p| {
                        format!(
                            "{} (id: {}, {}h voting period)",
                            p.title, p.id, p.voting_period_hours
                        )
                    })
                    .collect();
                let reply = if open.is_empty() {
                    "There are no active proposals right now.".to_string()
                } else {
                    format!("Active proposals:\n{}", open.join("\n"))
                };
                self.reply(user_id, &reply).await;
            }
            Err(e) => {
                tracing::error!("listing proposals failed: {e}");
                self.reply(user_id, "Something went wrong. Please try again.")
                    .await;
            }
        }
    }

    async fn show_results(&self, user_id: &UserId, arg: &str, now: Timestamp) {
        if arg.is_empty() {
            self.reply(user_id, "Usage: /results <proposal id>").await;
            return;
        }
        let id = ProposalId::new(arg);
        let outcome = async {
            let proposal = self.store.get_proposal(&id).await?;
            let votes = self.store.list_votes(&id).await?;
            Ok::<_, agora_store::StoreError>((proposal, votes))
        }
        .await;

        match outcome {
            Ok((Some(proposal), votes)) => {
                let totals = tally(&votes);
                let status = match proposal.status_at(now) {
                    ProposalStatus::Active => "voting is still open",
                    ProposalStatus::Closed => {
                        if totals.passed() {
                            "the proposal passed"
                        } else {
                            "the proposal was rejected"
                        }
                    }
                };
                self.reply(
                    user_id,
                    &format!(
                        "Results for \"{}\": yes {} / no {} ({} voters); {}.",
                        proposal.title, totals.yes_weight, totals.no_weight, totals.voters, status
                    ),
                )
                .await;
            }
            Ok((None, _)) => self.reply(user_id, "Invalid proposal ID.").await,
            Err(e) => {
                tracing::error!(proposal = %id, "results lookup failed: {e}");
                self.reply(user_id, "Something went wrong. Please try again.")
                    .await;
            }
        }
    }

    async fn reply(&self, user_id: &UserId, text: &str) {
        let target = ChatTarget::User(user_id.clone());
        if let Err(e) = self.chat.send(&target, text).await {
            tracing::warn!(user = %user_id, "reply delivery failed: {e}");
        }
    }
}

fn envelope_failure_reply(error: &HandshakeError) -> &'static str {
    match error {
        HandshakeError::ProofRejected => {
            "Wallet verification failed. Please start again with /linkwallet."
        }
        HandshakeError::NoPendingLink | HandshakeError::SessionNotFound => {
            "No link attempt in progress. Use /linkwallet to start."
        }
        HandshakeError::SessionExpired => {
            "Your wallet session expired. Use /linkwallet to start again."
        }
        HandshakeError::MalformedEnvelope(_) | HandshakeError::Crypto(_) => {
            "We could not read your wallet data. Please try linking again from the beginning."
        }
        HandshakeError::Submission(_) => "Transaction submission failed. Please try again.",
        HandshakeError::Store(_) => "Something went wrong. Please try again.",
    }
}
