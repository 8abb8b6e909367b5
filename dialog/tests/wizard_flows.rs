//! Wizard flows end-to-end against the in-memory store and nullable
//! collaborators, including the combined link → propose → vote scenario.

use agora_connector::Connector;
use agora_dialog::{DialogEngine, WizardDeps, WizardKind};
use agora_governance::{AuthorizationGate, GateConfig, NewProposal, ProposalStatus, Vote};
use agora_handshake::{LinkerConfig, WalletLinker};
use agora_nullables::{NullChatSender, NullOracle, NullSubmitter};
use agora_store::{GovernanceStore, MemoryStore, StoreError, WalletIdentity};
use agora_types::{
    ChatTarget, GroupId, ProposalId, PublicKey, Timestamp, UserId, WalletAddress,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

const NOW: Timestamp = Timestamp::new(1_700_000_000);

fn fixture() -> Fixture {
    fixture_with_store(Arc::new(MemoryStore::new()))
}

fn fixture_with_store<S: GovernanceStore + 'static>(store: Arc<S>) -> FixtureOf<S> {
    let oracle = Arc::new(NullOracle::new());
    let chat = Arc::new(NullChatSender::new());
    let linker = Arc::new(WalletLinker::new(
        store.clone(),
        Arc::new(NullSubmitter::new()),
        LinkerConfig::default(),
    ));
    let gate = AuthorizationGate::new(
        oracle.clone(),
        GateConfig {
            attempts: 2,
            retry_delay: Duration::from_millis(1),
            deadline: Duration::from_secs(2),
        },
    );
    let engine = DialogEngine::new(WizardDeps {
        store: store.clone(),
        gate,
        chat: chat.clone(),
        linker: linker.clone(),
        group: GroupId::new("group-1"),
        connector_url: "https://bot.example/wallet-link".to_string(),
    });
    FixtureOf {
        store,
        oracle,
        chat,
        linker,
        engine,
    }
}

struct FixtureOf<S> {
    store: Arc<S>,
    oracle: Arc<NullOracle>,
    chat: Arc<NullChatSender>,
    linker: Arc<WalletLinker>,
    engine: DialogEngine,
}

type Fixture = FixtureOf<MemoryStore>;

fn wallet(seed: u8) -> WalletAddress {
    WalletAddress::from_public_key(&PublicKey([seed; 32]))
}

/// Shortcut: put a linked user with a given balance in place.
async fn link_user(fx: &Fixture, user: &UserId, seed: u8, balance: u64) -> WalletAddress {
    let addr = wallet(seed);
    fx.store.upsert_wallet(user, &addr).await.unwrap();
    fx.oracle.set_balance(&addr, balance);
    addr
}

fn last_reply(fx: &Fixture, user: &UserId) -> String {
    fx.chat
        .sent_to(&ChatTarget::User(user.clone()))
        .last()
        .cloned()
        .expect("expected a reply")
}

#[tokio::test]
async fn zero_balance_user_cannot_enter_create_proposal() {
    let fx = fixture();
    let user = UserId::new("u1");
    link_user(&fx, &user, 1, 0).await;

    fx.engine.enter(WizardKind::CreateProposal, &user, NOW).await;
    assert!(last_reply(&fx, &user).contains("hold governance tokens"));
    assert!(!fx.engine.in_dialog(&user).await);
    assert!(fx.store.list_active_proposals().await.unwrap().is_empty());
}

#[tokio::test]
async fn vote_without_wallet_is_refused_without_a_session() {
    let fx = fixture();
    let user = UserId::new("u1");

    fx.engine.enter(WizardKind::Vote, &user, NOW).await;
    assert!(last_reply(&fx, &user).contains("link your wallet"));
    assert!(!fx.engine.in_dialog(&user).await);
}

#[tokio::test]
async fn create_proposal_walks_title_description_hours() {
    let fx = fixture();
    let user = UserId::new("u1");
    link_user(&fx, &user, 1, 100).await;

    fx.engine.enter(WizardKind::CreateProposal, &user, NOW).await;
    assert_eq!(last_reply(&fx, &user), "Please enter the proposal title:");

    assert!(fx.engine.input(&user, "T", NOW).await);
    assert_eq!(last_reply(&fx, &user), "Please enter the proposal description:");

    assert!(fx.engine.input(&user, "D", NOW).await);
    assert_eq!(last_reply(&fx, &user), "Please enter the voting period in hours:");

    assert!(fx.engine.input(&user, "24", NOW).await);
    assert!(last_reply(&fx, &user).contains("Proposal created successfully!"));
    assert!(!fx.engine.in_dialog(&user).await);

    let proposals = fx.store.list_active_proposals().await.unwrap();
    assert_eq!(proposals.len(), 1);
    let proposal = &proposals[0];
    assert_eq!(proposal.title, "T");
    assert_eq!(proposal.description, "D");
    assert_eq!(proposal.voting_period_hours, 24);
    assert_eq!(proposal.status, ProposalStatus::Active);
    assert_eq!(proposal.creator_id, user);

    // The group got its announcement.
    let announcements = fx.chat.sent_to(&ChatTarget::Group(GroupId::new("group-1")));
    assert_eq!(announcements.len(), 1);
    assert!(announcements[0].contains("New proposal created!"));
    assert!(announcements[0].contains(proposal.id.as_str()));
}

#[tokio::test]
async fn invalid_voting_period_reprompts_without_advancing() {
    let fx = fixture();
    let user = UserId::new("u1");
    link_user(&fx, &user, 1, 100).await;

    fx.engine.enter(WizardKind::CreateProposal, &user, NOW).await;
    fx.engine.input(&user, "T", NOW).await;
    fx.engine.input(&user, "D", NOW).await;

    for bad in ["abc", "-5", "0"] {
        fx.engine.input(&user, bad, NOW).await;
        assert!(
            last_reply(&fx, &user).contains("Invalid voting period"),
            "input {bad:?} should re-prompt"
        );
        assert!(fx.store.list_active_proposals().await.unwrap().is_empty());
        assert!(fx.engine.in_dialog(&user).await);
    }

    // The step never advanced; a valid value still lands here.
    fx.engine.input(&user, "24", NOW).await;
    assert_eq!(fx.store.list_active_proposals().await.unwrap().len(), 1);
}

#[tokio::test]
async fn weighted_vote_upserts_per_user() {
    let fx = fixture();
    let creator = UserId::new("u1");
    link_user(&fx, &creator, 1, 100).await;

    fx.engine.enter(WizardKind::CreateProposal, &creator, NOW).await;
    fx.engine.input(&creator, "T", NOW).await;
    fx.engine.input(&creator, "D", NOW).await;
    fx.engine.input(&creator, "24", NOW).await;
    let proposal = fx.store.list_active_proposals().await.unwrap().remove(0);

    // V votes yes with balance 50.
    let voter = UserId::new("v1");
    let voter_wallet = link_user(&fx, &voter, 2, 50).await;

    fx.engine.enter(WizardKind::Vote, &voter, NOW).await;
    fx.engine.input(&voter, proposal.id.as_str(), NOW).await;
    assert!(last_reply(&fx, &voter).contains("Proposal: T"));
    fx.engine.input(&voter, "yes", NOW).await;
    assert!(last_reply(&fx, &voter).contains("recorded successfully"));

    let votes = fx.store.list_votes(&proposal.id).await.unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].choice, true);
    assert_eq!(votes[0].weight, 50);

    // Later V's balance grows to 70 and the vote flips to no: still one
    // record, with the later values.
    fx.oracle.set_balance(&voter_wallet, 70);
    fx.engine.enter(WizardKind::Vote, &voter, NOW).await;
    fx.engine.input(&voter, proposal.id.as_str(), NOW).await;
    fx.engine.input(&voter, "NO", NOW).await;

    let votes = fx.store.list_votes(&proposal.id).await.unwrap();
    assert_eq!(votes.len(), 1);
    assert_eq!(votes[0].choice, false);
    assert_eq!(votes[0].weight, 70);
}

#[tokio::test]
async fn unknown_proposal_id_reprompts() {
    let fx = fixture();
    let user = UserId::new("u1");
    link_user(&fx, &user, 1, 10).await;

    fx.engine.enter(WizardKind::Vote, &user, NOW).await;
    fx.engine.input(&user, "no-such-id", NOW).await;
    assert!(last_reply(&fx, &user).contains("Invalid proposal ID"));
    assert!(fx.engine.in_dialog(&user).await);
}

#[tokio::test]
async fn clock_closed_proposal_refuses_votes_before_any_sweep() {
    let fx = fixture();
    let user = UserId::new("u1");
    link_user(&fx, &user, 1, 10).await;

    let proposal = fx
        .store
        .create_proposal(NewProposal {
            title: "short".into(),
            description: "d".into(),
            creator_id: user.clone(),
            voting_period_hours: 1,
            created_at: NOW,
        })
        .await
        .unwrap();

    let after_close = Timestamp::new(NOW.as_secs() + 3601);
    fx.engine.enter(WizardKind::Vote, &user, after_close).await;
    fx.engine.input(&user, proposal.id.as_str(), after_close).await;
    assert!(last_reply(&fx, &user).contains("not active"));
}

#[tokio::test]
async fn invalid_choice_reprompts_then_accepts() {
    let fx = fixture();
    let user = UserId::new("u1");
    link_user(&fx, &user, 1, 10).await;

    let proposal = fx
        .store
        .create_proposal(NewProposal {
            title: "T".into(),
            description: "d".into(),
            creator_id: user.clone(),
            voting_period_hours: 24,
            created_at: NOW,
        })
        .await
        .unwrap();

    fx.engine.enter(WizardKind::Vote, &user, NOW).await;
    fx.engine.input(&user, proposal.id.as_str(), NOW).await;
    fx.engine.input(&user, "maybe", NOW).await;
    assert!(last_reply(&fx, &user).contains("Invalid vote"));

    fx.engine.input(&user, "Yes", NOW).await;
    let votes = fx.store.list_votes(&proposal.id).await.unwrap();
    assert_eq!(votes.len(), 1);
    assert!(votes[0].choice);
}

#[tokio::test]
async fn entering_a_new_wizard_replaces_the_old_dialog() {
    let fx = fixture();
    let user = UserId::new("u1");
    link_user(&fx, &user, 1, 10).await;

    fx.engine.enter(WizardKind::Vote, &user, NOW).await;
    assert!(fx.engine.in_dialog(&user).await);

    // Abandoning mid-wizard by starting another one.
    fx.engine.enter(WizardKind::CreateProposal, &user, NOW).await;
    assert_eq!(last_reply(&fx, &user), "Please enter the proposal title:");

    // Input now feeds the new wizard: a title, not a proposal id.
    fx.engine.input(&user, "my title", NOW).await;
    assert_eq!(last_reply(&fx, &user), "Please enter the proposal description:");
}

#[tokio::test]
async fn leave_ends_the_dialog() {
    let fx = fixture();
    let user = UserId::new("u1");
    link_user(&fx, &user, 1, 10).await;

    fx.engine.enter(WizardKind::CreateProposal, &user, NOW).await;
    assert!(fx.engine.leave(&user).await);
    assert!(!fx.engine.in_dialog(&user).await);
    assert!(!fx.engine.input(&user, "text", NOW).await);
    assert!(!fx.engine.leave(&user).await);
}

#[tokio::test]
async fn announcement_failure_does_not_roll_back_the_proposal() {
    let fx = fixture();
    let user = UserId::new("u1");
    link_user(&fx, &user, 1, 100).await;

    fx.engine.enter(WizardKind::CreateProposal, &user, NOW).await;
    fx.engine.input(&user, "T", NOW).await;
    fx.engine.input(&user, "D", NOW).await;

    fx.chat.set_failing(true);
    fx.engine.input(&user, "24", NOW).await;
    fx.chat.set_failing(false);

    assert_eq!(fx.store.list_active_proposals().await.unwrap().len(), 1);
    assert!(!fx.engine.in_dialog(&user).await);
}

#[tokio::test]
async fn link_wallet_wizard_hands_out_the_connector_url() {
    let fx = fixture();
    let user = UserId::new("u1");

    fx.engine.enter(WizardKind::LinkWallet, &user, NOW).await;
    let reply = last_reply(&fx, &user);
    assert!(reply.contains("https://bot.example/wallet-link?user=u1&key="));
    assert!(fx.linker.has_pending_link(&user, NOW));

    // Chat text during the out-of-band handshake just re-points the user.
    fx.engine.input(&user, "hello?", NOW).await;
    assert!(last_reply(&fx, &user).contains("wallet connector link"));

    // Once linked, re-entering refuses.
    link_user(&fx, &user, 3, 0).await;
    fx.engine.enter(WizardKind::LinkWallet, &user, NOW).await;
    assert!(last_reply(&fx, &user).contains("already have a wallet linked"));
}

#[tokio::test]
async fn full_link_then_propose_flow() {
    let fx = fixture();
    let user = UserId::new("u1");

    fx.engine.enter(WizardKind::LinkWallet, &user, NOW).await;
    let reply = last_reply(&fx, &user);
    let key_b58 = reply
        .split("key=")
        .nth(1)
        .expect("connector url carries the backend key");
    let key_bytes: [u8; 32] = bs58::decode(key_b58.trim())
        .into_vec()
        .unwrap()
        .try_into()
        .unwrap();

    // The connector completes the handshake out-of-band.
    let connector = Connector::new([21u8; 32], &key_bytes).unwrap();
    let envelope = connector.connect_envelope(&user, NOW).unwrap();
    fx.linker.handle_envelope(&user, &envelope, NOW).await.unwrap();
    fx.engine.leave(&user).await;

    fx.oracle.set_balance(&connector.wallet_address(), 100);

    fx.engine.enter(WizardKind::CreateProposal, &user, NOW).await;
    fx.engine.input(&user, "T", NOW).await;
    fx.engine.input(&user, "D", NOW).await;
    fx.engine.input(&user, "24", NOW).await;
    assert_eq!(fx.store.list_active_proposals().await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Store failure during the terminal step
// ---------------------------------------------------------------------------

/// Delegating store whose vote writes can be made to fail.
struct FlakyStore {
    inner: MemoryStore,
    fail_writes: AtomicBool,
}

impl FlakyStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_writes: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl GovernanceStore for FlakyStore {
    async fn get_user(&self, user_id: &UserId) -> Result<Option<WalletIdentity>, StoreError> {
        self.inner.get_user(user_id).await
    }

    async fn upsert_wallet(
        &self,
        user_id: &UserId,
        wallet: &WalletAddress,
    ) -> Result<(), StoreError> {
        self.inner.upsert_wallet(user_id, wallet).await
    }

    async fn create_proposal(
        &self,
        new: NewProposal,
    ) -> Result<agora_governance::Proposal, StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("store offline".to_string()));
        }
        self.inner.create_proposal(new).await
    }

    async fn get_proposal(
        &self,
        id: &ProposalId,
    ) -> Result<Option<agora_governance::Proposal>, StoreError> {
        self.inner.get_proposal(id).await
    }

    async fn list_active_proposals(&self) -> Result<Vec<agora_governance::Proposal>, StoreError> {
        self.inner.list_active_proposals().await
    }

    async fn set_proposal_status(
        &self,
        id: &ProposalId,
        status: ProposalStatus,
    ) -> Result<(), StoreError> {
        self.inner.set_proposal_status(id, status).await
    }

    async fn record_vote(&self, vote: Vote) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("store offline".to_string()));
        }
        self.inner.record_vote(vote).await
    }

    async fn list_votes(&self, proposal_id: &ProposalId) -> Result<Vec<Vote>, StoreError> {
        self.inner.list_votes(proposal_id).await
    }
}

#[tokio::test]
async fn failed_terminal_write_reports_and_ends_the_dialog() {
    let store = Arc::new(FlakyStore::new());
    let fx = fixture_with_store(store.clone());
    let user = UserId::new("u1");

    let addr = wallet(1);
    store.upsert_wallet(&user, &addr).await.unwrap();
    fx.oracle.set_balance(&addr, 100);

    fx.engine.enter(WizardKind::CreateProposal, &user, NOW).await;
    fx.engine.input(&user, "T", NOW).await;
    fx.engine.input(&user, "D", NOW).await;

    store.fail_writes.store(true, Ordering::SeqCst);
    fx.engine.input(&user, "24", NOW).await;

    // Reported, and the user is not stuck mid-wizard.
    assert!(last_reply_of(&fx.chat, &user).contains("Something went wrong"));
    assert!(!fx.engine.in_dialog(&user).await);

    // A fresh attempt works once the store recovers.
    store.fail_writes.store(false, Ordering::SeqCst);
    fx.engine.enter(WizardKind::CreateProposal, &user, NOW).await;
    fx.engine.input(&user, "T2", NOW).await;
    fx.engine.input(&user, "D2", NOW).await;
    fx.engine.input(&user, "24", NOW).await;
    assert_eq!(store.list_active_proposals().await.unwrap().len(), 1);
}

fn last_reply_of(chat: &NullChatSender, user: &UserId) -> String {
    chat.sent_to(&ChatTarget::User(user.clone()))
        .last()
        .cloned()
        .expect("expected a reply")
}
