//! Nullable outbound collaborators — record instead of deliver.

use agora_types::{ChatSender, ChatTarget, OutboundError, TransactionSubmitter, WalletAddress};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// A chat sink that records every message instead of delivering it.
pub struct NullChatSender {
    sent: Mutex<Vec<(ChatTarget, String)>>,
    failing: AtomicBool,
}

impl NullChatSender {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
        }
    }

    /// Make every subsequent send fail. Delivery failures must not roll
    /// back persisted state; tests assert that.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Messages delivered to a specific target, in order.
    pub fn sent_to(&self, target: &ChatTarget) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| t == target)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl Default for NullChatSender {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatSender for NullChatSender {
    async fn send(&self, target: &ChatTarget, text: &str) -> Result<(), OutboundError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(OutboundError("null sender failure".into()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((target.clone(), text.to_string()));
        Ok(())
    }
}

/// A transaction sink that records submissions.
pub struct NullSubmitter {
    submitted: Mutex<Vec<(WalletAddress, Vec<u8>)>>,
}

impl NullSubmitter {
    pub fn new() -> Self {
        Self {
            submitted: Mutex::new(Vec::new()),
        }
    }

    pub fn submitted(&self) -> Vec<(WalletAddress, Vec<u8>)> {
        self.submitted.lock().unwrap().clone()
    }
}

impl Default for NullSubmitter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransactionSubmitter for NullSubmitter {
    async fn submit(&self, wallet: &WalletAddress, tx_bytes: &[u8]) -> Result<(), OutboundError> {
        self.submitted
            .lock()
            .unwrap()
            .push((wallet.clone(), tx_bytes.to_vec()));
        Ok(())
    }
}
