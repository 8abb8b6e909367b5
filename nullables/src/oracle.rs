//! Nullable token oracle — programmable balances and failures.

use agora_oracle::{OracleError, TokenOracle};
use agora_types::WalletAddress;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

/// An in-memory oracle. Unknown wallets read as balance zero; a failure
/// budget makes the next N reads error before normal behavior resumes.
pub struct NullOracle {
    balances: Mutex<HashMap<WalletAddress, u64>>,
    failures_remaining: AtomicU32,
}

impl NullOracle {
    pub fn new() -> Self {
        Self {
            balances: Mutex::new(HashMap::new()),
            failures_remaining: AtomicU32::new(0),
        }
    }

    pub fn set_balance(&self, wallet: &WalletAddress, balance: u64) {
        self.balances
            .lock()
            .unwrap()
            .insert(wallet.clone(), balance);
    }

    /// Make the next `n` reads fail with a transport error.
    pub fn fail_next(&self, n: u32) {
        self.failures_remaining.store(n, Ordering::SeqCst);
    }
}

impl Default for NullOracle {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TokenOracle for NullOracle {
    async fn token_balance(&self, wallet: &WalletAddress) -> Result<u64, OracleError> {
        let remaining = self.failures_remaining.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures_remaining
                .store(remaining - 1, Ordering::SeqCst);
            return Err(OracleError::Transport("null oracle failure".into()));
        }
        Ok(self
            .balances
            .lock()
            .unwrap()
            .get(wallet)
            .copied()
            .unwrap_or(0))
    }
}
