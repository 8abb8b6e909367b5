//! Balance-based authorization gate for governance writes.
//!
//! Authorization is `weight > 0` against a live oracle read. The gate is
//! fail-closed: when the oracle cannot be reached within the retry budget
//! and deadline, the weight is zero. Never a cached success; governance
//! actions are latency-tolerant but correctness-sensitive.

use agora_oracle::TokenOracle;
use agora_types::WalletAddress;
use std::sync::Arc;
use std::time::Duration;

/// Retry and deadline policy for a single authorization check.
#[derive(Clone, Copy, Debug)]
pub struct GateConfig {
    /// Total attempts per check (first try + retries).
    pub attempts: u32,
    /// Fixed delay between attempts.
    pub retry_delay: Duration,
    /// Overall deadline across all attempts.
    pub deadline: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            retry_delay: Duration::from_millis(500),
            deadline: Duration::from_secs(8),
        }
    }
}

/// The gate's answer for one wallet at one moment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Decision {
    pub authorized: bool,
    pub weight: u64,
}

pub struct AuthorizationGate {
    oracle: Arc<dyn TokenOracle>,
    config: GateConfig,
}

impl AuthorizationGate {
    pub fn new(oracle: Arc<dyn TokenOracle>, config: GateConfig) -> Self {
        Self { oracle, config }
    }

    /// Decide whether `wallet` may perform a governance write right now.
    pub async fn authorize(&self, wallet: &WalletAddress) -> Decision {
        let weight = match tokio::time::timeout(self.config.deadline, self.read_balance(wallet))
            .await
        {
            Ok(weight) => weight,
            Err(_) => {
                tracing::warn!(wallet = %wallet, "balance read deadline exceeded, treating as zero");
                0
            }
        };
        Decision {
            authorized: weight > 0,
            weight,
        }
    }

    async fn read_balance(&self, wallet: &WalletAddress) -> u64 {
        for attempt in 1..=self.config.attempts {
            match self.oracle.token_balance(wallet).await {
                Ok(balance) => return balance,
                Err(e) => {
                    tracing::warn!(wallet = %wallet, attempt, "balance read failed: {e}");
                    if attempt < self.config.attempts {
                        tokio::time::sleep(self.config.retry_delay).await;
                    }
                }
            }
        }
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_nullables::NullOracle;

    fn fast_config() -> GateConfig {
        GateConfig {
            attempts: 3,
            retry_delay: Duration::from_millis(1),
            deadline: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn positive_balance_authorizes_with_weight() {
        let oracle = Arc::new(NullOracle::new());
        let wallet = WalletAddress::from_public_key(&agora_types::PublicKey([1u8; 32]));
        oracle.set_balance(&wallet, 100);

        let gate = AuthorizationGate::new(oracle, fast_config());
        let decision = gate.authorize(&wallet).await;
        assert_eq!(
            decision,
            Decision {
                authorized: true,
                weight: 100
            }
        );
    }

    #[tokio::test]
    async fn zero_balance_is_unauthorized() {
        let oracle = Arc::new(NullOracle::new());
        let wallet = WalletAddress::from_public_key(&agora_types::PublicKey([1u8; 32]));
        oracle.set_balance(&wallet, 0);

        let gate = AuthorizationGate::new(oracle, fast_config());
        assert!(!gate.authorize(&wallet).await.authorized);
    }

    #[tokio::test]
    async fn oracle_failure_fails_closed() {
        let oracle = Arc::new(NullOracle::new());
        oracle.fail_next(10);
        let wallet = WalletAddress::from_public_key(&agora_types::PublicKey([1u8; 32]));

        let gate = AuthorizationGate::new(oracle, fast_config());
        let decision = gate.authorize(&wallet).await;
        assert_eq!(
            decision,
            Decision {
                authorized: false,
                weight: 0
            }
        );
    }

    #[tokio::test]
    async fn transient_failure_is_retried() {
        let oracle = Arc::new(NullOracle::new());
        let wallet = WalletAddress::from_public_key(&agora_types::PublicKey([1u8; 32]));
        oracle.set_balance(&wallet, 42);
        oracle.fail_next(2);

        let gate = AuthorizationGate::new(oracle, fast_config());
        let decision = gate.authorize(&wallet).await;
        assert_eq!(decision.weight, 42);
    }
}
