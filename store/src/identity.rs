//! The stored user record.

use agora_types::{UserId, WalletAddress};
use serde::{Deserialize, Serialize};

/// A user's wallet binding. Created implicitly on the first link attempt;
/// `wallet_address` is set only by a successful ownership proof and never
/// expires on its own.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletIdentity {
    pub user_id: UserId,
    pub wallet_address: Option<WalletAddress>,
}

impl WalletIdentity {
    pub fn unlinked(user_id: UserId) -> Self {
        Self {
            user_id,
            wallet_address: None,
        }
    }

    pub fn has_wallet(&self) -> bool {
        self.wallet_address.is_some()
    }
}
