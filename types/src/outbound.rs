//! Outbound collaborator traits.
//!
//! The chat transport and the blockchain submitter live outside this
//! codebase; the core only ever talks to them through these seams. Both are
//! async because every outbound call is a suspension point: one user's
//! slow delivery must not stall another user's dialog.

use crate::address::WalletAddress;
use crate::ids::{GroupId, UserId};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("outbound delivery failed: {0}")]
pub struct OutboundError(pub String);

/// Where an outbound chat message goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChatTarget {
    /// A direct reply to one user.
    User(UserId),
    /// The group channel (proposal announcements, tally results).
    Group(GroupId),
}

/// Delivery of chat messages. Failures are reported to the caller, which
/// logs them; they are never retried and never roll back persisted state.
#[async_trait]
pub trait ChatSender: Send + Sync {
    async fn send(&self, target: &ChatTarget, text: &str) -> Result<(), OutboundError>;
}

/// Submission of signed transaction bytes to the chain. The bytes are
/// opaque to this codebase; construction and broadcast are external.
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    async fn submit(&self, wallet: &WalletAddress, tx_bytes: &[u8]) -> Result<(), OutboundError>;
}
