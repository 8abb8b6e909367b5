//! Fundamental types for the Agora governance bot.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: user and session identifiers, wallet addresses, timestamps,
//! key material, and the outbound collaborator traits (chat delivery,
//! transaction submission).

pub mod address;
pub mod ids;
pub mod keys;
pub mod outbound;
pub mod time;

pub use address::{AddressError, WalletAddress};
pub use ids::{GroupId, ProposalId, SessionId, UserId};
pub use keys::{PublicKey, Signature};
pub use outbound::{ChatSender, ChatTarget, OutboundError, TransactionSubmitter};
pub use time::Timestamp;
