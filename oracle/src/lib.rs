//! Token balance oracle.
//!
//! Governance weight comes from a live balance read against the chain's
//! RPC endpoint. The oracle itself is a thin, single-shot read; retry and
//! fail-closed policy belong to the authorization gate that consumes it.

pub mod client;

pub use client::RpcOracle;

use agora_types::WalletAddress;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("balance endpoint unreachable: {0}")]
    Transport(String),

    #[error("balance endpoint returned an error: {0}")]
    Rpc(String),

    #[error("unexpected balance response shape: {0}")]
    Malformed(String),
}

/// A live read of the governance token balance for a wallet.
///
/// Implementations must not cache: a stale success is worse than a failure,
/// which the gate maps to zero weight.
#[async_trait]
pub trait TokenOracle: Send + Sync {
    async fn token_balance(&self, wallet: &WalletAddress) -> Result<u64, OracleError>;
}
