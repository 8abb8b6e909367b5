//! JSON-RPC client for SPL-style token balance lookups.
//!
//! Asks the node for the wallet's token accounts filtered by the governance
//! mint and sums their amounts. A wallet with no token account simply has
//! balance zero; that is a successful read, not an error.

use crate::{OracleError, TokenOracle};
use agora_types::WalletAddress;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

/// Default per-request timeout for balance reads.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Token balance oracle backed by the chain's JSON-RPC endpoint.
pub struct RpcOracle {
    http: reqwest::Client,
    rpc_url: String,
    token_mint: String,
}

#[derive(Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<RpcResult>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct RpcResult {
    #[serde(default)]
    value: Vec<Value>,
}

impl RpcOracle {
    pub fn new(rpc_url: impl Into<String>, token_mint: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction");
        Self {
            http,
            rpc_url: rpc_url.into(),
            token_mint: token_mint.into(),
        }
    }

    /// Pull the integer amount out of one token-account entry.
    ///
    /// Response shape (jsonParsed encoding):
    /// `account.data.parsed.info.tokenAmount.amount`, a stringified u64.
    fn account_amount(entry: &Value) -> Result<u64, OracleError> {
        let amount = entry
            .pointer("/account/data/parsed/info/tokenAmount/amount")
            .and_then(Value::as_str)
            .ok_or_else(|| OracleError::Malformed("missing tokenAmount.amount".into()))?;
        amount
            .parse::<u64>()
            .map_err(|_| OracleError::Malformed(format!("non-integer amount {amount:?}")))
    }
}

#[async_trait]
impl TokenOracle for RpcOracle {
    async fn token_balance(&self, wallet: &WalletAddress) -> Result<u64, OracleError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "getTokenAccountsByOwner",
            "params": [
                wallet.as_str(),
                { "mint": self.token_mint },
                { "encoding": "jsonParsed" },
            ],
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OracleError::Transport(e.to_string()))?;

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        if let Some(err) = body.error {
            return Err(OracleError::Rpc(err.to_string()));
        }
        let result = body
            .result
            .ok_or_else(|| OracleError::Malformed("missing result".into()))?;

        let mut total = 0u64;
        for entry in &result.value {
            total = total.saturating_add(Self::account_amount(entry)?);
        }
        tracing::debug!(wallet = %wallet, balance = total, "token balance read");
        Ok(total)
    }
}
