//! Outbound adapters: the chat transport webhook and the chain submitter.
//!
//! Both sit at the external system boundary. The chat transport exposes a
//! webhook we POST messages to; the chain accepts signed transaction bytes
//! over the same JSON-RPC endpoint the oracle reads from.

use agora_types::{ChatSender, ChatTarget, OutboundError, TransactionSubmitter, WalletAddress};
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Delivers chat messages by POSTing to the transport's webhook.
pub struct WebhookChatSender {
    http: reqwest::Client,
    url: String,
}

impl WebhookChatSender {
    pub fn new(url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("reqwest client construction");
        Self {
            http,
            url: url.into(),
        }
    }
}

#[async_trait]
impl ChatSender for WebhookChatSender {
    async fn send(&self, target: &ChatTarget, text: &str) -> Result<(), OutboundError> {
        let (kind, id) = match target {
            ChatTarget::User(user) => ("user", user.to_string()),
            ChatTarget::Group(group) => ("group", group.to_string()),
        };
        let body = json!({ "target_kind": kind, "target_id": id, "text": text });

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| OutboundError(e.to_string()))?;
        if !response.status().is_success() {
            return Err(OutboundError(format!(
                "transport returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Submits signed transaction bytes via the chain's JSON-RPC endpoint.
pub struct RpcTransactionSubmitter {
    http: reqwest::Client,
    rpc_url: String,
}

impl RpcTransactionSubmitter {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .expect("reqwest client construction");
        Self {
            http,
            rpc_url: rpc_url.into(),
        }
    }
}

#[async_trait]
impl TransactionSubmitter for RpcTransactionSubmitter {
    async fn submit(&self, wallet: &WalletAddress, tx_bytes: &[u8]) -> Result<(), OutboundError> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "sendTransaction",
            "params": [bs58::encode(tx_bytes).into_string()],
        });

        let response = self
            .http
            .post(&self.rpc_url)
            .json(&request)
            .send()
            .await
            .map_err(|e| OutboundError(e.to_string()))?;
        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OutboundError(e.to_string()))?;
        if let Some(err) = body.get("error") {
            return Err(OutboundError(err.to_string()));
        }
        tracing::info!(wallet = %wallet, "transaction forwarded to chain");
        Ok(())
    }
}
