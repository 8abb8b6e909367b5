//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};

/// Configuration for the governance bot daemon.
///
/// Can be loaded from a TOML file via [`BotConfig::from_toml_str`] or built
/// programmatically (e.g. for tests). CLI flags and environment variables
/// override file values; see `main.rs`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotConfig {
    /// Chain JSON-RPC endpoint for balance reads and submissions.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Mint address of the governance token.
    pub token_mint: String,

    /// Group channel id for proposal announcements.
    pub group_chat_id: String,

    /// Webhook the chat transport exposes for outbound messages.
    pub outbound_url: String,

    /// Public URL of the hosted wallet connector page.
    pub connector_url: String,

    /// Address the inbound HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Handshake session lifetime.
    #[serde(default = "default_session_ttl")]
    pub session_ttl_secs: u64,

    /// How long a link attempt waits for its envelope.
    #[serde(default = "default_link_ttl")]
    pub link_ttl_secs: u64,

    /// Challenge freshness window (two-sided).
    #[serde(default = "default_challenge_window")]
    pub challenge_window_secs: u64,

    /// Interval between proposal-close sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_secs: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl BotConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_rpc_url() -> String {
    "https://api.mainnet-beta.solana.com".to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_session_ttl() -> u64 {
    3600
}

fn default_link_ttl() -> u64 {
    600
}

fn default_challenge_window() -> u64 {
    300
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}
