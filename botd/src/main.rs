//! Agora governance bot daemon — entry point.

mod config;
mod dispatch;
mod http;
mod logging;
mod outbound;
mod sweep;

use agora_dialog::{DialogEngine, WizardDeps};
use agora_governance::{AuthorizationGate, GateConfig};
use agora_handshake::{LinkerConfig, WalletLinker};
use agora_oracle::RpcOracle;
use agora_store::{GovernanceStore, MemoryStore};
use agora_types::{ChatSender, GroupId};
use anyhow::Context;
use clap::Parser;
use config::BotConfig;
use dispatch::Dispatcher;
use logging::LogFormat;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "agora-botd", about = "Agora governance bot daemon")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base; CLI
    /// flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Chain JSON-RPC endpoint.
    #[arg(long, env = "AGORA_RPC_URL")]
    rpc_url: Option<String>,

    /// Governance token mint address.
    #[arg(long, env = "AGORA_TOKEN_MINT")]
    token_mint: Option<String>,

    /// Group channel id for announcements.
    #[arg(long, env = "AGORA_GROUP_CHAT_ID")]
    group_chat_id: Option<String>,

    /// Chat transport webhook for outbound messages.
    #[arg(long, env = "AGORA_OUTBOUND_URL")]
    outbound_url: Option<String>,

    /// Public URL of the hosted wallet connector page.
    #[arg(long, env = "AGORA_CONNECTOR_URL")]
    connector_url: Option<String>,

    /// Address for the inbound HTTP server.
    #[arg(long, env = "AGORA_BIND_ADDR")]
    bind_addr: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "AGORA_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "AGORA_LOG_FORMAT")]
    log_format: Option<String>,
}

fn resolve_config(cli: &Cli) -> anyhow::Result<BotConfig> {
    let mut cfg = match &cli.config {
        Some(path) => {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("reading config file {}", path.display()))?;
            BotConfig::from_toml_str(&contents)
                .with_context(|| format!("parsing config file {}", path.display()))?
        }
        None => BotConfig {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            token_mint: cli
                .token_mint
                .clone()
                .context("--token-mint (or AGORA_TOKEN_MINT) is required without a config file")?,
            group_chat_id: cli.group_chat_id.clone().context(
                "--group-chat-id (or AGORA_GROUP_CHAT_ID) is required without a config file",
            )?,
            outbound_url: cli.outbound_url.clone().context(
                "--outbound-url (or AGORA_OUTBOUND_URL) is required without a config file",
            )?,
            connector_url: cli.connector_url.clone().context(
                "--connector-url (or AGORA_CONNECTOR_URL) is required without a config file",
            )?,
            bind_addr: "0.0.0.0:3000".to_string(),
            session_ttl_secs: 3600,
            link_ttl_secs: 600,
            challenge_window_secs: 300,
            sweep_interval_secs: 60,
            log_format: "human".to_string(),
            log_level: "info".to_string(),
        },
    };

    // CLI / env overrides on top of the file.
    if let Some(v) = &cli.rpc_url {
        cfg.rpc_url = v.clone();
    }
    if let Some(v) = &cli.token_mint {
        cfg.token_mint = v.clone();
    }
    if let Some(v) = &cli.group_chat_id {
        cfg.group_chat_id = v.clone();
    }
    if let Some(v) = &cli.outbound_url {
        cfg.outbound_url = v.clone();
    }
    if let Some(v) = &cli.connector_url {
        cfg.connector_url = v.clone();
    }
    if let Some(v) = &cli.bind_addr {
        cfg.bind_addr = v.clone();
    }
    if let Some(v) = &cli.log_level {
        cfg.log_level = v.clone();
    }
    if let Some(v) = &cli.log_format {
        cfg.log_format = v.clone();
    }
    Ok(cfg)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = resolve_config(&cli)?;
    logging::init_logging(LogFormat::parse(&cfg.log_format), &cfg.log_level);

    tracing::info!(
        rpc = %cfg.rpc_url,
        mint = %cfg.token_mint,
        bind = %cfg.bind_addr,
        "starting agora-botd"
    );

    let store: Arc<dyn GovernanceStore> = Arc::new(MemoryStore::new());
    let oracle = Arc::new(RpcOracle::new(&cfg.rpc_url, &cfg.token_mint));
    let chat: Arc<dyn ChatSender> = Arc::new(outbound::WebhookChatSender::new(&cfg.outbound_url));
    let submitter = Arc::new(outbound::RpcTransactionSubmitter::new(&cfg.rpc_url));

    let linker = Arc::new(WalletLinker::new(
        store.clone(),
        submitter,
        LinkerConfig {
            session_ttl_secs: cfg.session_ttl_secs,
            link_ttl_secs: cfg.link_ttl_secs,
            challenge_window_secs: cfg.challenge_window_secs,
        },
    ));

    let group = GroupId::new(&cfg.group_chat_id);
    let engine = DialogEngine::new(WizardDeps {
        store: store.clone(),
        gate: AuthorizationGate::new(oracle, GateConfig::default()),
        chat: chat.clone(),
        linker: linker.clone(),
        group: group.clone(),
        connector_url: cfg.connector_url.clone(),
    });
    let dispatcher = Arc::new(Dispatcher::new(
        engine,
        linker.clone(),
        store.clone(),
        chat.clone(),
    ));

    let sweeper = tokio::spawn(sweep::run_sweeper(
        store,
        chat,
        linker,
        group,
        cfg.sweep_interval_secs,
    ));

    let app = http::router(http::AppState { dispatcher });
    let listener = tokio::net::TcpListener::bind(&cfg.bind_addr)
        .await
        .with_context(|| format!("binding {}", cfg.bind_addr))?;
    tracing::info!("listening on {}", cfg.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await
        .context("http server")?;

    sweeper.abort();
    Ok(())
}
