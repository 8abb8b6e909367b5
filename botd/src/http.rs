//! Inbound HTTP surface.
//!
//! Two endpoints: the transport adapter POSTs chat updates to `/update`,
//! and the hosted connector page POSTs wallet-link envelopes to
//! `/wallet-link` (the out-of-band delivery path for the handshake).

use crate::dispatch::Dispatcher;
use agora_handshake::Envelope;
use agora_types::{Timestamp, UserId};
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/update", post(update))
        .route("/wallet-link", post(wallet_link))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Deserialize)]
struct UpdateRequest {
    user_id: String,
    text: String,
}

async fn update(State(state): State<AppState>, Json(req): Json<UpdateRequest>) -> StatusCode {
    let user = UserId::new(req.user_id);
    state
        .dispatcher
        .handle_update(&user, &req.text, Timestamp::now())
        .await;
    StatusCode::OK
}

#[derive(Deserialize)]
struct WalletLinkRequest {
    user_id: String,
    envelope: Envelope,
}

#[derive(Serialize)]
struct WalletLinkResponse {
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn wallet_link(
    State(state): State<AppState>,
    Json(req): Json<WalletLinkRequest>,
) -> (StatusCode, Json<WalletLinkResponse>) {
    let user = UserId::new(req.user_id);
    match state
        .dispatcher
        .handle_envelope(&user, &req.envelope, Timestamp::now())
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(WalletLinkResponse {
                ok: true,
                error: None,
            }),
        ),
        Err(e) => (
            // The user already got a chat explanation; the connector only
            // needs a coarse failure signal.
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(WalletLinkResponse {
                ok: false,
                error: Some(e.to_string()),
            }),
        ),
    }
}
