//! The wallet-linking wizard.
//!
//! The chat side of linking is thin: hand the user a connector URL carrying
//! the backend's fresh encryption key, then wait. The handshake itself
//! completes out-of-band through the wallet linker; any chat message in the
//! meantime just re-points the user at the connector.

use crate::engine::WizardDeps;
use crate::step::{Draft, EnterOutcome, StepOutcome};
use agora_store::StoreError;
use agora_types::{Timestamp, UserId};

pub(crate) async fn enter(
    deps: &WizardDeps,
    user_id: &UserId,
    now: Timestamp,
) -> Result<EnterOutcome, StoreError> {
    let already_linked = deps
        .store
        .get_user(user_id)
        .await?
        .is_some_and(|identity| identity.has_wallet());
    if already_linked {
        return Ok(EnterOutcome::Refused {
            reply: "You already have a wallet linked.".to_string(),
        });
    }

    let backend_public = deps.linker.begin_link(user_id, now);
    let url = format!(
        "{}?user={}&key={}",
        deps.connector_url,
        user_id,
        bs58::encode(backend_public).into_string()
    );
    Ok(EnterOutcome::Started {
        reply: format!("Open the wallet connector to link your wallet:\n{url}"),
        draft: Draft::LinkWallet,
    })
}

pub(crate) async fn step(
    _deps: &WizardDeps,
    _user_id: &UserId,
    _step: usize,
    _input: &str,
    _draft: &mut Draft,
    _now: Timestamp,
) -> Result<StepOutcome, StoreError> {
    Ok(StepOutcome::stay(
        "Please use the wallet connector link above to finish linking.",
    ))
}
