use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Deserialize;

use super::{Envelope, ok};
use crate::error::ServerResult;
use crate::gateway::{CiphertextOutput, PlaintextOutput};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct EncryptRequest {
    #[serde(alias = "publish_key_file")]
    pub publisher: String,
    /// base64
    pub plaintext: String,
}

/// Re-encryption and decryption both address the subscriber
#[derive(Deserialize)]
pub struct SubscriberCiphertextRequest {
    #[serde(alias = "subscribe_key_file")]
    pub subscriber: String,
    pub ciphertext: String,
}

/// POST /encrypt
pub async fn encrypt(
    State(state): State<AppState>,
    body: Result<Json<EncryptRequest>, JsonRejection>,
) -> ServerResult<Json<Envelope<CiphertextOutput>>> {
    let Json(req) = body?;
    let ct = state.gateway.encrypt(&req.publisher, &req.plaintext).await?;
    Ok(ok(ct))
}

/// POST /reencrypt
pub async fn re_encrypt(
    State(state): State<AppState>,
    body: Result<Json<SubscriberCiphertextRequest>, JsonRejection>,
) -> ServerResult<Json<Envelope<CiphertextOutput>>> {
    let Json(req) = body?;
    let ct = state
        .gateway
        .re_encrypt(&req.subscriber, &req.ciphertext)
        .await?;
    Ok(ok(ct))
}

/// POST /decrypt
pub async fn decrypt(
    State(state): State<AppState>,
    body: Result<Json<SubscriberCiphertextRequest>, JsonRejection>,
) -> ServerResult<Json<Envelope<PlaintextOutput>>> {
    let Json(req) = body?;
    let pt = state.gateway.decrypt(&req.subscriber, &req.ciphertext).await?;
    Ok(ok(pt))
}
