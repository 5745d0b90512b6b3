use axum::{Json, extract::State, extract::rejection::JsonRejection};
use serde::Deserialize;

use super::{Envelope, ok};
use crate::error::ServerResult;
use crate::gateway::{IssuedKeys, IssuedSwitchingKey};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct NewPublisherRequest {
    pub username: String,
}

#[derive(Deserialize)]
pub struct NewSubscriberRequest {
    pub username: String,
    #[serde(alias = "publish_key_file")]
    pub publisher: String,
}

#[derive(Deserialize)]
pub struct SwitchingKeyRequest {
    #[serde(alias = "publish_key_file")]
    pub publisher: String,
    #[serde(alias = "subscribe_key_file")]
    pub subscriber: String,
}

/// POST /newpks
pub async fn new_publisher_keys(
    State(state): State<AppState>,
    body: Result<Json<NewPublisherRequest>, JsonRejection>,
) -> ServerResult<Json<Envelope<IssuedKeys>>> {
    let Json(req) = body?;
    let issued = state.gateway.issue_publisher_keys(&req.username).await?;
    Ok(ok(issued))
}

/// POST /newsks
pub async fn new_subscriber_keys(
    State(state): State<AppState>,
    body: Result<Json<NewSubscriberRequest>, JsonRejection>,
) -> ServerResult<Json<Envelope<IssuedKeys>>> {
    let Json(req) = body?;
    let issued = state
        .gateway
        .issue_subscriber_keys(&req.username, &req.publisher)
        .await?;
    Ok(ok(issued))
}

/// POST /switchingkey
pub async fn derive_switching_key(
    State(state): State<AppState>,
    body: Result<Json<SwitchingKeyRequest>, JsonRejection>,
) -> ServerResult<Json<Envelope<IssuedSwitchingKey>>> {
    let Json(req) = body?;
    let issued = state
        .gateway
        .derive_switching_key(&req.publisher, &req.subscriber)
        .await?;
    Ok(ok(issued))
}
