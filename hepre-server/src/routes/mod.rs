use std::time::Duration;

use axum::{
    Json, Router,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::state::AppState;

mod crypto;
mod health;
mod keys;

/// Success body: `{"code": 0, ...payload}`
#[derive(Serialize)]
pub struct Envelope<T> {
    code: i32,
    #[serde(flatten)]
    payload: T,
}

pub(crate) fn ok<T: Serialize>(payload: T) -> Json<Envelope<T>> {
    Json(Envelope { code: 0, payload })
}

pub fn router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/newpks", post(keys::new_publisher_keys))
        .route("/newsks", post(keys::new_subscriber_keys))
        .route("/switchingkey", post(keys::derive_switching_key))
        .route("/encrypt", post(crypto::encrypt))
        .route("/reencrypt", post(crypto::re_encrypt))
        .route("/decrypt", post(crypto::decrypt))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
