use axum::{Json, extract::State};
use serde::Serialize;

use super::{Envelope, ok};
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    parameter_set: String,
    slot_capacity: usize,
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<Envelope<HealthResponse>> {
    let context = state.gateway.context();
    ok(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        parameter_set: context
            .parameter_set()
            .map(|set| set.to_string())
            .unwrap_or_else(|| "custom".into()),
        slot_capacity: context.slot_capacity(),
    })
}
