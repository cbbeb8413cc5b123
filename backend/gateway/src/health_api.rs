//! Gateway Health API

use axum::{extract::State, Json};
use serde::Serialize;

use crate::server::GatewayState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub uptime_seconds: u64,
    /// Action kinds with a registered destination.
    pub routes: Vec<String>,
}

/// Handler for `GET /health`
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        uptime_seconds: state.started_at.elapsed().as_secs(),
        routes: state
            .router
            .routes()
            .kinds()
            .into_iter()
            .map(str::to_string)
            .collect(),
    })
}
