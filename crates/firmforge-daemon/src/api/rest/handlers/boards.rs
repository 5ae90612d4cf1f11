//! Board discovery

use crate::api::rest::state::AppState;
use axum::{extract::State, Json};
use firmforge_types::TargetConfig;
use serde::Serialize;
use std::collections::BTreeMap;

/// Supported boards response
#[derive(Debug, Serialize)]
pub struct BoardsResponse {
    /// Aliases in registry order
    pub boards: Vec<&'static str>,
    pub details: BTreeMap<&'static str, TargetConfig>,
}

/// List all supported boards
pub async fn list_boards(State(state): State<AppState>) -> Json<BoardsResponse> {
    let registry = state.jobs.registry();

    Json(BoardsResponse {
        boards: registry.aliases().collect(),
        details: registry
            .entries()
            .iter()
            .map(|entry| (entry.alias, entry.config))
            .collect(),
    })
}
