use axum::{Json, extract::State};
use serde_json::Value;
use std::sync::Arc;

use crate::admin::fetch_history_stats;
use crate::proxy::{ApiError, AppState};

pub async fn history_stats_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Value>, ApiError> {
    let stats = fetch_history_stats(&state.client, &state.config.admin).await?;
    Ok(Json(stats))
}
