//! Admin history-statistics collaborator
//!
//! The server forwards `/api/history/stats` to an upstream admin endpoint,
//! authenticating with a shared secret, and relays the JSON it gets back.
//! The typed [`HistoryStats`] mirrors that payload for clients.

pub mod handlers;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::config::AdminConfig;
use crate::proxy::ApiError;

/// Header carrying the shared admin secret
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Aggregate statistics over past analyses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct HistoryStats {
    #[serde(default)]
    pub total_requests: u64,
    #[serde(default)]
    pub average_score: f64,
    #[serde(default)]
    pub fake_count: u64,
    #[serde(default)]
    pub real_count: u64,
    /// Most recent analyses, newest first (null upstream when empty)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recent_requests: Vec<HistoryItem>,
}

/// One past analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub score: i64,
    #[serde(default)]
    pub is_fake: bool,
    #[serde(default)]
    pub created_at: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<HistoryItem>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<Vec<HistoryItem>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Fetch statistics from the admin upstream
///
/// Error statuses map to [`ApiError::Api`] with the same status; transport
/// failures and non-JSON bodies map to [`ApiError::ConnectionFailed`].
pub async fn fetch_history_stats(
    client: &reqwest::Client,
    config: &AdminConfig,
) -> Result<Value, ApiError> {
    let response = client
        .get(&config.stats_url)
        .header(ADMIN_TOKEN_HEADER, &config.token)
        .timeout(Duration::from_secs(config.timeout_secs))
        .send()
        .await
        .map_err(|e| ApiError::ConnectionFailed(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        tracing::warn!(
            error_type = "api_error",
            status = status.as_u16(),
            "Admin stats upstream returned an error status"
        );
        return Err(ApiError::Api {
            status: status.as_u16(),
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ApiError::ConnectionFailed(e.to_string()))
}
