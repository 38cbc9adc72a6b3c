//! Analysis request and result types
//!
//! The proxy never interprets an analysis result. [`AnalysisResult`] keeps
//! the upstream JSON object intact and only offers read accessors for
//! display code, plus the `url` substitution used by canned mode.

pub mod canned;

pub use canned::CannedScript;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body posted to the upstream analysis service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub url: String,
}

impl AnalysisRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// A source cited by an analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Source {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub description: String,
}

/// Token accounting reported by the upstream model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
}

/// Structured analysis produced by the upstream service
///
/// Serializes back to exactly the object it was parsed from, unknown fields
/// included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct AnalysisResult(Map<String, Value>);

impl AnalysisResult {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Copy of this result with the `url` field replaced
    pub fn with_url(&self, url: &str) -> Self {
        let mut map = self.0.clone();
        map.insert("url".to_string(), Value::String(url.to_string()));
        Self(map)
    }

    pub fn url(&self) -> Option<&str> {
        self.str_field("url")
    }

    pub fn summary(&self) -> Option<&str> {
        self.str_field("summary")
    }

    pub fn final_verdict(&self) -> Option<&str> {
        self.str_field("final_verdict")
    }

    pub fn credibility_score(&self) -> Option<f64> {
        self.0.get("credibility_score").and_then(Value::as_f64)
    }

    pub fn manipulations(&self) -> Vec<&str> {
        self.str_list("manipulations")
    }

    pub fn logical_issues(&self) -> Vec<&str> {
        self.str_list("logical_issues")
    }

    pub fn verifiable_facts(&self) -> Vec<&str> {
        self.0
            .get("fact_check")
            .and_then(|fc| fc.get("verifiable_facts"))
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    pub fn is_fake(&self) -> Option<bool> {
        self.0
            .get("verification")
            .and_then(|v| v.get("is_fake"))
            .and_then(Value::as_bool)
    }

    /// Cited sources; entries that are not objects are skipped
    pub fn sources(&self) -> Vec<Source> {
        self.0
            .get("sources")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn usage(&self) -> Option<TokenUsage> {
        self.0
            .get("usage")
            .and_then(|u| serde_json::from_value(u.clone()).ok())
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    fn str_list(&self, key: &str) -> Vec<&str> {
        self.0
            .get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}
