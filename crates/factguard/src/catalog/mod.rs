//! Article library loaded once at startup
//!
//! The backing file is a JSON array of objects. Only `id` is interpreted;
//! every other field is kept as-is and served back unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

use crate::error::{FactGuardError, Result};

/// One library entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Article {
    pub fn title(&self) -> Option<&str> {
        self.fields.get("title").and_then(Value::as_str)
    }
}

/// Immutable, ordered collection of articles
#[derive(Debug, Clone, Default)]
pub struct ArticleCatalog {
    articles: Vec<Article>,
}

impl ArticleCatalog {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_articles(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let articles: Vec<Article> = serde_json::from_str(content)
            .map_err(|e| FactGuardError::Catalog(format!("Invalid article list: {e}")))?;
        Ok(Self { articles })
    }

    /// Read the catalog from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FactGuardError::Catalog(format!(
                "Failed to read article file {}: {}",
                path.display(),
                e
            ))
        })?;
        let catalog = Self::from_json_str(&content)?;
        tracing::info!(
            "Loaded {} articles from {}",
            catalog.len(),
            path.display()
        );
        Ok(catalog)
    }

    /// Load from `path` when configured, otherwise start with no articles
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                tracing::info!("No article file configured, library is empty");
                Ok(Self::empty())
            }
        }
    }

    pub fn all(&self) -> &[Article] {
        &self.articles
    }

    /// First article carrying `id`
    pub fn get(&self, id: i64) -> Option<&Article> {
        self.articles.iter().find(|a| a.id == id)
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
