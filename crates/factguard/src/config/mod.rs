use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

use crate::error::{FactGuardError, Result};

/// Main configuration structure for Fact Guard
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Analysis proxy configuration (mode flag and upstream)
    #[serde(default)]
    pub analysis: AnalysisConfig,
    /// Admin statistics collaborator configuration
    #[serde(default)]
    pub admin: AdminConfig,
    /// Article library configuration
    #[serde(default)]
    pub library: LibraryConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "127.0.0.1:8000")
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> String {
    "127.0.0.1:8000".to_string()
}

/// Whether analyses are replayed from the canned script or relayed live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisMode {
    Fake,
    Live,
}

impl AnalysisMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Fake => "fake",
            AnalysisMode::Live => "live",
        }
    }
}

/// Analysis proxy configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisConfig {
    /// Replay the canned analysis instead of calling upstream
    #[serde(default)]
    pub use_fake_api_data: bool,
    /// Upstream event-stream endpoint that receives `POST {url}`
    #[serde(default = "default_upstream_url")]
    pub upstream_url: String,
    /// Pause between canned events, in milliseconds (0 = no pause)
    #[serde(default)]
    pub fake_event_delay_ms: u64,
}

impl AnalysisConfig {
    pub fn mode(&self) -> AnalysisMode {
        if self.use_fake_api_data {
            AnalysisMode::Fake
        } else {
            AnalysisMode::Live
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            use_fake_api_data: false,
            upstream_url: default_upstream_url(),
            fake_event_delay_ms: 0,
        }
    }
}

fn default_upstream_url() -> String {
    "https://apich.sinkdev.dev/api/analyze/stream".to_string()
}

/// Admin statistics collaborator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AdminConfig {
    /// Upstream admin endpoint returning history statistics
    #[serde(default = "default_admin_stats_url")]
    pub stats_url: String,
    /// Shared secret sent as `X-Admin-Token`
    #[serde(default)]
    pub token: String,
    /// Request timeout in seconds
    #[serde(default = "default_admin_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            stats_url: default_admin_stats_url(),
            token: String::new(),
            timeout_secs: default_admin_timeout_secs(),
        }
    }
}

fn default_admin_stats_url() -> String {
    "http://127.0.0.1:8080/api/admin/stats".to_string()
}

fn default_admin_timeout_secs() -> u64 {
    10
}

/// Article library configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LibraryConfig {
    /// JSON file holding the article array (no library when unset)
    #[serde(default)]
    pub articles_path: Option<PathBuf>,
}

/// Parse the `USE_FAKE_API_DATA` style switch: only "true" enables it
pub fn parse_flag(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}

impl Config {
    /// Parse a TOML document into a config
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content)
            .map_err(|e| FactGuardError::Config(format!("Failed to parse config: {e}")))
    }

    /// Apply overrides from the process environment
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ANALYZE_STREAM_URL") {
            self.analysis.upstream_url = v;
        }
        if let Some(v) = lookup("USE_FAKE_API_DATA") {
            self.analysis.use_fake_api_data = parse_flag(&v);
        }
        if let Some(v) = lookup("ADMIN_STATS_URL") {
            self.admin.stats_url = v;
        }
        if let Some(v) = lookup("ADMIN_TOKEN") {
            self.admin.token = v;
        }
        if let Some(v) = lookup("LISTEN_ADDR") {
            self.server.listen_addr = v;
        }
        if let Some(v) = lookup("ARTICLES_PATH") {
            self.library.articles_path = Some(PathBuf::from(v));
        }
    }

    /// Check the upstream URLs before the server starts
    ///
    /// The analysis upstream is only required in live mode.
    pub fn validate(&self) -> Result<()> {
        if self.analysis.mode() == AnalysisMode::Live {
            validate_http_url("analysis.upstream_url", &self.analysis.upstream_url)?;
        }
        validate_http_url("admin.stats_url", &self.admin.stats_url)?;
        Ok(())
    }
}

fn validate_http_url(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| FactGuardError::Config(format!("Invalid {field} '{value}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FactGuardError::Config(format!(
            "Unsupported scheme '{other}' in {field}: only http and https are allowed"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server.listen_addr, "127.0.0.1:8000");
        assert!(!config.analysis.use_fake_api_data);
        assert_eq!(config.analysis.mode(), AnalysisMode::Live);
        assert_eq!(
            config.analysis.upstream_url,
            "https://apich.sinkdev.dev/api/analyze/stream"
        );
        assert_eq!(config.analysis.fake_event_delay_ms, 0);
        assert!(config.admin.token.is_empty());
        assert_eq!(config.admin.timeout_secs, 10);
        assert!(config.library.articles_path.is_none());
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_str = r#"
[server]
listen_addr = "0.0.0.0:9000"

[analysis]
use_fake_api_data = true
upstream_url = "http://localhost:7000/api/analyze/stream"
fake_event_delay_ms = 250

[admin]
stats_url = "http://localhost:7000/api/admin/stats"
token = "s3cret"
timeout_secs = 3

[library]
articles_path = "/srv/factguard/articles.json"
"#;

        let config = Config::from_toml_str(toml_str).expect("Failed to parse TOML");

        assert_eq!(config.server.listen_addr, "0.0.0.0:9000");
        assert_eq!(config.analysis.mode(), AnalysisMode::Fake);
        assert_eq!(
            config.analysis.upstream_url,
            "http://localhost:7000/api/analyze/stream"
        );
        assert_eq!(config.analysis.fake_event_delay_ms, 250);
        assert_eq!(config.admin.stats_url, "http://localhost:7000/api/admin/stats");
        assert_eq!(config.admin.token, "s3cret");
        assert_eq!(config.admin.timeout_secs, 3);
        assert_eq!(
            config.library.articles_path,
            Some(PathBuf::from("/srv/factguard/articles.json"))
        );
    }

    #[test]
    fn test_toml_partial_deserialization() {
        let toml_str = r#"
[admin]
token = "abc"
"#;

        let config = Config::from_toml_str(toml_str).expect("Failed to parse partial TOML");

        assert_eq!(config.server.listen_addr, "127.0.0.1:8000");
        assert_eq!(config.admin.token, "abc");
        assert_eq!(config.admin.timeout_secs, 10);
        assert!(!config.analysis.use_fake_api_data);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("[server\nlisten_addr = 1").unwrap_err();
        assert!(matches!(err, FactGuardError::Config(_)));
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" TRUE \n"));
        assert!(!parse_flag("1"));
        assert!(!parse_flag("yes"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("false"));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("ANALYZE_STREAM_URL", "http://upstream.test/stream"),
            ("USE_FAKE_API_DATA", "True"),
            ("ADMIN_STATS_URL", "http://admin.test/stats"),
            ("ADMIN_TOKEN", "token-1"),
            ("LISTEN_ADDR", "0.0.0.0:1234"),
            ("ARTICLES_PATH", "data/articles.json"),
        ]);

        let mut config = Config::default();
        config.apply_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.analysis.upstream_url, "http://upstream.test/stream");
        assert_eq!(config.analysis.mode(), AnalysisMode::Fake);
        assert_eq!(config.admin.stats_url, "http://admin.test/stats");
        assert_eq!(config.admin.token, "token-1");
        assert_eq!(config.server.listen_addr, "0.0.0.0:1234");
        assert_eq!(
            config.library.articles_path,
            Some(PathBuf::from("data/articles.json"))
        );
    }

    #[test]
    fn test_env_override_can_disable_fake_mode() {
        let mut config = Config::default();
        config.analysis.use_fake_api_data = true;
        config.apply_overrides(|key| (key == "USE_FAKE_API_DATA").then(|| "false".to_string()));
        assert_eq!(config.analysis.mode(), AnalysisMode::Live);
    }

    #[test]
    fn test_validate_rejects_bad_upstream_in_live_mode() {
        let mut config = Config::default();
        config.analysis.upstream_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.analysis.upstream_url = "ftp://example.com/stream".to_string();
        assert!(config.validate().is_err());

        // Upstream is unused in fake mode
        config.analysis.use_fake_api_data = true;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_admin_url() {
        let mut config = Config::default();
        config.admin.stats_url = "localhost:8080".to_string();
        assert!(config.validate().is_err());
    }
}
