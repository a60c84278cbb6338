//! # Client configuration: `kanban.toml`
//!
//! Where the backend lives and how to reach the real-time service. Desktop
//! builds read the file from the working directory; web builds bake values in
//! at compile time through `KANBAN_*` environment variables.
//!
//! ## Structure
//!
//! ```toml
//! [api]
//! base_url = "http://localhost:5000"
//!
//! [realtime]
//! key = "app-key"
//! cluster = "us2"
//! auth_endpoint = "http://localhost:5000/pusher/auth"   # optional
//! force_tls = true
//! activity_timeout_secs = 120
//!
//! [notifications]
//! page_size = 20
//! initial_visible = 7
//! show_more_step = 3
//! ```
//!
//! Every section derives `Default`, so a missing or empty file is equivalent
//! to the defaults above (with no real-time key, which disables push).

use serde::{Deserialize, Serialize};

/// Top-level configuration stored in `kanban.toml`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub realtime: RealtimeConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Pusher Channels connection settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Application key. Push is disabled when empty.
    #[serde(default)]
    pub key: String,
    /// Cluster name, e.g. `"us2"`. Push is disabled when empty.
    #[serde(default)]
    pub cluster: String,
    /// Channel authorization endpoint. Defaults to `{api.base_url}/pusher/auth`.
    #[serde(default)]
    pub auth_endpoint: Option<String>,
    /// Explicit websocket host, overriding `ws-{cluster}.pusher.com`.
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "default_force_tls")]
    pub force_tls: bool,
    #[serde(default = "default_activity_timeout")]
    pub activity_timeout_secs: u64,
}

fn default_force_tls() -> bool {
    true
}

fn default_activity_timeout() -> u64 {
    120
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            cluster: String::new(),
            auth_endpoint: None,
            host: None,
            force_tls: default_force_tls(),
            activity_timeout_secs: default_activity_timeout(),
        }
    }
}

impl RealtimeConfig {
    pub fn is_configured(&self) -> bool {
        !self.key.trim().is_empty() && !self.cluster.trim().is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Page size for history loads.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Entries shown on the notifications page before "show more".
    #[serde(default = "default_initial_visible")]
    pub initial_visible: usize,
    #[serde(default = "default_show_more_step")]
    pub show_more_step: usize,
}

fn default_page_size() -> usize {
    20
}

fn default_initial_visible() -> usize {
    7
}

fn default_show_more_step() -> usize {
    3
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            initial_visible: default_initial_visible(),
            show_more_step: default_show_more_step(),
        }
    }
}

impl ClientConfig {
    /// Create a config pointing at the given backend.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            api: ApiConfig {
                base_url: base_url.into(),
            },
            ..Default::default()
        }
    }

    /// Builder method to set the real-time key and cluster.
    pub fn with_realtime(mut self, key: impl Into<String>, cluster: impl Into<String>) -> Self {
        self.realtime.key = key.into();
        self.realtime.cluster = cluster.into();
        self
    }

    /// The well-known filename for the config file.
    pub fn filename() -> &'static str {
        "kanban.toml"
    }

    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Serialize to TOML string.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Backend base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api.base_url.trim_end_matches('/')
    }

    /// Channel authorization endpoint, falling back to the backend's `/pusher/auth`.
    pub fn auth_endpoint(&self) -> String {
        match &self.realtime.auth_endpoint {
            Some(endpoint) if !endpoint.trim().is_empty() => endpoint.clone(),
            _ => format!("{}/pusher/auth", self.base_url()),
        }
    }

    /// Apply overrides from a variable lookup (`KANBAN_API_URL`,
    /// `KANBAN_PUSHER_KEY`, `KANBAN_PUSHER_CLUSTER`, `KANBAN_PUSHER_AUTH_ENDPOINT`).
    ///
    /// Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = get("KANBAN_API_URL") {
            self.api.base_url = url;
        }
        if let Some(key) = get("KANBAN_PUSHER_KEY") {
            self.realtime.key = key;
        }
        if let Some(cluster) = get("KANBAN_PUSHER_CLUSTER") {
            self.realtime.cluster = cluster;
        }
        if let Some(endpoint) = get("KANBAN_PUSHER_AUTH_ENDPOINT") {
            self.realtime.auth_endpoint = Some(endpoint);
        }
        self
    }

    /// Apply overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_empty_file_is_default() {
        let config = ClientConfig::from_toml("").unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.base_url(), "http://localhost:5000");
        assert_eq!(config.notifications.page_size, 20);
        assert!(!config.realtime.is_configured());
    }

    #[test]
    fn test_partial_sections() {
        let config = ClientConfig::from_toml(
            r#"
            [api]
            base_url = "https://kanban.example.com/"

            [realtime]
            key = "abc"
            cluster = "us2"
            "#,
        )
        .unwrap();
        assert_eq!(config.base_url(), "https://kanban.example.com");
        assert_eq!(config.auth_endpoint(), "https://kanban.example.com/pusher/auth");
        assert!(config.realtime.is_configured());
        assert!(config.realtime.force_tls);
        assert_eq!(config.realtime.activity_timeout_secs, 120);
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ClientConfig::new("http://api.local").with_realtime("key", "eu");
        let text = config.to_toml().unwrap();
        assert_eq!(ClientConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("KANBAN_API_URL", "http://override:9000"),
            ("KANBAN_PUSHER_KEY", ""),
            ("KANBAN_PUSHER_CLUSTER", "ap1"),
        ]
        .into_iter()
        .collect();
        let config = ClientConfig::default()
            .with_realtime("original", "us2")
            .with_overrides(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(config.base_url(), "http://override:9000");
        assert_eq!(config.realtime.key, "original");
        assert_eq!(config.realtime.cluster, "ap1");
        assert_eq!(config.auth_endpoint(), "http://override:9000/pusher/auth");
    }
}
