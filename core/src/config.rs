//! Settings loader. Reads settings.json once at startup, then applies environment overrides.
//! Server, Feishu and Gemini settings all come from here; the result is passed around explicitly.

use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_WEBHOOK_PATH: &str = "/feishu/event";
pub const DEFAULT_FEISHU_API_BASE: &str = "https://open.feishu.cn/open-apis";
pub const DEFAULT_GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-pro";

/// Timeout for every Feishu API call (token, reply, bot info).
pub const FEISHU_TIMEOUT: Duration = Duration::from_secs(10);
/// Timeout for fetching a store page.
pub const STORE_TIMEOUT: Duration = Duration::from_secs(15);
/// Timeout for a single generateContent call.
pub const GEMINI_TIMEOUT: Duration = Duration::from_secs(60);

/// Default settings file, relative to the working directory.
pub fn default_settings_path() -> PathBuf {
    PathBuf::from("settings.json")
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Path of the Feishu event subscription endpoint.
    pub webhook_path: String,
    pub feishu_app_id: Option<String>,
    pub feishu_app_secret: Option<String>,
    pub feishu_api_base: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_api_base: String,
}

impl Config {
    /// Load settings.json (missing or invalid file yields defaults), then apply process env overrides.
    pub fn load(path: &Path) -> Config {
        let mut config = load_settings_from(path);
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Both app_id and app_secret present. Without them replies are disabled.
    pub fn feishu_credentials(&self) -> Option<(&str, &str)> {
        match (self.feishu_app_id.as_deref(), self.feishu_app_secret.as_deref()) {
            (Some(id), Some(secret)) => Some((id, secret)),
            _ => None,
        }
    }

    /// Override fields from environment lookups. `lookup` is injectable for tests.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        if let Some(v) = get("FEISHU_APP_ID") {
            self.feishu_app_id = Some(v);
        }
        if let Some(v) = get("FEISHU_APP_SECRET") {
            self.feishu_app_secret = Some(v);
        }
        if let Some(v) = get("GOOGLE_API_KEY") {
            self.gemini_api_key = Some(v);
        }
        if let Some(v) = get("GEMINI_MODEL") {
            self.gemini_model = v;
        }
        if let Some(port) = get("STEAMLENS_PORT").and_then(|v| v.parse().ok()) {
            self.port = port;
        }
    }
}

fn load_settings_from(path: &Path) -> Config {
    let Ok(data) = std::fs::read_to_string(path) else {
        return Config::default();
    };
    let Ok(root) = serde_json::from_str::<serde_json::Value>(&data) else {
        return Config::default();
    };
    parse_settings(&root)
}

fn str_field(value: Option<&serde_json::Value>, key: &str) -> Option<String> {
    value
        .and_then(|v| v.get(key))
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_settings(root: &serde_json::Value) -> Config {
    let defaults = Config::default();
    let server = root.get("server");
    let feishu = root.get("channels").and_then(|c| c.get("feishu"));
    let gemini = root.get("gemini");

    let port = server
        .and_then(|s| s.get("port"))
        .and_then(|p| p.as_u64())
        .and_then(|p| u16::try_from(p).ok())
        .unwrap_or(defaults.port);

    let webhook_path = str_field(server, "webhook_path")
        .map(|p| if p.starts_with('/') { p } else { format!("/{}", p) })
        .unwrap_or(defaults.webhook_path);

    Config {
        host: str_field(server, "host").unwrap_or(defaults.host),
        port,
        webhook_path,
        feishu_app_id: str_field(feishu, "app_id"),
        feishu_app_secret: str_field(feishu, "app_secret"),
        feishu_api_base: str_field(feishu, "api_base")
            .map(|b| b.trim_end_matches('/').to_string())
            .unwrap_or(defaults.feishu_api_base),
        gemini_api_key: str_field(gemini, "api_key"),
        gemini_model: str_field(gemini, "model").unwrap_or(defaults.gemini_model),
        gemini_api_base: str_field(gemini, "api_base")
            .map(|b| b.trim_end_matches('/').to_string())
            .unwrap_or(defaults.gemini_api_base),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            webhook_path: DEFAULT_WEBHOOK_PATH.to_string(),
            feishu_app_id: None,
            feishu_app_secret: None,
            feishu_api_base: DEFAULT_FEISHU_API_BASE.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_api_base: DEFAULT_GEMINI_API_BASE.to_string(),
        }
    }
}
