use std::{collections::HashMap, fs, path::Path};

pub const DEFAULT_SERVICE_URL: &str = "http://localhost:8082";
pub const DEFAULT_SETTINGS_FILE: &str = "wallet.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    /// Base URL of the wallet service that brokers verify and issue exchanges.
    pub service_url: String,
    /// Endpoint pre-filled in the verify flow's input.
    pub verify_endpoint: String,
    /// Endpoint pre-filled in the issue flow's input.
    pub issue_endpoint: String,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            service_url: DEFAULT_SERVICE_URL.into(),
            verify_endpoint: format!("{DEFAULT_SERVICE_URL}/verify"),
            issue_endpoint: format!("{DEFAULT_SERVICE_URL}/issue"),
        }
    }
}

/// Defaults, then the settings file (if readable), then environment
/// overrides. Only the service URL can come from the environment.
pub fn load_settings_from<F>(path: &Path, env: F) -> ClientSettings
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = ClientSettings::default();

    if let Ok(raw) = fs::read_to_string(path) {
        match toml::from_str::<HashMap<String, String>>(&raw) {
            Ok(file_cfg) => {
                if let Some(v) = file_cfg.get("service_url") {
                    settings.service_url = v.clone();
                }
                if let Some(v) = file_cfg.get("verify_endpoint") {
                    settings.verify_endpoint = v.clone();
                }
                if let Some(v) = file_cfg.get("issue_endpoint") {
                    settings.issue_endpoint = v.clone();
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), "ignoring unreadable settings file: {err}");
            }
        }
    }

    if let Some(v) = env("WALLET_SERVICE_URL") {
        settings.service_url = v;
    }
    if let Some(v) = env("APP__SERVICE_URL") {
        settings.service_url = v;
    }

    settings.service_url = normalize_service_url(&settings.service_url);
    settings
}

pub fn normalize_service_url(raw_service_url: &str) -> String {
    let service_url = raw_service_url.trim().trim_end_matches('/');

    if service_url.is_empty() {
        return DEFAULT_SERVICE_URL.to_string();
    }

    service_url.to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
