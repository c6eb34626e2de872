use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use client_core::description::{DEFAULT_ENDPOINT, DEFAULT_MODEL};
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "field_app.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub description_endpoint: String,
    pub description_model: String,
    pub api_key: Option<String>,
    /// `None` turns the connectivity probe off.
    pub connectivity_probe_url: Option<String>,
    pub connectivity_interval_secs: u64,
    pub connectivity_timeout_secs: u64,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            description_endpoint: DEFAULT_ENDPOINT.into(),
            description_model: DEFAULT_MODEL.into(),
            api_key: None,
            connectivity_probe_url: Some("https://clients3.google.com/generate_204".into()),
            connectivity_interval_secs: 30,
            connectivity_timeout_secs: 5,
            log_filter: "info".into(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    description_endpoint: Option<String>,
    description_model: Option<String>,
    api_key: Option<String>,
    connectivity_probe_url: Option<String>,
    connectivity_interval_secs: Option<u64>,
    connectivity_timeout_secs: Option<u64>,
    log_filter: Option<String>,
}

/// Defaults, then the TOML file, then environment overrides.
///
/// An explicit path must be readable. Without one, `field_app.toml` in the
/// working directory is tried, then the per-user config directory; a missing
/// file there just means defaults.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => default_config_path(),
    };
    if let Some(path) = path {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file '{}'", path.display()))?;
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config file '{}'", path.display()))?;
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }
    dirs::config_dir()
        .map(|dir| dir.join("field_app").join(CONFIG_FILE_NAME))
        .filter(|path| path.is_file())
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.description_endpoint {
        settings.description_endpoint = v;
    }
    if let Some(v) = file_cfg.description_model {
        settings.description_model = v;
    }
    if let Some(v) = file_cfg.api_key {
        settings.api_key = Some(v);
    }
    if let Some(v) = file_cfg.connectivity_probe_url {
        settings.connectivity_probe_url = non_blank(v);
    }
    if let Some(v) = file_cfg.connectivity_interval_secs {
        settings.connectivity_interval_secs = v;
    }
    if let Some(v) = file_cfg.connectivity_timeout_secs {
        settings.connectivity_timeout_secs = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, env: impl Fn(&str) -> Option<String>) {
    if let Some(v) = env("APP__DESCRIPTION_ENDPOINT") {
        settings.description_endpoint = v;
    }
    if let Some(v) = env("APP__DESCRIPTION_MODEL") {
        settings.description_model = v;
    }

    if let Some(v) = env("API_KEY") {
        settings.api_key = Some(v);
    }
    if let Some(v) = env("GEMINI_API_KEY") {
        settings.api_key = Some(v);
    }
    if let Some(v) = env("APP__API_KEY") {
        settings.api_key = Some(v);
    }

    if let Some(v) = env("APP__CONNECTIVITY_PROBE_URL") {
        settings.connectivity_probe_url = non_blank(v);
    }
    if let Some(v) = env("APP__CONNECTIVITY_INTERVAL_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.connectivity_interval_secs = parsed;
        }
    }
    if let Some(v) = env("APP__CONNECTIVITY_TIMEOUT_SECS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.connectivity_timeout_secs = parsed;
        }
    }

    if let Some(v) = env("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
}

fn non_blank(value: String) -> Option<String> {
    (!value.trim().is_empty()).then_some(value)
}
