use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::Deserialize;

fn default_autosave_interval() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    15
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_base_url: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub school_id: String,
    #[serde(default = "default_autosave_interval")]
    pub autosave_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            token: String::new(),
            school_id: String::new(),
            autosave_interval_secs: default_autosave_interval(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    /// Reads the explicit path if given, else the user config file. A
    /// missing default file yields defaults; a missing explicit file is an
    /// error. `TERMCBT_API_BASE_URL` and `TERMCBT_TOKEN` override the file
    /// (and CLI flags override both, applied by the caller).
    pub fn load(path: Option<&Path>) -> Result<Self, String> {
        let resolved = resolve_path(path);
        let mut config = match &resolved {
            Some(p) if p.exists() => {
                let content = fs::read_to_string(p)
                    .map_err(|e| format!("Cannot read config {}: {}", p.display(), e))?;
                serde_yaml::from_str(&content)
                    .map_err(|e| format!("Invalid config {}: {}", p.display(), e))?
            }
            Some(p) => {
                if path.is_some() {
                    return Err(format!("Config file not found: {}", p.display()));
                }
                Config::default()
            }
            None => Config::default(),
        };

        if let Some(url) = env_optional("TERMCBT_API_BASE_URL") {
            config.api_base_url = url;
        }
        if let Some(token) = env_optional("TERMCBT_TOKEN") {
            config.token = token;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.api_base_url.is_empty() {
            return Err(
                "No server configured. Set api_base_url in config.yaml, \
                 TERMCBT_API_BASE_URL, or pass --server."
                    .to_string(),
            );
        }
        if self.token.is_empty() {
            return Err(
                "No auth token configured. Set token in config.yaml, \
                 TERMCBT_TOKEN, or pass --token."
                    .to_string(),
            );
        }
        Ok(())
    }
}

fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    match explicit {
        Some(p) => Some(p.to_path_buf()),
        None => ProjectDirs::from("", "", "termcbt").map(|d| d.config_dir().join("config.yaml")),
    }
}

pub fn log_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "termcbt").map(|d| d.data_dir().join("logs"))
}

fn env_optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
