//! Client configuration parsed from environment variables.

use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_VAR: &str = "CRAVING_API_URL";

const CREDENTIALS_DIR: &str = "craving";
const CREDENTIALS_FILE: &str = "credentials.json";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    /// Build a config for `base_url`, trimming trailing slashes. A blank
    /// value falls back to [`DEFAULT_API_URL`].
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        let trimmed = base_url.trim().trim_end_matches('/');
        let base_url = if trimmed.is_empty() { DEFAULT_API_URL } else { trimmed };
        Self { base_url: base_url.to_owned() }
    }

    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `CRAVING_API_URL`: suggestion service base URL, default
    ///   `http://localhost:8000`
    #[must_use]
    pub fn from_env() -> Self {
        match std::env::var(API_URL_VAR) {
            Ok(raw) => Self::new(&raw),
            Err(_) => Self::default(),
        }
    }

    /// Absolute URL for a service path such as `/suggest`.
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

/// Default location of the credential file, derived from the XDG config
/// directory or `$HOME/.config`.
#[must_use]
pub fn default_credentials_path() -> Option<PathBuf> {
    resolve_credentials_path(
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

fn resolve_credentials_path(xdg_config_home: Option<PathBuf>, home: Option<PathBuf>) -> Option<PathBuf> {
    let base = match xdg_config_home {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => home?.join(".config"),
    };
    Some(base.join(CREDENTIALS_DIR).join(CREDENTIALS_FILE))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
