//! Runtime configuration for the API endpoint, the session storage location and
//! the client-bot collection. Defaults mirror a same-origin deployment; the CLI
//! layers flag and environment overrides on top. Configuration values are
//! public; do not store secrets here.

use crate::api::AppError;
use std::{path::PathBuf, time::Duration};
use url::Url;

/// Default request timeout applied to every HTTP call.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
/// Collection the client-bot settings are written to.
pub const DEFAULT_COLLECTION: &str = "yantracore";
/// File the session is persisted to when no path is configured.
pub const DEFAULT_STORAGE_PATH: &str = "auth-storage.json";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub storage_path: PathBuf,
    pub collection_name: String,
    pub timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: String::new(),
            storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            collection_name: DEFAULT_COLLECTION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl AppConfig {
    /// Default configuration pointed at `api_base_url`.
    #[must_use]
    pub fn new(api_base_url: &str) -> Self {
        let mut config = Self::default();
        apply_overrides(
            &mut config,
            Overrides {
                api_base_url: normalize_value(api_base_url),
                ..Overrides::default()
            },
        );
        config
    }

    /// Ensures an API base URL is configured and is an absolute http(s) URL.
    ///
    /// # Errors
    /// Returns `AppError::Config` when the base URL is missing or unusable.
    pub fn require_api_base(&self) -> Result<Url, AppError> {
        if self.api_base_url.is_empty() {
            return Err(AppError::Config(
                "API base URL is not configured.".to_string(),
            ));
        }

        let url = Url::parse(&self.api_base_url)
            .map_err(|err| AppError::Config(format!("Invalid API base URL: {err}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(AppError::Config(format!(
                "Unsupported API base URL scheme: {scheme}"
            ))),
        }
    }
}

/// Optional values layered over the defaults; `None` keeps the current value.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub storage_path: Option<String>,
    pub collection_name: Option<String>,
    pub timeout_seconds: Option<u64>,
}

pub fn apply_overrides(config: &mut AppConfig, overrides: Overrides) {
    if let Some(value) = overrides.api_base_url {
        config.api_base_url = value.trim_end_matches('/').to_string();
    }
    if let Some(value) = overrides.storage_path {
        config.storage_path = PathBuf::from(value);
    }
    if let Some(value) = overrides.collection_name {
        config.collection_name = value;
    }
    if let Some(value) = overrides.timeout_seconds.filter(|seconds| *seconds > 0) {
        config.timeout = Duration::from_secs(value);
    }
}

/// Trims a raw value and drops it when nothing is left.
#[must_use]
pub fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
