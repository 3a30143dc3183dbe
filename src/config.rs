use std::path::PathBuf;

use zeroize::Zeroizing;

use crate::copier::remediate::GroupFilterMode;
use crate::copier::retry::RetryPolicy;
use crate::error::AppError;

const KEY_BASE_URL: &str = "ZENDESK_BASE_URL";
const KEY_EMAIL: &str = "ZENDESK_EMAIL";
const KEY_TOKEN: &str = "ZENDESK_API_TOKEN";
const KEY_LOG_DIR: &str = "VIEW_COPY_LOG_DIR";
const KEY_MAX_LOG_FILES: &str = "VIEW_COPY_MAX_LOG_FILES";
const KEY_MAX_ATTEMPTS: &str = "VIEW_COPY_MAX_ATTEMPTS";
const KEY_GROUP_FILTER: &str = "VIEW_COPY_GROUP_FILTER";
const KEY_SENTRY_DSN: &str = "SENTRY_DSN";

const DEFAULT_LOG_DIR: &str = "logs";
const DEFAULT_MAX_LOG_FILES: usize = 5;

/// Zendesk credentials. The token is zeroed on drop and never printed.
pub struct Credentials {
    pub email: String,
    pub api_token: Zeroizing<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug)]
pub struct Config {
    /// API root, always ending in `/` (e.g. `https://acme.zendesk.com/api/v2/`).
    pub base_url: url::Url,
    pub credentials: Credentials,
    pub log_dir: PathBuf,
    pub max_log_files: usize,
    pub retry: RetryPolicy,
    pub group_filter: GroupFilterMode,
    pub sentry_dsn: Option<String>,
}

impl Config {
    /// Load from the process environment, reading a `.env` file first if present.
    pub fn from_env() -> Result<Self, AppError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::Config(format!("{key} is not set")))
        };

        let base_url = parse_base_url(&required(KEY_BASE_URL)?)?;
        let credentials = Credentials {
            email: required(KEY_EMAIL)?,
            api_token: Zeroizing::new(required(KEY_TOKEN)?),
        };

        let log_dir = lookup(KEY_LOG_DIR)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR));

        let max_log_files = match lookup(KEY_MAX_LOG_FILES) {
            Some(raw) => parse_positive(KEY_MAX_LOG_FILES, &raw)? as usize,
            None => DEFAULT_MAX_LOG_FILES,
        };

        let mut retry = RetryPolicy::default();
        if let Some(raw) = lookup(KEY_MAX_ATTEMPTS) {
            retry.max_attempts = parse_positive(KEY_MAX_ATTEMPTS, &raw)?;
        }

        let group_filter = match lookup(KEY_GROUP_FILTER) {
            Some(raw) => raw.parse().map_err(AppError::Config)?,
            None => GroupFilterMode::default(),
        };

        Ok(Self {
            base_url,
            credentials,
            log_dir,
            max_log_files,
            retry,
            group_filter,
            sentry_dsn: lookup(KEY_SENTRY_DSN).filter(|v| !v.trim().is_empty()),
        })
    }
}

fn parse_base_url(raw: &str) -> Result<url::Url, AppError> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };
    let url = url::Url::parse(&normalized)
        .map_err(|e| AppError::Config(format!("{KEY_BASE_URL} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::Config(format!(
            "{KEY_BASE_URL} must use http or https, got {other}"
        ))),
    }
}

fn parse_positive(key: &str, raw: &str) -> Result<u32, AppError> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n >= 1 => Ok(n),
        _ => Err(AppError::Config(format!(
            "{key} must be a positive integer, got \"{raw}\""
        ))),
    }
}
