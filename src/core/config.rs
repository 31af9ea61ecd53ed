//! Client configuration from environment variables.
//!
//! Load configuration using `Config::from_env()` after calling `dotenvy::dotenv()`.

use std::path::PathBuf;
use std::str::FromStr;

use reqwest::Url;

use crate::core::error::{ApiError, Result};

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_LOGIN_PATH: &str = "/login";
pub const DEFAULT_SESSION_FILE: &str = ".school-panel/session.json";

/// How concurrent 401 responses share a token refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RefreshPolicy {
    /// One refresh exchange at a time; requests that were rejected with the
    /// same stale token reuse the rotated one
    #[default]
    Coalesced,
    /// Every rejected request runs its own refresh exchange
    PerRequest,
}

impl FromStr for RefreshPolicy {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "coalesced" => Ok(RefreshPolicy::Coalesced),
            "per-request" | "per_request" => Ok(RefreshPolicy::PerRequest),
            other => Err(ApiError::Config(format!("unknown refresh policy '{other}'"))),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the REST API, always ending in `/`
    /// Example: http://localhost:8000/api/
    pub api_base_url: Url,

    /// Where the user is sent when the session cannot be recovered
    pub login_path: String,

    pub refresh_policy: RefreshPolicy,

    /// Session file used by the native file-backed token store
    pub session_file: PathBuf,
}

impl Config {
    /// Configuration for the given API base URL with default settings
    pub fn new(api_base_url: &str) -> Result<Self> {
        Ok(Self {
            api_base_url: parse_base_url(api_base_url)?,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            refresh_policy: RefreshPolicy::default(),
            session_file: PathBuf::from(DEFAULT_SESSION_FILE),
        })
    }

    /// Load configuration from environment variables.
    ///
    /// Call `dotenvy::dotenv()` before this to load from `.env` file.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the API under `/api` on the page's own origin
    #[cfg(feature = "hydrate")]
    pub fn for_browser() -> Result<Self> {
        let origin = web_sys::window()
            .ok_or_else(|| ApiError::Config("No window".into()))?
            .location()
            .origin()
            .map_err(|e| ApiError::Config(format!("{e:?}")))?;
        Self::new(&format!("{origin}/api"))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_url = lookup("SCHOOL_PANEL_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let mut config = Self::new(&api_url)?;

        if let Some(path) = lookup("SCHOOL_PANEL_LOGIN_PATH") {
            config.login_path = path;
        }
        if let Some(policy) = lookup("SCHOOL_PANEL_REFRESH_POLICY") {
            config.refresh_policy = policy.parse()?;
        }
        if let Some(file) = lookup("SCHOOL_PANEL_SESSION_FILE") {
            config.session_file = PathBuf::from(file);
        }
        Ok(config)
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    pub fn with_refresh_policy(mut self, policy: RefreshPolicy) -> Self {
        self.refresh_policy = policy;
        self
    }

    pub fn with_session_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.session_file = path.into();
        self
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let trimmed = raw.trim().trim_end_matches('/');
    let url = Url::parse(&format!("{trimmed}/"))
        .map_err(|e| ApiError::Config(format!("invalid API URL '{raw}': {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::Config(format!("API URL '{raw}' cannot be a base")));
    }
    Ok(url)
}
