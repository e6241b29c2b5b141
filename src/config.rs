use std::env;
use std::time::Duration;

use thiserror::Error;
use url::Url;

use crate::resources::Resource;

const DEFAULT_LOCAL_BASE: &str = "http://localhost:8000/api/";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid API base URL '{base}': {source}")]
    InvalidBase {
        base: String,
        #[source]
        source: url::ParseError,
    },
    #[error("API base URL '{0}' must use http or https")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: Url,
    pub request_timeout: Duration,
    pub start_view: Option<Resource>,
}

impl AppConfig {
    /// Reads `.env.local` / `.env` and then the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let base = non_empty("OCTOFIT_API_BASE")
            .or_else(|| {
                non_empty("CODESPACE_NAME")
                    .or_else(|| non_empty("REACT_APP_CODESPACE_NAME"))
                    .map(|name| codespace_base(name.trim()))
            })
            .unwrap_or_else(|| DEFAULT_LOCAL_BASE.to_string());
        let api_base = parse_base(&base)?;

        let timeout_secs = non_empty("OCTOFIT_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS)
            .clamp(1, 120);

        let start_view = non_empty("OCTOFIT_START_VIEW")
            .and_then(|val| val.parse::<Resource>().ok());

        Ok(Self {
            api_base,
            request_timeout: Duration::from_secs(timeout_secs),
            start_view,
        })
    }

    pub fn endpoint(&self, resource: Resource) -> String {
        // `parse_base` guarantees a trailing slash, so join keeps the `/api/` segment.
        match self.api_base.join(resource.path()) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.api_base, resource.path()),
        }
    }
}

pub fn codespace_base(name: &str) -> String {
    format!("https://{name}-8000.app.github.dev/api/")
}

fn parse_base(raw: &str) -> Result<Url, ConfigError> {
    let mut base = raw.trim().to_string();
    if !base.ends_with('/') {
        base.push('/');
    }
    let url = Url::parse(&base).map_err(|source| ConfigError::InvalidBase {
        base: raw.to_string(),
        source,
    })?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::UnsupportedScheme(raw.to_string()));
    }
    Ok(url)
}
