use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

static CLIENT: OnceCell<Client> = OnceCell::new();

/// Process-wide client with the default timeout.
pub fn http_client() -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| build_http_client(DEFAULT_TIMEOUT))
}

pub fn build_http_client(timeout: Duration) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Client::builder()
        .timeout(timeout)
        .user_agent(format!(
            "octofit-terminal/{}; {}",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        ))
        .default_headers(headers)
        .build()
        .context("failed to build http client")
}
