//! One-shot GET of a list endpoint, decoded into normalized records.

use std::error::Error as StdError;
use std::time::Duration;

use anyhow::Result;
use reqwest::blocking::Client;
use thiserror::Error;

use crate::http_client::{DEFAULT_TIMEOUT, build_http_client, http_client};
use crate::normalize::normalize_json;
use crate::observer::{FetchObserver, NoopObserver};
use crate::record::Record;
use crate::resources::Resource;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: BoxError,
    },
    #[error("HTTP error! status: {status}")]
    HttpStatus { status: u16 },
    #[error("invalid JSON in response: {source}")]
    Decode {
        #[source]
        source: serde_json::Error,
    },
}

impl FetchError {
    pub fn network(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        FetchError::Network {
            url: url.into(),
            source: source.into(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }
}

/// Performs a single GET. Implementations must not retry.
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> Result<RawResponse, FetchError>;
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = if timeout == DEFAULT_TIMEOUT {
            http_client()?.clone()
        } else {
            build_http_client(timeout)?
        };
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<RawResponse, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|err| FetchError::network(url, err))?;
        let status = resp.status().as_u16();
        let body = resp.text().map_err(|err| FetchError::network(url, err))?;
        Ok(RawResponse { status, body })
    }
}

/// Maps a raw response to records: non-2xx is a status error, a body that
/// is not JSON is a decode error, any JSON shape is normalized.
pub fn decode_response(raw: RawResponse) -> Result<Vec<Record>, FetchError> {
    if !(200..300).contains(&raw.status) {
        return Err(FetchError::HttpStatus { status: raw.status });
    }
    normalize_json(&raw.body).map_err(|source| FetchError::Decode { source })
}

pub struct ResourceClient<T: Transport> {
    transport: T,
    observer: Box<dyn FetchObserver>,
}

impl<T: Transport> ResourceClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            observer: Box::new(NoopObserver),
        }
    }

    pub fn with_observer(mut self, observer: impl FetchObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn fetch(&self, resource: Resource, url: &str) -> Result<Vec<Record>, FetchError> {
        self.observer.on_request(resource, url);
        let outcome = self.transport.get(url).and_then(decode_response);
        match &outcome {
            Ok(records) => self.observer.on_loaded(resource, records.len()),
            Err(err) => self.observer.on_failed(resource, err),
        }
        outcome
    }
}
