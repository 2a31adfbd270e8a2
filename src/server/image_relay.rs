//! Relays product images hosted on third-party sites, so browsers that get
//! blocked by hotlink protection can still display them.

use axum::body::Body;
use futures::stream::{self, StreamExt};
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{StatusCode, Url};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

const RELAY_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const RELAY_ACCEPT: &str = "image/*,*/*";
const RELAY_REFERER: &str = "https://www.google.com";
const FALLBACK_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("invalid_url")]
    InvalidUrl,

    #[error("http_{0}")]
    UpstreamStatus(u16),

    #[error("too_large")]
    TooLarge { limit: u64 },

    #[error("{0}")]
    Upstream(#[from] reqwest::Error),
}

/// An upstream image whose body is streamed back to the client.
pub struct RelayedImage {
    pub content_type: String,
    pub body: Body,
}

pub struct ImageRelay {
    client: reqwest::Client,
    max_bytes: u64,
}

impl ImageRelay {
    pub fn new(timeout_sec: u64, max_bytes: u64) -> Result<ImageRelay, RelayError> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(RELAY_USER_AGENT));
        headers.insert(header::ACCEPT, HeaderValue::from_static(RELAY_ACCEPT));
        headers.insert(header::REFERER, HeaderValue::from_static(RELAY_REFERER));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_sec))
            .default_headers(headers)
            .build()?;

        Ok(ImageRelay { client, max_bytes })
    }

    /// Accepts only absolute http(s) URLs.
    pub fn validate_url(raw: Option<&str>) -> Result<Url, RelayError> {
        let raw = raw.map(str::trim).filter(|s| !s.is_empty());
        let url = raw
            .and_then(|s| Url::parse(s).ok())
            .ok_or(RelayError::InvalidUrl)?;
        match url.scheme() {
            "http" | "https" if url.has_host() => Ok(url),
            _ => Err(RelayError::InvalidUrl),
        }
    }

    /// Starts the upstream download and hands back a body that streams the
    /// rest of it. Only the first chunk is held before responding.
    ///
    /// Bodies over `max_bytes` are refused up front when the upstream
    /// declares a `Content-Length`, otherwise the stream is cut with an
    /// error as soon as the running count goes past the limit.
    pub async fn fetch(&self, url: Url) -> Result<RelayedImage, RelayError> {
        debug!("Relaying image from {}", url);
        let response = self.client.get(url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(RelayError::UpstreamStatus(response.status().as_u16()));
        }

        let limit = self.max_bytes;
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(RelayError::TooLarge { limit });
        }

        let upstream_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut upstream = Box::pin(response.bytes_stream());
        let first = upstream.next().await.transpose()?;
        if first.as_ref().is_some_and(|chunk| chunk.len() as u64 > limit) {
            return Err(RelayError::TooLarge { limit });
        }
        let content_type = resolve_content_type(upstream_type, first.as_deref().unwrap_or(&[]));

        let mut received: u64 = 0;
        let limited = stream::iter(first.map(Ok))
            .chain(upstream)
            .map(move |chunk| {
                let chunk = chunk.map_err(RelayError::from)?;
                received += chunk.len() as u64;
                if received > limit {
                    return Err(RelayError::TooLarge { limit });
                }
                Ok(chunk)
            });

        Ok(RelayedImage {
            content_type,
            body: Body::from_stream(limited),
        })
    }
}

/// Upstream header first, then a sniffed type, then jpeg.
fn resolve_content_type(upstream: Option<String>, bytes: &[u8]) -> String {
    upstream
        .filter(|s| !s.is_empty())
        .or_else(|| infer::get(bytes).map(|kind| kind.mime_type().to_string()))
        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string())
}
