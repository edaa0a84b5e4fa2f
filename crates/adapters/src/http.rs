// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin HTTP client with one error type for transport and status failures

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Method;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Statuses at or above this are reported as [`HttpError::Status`].
const ERROR_THRESHOLD: u16 = 400;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("invalid header {name:?}: {message}")]
    InvalidHeader { name: String, message: String },
    #[error("HTTP error calling {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} calling {url}: {body}")]
    Status { status: u16, url: String, body: String },
}

impl HttpError {
    /// Status code for [`HttpError::Status`]
    pub fn status(&self) -> Option<u16> {
        match self {
            HttpError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    /// Sent with every request unless overridden per request
    pub headers: Vec<(String, String)>,
    pub follow_redirects: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            headers: Vec::new(),
            follow_redirects: true,
        }
    }
}

impl HttpClientConfig {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = follow;
        self
    }
}

/// Successful (< 400) response
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub text: String,
    /// Parsed body, `None` when the body is not JSON
    pub json: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    default_headers: HeaderMap,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, HttpError> {
        let redirect = if config.follow_redirects {
            Policy::default()
        } else {
            Policy::none()
        };
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(redirect)
            .build()
            .map_err(HttpError::Build)?;
        let mut default_headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let (name, value) = header_pair(name, value)?;
            default_headers.insert(name, value);
        }
        Ok(Self {
            client,
            default_headers,
        })
    }

    /// Send a request, merging `headers` over the client defaults.
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        headers: &[(&str, &str)],
        json: Option<&Value>,
    ) -> Result<HttpResponse, HttpError> {
        let mut combined = self.default_headers.clone();
        for (name, value) in headers {
            let (name, value) = header_pair(name, value)?;
            combined.insert(name, value);
        }

        tracing::debug!(%method, url, "http request");
        let mut builder = self.client.request(method, url).headers(combined);
        if let Some(body) = json {
            builder = builder.json(body);
        }

        let transport = |source| HttpError::Transport {
            url: url.to_string(),
            source,
        };
        let response = builder.send().await.map_err(transport)?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(transport)?;

        if status >= ERROR_THRESHOLD {
            tracing::debug!(status, url, "http error status");
            return Err(HttpError::Status {
                status,
                url: url.to_string(),
                body: text.trim().to_string(),
            });
        }

        let json = serde_json::from_str(&text).ok();
        Ok(HttpResponse { status, text, json })
    }

    pub async fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, HttpError> {
        self.request(Method::GET, url, headers, None).await
    }

    pub async fn head(&self, url: &str, headers: &[(&str, &str)]) -> Result<HttpResponse, HttpError> {
        self.request(Method::HEAD, url, headers, None).await
    }

    pub async fn post_json(
        &self,
        url: &str,
        headers: &[(&str, &str)],
        body: &Value,
    ) -> Result<HttpResponse, HttpError> {
        self.request(Method::POST, url, headers, Some(body)).await
    }
}

fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), HttpError> {
    let invalid = |message: String| HttpError::InvalidHeader {
        name: name.to_string(),
        message,
    };
    let header_name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| invalid(e.to_string()))?;
    let header_value = HeaderValue::from_str(value).map_err(|e| invalid(e.to_string()))?;
    Ok((header_name, header_value))
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
