// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP client for the remote events/teams service.
//!
//! Handles:
//! - Endpoint resolution from the configured path templates
//! - JSON request/response bodies
//! - `Authorization` header attachment
//! - Uniform failure mapping (non-2xx -> `AppError::Http`)
//! - Per-call latency logging

use crate::config::{endpoint, AuthScheme, Config, Endpoints};
use crate::error::AppError;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder};
use serde_json::Value;
use std::time::{Duration, Instant};

/// An `Authorization` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthHeader {
    scheme: AuthScheme,
    token: String,
}

impl AuthHeader {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::with_scheme(AuthScheme::Bearer, token)
    }

    pub fn with_scheme(scheme: AuthScheme, token: impl Into<String>) -> Self {
        Self {
            scheme,
            token: token.into(),
        }
    }

    /// Header name.
    pub fn name(&self) -> &'static str {
        "Authorization"
    }

    /// Header value, e.g. `Bearer <token>`.
    pub fn value(&self) -> String {
        format!("{} {}", self.scheme.as_str(), self.token)
    }

    pub fn scheme(&self) -> AuthScheme {
        self.scheme
    }

    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Remote service client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    endpoints: Endpoints,
    health_timeout: Duration,
}

impl ApiClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.api_base_url.clone(),
            endpoints: config.endpoints.clone(),
            health_timeout: config.health_check_timeout,
        }
    }

    /// Full URL for a logical endpoint.
    pub fn url(&self, name: &str, params: &[(&str, &str)]) -> Result<String, AppError> {
        let path = self.endpoints.resolve(name, params)?;
        Ok(format!("{}{}", self.base_url, path))
    }

    /// GET a logical endpoint and return its JSON body.
    pub async fn get_json(
        &self,
        name: &str,
        params: &[(&str, &str)],
        auth: Option<&AuthHeader>,
    ) -> Result<Value, AppError> {
        let url = self.url(name, params)?;
        let request = self.request(Method::GET, &url, auth);
        self.send(name, request).await
    }

    /// POST a JSON body to a logical endpoint and return its JSON body.
    pub async fn post_json(
        &self,
        name: &str,
        params: &[(&str, &str)],
        body: &Value,
        auth: Option<&AuthHeader>,
    ) -> Result<Value, AppError> {
        let url = self.url(name, params)?;
        let request = self.request(Method::POST, &url, auth).json(body);
        self.send(name, request).await
    }

    /// Check that the remote service answers, bounded by the health timeout.
    pub async fn health_check(&self) -> bool {
        let url = match self.url(endpoint::HEALTH, &[]) {
            Ok(url) => url,
            Err(e) => {
                tracing::warn!(error = %e, "Health endpoint not configured");
                return false;
            }
        };

        let started = Instant::now();
        let result = self
            .http
            .get(&url)
            .timeout(self.health_timeout)
            .send()
            .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(elapsed_ms, "Remote service healthy");
                true
            }
            Ok(response) => {
                tracing::warn!(status = %response.status(), elapsed_ms, "Remote service unhealthy");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, elapsed_ms, "Remote service unreachable");
                false
            }
        }
    }

    /// Request builder carrying the shared headers.
    fn request(&self, method: Method, url: &str, auth: Option<&AuthHeader>) -> RequestBuilder {
        let request = self
            .http
            .request(method, url)
            .header(CONTENT_TYPE, "application/json");
        match auth {
            Some(auth) => request.header(AUTHORIZATION, auth.value()),
            None => request,
        }
    }

    /// Send a request, timing the round trip.
    async fn send(&self, name: &str, request: RequestBuilder) -> Result<Value, AppError> {
        let started = Instant::now();
        let result = request.send().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let response = result.map_err(|e| {
            tracing::warn!(endpoint = name, elapsed_ms, error = %e, "Request failed");
            AppError::Network(e.to_string())
        })?;

        tracing::debug!(
            endpoint = name,
            status = response.status().as_u16(),
            elapsed_ms,
            "Remote call completed"
        );

        check_response_json(response).await
    }
}

/// Check response status and parse the JSON body.
///
/// An empty 2xx body is returned as `Value::Null`.
async fn check_response_json(response: reqwest::Response) -> Result<Value, AppError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::Network(format!("Failed to read response: {}", e)))?;

    if !status.is_success() {
        let reason = error_reason(&body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "Request failed".to_string());
        return Err(AppError::Http {
            status: status.as_u16(),
            reason,
        });
    }

    if body.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(&body).map_err(|e| AppError::Decode(format!("JSON parse error: {}", e)))
}

/// Pull a human-readable message out of an error body.
fn error_reason(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    if let Ok(value) = serde_json::from_str::<Value>(body) {
        return ["message", "error", "detail"]
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .map(str::to_string);
    }

    // Plain-text bodies are passed through when short enough to show.
    (body.len() <= 200).then(|| body.to_string())
}
