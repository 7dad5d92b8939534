// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Client configuration loaded from environment variables.
//!
//! The remote service is addressed through a base URL plus a table of
//! logical endpoint names mapped to path templates. Templates carry
//! `{param}` placeholders that are substituted per call.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Authorization scheme used by the legacy profile fetch.
///
/// Every other authenticated call sends `Bearer`. The profile endpoint has
/// historically been called with `Basic`; the inconsistency is kept here in
/// one place so it can be corrected without touching call sites.
pub const PROFILE_AUTH_SCHEME: AuthScheme = AuthScheme::Basic;

/// Default request timeout for the health check.
const DEFAULT_HEALTH_TIMEOUT_MS: u64 = 5_000;

/// Scheme prefix for the `Authorization` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    Bearer,
    Basic,
}

impl AuthScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthScheme::Bearer => "Bearer",
            AuthScheme::Basic => "Basic",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bearer" => Some(AuthScheme::Bearer),
            "basic" => Some(AuthScheme::Basic),
            _ => None,
        }
    }
}

/// Client configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote service base URL (no trailing slash)
    pub api_base_url: String,
    /// Logical endpoint name -> path template
    pub endpoints: Endpoints,
    /// Directory holding the persisted key-value files
    pub data_dir: PathBuf,
    /// Scheme for the profile fetch
    pub profile_auth_scheme: AuthScheme,
    /// Treat id-less navigation items of the same type as duplicates on push
    pub dedupe_idless_navigation: bool,
    /// Request-level timeout for the health check
    pub health_check_timeout: Duration,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:9".to_string(),
            endpoints: Endpoints::default(),
            data_dir: env::temp_dir().join("teamsheet-test"),
            profile_auth_scheme: PROFILE_AUTH_SCHEME,
            dedupe_idless_navigation: false,
            health_check_timeout: Duration::from_millis(500),
        }
    }

    /// Same as [`Config::test_default`] but pointed at a live base URL.
    pub fn for_base_url(base_url: &str) -> Self {
        Self {
            api_base_url: base_url.trim_end_matches('/').to_string(),
            ..Self::test_default()
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honored for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let mut endpoints = Endpoints::default();
        if let Ok(path) = env::var("TEAMSHEET_ENDPOINTS_FILE") {
            let raw = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::EndpointsFile(format!("{}: {}", path, e)))?;
            let overrides: HashMap<String, String> = serde_json::from_str(&raw)
                .map_err(|e| ConfigError::EndpointsFile(format!("{}: {}", path, e)))?;
            endpoints.merge(overrides);
        }

        let profile_auth_scheme = match env::var("TEAMSHEET_PROFILE_AUTH") {
            Ok(v) => AuthScheme::parse(&v).ok_or(ConfigError::Invalid("TEAMSHEET_PROFILE_AUTH"))?,
            Err(_) => PROFILE_AUTH_SCHEME,
        };

        Ok(Self {
            api_base_url: env::var("TEAMSHEET_API_URL")
                .unwrap_or_else(|_| "http://localhost:3000/api".to_string())
                .trim_end_matches('/')
                .to_string(),
            endpoints,
            data_dir: env::var("TEAMSHEET_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".teamsheet")),
            profile_auth_scheme,
            dedupe_idless_navigation: env::var("TEAMSHEET_DEDUPE_IDLESS_NAV")
                .map(|v| matches!(v.trim(), "1" | "true" | "yes"))
                .unwrap_or(false),
            health_check_timeout: Duration::from_millis(
                env::var("TEAMSHEET_HEALTH_TIMEOUT_MS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_HEALTH_TIMEOUT_MS),
            ),
        })
    }
}

/// Logical endpoint names understood by the services.
pub mod endpoint {
    pub const REGISTER: &str = "register";
    pub const LOGIN: &str = "login";
    pub const PROFILE: &str = "profile";
    pub const HEALTH: &str = "health";
    pub const EVENTS: &str = "events";
    pub const EVENT_DETAILS: &str = "event_details";
    pub const TEAMS: &str = "teams";
    pub const USER_TEAMS: &str = "user_teams";
    pub const TEAM_DETAILS: &str = "team_details";
    pub const EVENT_REGISTRATIONS: &str = "event_registrations";
    pub const TEAM_REGISTRATIONS: &str = "team_registrations";
    pub const REGISTRATIONS: &str = "registrations";
}

/// Path templates keyed by logical endpoint name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints(HashMap<String, String>);

impl Default for Endpoints {
    fn default() -> Self {
        let table = [
            (endpoint::REGISTER, "/users"),
            (endpoint::LOGIN, "/auth/login"),
            (endpoint::PROFILE, "/users/{userId}"),
            (endpoint::HEALTH, "/health"),
            (endpoint::EVENTS, "/events"),
            (endpoint::EVENT_DETAILS, "/events/{id}"),
            (endpoint::TEAMS, "/teams"),
            (endpoint::USER_TEAMS, "/users/{userId}/teams"),
            (endpoint::TEAM_DETAILS, "/teams/{id}"),
            (endpoint::EVENT_REGISTRATIONS, "/registrations/events"),
            (endpoint::TEAM_REGISTRATIONS, "/registrations/teams"),
            (endpoint::REGISTRATIONS, "/users/{userId}/registrations"),
        ];
        Self(
            table
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl Endpoints {
    /// Override or add templates.
    pub fn merge(&mut self, overrides: HashMap<String, String>) {
        self.0.extend(overrides);
    }

    /// Resolve a logical endpoint into a path, substituting `{key}` placeholders.
    ///
    /// Parameter values are URL-encoded. A placeholder left without a value is
    /// an error rather than being sent to the server verbatim.
    pub fn resolve(&self, name: &str, params: &[(&str, &str)]) -> Result<String, ConfigError> {
        let template = self
            .0
            .get(name)
            .ok_or_else(|| ConfigError::UnknownEndpoint(name.to_string()))?;

        let mut path = template.clone();
        for (key, value) in params {
            path = path.replace(&format!("{{{}}}", key), &urlencoding::encode(value));
        }

        if let Some(start) = path.find('{') {
            let end = path[start..].find('}').map(|i| start + i + 1).unwrap_or(path.len());
            return Err(ConfigError::UnresolvedPlaceholder {
                endpoint: name.to_string(),
                placeholder: path[start..end].to_string(),
            });
        }

        Ok(path)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Could not load endpoints file {0}")]
    EndpointsFile(String),

    #[error("Unknown endpoint: {0}")]
    UnknownEndpoint(String),

    #[error("Endpoint {endpoint} has unresolved placeholder {placeholder}")]
    UnresolvedPlaceholder {
        endpoint: String,
        placeholder: String,
    },
}
