// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session management: login, registration, logout and token gating.
//!
//! Login tries the remote service first and falls back to users already
//! known on this device when the service cannot be reached. Registration has
//! no such fallback.

use crate::config::{endpoint, AuthScheme};
use crate::db::{keys, KeyValueStore, SnapshotStore};
use crate::error::AppError;
use crate::models::{AuthResult, Credentials, Session, User};
use crate::services::api::{ApiClient, AuthHeader};
use crate::services::normalize::{normalize_auth_response, normalize_user};
use crate::services::token::{self, TokenPayload};
use crate::time_utils::now_rfc3339;
use chrono::{Duration, Utc};
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// Lifetime of tokens minted by the offline login fallback.
const LOCAL_TOKEN_LIFETIME_DAYS: i64 = 14;

/// Owns the persisted session and the auth flows around it.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn KeyValueStore>,
    api: ApiClient,
    snapshots: SnapshotStore,
    profile_auth_scheme: AuthScheme,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        api: ApiClient,
        snapshots: SnapshotStore,
        profile_auth_scheme: AuthScheme,
    ) -> Self {
        Self {
            store,
            api,
            snapshots,
            profile_auth_scheme,
        }
    }

    // ─── Persistence ─────────────────────────────────────────────────────────

    /// Load the persisted session. Never fails; problems yield a signed-out
    /// session.
    pub async fn load_session(&self) -> Session {
        let raw = match self.store.get(keys::SESSION).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Session::default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session, treating as signed out");
                return Session::default();
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if session.is_consistent() => session,
            Ok(_) => {
                tracing::warn!("Persisted session is authenticated without a token, ignoring");
                Session::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse session, treating as signed out");
                Session::default()
            }
        }
    }

    /// Persist the session verbatim.
    pub async fn save_session(&self, session: &Session) -> Result<(), AppError> {
        let raw = serde_json::to_string(session)
            .map_err(|e| AppError::Storage(format!("Failed to encode session: {}", e)))?;
        self.store.set(keys::SESSION, &raw).await
    }

    // ─── Auth Flows ──────────────────────────────────────────────────────────

    /// Create an account on the remote service.
    ///
    /// A local user record is built first and used for any field the remote
    /// response leaves out. Failures propagate; there is no offline sign-up.
    pub async fn register(&self, credentials: &Credentials) -> Result<AuthResult, AppError> {
        credentials.validate()?;

        let fallback = User {
            id: uuid::Uuid::new_v4().to_string(),
            username: credentials.username.clone(),
            email: credentials.email.clone(),
            created_at: now_rfc3339(),
        };

        let body = json!({
            "username": credentials.username,
            "password": credentials.password,
            "email": credentials.email,
        });

        let response = self
            .api
            .post_json(endpoint::REGISTER, &[], &body, None)
            .await?;
        let result = normalize_auth_response(&response, &fallback)?;

        self.establish(&result).await?;
        tracing::info!(user_id = %result.user.id, username = %result.user.username, "Registered");
        Ok(result)
    }

    /// Sign in, falling back to the local user cache if the remote call fails.
    ///
    /// An empty password cannot sign in remotely, so it goes straight to the
    /// local cache, which does not check passwords.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResult, AppError> {
        let remote_allowed = match credentials.validate() {
            Ok(()) => true,
            Err(errors) if errors.errors().keys().all(|field| &**field == "password") => false,
            Err(errors) => return Err(errors.into()),
        };

        let result = if remote_allowed {
            self.login_remotely(credentials).await?
        } else {
            tracing::debug!("Password missing, skipping remote login");
            self.login_locally(&credentials.username).await?
        };

        self.establish(&result).await?;
        tracing::info!(user_id = %result.user.id, username = %result.user.username, "Logged in");
        Ok(result)
    }

    async fn login_remotely(&self, credentials: &Credentials) -> Result<AuthResult, AppError> {
        let body = json!({
            "username": credentials.username,
            "password": credentials.password,
        });

        match self.api.post_json(endpoint::LOGIN, &[], &body, None).await {
            Ok(response) => {
                let fallback = self
                    .find_local_user(&credentials.username)
                    .await
                    .unwrap_or_else(|| User {
                        id: uuid::Uuid::new_v4().to_string(),
                        username: credentials.username.clone(),
                        email: None,
                        created_at: now_rfc3339(),
                    });
                normalize_auth_response(&response, &fallback)
            }
            Err(e) if e.is_transient() => {
                tracing::warn!(error = %e, "Remote login failed, trying local users");
                self.login_locally(&credentials.username).await
            }
            Err(e) => Err(e),
        }
    }

    /// Offline sign-in against users cached on this device.
    ///
    /// The password is not checked; the cache holds no credentials.
    async fn login_locally(&self, username: &str) -> Result<AuthResult, AppError> {
        let user = self
            .find_local_user(username)
            .await
            .ok_or(AppError::InvalidCredentials)?;

        let exp = Utc::now() + Duration::days(LOCAL_TOKEN_LIFETIME_DAYS);
        let token = token::encode_token_payload(&json!({
            "user_id": user.id,
            "username": user.username,
            "exp": exp.timestamp(),
        }));

        tracing::info!(user_id = %user.id, "Signed in with local fallback");
        Ok(AuthResult { user, token })
    }

    /// Sign out locally and wipe cached data.
    ///
    /// The session is reset even if clearing the snapshot fails. The remote
    /// service is not told.
    pub async fn logout(&self) -> Result<(), AppError> {
        if let Err(e) = self.snapshots.clear().await {
            tracing::warn!(error = %e, "Failed to clear application data during logout");
        }
        self.save_session(&Session::default()).await?;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Persist a successful sign-in everywhere it is mirrored.
    ///
    /// The session key is written last so a failed mirror write never leaves
    /// it claiming an authenticated user.
    async fn establish(&self, result: &AuthResult) -> Result<(), AppError> {
        let session = Session::authenticated(result.user.clone(), result.token.clone());

        let mirrored = session.clone();
        let user_id = result.user.id.clone();
        self.snapshots
            .update(move |snapshot| {
                snapshot.auth = mirrored;
                snapshot.user_id = Some(user_id);
            })
            .await?;
        self.cache_local_user(&result.user).await?;

        self.save_session(&session).await
    }

    // ─── Local User Cache ────────────────────────────────────────────────────

    /// Remember a user for offline login. Replaces any entry with the same
    /// username.
    pub async fn cache_local_user(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.local_users().await;
        users.retain(|u| u.username != user.username);
        users.push(user.clone());

        let raw = serde_json::to_string(&users)
            .map_err(|e| AppError::Storage(format!("Failed to encode local users: {}", e)))?;
        self.store.set(keys::LOCAL_USERS, &raw).await
    }

    async fn local_users(&self) -> Vec<User> {
        match self.store.get(keys::LOCAL_USERS).await {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to parse local users");
                Vec::new()
            }),
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read local users");
                Vec::new()
            }
        }
    }

    async fn find_local_user(&self, username: &str) -> Option<User> {
        self.local_users()
            .await
            .into_iter()
            .find(|u| u.username == username)
    }

    // ─── Token Gating ────────────────────────────────────────────────────────

    /// `Authorization: Bearer <token>` if a stored token is still valid.
    pub async fn auth_header(&self) -> Option<AuthHeader> {
        self.valid_token().await.map(AuthHeader::bearer)
    }

    async fn valid_token(&self) -> Option<String> {
        let token = self.load_session().await.token?;
        if self.is_token_expired(&token) {
            tracing::debug!("Stored token is expired");
            return None;
        }
        Some(token)
    }

    pub fn is_token_expired(&self, token: &str) -> bool {
        token::is_token_expired(token)
    }

    pub fn decode_token_payload(&self, token: &str) -> Option<TokenPayload> {
        token::decode_token_payload(token)
    }

    /// Identity of the signed-in user: the token's user id, else the
    /// session's user record.
    pub async fn current_user_id(&self) -> Option<String> {
        let session = self.load_session().await;
        session
            .active_token()
            .and_then(token::decode_token_payload)
            .and_then(|payload| payload.user_id())
            .or_else(|| session.user.as_ref().map(|u| u.id.clone()))
    }

    /// Fetch the signed-in user's profile and refresh the stored session.
    ///
    /// Uses the configured profile auth scheme (see
    /// [`crate::config::PROFILE_AUTH_SCHEME`]).
    pub async fn fetch_profile(&self) -> Result<User, AppError> {
        let token = self.valid_token().await.ok_or(AppError::NotAuthenticated)?;
        let user_id = self
            .current_user_id()
            .await
            .ok_or(AppError::NotAuthenticated)?;

        let auth = AuthHeader::with_scheme(self.profile_auth_scheme, token.clone());
        let response = self
            .api
            .get_json(endpoint::PROFILE, &[("userId", &user_id)], Some(&auth))
            .await?;
        let user = normalize_user(&response)?;

        self.save_session(&Session::authenticated(user.clone(), token))
            .await?;
        Ok(user)
    }
}
