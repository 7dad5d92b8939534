// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::Router;
use chrono::{Duration, Utc};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use teamsheet::config::Config;
use teamsheet::db::MemoryStore;
use teamsheet::models::{Session, User};
use teamsheet::services::encode_token_payload;
use teamsheet::AppState;

/// Serve `router` on an ephemeral local port and return its base URL.
#[allow(dead_code)]
pub async fn spawn_remote(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake remote");
    let addr = listener.local_addr().expect("Fake remote has no address");
    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("Fake remote failed");
    });
    format!("http://{}", addr)
}

/// App state over an in-memory store, pointed at `base_url`.
#[allow(dead_code)]
pub fn create_test_state(base_url: &str) -> (AppState, MemoryStore) {
    create_test_state_with(Config::for_base_url(base_url))
}

/// App state over an in-memory store with an unreachable remote.
#[allow(dead_code)]
pub fn create_offline_state() -> (AppState, MemoryStore) {
    create_test_state_with(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_state_with(config: Config) -> (AppState, MemoryStore) {
    let store = MemoryStore::new();
    let state = AppState::new(config, Arc::new(store.clone()));
    (state, store)
}

#[allow(dead_code)]
pub fn test_user(id: &str, username: &str) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        email: None,
        created_at: "2026-01-01T00:00:00Z".to_string(),
    }
}

/// Locally encoded token for `user_id` expiring `offset` from now.
#[allow(dead_code)]
pub fn local_token(user_id: &str, offset: Duration) -> String {
    encode_token_payload(&json!({
        "user_id": user_id,
        "exp": (Utc::now() + offset).timestamp(),
    }))
}

#[derive(Serialize)]
struct RemoteClaims<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    username: &'a str,
    exp: i64,
}

/// Signed JWT like the remote service issues.
#[allow(dead_code)]
pub fn remote_jwt(user_id: &str, username: &str, offset: Duration) -> String {
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};

    let claims = RemoteClaims {
        user_id,
        username,
        exp: (Utc::now() + offset).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(b"remote-test-secret"),
    )
    .expect("Failed to create JWT")
}

/// Persist an authenticated session for `user` with `token`.
#[allow(dead_code)]
pub async fn sign_in(state: &AppState, user: User, token: &str) {
    state
        .session
        .save_session(&Session::authenticated(user, token.to_string()))
        .await
        .expect("Failed to save session");
}
