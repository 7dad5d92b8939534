// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session token payload decoding and expiry checks.
//!
//! Tokens are trusted at face value: the client only reads the JSON payload
//! to decide whether a token is still usable and whose it is. Nothing here
//! verifies signatures.
//!
//! Two shapes are accepted:
//! - `header.payload.signature`, where `payload` is base64url JSON (what the
//!   remote service issues)
//! - a whole-string base64 JSON object (what the local login fallback issues)

use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD, URL_SAFE, URL_SAFE_NO_PAD};
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::time_utils::parse_epoch_seconds;

/// Decoded token payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenPayload {
    claims: Map<String, Value>,
}

impl TokenPayload {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.claims.get(key)
    }

    /// Expiry as epoch seconds, from `exp` or `expires_at`.
    ///
    /// Numbers are epoch seconds; strings are parsed as dates (or digit
    /// strings as epoch seconds).
    pub fn expires_at(&self) -> Option<i64> {
        ["exp", "expires_at"]
            .iter()
            .filter_map(|key| self.claims.get(*key))
            .find_map(|value| match value {
                Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
                Value::String(s) => parse_epoch_seconds(s),
                _ => None,
            })
    }

    /// User id, from `user_id` or `userId`.
    pub fn user_id(&self) -> Option<String> {
        ["user_id", "userId"]
            .iter()
            .filter_map(|key| self.claims.get(*key))
            .find_map(|value| match value {
                Value::String(s) if !s.is_empty() => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
    }

    pub fn username(&self) -> Option<&str> {
        self.claims.get("username").and_then(Value::as_str)
    }
}

/// Encode a JSON object as a token in the local representation.
pub fn encode_token_payload(payload: &Value) -> String {
    STANDARD.encode(payload.to_string())
}

/// Decode a token's payload. Returns `None` (and logs) on any failure.
pub fn decode_token_payload(token: &str) -> Option<TokenPayload> {
    let token = token.trim();
    let segments: Vec<&str> = token.split('.').collect();
    let encoded = match segments.as_slice() {
        [_, payload, _] => *payload,
        [whole] => *whole,
        _ => {
            tracing::debug!(segments = segments.len(), "Token has unexpected shape");
            return None;
        }
    };

    let Some(bytes) = decode_base64_any(encoded) else {
        tracing::debug!("Token payload is not valid base64");
        return None;
    };

    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(claims)) => Some(TokenPayload { claims }),
        Ok(_) => {
            tracing::debug!("Token payload is not a JSON object");
            None
        }
        Err(e) => {
            tracing::debug!(error = %e, "Token payload is not valid JSON");
            None
        }
    }
}

fn decode_base64_any(encoded: &str) -> Option<Vec<u8>> {
    URL_SAFE_NO_PAD
        .decode(encoded)
        .or_else(|_| STANDARD.decode(encoded))
        .or_else(|_| URL_SAFE.decode(encoded))
        .or_else(|_| STANDARD_NO_PAD.decode(encoded))
        .ok()
}

/// Whether `token` is expired at `now`.
///
/// Tokens that fail to decode, or that carry no usable expiry, count as
/// expired. No clock skew allowance is applied.
pub fn is_token_expired_at(token: &str, now: DateTime<Utc>) -> bool {
    match decode_token_payload(token).and_then(|p| p.expires_at()) {
        Some(exp) => exp < now.timestamp(),
        None => true,
    }
}

/// Whether `token` is expired now.
pub fn is_token_expired(token: &str) -> bool {
    is_token_expired_at(token, Utc::now())
}
