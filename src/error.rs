// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent user-facing messages.

use crate::config::ConfigError;
use serde::Serialize;

/// Application error type shared by every service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("You must be authenticated to perform this action")]
    NotAuthenticated,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Broad failure categories the UI distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    InvalidCredentials,
    Connection,
    Server,
    Authentication,
    Validation,
    Storage,
    Unexpected,
}

/// Short title/message pair shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserMessage {
    pub title: String,
    pub message: String,
}

impl AppError {
    /// Network failures and non-2xx responses.
    ///
    /// Login falls back to the local user cache on these; every other remote
    /// operation surfaces them.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Network(_) | AppError::Http { .. })
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::InvalidCredentials => ErrorCategory::InvalidCredentials,
            AppError::Http { status: 401, .. } => ErrorCategory::InvalidCredentials,
            AppError::Network(_) => ErrorCategory::Connection,
            AppError::Http { .. } => ErrorCategory::Server,
            AppError::NotAuthenticated => ErrorCategory::Authentication,
            AppError::Validation(_) => ErrorCategory::Validation,
            AppError::Storage(_) => ErrorCategory::Storage,
            AppError::Decode(_) | AppError::Config(_) | AppError::Internal(_) => {
                ErrorCategory::Unexpected
            }
        }
    }

    /// Map the error to the title/message pairing shown in alerts.
    pub fn user_message(&self) -> UserMessage {
        let (title, message) = match self.category() {
            ErrorCategory::InvalidCredentials => (
                "Invalid credentials",
                "The username or password is incorrect.".to_string(),
            ),
            ErrorCategory::Connection => (
                "Connection error",
                "Could not reach the server. Check your connection and try again.".to_string(),
            ),
            ErrorCategory::Server => ("Server error", self.to_string()),
            ErrorCategory::Authentication => (
                "Sign in required",
                "Please sign in to continue.".to_string(),
            ),
            ErrorCategory::Validation => ("Invalid input", self.to_string()),
            ErrorCategory::Storage => (
                "Storage error",
                "Could not save data on this device.".to_string(),
            ),
            ErrorCategory::Unexpected => ("Something went wrong", self.to_string()),
        };

        UserMessage {
            title: title.to_string(),
            message,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for services
pub type Result<T> = std::result::Result<T, AppError>;
