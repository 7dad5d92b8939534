// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use teamsheet::config::ConfigError;
use teamsheet::error::{AppError, ErrorCategory};

#[test]
fn test_user_message_titles() {
    let cases = [
        (AppError::InvalidCredentials, "Invalid credentials"),
        (AppError::Network("connection refused".to_string()), "Connection error"),
        (
            AppError::Http {
                status: 500,
                reason: "Internal Server Error".to_string(),
            },
            "Server error",
        ),
        (AppError::NotAuthenticated, "Sign in required"),
        (AppError::Storage("disk full".to_string()), "Storage error"),
        (AppError::Decode("bad json".to_string()), "Something went wrong"),
    ];

    for (err, title) in cases {
        assert_eq!(err.user_message().title, title, "for {:?}", err);
    }
}

#[test]
fn test_server_message_carries_status_and_reason() {
    let err = AppError::Http {
        status: 409,
        reason: "Event is full".to_string(),
    };
    let message = err.user_message().message;
    assert!(message.contains("409"));
    assert!(message.contains("Event is full"));
}

#[test]
fn test_connection_message_hides_transport_details() {
    let err = AppError::Network("tcp connect error: os error 111".to_string());
    assert!(!err.user_message().message.contains("os error"));
}

#[test]
fn test_config_errors_are_unexpected() {
    let err: AppError = ConfigError::UnknownEndpoint("nope".to_string()).into();
    assert_eq!(err.category(), ErrorCategory::Unexpected);
    assert!(!err.is_transient());
}

#[test]
fn test_not_authenticated_message() {
    assert_eq!(
        AppError::NotAuthenticated.to_string(),
        "You must be authenticated to perform this action"
    );
}
