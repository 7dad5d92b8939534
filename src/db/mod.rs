// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persistence layer (device-local key-value store).

pub mod file;
pub mod memory;
pub mod snapshot;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use snapshot::SnapshotStore;

use crate::error::AppError;
use async_trait::async_trait;

/// Storage keys as constants.
pub mod keys {
    /// Persisted [`crate::models::Session`]
    pub const SESSION: &str = "session";
    /// Persisted [`crate::models::AppSnapshot`]
    pub const SNAPSHOT: &str = "app_state";
    /// Users that have signed in on this device (login fallback cache)
    pub const LOCAL_USERS: &str = "local_users";
}

/// Durable string key-value storage.
///
/// Values are opaque JSON blobs. Write failures must be reported, never
/// dropped.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, AppError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), AppError>;

    async fn remove(&self, key: &str) -> Result<(), AppError>;
}
