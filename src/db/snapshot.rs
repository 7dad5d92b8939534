// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Typed access to the persisted application snapshot.
//!
//! Several services own different parts of the snapshot, so every write is a
//! full read-merge-write of the whole aggregate. Interleaved writers resolve
//! last-writer-wins; the client is single-user and single-device.

use super::{keys, KeyValueStore};
use crate::error::AppError;
use crate::models::AppSnapshot;
use std::sync::Arc;

/// Snapshot accessor shared by the sync service, session manager and
/// navigation manager.
#[derive(Clone)]
pub struct SnapshotStore {
    store: Arc<dyn KeyValueStore>,
}

impl SnapshotStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Load the snapshot, migrating older shapes.
    ///
    /// A missing or unparseable blob yields the default snapshot. Store read
    /// errors are returned so a caller about to write does not clobber data it
    /// failed to read.
    pub async fn load(&self) -> Result<AppSnapshot, AppError> {
        let Some(raw) = self.store.get(keys::SNAPSHOT).await? else {
            return Ok(AppSnapshot::default());
        };

        match serde_json::from_str::<serde_json::Value>(&raw) {
            Ok(value) => Ok(AppSnapshot::from_value(&value)),
            Err(e) => {
                tracing::warn!(error = %e, "Persisted snapshot is not valid JSON, using defaults");
                Ok(AppSnapshot::default())
            }
        }
    }

    pub async fn save(&self, snapshot: &AppSnapshot) -> Result<(), AppError> {
        let raw = serde_json::to_string(snapshot)
            .map_err(|e| AppError::Storage(format!("Failed to encode snapshot: {}", e)))?;
        self.store.set(keys::SNAPSHOT, &raw).await
    }

    /// Read the snapshot, apply `f`, write it back, and return `f`'s result.
    pub async fn update<R>(
        &self,
        f: impl FnOnce(&mut AppSnapshot) -> R + Send,
    ) -> Result<R, AppError> {
        let mut snapshot = self.load().await?;
        let result = f(&mut snapshot);
        self.save(&snapshot).await?;
        Ok(result)
    }

    /// Reset everything to the default shape and persist it.
    pub async fn clear(&self) -> Result<(), AppError> {
        self.save(&AppSnapshot::default()).await?;
        tracing::info!("Application snapshot cleared");
        Ok(())
    }
}
