// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Teamsheet: offline-first client core for sports events, teams and
//! registrations.
//!
//! This crate holds the session, remote data sync and navigation stack
//! layers of the mobile app. Everything persists to a device-local
//! key-value store and syncs best-effort against a remote JSON service.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

use config::Config;
use db::{FileStore, KeyValueStore, SnapshotStore};
use error::AppError;
use services::{ApiClient, DataSynchronizer, NavigationManager, SessionManager};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<dyn KeyValueStore>,
    pub api: ApiClient,
    pub session: Arc<SessionManager>,
    pub sync: DataSynchronizer,
    pub navigation: Arc<NavigationManager>,
}

impl AppState {
    /// Wire up all services over the given store.
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>) -> Self {
        let api = ApiClient::new(&config);
        let snapshots = SnapshotStore::new(store.clone());

        let session = Arc::new(SessionManager::new(
            store.clone(),
            api.clone(),
            snapshots.clone(),
            config.profile_auth_scheme,
        ));
        let sync = DataSynchronizer::new(api.clone(), session.clone(), snapshots.clone());
        let navigation = Arc::new(NavigationManager::new(
            snapshots,
            config.dedupe_idless_navigation,
        ));

        Self {
            config,
            store,
            api,
            session,
            sync,
            navigation,
        }
    }

    /// Open the file-backed store under `config.data_dir`.
    pub async fn open(config: Config) -> Result<Self, AppError> {
        let store = FileStore::open(&config.data_dir).await?;
        Ok(Self::new(config, Arc::new(store)))
    }
}
