// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! The persisted application snapshot.
//!
//! One aggregate holds every cached entity, the current selections, a copy of
//! the auth state and the navigation stack. The sync service and the
//! navigation manager both read-modify-write it.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::navigation::{NavigationStack, NavigationStackItem};
use crate::models::{Event, Player, Registration, Session, Team};

/// Role the signed-in user acts as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub enum UserRole {
    #[default]
    Player,
    Organizer,
}

/// Everything the client keeps offline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSnapshot {
    pub events: Vec<Event>,
    pub teams: Vec<Team>,
    pub players: Vec<Player>,
    pub registrations: Vec<Registration>,
    pub current_event: Option<Event>,
    pub current_team: Option<Team>,
    /// Denormalized copy of the session
    pub auth: Session,
    pub user_id: Option<String>,
    pub user_role: UserRole,
    pub navigation_stack: Vec<NavigationStackItem>,
}

impl Default for AppSnapshot {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            teams: Vec::new(),
            players: Vec::new(),
            registrations: Vec::new(),
            current_event: None,
            current_team: None,
            auth: Session::default(),
            user_id: None,
            user_role: UserRole::default(),
            navigation_stack: NavigationStack::default().into_items(),
        }
    }
}

impl AppSnapshot {
    /// Decode a persisted snapshot, defaulting anything missing or malformed.
    ///
    /// Fields are read one at a time so a single bad field (say, an entity
    /// list written by an older client) does not discard the rest.
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            tracing::warn!("Persisted snapshot is not an object, using defaults");
            return Self::default();
        };

        let mut snapshot = Self {
            events: field(obj, "events"),
            teams: field(obj, "teams"),
            players: field(obj, "players"),
            registrations: field(obj, "registrations"),
            current_event: field(obj, "currentEvent"),
            current_team: field(obj, "currentTeam"),
            auth: field(obj, "auth"),
            user_id: field(obj, "userId"),
            user_role: field(obj, "userRole"),
            navigation_stack: field(obj, "navigationStack"),
        };
        snapshot.migrate();
        snapshot
    }

    /// Bring invariants up to date after loading.
    fn migrate(&mut self) {
        let items = std::mem::take(&mut self.navigation_stack);
        self.navigation_stack = NavigationStack::from_items(items).into_items();

        if !self.auth.is_consistent() {
            tracing::warn!("Snapshot auth marked authenticated without a token, resetting");
            self.auth = Session::default();
        }
    }

    pub fn stack(&self) -> NavigationStack {
        NavigationStack::from_items(self.navigation_stack.clone())
    }

    pub fn set_stack(&mut self, stack: NavigationStack) {
        self.navigation_stack = stack.into_items();
    }
}

fn field<T: DeserializeOwned + Default>(obj: &serde_json::Map<String, Value>, key: &str) -> T {
    match obj.get(key) {
        None | Some(Value::Null) => T::default(),
        Some(v) => serde_json::from_value(v.clone()).unwrap_or_else(|e| {
            tracing::warn!(field = key, error = %e, "Dropping malformed snapshot field");
            T::default()
        }),
    }
}
