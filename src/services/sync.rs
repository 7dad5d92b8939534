// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Remote data synchronization for events, teams and registrations.
//!
//! Every operation has the same shape: resolve the endpoint, attach the auth
//! header, call the remote service, normalize the response, merge it into the
//! application snapshot, persist, and return the normalized entity.
//!
//! Unlike login there is no local fallback here: remote failures propagate.

use crate::config::endpoint;
use crate::db::SnapshotStore;
use crate::error::AppError;
use crate::models::{
    Event, NewEvent, NewTeam, Registration, RegistrationType, Team, UserRole,
};
use crate::services::api::{ApiClient, AuthHeader};
use crate::services::normalize::{
    normalize_event, normalize_events, normalize_registration_as, normalize_registrations,
    normalize_team, normalize_teams,
};
use crate::services::SessionManager;
use serde_json::json;
use std::sync::Arc;
use validator::Validate;

/// Credentials for a call that requires a signed-in user.
struct AuthContext {
    header: Option<AuthHeader>,
    user_id: String,
}

/// Keeps the local snapshot in step with the remote service.
#[derive(Clone)]
pub struct DataSynchronizer {
    api: ApiClient,
    session: Arc<SessionManager>,
    snapshots: SnapshotStore,
}

impl DataSynchronizer {
    pub fn new(api: ApiClient, session: Arc<SessionManager>, snapshots: SnapshotStore) -> Self {
        Self {
            api,
            session,
            snapshots,
        }
    }

    /// Fail fast, before any I/O to the remote, when nobody is signed in.
    async fn require_auth(&self) -> Result<AuthContext, AppError> {
        let session = self.session.load_session().await;
        if session.active_token().is_none() {
            return Err(AppError::NotAuthenticated);
        }

        let user_id = self
            .session
            .current_user_id()
            .await
            .ok_or(AppError::NotAuthenticated)?;

        Ok(AuthContext {
            header: self.session.auth_header().await,
            user_id,
        })
    }

    // ─── Events ──────────────────────────────────────────────────────────────

    /// Create an event (or sub-event) and prepend it to the local list.
    pub async fn create_event(&self, new_event: &NewEvent) -> Result<Event, AppError> {
        let auth = self.require_auth().await?;
        new_event.validate()?;

        let body = serde_json::to_value(new_event)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode event: {}", e)))?;
        let response = self
            .api
            .post_json(endpoint::EVENTS, &[], &body, auth.header.as_ref())
            .await?;
        let event = normalize_event(&response)?;

        let stored = event.clone();
        self.snapshots
            .update(move |snapshot| snapshot.events.insert(0, stored))
            .await?;

        tracing::info!(event_id = %event.id, name = %event.name, "Event created");
        Ok(event)
    }

    /// Fetch all events, replacing the local list.
    pub async fn get_events(&self) -> Result<Vec<Event>, AppError> {
        let auth = self.session.auth_header().await;
        let response = self
            .api
            .get_json(endpoint::EVENTS, &[], auth.as_ref())
            .await?;
        let events = normalize_events(&response)?;

        let stored = events.clone();
        self.snapshots
            .update(move |snapshot| snapshot.events = stored)
            .await?;

        tracing::info!(count = events.len(), "Events synced");
        Ok(events)
    }

    /// Fetch one event and make it the current event.
    pub async fn get_event_details(&self, event_id: &str) -> Result<Event, AppError> {
        let auth = self.session.auth_header().await;
        let response = self
            .api
            .get_json(endpoint::EVENT_DETAILS, &[("id", event_id)], auth.as_ref())
            .await?;
        let event = normalize_event(&response)?;

        let stored = event.clone();
        self.snapshots
            .update(move |snapshot| {
                snapshot.current_event = Some(stored.clone());
                replace_or_prepend(&mut snapshot.events, stored, |e| &e.id);
            })
            .await?;

        Ok(event)
    }

    // ─── Teams ───────────────────────────────────────────────────────────────

    /// Create a team (or sub-team) and prepend it to the local list.
    pub async fn create_team(&self, new_team: &NewTeam) -> Result<Team, AppError> {
        let auth = self.require_auth().await?;
        new_team.validate()?;

        let body = serde_json::to_value(new_team)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode team: {}", e)))?;
        let response = self
            .api
            .post_json(endpoint::TEAMS, &[], &body, auth.header.as_ref())
            .await?;
        let team = normalize_team(&response)?;

        let stored = team.clone();
        self.snapshots
            .update(move |snapshot| snapshot.teams.insert(0, stored))
            .await?;

        tracing::info!(team_id = %team.id, name = %team.name, "Team created");
        Ok(team)
    }

    /// Fetch the signed-in user's teams, replacing the local list.
    pub async fn get_teams(&self) -> Result<Vec<Team>, AppError> {
        let auth = self.require_auth().await?;
        let response = self
            .api
            .get_json(
                endpoint::USER_TEAMS,
                &[("userId", &auth.user_id)],
                auth.header.as_ref(),
            )
            .await?;
        let teams = normalize_teams(&response)?;

        let stored = teams.clone();
        self.snapshots
            .update(move |snapshot| snapshot.teams = stored)
            .await?;

        tracing::info!(count = teams.len(), "Teams synced");
        Ok(teams)
    }

    /// Fetch one team and make it the current team.
    pub async fn get_team_details(&self, team_id: &str) -> Result<Team, AppError> {
        let auth = self.session.auth_header().await;
        let response = self
            .api
            .get_json(endpoint::TEAM_DETAILS, &[("id", team_id)], auth.as_ref())
            .await?;
        let team = normalize_team(&response)?;

        let stored = team.clone();
        self.snapshots
            .update(move |snapshot| {
                snapshot.current_team = Some(stored.clone());
                replace_or_prepend(&mut snapshot.teams, stored, |t| &t.id);
            })
            .await?;

        Ok(team)
    }

    // ─── Registrations ───────────────────────────────────────────────────────

    /// Register the signed-in player for an event.
    pub async fn register_for_event(&self, event_id: &str) -> Result<Registration, AppError> {
        self.create_registration(RegistrationType::Event, event_id)
            .await
    }

    /// Ask to join a team as the signed-in player.
    pub async fn join_team(&self, team_id: &str) -> Result<Registration, AppError> {
        self.create_registration(RegistrationType::Team, team_id)
            .await
    }

    async fn create_registration(
        &self,
        kind: RegistrationType,
        target_id: &str,
    ) -> Result<Registration, AppError> {
        let auth = self.require_auth().await?;

        let (name, body) = match kind {
            RegistrationType::Event => (
                endpoint::EVENT_REGISTRATIONS,
                json!({ "player_id": auth.user_id, "event_id": target_id }),
            ),
            RegistrationType::Team => (
                endpoint::TEAM_REGISTRATIONS,
                json!({ "player_id": auth.user_id, "team_id": target_id }),
            ),
        };

        let response = self
            .api
            .post_json(name, &[], &body, auth.header.as_ref())
            .await?;
        let mut registration = normalize_registration_as(&response, Some(kind))?;

        // The remote sometimes echoes only the new id and status.
        match kind {
            RegistrationType::Event => {
                registration.event_id.get_or_insert_with(|| target_id.to_string());
            }
            RegistrationType::Team => {
                registration.team_id.get_or_insert_with(|| target_id.to_string());
            }
        }
        registration.player_id.get_or_insert(auth.user_id);

        let stored = registration.clone();
        self.snapshots
            .update(move |snapshot| snapshot.registrations.insert(0, stored))
            .await?;

        tracing::info!(
            registration_id = %registration.id,
            kind = ?kind,
            target_id,
            "Registration created"
        );
        Ok(registration)
    }

    /// Fetch the signed-in user's registrations, replacing the local list.
    pub async fn get_registrations(&self) -> Result<Vec<Registration>, AppError> {
        let auth = self.require_auth().await?;
        let response = self
            .api
            .get_json(
                endpoint::REGISTRATIONS,
                &[("userId", &auth.user_id)],
                auth.header.as_ref(),
            )
            .await?;
        let registrations = normalize_registrations(&response)?;

        let stored = registrations.clone();
        self.snapshots
            .update(move |snapshot| snapshot.registrations = stored)
            .await?;

        tracing::info!(count = registrations.len(), "Registrations synced");
        Ok(registrations)
    }

    // ─── Local State ─────────────────────────────────────────────────────────

    /// Reset the whole snapshot (entities, session copy, navigation stack).
    pub async fn clear_all_data(&self) -> Result<(), AppError> {
        self.snapshots.clear().await
    }

    /// Record which role the user is acting as.
    pub async fn set_user_role(&self, role: UserRole) -> Result<(), AppError> {
        self.snapshots
            .update(move |snapshot| snapshot.user_role = role)
            .await
    }
}

/// Replace the entry with the same id, or put `item` first if absent.
fn replace_or_prepend<T>(items: &mut Vec<T>, item: T, id: impl Fn(&T) -> &str) {
    match items.iter().position(|existing| id(existing) == id(&item)) {
        Some(index) => items[index] = item,
        None => items.insert(0, item),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_or_prepend() {
        let mut items = vec![("a", 1), ("b", 2)];

        replace_or_prepend(&mut items, ("b", 20), |i| i.0);
        assert_eq!(items, vec![("a", 1), ("b", 20)]);

        replace_or_prepend(&mut items, ("c", 3), |i| i.0);
        assert_eq!(items, vec![("c", 3), ("a", 1), ("b", 20)]);
    }
}
