// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data synchronizer tests against a fake remote service.

mod common;

use axum::extract::Path;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Duration;
use common::{create_test_state, local_token, sign_in, spawn_remote, test_user};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use teamsheet::db::{MemoryStore, SnapshotStore};
use teamsheet::error::{AppError, ErrorCategory};
use teamsheet::models::{
    AppSnapshot, NavigationStackItem, NewEvent, NewTeam, Player, RegistrationStatus,
    RegistrationType, ScreenKind, Session, UserRole,
};
use teamsheet::AppState;

/// Requests seen by the fake remote: `(route, Authorization header)`.
type RequestLog = Arc<Mutex<Vec<(String, Option<String>)>>>;

fn record(log: &RequestLog, route: &str, headers: &HeaderMap) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    log.lock().unwrap().push((route.to_string(), auth));
}

/// Fake remote speaking the service's mixed response dialects.
fn fake_remote(log: RequestLog) -> Router {
    let (l1, l2, l3, l4, l5, l6, l7, l8, l9) = (
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log.clone(),
        log,
    );

    Router::new()
        .route(
            "/events",
            get(move |headers: HeaderMap| async move {
                record(&l1, "GET /events", &headers);
                Json(json!({
                    "events": [
                        {
                            "id": 1,
                            "name": "Spring Cup",
                            "date_start": "2026-05-01",
                            "date_end": "2026-05-02",
                            "location": "Field 3",
                            "participants": ["p1", "p2"],
                            "sub_events": [{ "id": 11, "name": "U12 bracket" }]
                        },
                        {
                            "_id": "e2",
                            "title": "Fall Classic",
                            "dateStart": "2026-10-01",
                            "dateEnd": "2026-10-03",
                            "location": "Main Park",
                            "parentEventId": "1",
                            "participantCount": 40
                        }
                    ]
                }))
            })
            .post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&l2, "POST /events", &headers);
                Json(json!({ "event": {
                    "id": 101,
                    "name": body["name"],
                    "date_start": body["date_start"],
                    "date_end": body["date_end"],
                    "location": body["location"],
                    "parent_event_id": body["parent_event_id"]
                }}))
            }),
        )
        .route(
            "/events/{id}",
            get(move |Path(id): Path<String>, headers: HeaderMap| async move {
                record(&l3, "GET /events/{id}", &headers);
                Json(json!({ "id": id, "name": "Spring Cup (final)", "teams": ["t1"] }))
            }),
        )
        .route(
            "/teams",
            post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&l4, "POST /teams", &headers);
                Json(json!({
                    "id": "t9",
                    "name": body["name"],
                    "parentTeamId": body["parent_team_id"]
                }))
            }),
        )
        .route(
            "/users/{userId}/teams",
            get(move |Path(user_id): Path<String>, headers: HeaderMap| async move {
                record(&l5, &format!("GET /users/{}/teams", user_id), &headers);
                Json(json!({ "data": [
                    {
                        "team_id": "t1",
                        "name": "Hawks",
                        "members": [{ "id": user_id, "username": "alice" }]
                    },
                    { "id": "t2", "name": "Owls", "subTeams": [{ "id": "t3", "name": "Owlets" }] }
                ]}))
            }),
        )
        .route(
            "/teams/{id}",
            get(move |Path(id): Path<String>, headers: HeaderMap| async move {
                record(&l6, "GET /teams/{id}", &headers);
                Json(json!({ "team": { "id": id, "name": "Hawks (updated)" } }))
            }),
        )
        .route(
            "/registrations/events",
            post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&l7, "POST /registrations/events", &headers);
                assert!(body["player_id"].is_string());
                Json(json!({ "registration": { "id": "reg1" } }))
            }),
        )
        .route(
            "/registrations/teams",
            post(move |headers: HeaderMap, Json(body): Json<Value>| async move {
                record(&l8, "POST /registrations/teams", &headers);
                Json(json!({
                    "id": "reg2",
                    "team_id": body["team_id"],
                    "status": "approved"
                }))
            }),
        )
        .route(
            "/users/{userId}/registrations",
            get(move |Path(user_id): Path<String>, headers: HeaderMap| async move {
                record(&l9, &format!("GET /users/{}/registrations", user_id), &headers);
                Json(json!([
                    { "id": "r1", "eventId": "1", "status": "approved" },
                    { "id": "r2", "team_id": "t1", "status": "waitlisted" }
                ]))
            }),
        )
}

async fn remote_state() -> (AppState, MemoryStore, RequestLog) {
    let log: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let base_url = spawn_remote(fake_remote(log.clone())).await;
    let (state, store) = create_test_state(&base_url);
    (state, store, log)
}

async fn signed_in_state() -> (AppState, MemoryStore, RequestLog, String) {
    let (state, store, log) = remote_state().await;
    let token = local_token("u1", Duration::hours(1));
    sign_in(&state, test_user("u1", "alice"), &token).await;
    (state, store, log, token)
}

async fn snapshot(store: &MemoryStore) -> AppSnapshot {
    SnapshotStore::new(Arc::new(store.clone()))
        .load()
        .await
        .unwrap()
}

fn spring_cup() -> NewEvent {
    NewEvent {
        name: "Spring Cup".to_string(),
        date_start: "2026-05-01".to_string(),
        date_end: "2026-05-02".to_string(),
        location: "Field 3".to_string(),
        description: None,
        parent_event_id: None,
    }
}

// ─── Events ──────────────────────────────────────────────────

#[tokio::test]
async fn test_get_events_normalizes_and_replaces() {
    let (state, store, log, token) = signed_in_state().await;

    let events = state.sync.get_events().await.unwrap();
    assert_eq!(events.len(), 2);

    assert_eq!(events[0].id, "1");
    assert_eq!(events[0].participant_count, 2);
    assert_eq!(events[0].sub_event_count, 1);
    assert_eq!(events[0].sub_events[0].name, "U12 bracket");
    assert_eq!(events[0].team_count, 0);

    assert_eq!(events[1].id, "e2");
    assert_eq!(events[1].name, "Fall Classic");
    assert_eq!(events[1].date_start, "2026-10-01");
    assert_eq!(events[1].parent_event_id.as_deref(), Some("1"));
    assert_eq!(events[1].participant_count, 40);
    assert!(events[1].participants.is_empty());

    assert_eq!(snapshot(&store).await.events, events);
    assert_eq!(
        log.lock().unwrap()[0],
        ("GET /events".to_string(), Some(format!("Bearer {}", token)))
    );
}

#[tokio::test]
async fn test_get_events_anonymous_sends_no_auth() {
    let (state, _store, log) = remote_state().await;
    state.sync.get_events().await.unwrap();
    assert_eq!(log.lock().unwrap()[0].1, None);
}

#[tokio::test]
async fn test_create_event_prepends() {
    let (state, store, _log, _token) = signed_in_state().await;
    state.sync.get_events().await.unwrap();

    let mut sub_event = spring_cup();
    sub_event.name = "U14 bracket".to_string();
    sub_event.parent_event_id = Some("1".to_string());
    let created = state.sync.create_event(&sub_event).await.unwrap();

    assert_eq!(created.id, "101");
    assert_eq!(created.parent_event_id.as_deref(), Some("1"));
    assert_eq!(created.participant_count, 0);
    assert!(created.sub_events.is_empty());

    let events = snapshot(&store).await.events;
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], created);
}

#[tokio::test]
async fn test_create_event_rejects_bad_dates_before_io() {
    let (state, _store, log, _token) = signed_in_state().await;
    let mut event = spring_cup();
    event.date_end = "2026-04-01".to_string();

    let err = state.sync.create_event(&event).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_event_details_replace_or_prepend() {
    let (state, store, _log, _token) = signed_in_state().await;
    state.sync.get_events().await.unwrap();

    let event = state.sync.get_event_details("1").await.unwrap();
    assert_eq!(event.name, "Spring Cup (final)");
    assert_eq!(event.team_count, 1);

    let snap = snapshot(&store).await;
    assert_eq!(snap.current_event.as_ref(), Some(&event));
    assert_eq!(snap.events.len(), 2);
    assert_eq!(snap.events[0], event);

    state.sync.get_event_details("e77").await.unwrap();
    let snap = snapshot(&store).await;
    assert_eq!(snap.events.len(), 3);
    assert_eq!(snap.events[0].id, "e77");
}

// ─── Teams ───────────────────────────────────────────────────

#[tokio::test]
async fn test_get_teams_uses_signed_in_user() {
    let (state, store, log, _token) = signed_in_state().await;

    let teams = state.sync.get_teams().await.unwrap();
    assert_eq!(teams.len(), 2);
    assert_eq!(teams[0].id, "t1");
    assert_eq!(teams[0].member_count, 1);
    assert_eq!(teams[0].members[0].id, "u1");
    assert_eq!(teams[1].sub_team_count, 1);

    assert_eq!(log.lock().unwrap()[0].0, "GET /users/u1/teams");
    assert_eq!(snapshot(&store).await.teams, teams);
}

#[tokio::test]
async fn test_create_team_and_details() {
    let (state, store, _log, _token) = signed_in_state().await;

    let mut sub_team = NewTeam::named("Hawklets");
    sub_team.parent_team_id = Some("t1".to_string());
    let created = state.sync.create_team(&sub_team).await.unwrap();
    assert_eq!(created.id, "t9");
    assert_eq!(created.parent_team_id.as_deref(), Some("t1"));

    let team = state.sync.get_team_details("t9").await.unwrap();
    assert_eq!(team.name, "Hawks (updated)");

    let snap = snapshot(&store).await;
    assert_eq!(snap.teams.len(), 1);
    assert_eq!(snap.current_team, Some(team));
}

// ─── Registrations ───────────────────────────────────────────

#[tokio::test]
async fn test_register_for_event_defaults_to_pending() {
    let (state, store, _log, _token) = signed_in_state().await;

    let registration = state.sync.register_for_event("1").await.unwrap();
    assert_eq!(registration.kind, RegistrationType::Event);
    assert_eq!(registration.status, RegistrationStatus::Pending);
    assert_eq!(registration.event_id.as_deref(), Some("1"));
    assert_eq!(registration.team_id, None);
    assert_eq!(registration.player_id.as_deref(), Some("u1"));

    let joined = state.sync.join_team("t1").await.unwrap();
    assert_eq!(joined.kind, RegistrationType::Team);
    assert_eq!(joined.status, RegistrationStatus::Approved);
    assert_eq!(joined.target_id(), Some("t1"));

    let snap = snapshot(&store).await;
    assert_eq!(snap.registrations, vec![joined, registration]);
}

#[tokio::test]
async fn test_get_registrations_infers_type() {
    let (state, _store, log, _token) = signed_in_state().await;

    let registrations = state.sync.get_registrations().await.unwrap();
    assert_eq!(registrations[0].kind, RegistrationType::Event);
    assert_eq!(registrations[0].status, RegistrationStatus::Approved);
    assert_eq!(registrations[1].kind, RegistrationType::Team);
    assert_eq!(registrations[1].status, RegistrationStatus::Pending);

    assert_eq!(log.lock().unwrap()[0].0, "GET /users/u1/registrations");
}

// ─── Failures ────────────────────────────────────────────────

#[tokio::test]
async fn test_authenticated_ops_fail_before_io() {
    let (state, _store, log) = remote_state().await;

    let err = state.sync.create_event(&spring_cup()).await.unwrap_err();
    assert!(matches!(err, AppError::NotAuthenticated));
    assert!(matches!(
        state.sync.create_team(&NewTeam::named("Hawks")).await,
        Err(AppError::NotAuthenticated)
    ));
    assert!(matches!(
        state.sync.get_teams().await,
        Err(AppError::NotAuthenticated)
    ));
    assert!(matches!(
        state.sync.register_for_event("1").await,
        Err(AppError::NotAuthenticated)
    ));
    assert!(matches!(
        state.sync.join_team("t1").await,
        Err(AppError::NotAuthenticated)
    ));
    assert!(matches!(
        state.sync.get_registrations().await,
        Err(AppError::NotAuthenticated)
    ));

    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_http_failure_propagates_without_touching_snapshot() {
    let router = Router::new().route(
        "/events",
        get(|| async {
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "error": "down for maintenance" })),
            )
        }),
    );
    let (state, store) = create_test_state(&spawn_remote(router).await);
    SnapshotStore::new(Arc::new(store.clone()))
        .update(|snap| snap.user_role = UserRole::Organizer)
        .await
        .unwrap();

    let err = state.sync.get_events().await.unwrap_err();
    match &err {
        AppError::Http { status, reason } => {
            assert_eq!(*status, 503);
            assert_eq!(reason, "down for maintenance");
        }
        other => panic!("expected HTTP error, got {:?}", other),
    }
    assert_eq!(err.user_message().title, "Server error");
    assert_eq!(snapshot(&store).await.user_role, UserRole::Organizer);
}

#[tokio::test]
async fn test_unreachable_remote_is_connection_error() {
    let (state, _store) = common::create_offline_state();
    let err = state.sync.get_events().await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Connection);
}

// ─── Local state ─────────────────────────────────────────────

#[tokio::test]
async fn test_clear_all_data_resets_snapshot() {
    let (state, store, _log, token) = signed_in_state().await;
    state.sync.get_events().await.unwrap();
    state.sync.get_teams().await.unwrap();
    state.sync.get_registrations().await.unwrap();
    SnapshotStore::new(Arc::new(store.clone()))
        .update(move |snap| {
            snap.auth = Session::authenticated(test_user("u1", "alice"), token);
            snap.players.push(Player {
                id: "p1".to_string(),
                username: "pat".to_string(),
                email: None,
                team_ids: vec!["t1".to_string()],
            });
        })
        .await
        .unwrap();
    state
        .navigation
        .push(NavigationStackItem::new(ScreenKind::Teams, "Teams", "/teams"))
        .await
        .unwrap();
    state
        .navigation
        .push(NavigationStackItem::new(ScreenKind::Team, "Hawks", "/team/t1").with_id("t1"))
        .await
        .unwrap();

    let before = snapshot(&store).await;
    assert!(!before.events.is_empty());
    assert!(!before.teams.is_empty());
    assert!(!before.registrations.is_empty());
    assert!(before.auth.is_authenticated);
    assert_eq!(before.navigation_stack.len(), 3);

    state.sync.clear_all_data().await.unwrap();

    let after = snapshot(&store).await;
    assert!(after.events.is_empty());
    assert!(after.teams.is_empty());
    assert!(after.players.is_empty());
    assert!(after.registrations.is_empty());
    assert!(!after.auth.is_authenticated);
    assert_eq!(after.navigation_stack, vec![NavigationStackItem::dashboard()]);
}

#[tokio::test]
async fn test_set_user_role() {
    let (state, store, _log) = remote_state().await;
    state.sync.set_user_role(UserRole::Organizer).await.unwrap();
    assert_eq!(snapshot(&store).await.user_role, UserRole::Organizer);
}
