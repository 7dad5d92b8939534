// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Tolerant decoding of remote responses into canonical models.
//!
//! The remote service is inconsistent: fields arrive as either snake_case or
//! camelCase, single objects may or may not be wrapped in an envelope
//! (`{"event": {...}}`), lists may be bare arrays or `{"events": [...]}` /
//! `{"data": [...]}`, and ids may be numbers. Each entity type has one
//! normalization function here; nothing outside this module looks at raw
//! response shapes.

use crate::error::AppError;
use crate::models::{
    AuthResult, Event, Player, Registration, RegistrationStatus, RegistrationType, Team, User,
};
use serde_json::Value;

// ─── Shape helpers ───────────────────────────────────────────

/// Unwrap `{key: {...}}` or `{data: {...}}`, otherwise return the value as-is.
pub fn unwrap_object<'a>(value: &'a Value, key: &str) -> &'a Value {
    for wrapper in [key, "data"] {
        if let Some(inner) = value.get(wrapper).filter(|v| v.is_object()) {
            return inner;
        }
    }
    value
}

/// Find the list in a bare array, `{key: [...]}` or `{data: [...]}`.
pub fn unwrap_list<'a>(value: &'a Value, key: &str) -> Result<&'a [Value], AppError> {
    if let Some(items) = value.as_array() {
        return Ok(items);
    }
    [key, "data"]
        .iter()
        .find_map(|wrapper| value.get(*wrapper).and_then(Value::as_array))
        .map(Vec::as_slice)
        .ok_or_else(|| AppError::Decode(format!("expected a list of {}", key)))
}

/// First present, non-null field among `names`.
fn field<'a>(obj: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| obj.get(*name))
        .find(|v| !v.is_null())
}

/// String field, accepting numbers (ids are sometimes numeric).
fn string_field(obj: &Value, names: &[&str]) -> Option<String> {
    field(obj, names).and_then(|v| match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn required_string(obj: &Value, names: &[&str], what: &str) -> Result<String, AppError> {
    string_field(obj, names)
        .ok_or_else(|| AppError::Decode(format!("{} is missing {}", what, names[0])))
}

/// Count field, saturating at `u32::MAX` rather than wrapping.
fn count_field(obj: &Value, names: &[&str], fallback: usize) -> u32 {
    field(obj, names)
        .and_then(Value::as_u64)
        .map(|n| u32::try_from(n).unwrap_or(u32::MAX))
        .unwrap_or_else(|| u32::try_from(fallback).unwrap_or(u32::MAX))
}

/// Ids from a list of ids or a list of objects carrying `id`.
fn id_list(obj: &Value, names: &[&str]) -> Vec<String> {
    field(obj, names)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    Value::Object(_) => string_field(item, &["id", "_id"]),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Nested entity list; malformed entries are skipped with a warning.
fn nested_list<T>(
    obj: &Value,
    names: &[&str],
    normalize: fn(&Value) -> Result<T, AppError>,
) -> Vec<T> {
    field(obj, names)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| match normalize(item) {
                    Ok(v) => Some(v),
                    Err(e) => {
                        tracing::warn!(field = names[0], error = %e, "Skipping malformed entry");
                        None
                    }
                })
                .collect()
        })
        .unwrap_or_default()
}

fn normalize_all<T>(
    value: &Value,
    key: &str,
    normalize: fn(&Value) -> Result<T, AppError>,
) -> Result<Vec<T>, AppError> {
    unwrap_list(value, key)?.iter().map(normalize).collect()
}

// ─── Events ──────────────────────────────────────────────────

pub fn normalize_event(value: &Value) -> Result<Event, AppError> {
    let obj = unwrap_object(value, "event");

    let sub_events = nested_list(obj, &["sub_events", "subEvents"], normalize_event);
    let participants = id_list(obj, &["participants", "players"]);
    let teams = id_list(obj, &["teams", "team_ids", "teamIds"]);

    Ok(Event {
        id: required_string(obj, &["id", "_id", "event_id", "eventId"], "event")?,
        name: required_string(obj, &["name", "title"], "event")?,
        date_start: string_field(obj, &["date_start", "dateStart", "start_date", "startDate"])
            .unwrap_or_default(),
        date_end: string_field(obj, &["date_end", "dateEnd", "end_date", "endDate"])
            .unwrap_or_default(),
        location: string_field(obj, &["location"]).unwrap_or_default(),
        description: string_field(obj, &["description"]),
        parent_event_id: string_field(obj, &["parent_event_id", "parentEventId", "parent_id"]),
        participant_count: count_field(
            obj,
            &["participant_count", "participantCount", "participants_count"],
            participants.len(),
        ),
        team_count: count_field(obj, &["team_count", "teamCount", "teams_count"], teams.len()),
        sub_event_count: count_field(
            obj,
            &["sub_event_count", "subEventCount", "sub_events_count"],
            sub_events.len(),
        ),
        sub_events,
        participants,
        teams,
        created_by: string_field(obj, &["created_by", "createdBy", "organizer_id"]),
        created_at: string_field(obj, &["created_at", "createdAt"]),
    })
}

pub fn normalize_events(value: &Value) -> Result<Vec<Event>, AppError> {
    normalize_all(value, "events", normalize_event)
}

// ─── Teams & Players ─────────────────────────────────────────

pub fn normalize_player(value: &Value) -> Result<Player, AppError> {
    let obj = unwrap_object(value, "player");
    Ok(Player {
        id: required_string(obj, &["id", "_id", "player_id", "playerId", "user_id"], "player")?,
        username: string_field(obj, &["username", "name"]).unwrap_or_default(),
        email: string_field(obj, &["email"]),
        team_ids: id_list(obj, &["team_ids", "teamIds", "teams"]),
    })
}

pub fn normalize_team(value: &Value) -> Result<Team, AppError> {
    let obj = unwrap_object(value, "team");

    let sub_teams = nested_list(obj, &["sub_teams", "subTeams"], normalize_team);
    let members = nested_list(obj, &["members", "players"], normalize_player);

    Ok(Team {
        id: required_string(obj, &["id", "_id", "team_id", "teamId"], "team")?,
        name: required_string(obj, &["name"], "team")?,
        description: string_field(obj, &["description"]),
        parent_team_id: string_field(obj, &["parent_team_id", "parentTeamId", "parent_id"]),
        member_count: count_field(
            obj,
            &["member_count", "memberCount", "members_count"],
            members.len(),
        ),
        sub_team_count: count_field(
            obj,
            &["sub_team_count", "subTeamCount", "sub_teams_count"],
            sub_teams.len(),
        ),
        sub_teams,
        members,
        created_by: string_field(obj, &["created_by", "createdBy", "owner_id"]),
        created_at: string_field(obj, &["created_at", "createdAt"]),
    })
}

pub fn normalize_teams(value: &Value) -> Result<Vec<Team>, AppError> {
    normalize_all(value, "teams", normalize_team)
}

// ─── Registrations ───────────────────────────────────────────

/// Normalize one registration.
///
/// `kind` wins over anything in the payload when given; otherwise the
/// payload's `type` is used, then inferred from which target id is present.
pub fn normalize_registration_as(
    value: &Value,
    kind: Option<RegistrationType>,
) -> Result<Registration, AppError> {
    let obj = unwrap_object(value, "registration");

    let mut event_id = string_field(obj, &["event_id", "eventId"]);
    let mut team_id = string_field(obj, &["team_id", "teamId"]);

    let declared = string_field(obj, &["type", "registration_type", "registrationType"])
        .and_then(|t| match t.to_ascii_lowercase().as_str() {
            "event" => Some(RegistrationType::Event),
            "team" => Some(RegistrationType::Team),
            _ => None,
        });

    let kind = kind
        .or(declared)
        .or_else(|| event_id.as_ref().map(|_| RegistrationType::Event))
        .or_else(|| team_id.as_ref().map(|_| RegistrationType::Team))
        .ok_or_else(|| AppError::Decode("registration has neither event nor team".to_string()))?;

    match kind {
        RegistrationType::Event => team_id = None,
        RegistrationType::Team => event_id = None,
    }

    let status = match string_field(obj, &["status"]) {
        None => RegistrationStatus::Pending,
        Some(s) => RegistrationStatus::parse(&s).unwrap_or_else(|| {
            tracing::warn!(status = %s, "Unknown registration status, treating as pending");
            RegistrationStatus::Pending
        }),
    };

    Ok(Registration {
        id: required_string(obj, &["id", "_id", "registration_id"], "registration")?,
        kind,
        event_id,
        team_id,
        player_id: string_field(obj, &["player_id", "playerId", "user_id", "userId"]),
        status,
        created_at: string_field(obj, &["created_at", "createdAt"]),
    })
}

pub fn normalize_registration(value: &Value) -> Result<Registration, AppError> {
    normalize_registration_as(value, None)
}

pub fn normalize_registrations(value: &Value) -> Result<Vec<Registration>, AppError> {
    normalize_all(value, "registrations", normalize_registration)
}

// ─── Auth ────────────────────────────────────────────────────

/// Normalize a login/registration response.
///
/// The user record may be enveloped (`{"user": {...}, "token": ...}`) or
/// flattened alongside the token. Fields the remote omits are taken from
/// `fallback`.
pub fn normalize_auth_response(value: &Value, fallback: &User) -> Result<AuthResult, AppError> {
    let root = unwrap_object(value, "session");
    let token_names = ["token", "access_token", "accessToken"];

    let token = string_field(root, &token_names)
        .or_else(|| root.get("data").and_then(|d| string_field(d, &token_names)))
        .ok_or_else(|| AppError::Decode("auth response has no token".to_string()))?;

    let user_obj = root
        .get("user")
        .filter(|u| u.is_object())
        .unwrap_or(root);

    let user = User {
        id: string_field(user_obj, &["id", "_id", "user_id", "userId"])
            .unwrap_or_else(|| fallback.id.clone()),
        username: string_field(user_obj, &["username"]).unwrap_or_else(|| fallback.username.clone()),
        email: string_field(user_obj, &["email"]).or_else(|| fallback.email.clone()),
        created_at: string_field(user_obj, &["created_at", "createdAt"])
            .unwrap_or_else(|| fallback.created_at.clone()),
    };

    Ok(AuthResult { user, token })
}

/// Normalize a profile response into a user.
pub fn normalize_user(value: &Value) -> Result<User, AppError> {
    let obj = unwrap_object(value, "user");
    Ok(User {
        id: required_string(obj, &["id", "_id", "user_id", "userId"], "user")?,
        username: required_string(obj, &["username"], "user")?,
        email: string_field(obj, &["email"]),
        created_at: string_field(obj, &["created_at", "createdAt"]).unwrap_or_default(),
    })
}
