// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Sports event model.

use crate::time_utils::parse_epoch_seconds;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::{Validate, ValidationError};

/// An event, possibly nested under a parent event.
///
/// `sub_events` is containment for display, not ownership.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct Event {
    pub id: String,
    pub name: String,
    /// Start date (ISO 8601)
    #[serde(default)]
    pub date_start: String,
    /// End date (ISO 8601)
    #[serde(default)]
    pub date_end: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub parent_event_id: Option<String>,
    #[serde(default)]
    pub sub_events: Vec<Event>,
    /// Participant (player) ids
    #[serde(default)]
    pub participants: Vec<String>,
    /// Participating team ids
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub participant_count: u32,
    #[serde(default)]
    pub team_count: u32,
    #[serde(default)]
    pub sub_event_count: u32,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Input for creating an event.
#[derive(Debug, Clone, Serialize, Validate)]
#[validate(schema(function = "validate_date_range"))]
pub struct NewEvent {
    #[validate(length(min = 1, max = 120, message = "event name is required"))]
    pub name: String,
    #[validate(length(min = 1, message = "start date is required"))]
    pub date_start: String,
    #[validate(length(min = 1, message = "end date is required"))]
    pub date_end: String,
    #[validate(length(min = 1, message = "location is required"))]
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_event_id: Option<String>,
}

fn validate_date_range(event: &NewEvent) -> Result<(), ValidationError> {
    match (
        parse_epoch_seconds(&event.date_start),
        parse_epoch_seconds(&event.date_end),
    ) {
        (Some(start), Some(end)) if end < start => {
            let mut err = ValidationError::new("date_range");
            err.message = Some("end date is before start date".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_event(start: &str, end: &str) -> NewEvent {
        NewEvent {
            name: "Spring Cup".to_string(),
            date_start: start.to_string(),
            date_end: end.to_string(),
            location: "Field 3".to_string(),
            description: None,
            parent_event_id: None,
        }
    }

    #[test]
    fn test_end_before_start_rejected() {
        assert!(new_event("2026-05-01", "2026-05-02").validate().is_ok());
        assert!(new_event("2026-05-02", "2026-05-01").validate().is_err());
    }
}
