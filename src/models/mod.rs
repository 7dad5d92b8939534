// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod event;
pub mod navigation;
pub mod registration;
pub mod snapshot;
pub mod team;
pub mod user;

pub use event::{Event, NewEvent};
pub use navigation::{NavigationStack, NavigationStackItem, ScreenKind};
pub use registration::{Registration, RegistrationStatus, RegistrationType};
pub use snapshot::{AppSnapshot, UserRole};
pub use team::{NewTeam, Player, Team};
pub use user::{AuthResult, Credentials, Session, User};
