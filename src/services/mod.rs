// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod api;
pub mod navigation;
pub mod normalize;
pub mod session;
pub mod sync;
pub mod token;

pub use api::{ApiClient, AuthHeader};
pub use navigation::{CleanupHook, NavigationManager, StackListener, SubscriptionId};
pub use session::SessionManager;
pub use sync::DataSynchronizer;
pub use token::{decode_token_payload, encode_token_payload, is_token_expired, TokenPayload};
