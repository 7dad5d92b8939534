// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Navigation stack model.
//!
//! The stack records the logical places the user has visited, rooted at the
//! dashboard. It is kept alongside the platform's native navigation history
//! and reconciled with it when a screen regains focus.
//!
//! All operations here are pure; persistence and change notification live in
//! [`crate::services::NavigationManager`].

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Route of the dashboard (tab root) screen.
pub const DASHBOARD_ROUTE: &str = "/(tabs)";

/// Kind of screen a stack item represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub enum ScreenKind {
    Dashboard,
    Events,
    Event,
    Teams,
    Team,
    Players,
    Registrations,
}

/// One visited place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "app/src/generated/")
)]
pub struct NavigationStackItem {
    #[serde(rename = "type")]
    pub kind: ScreenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub route: String,
}

impl NavigationStackItem {
    pub fn new(kind: ScreenKind, name: impl Into<String>, route: impl Into<String>) -> Self {
        Self {
            kind,
            id: None,
            name: name.into(),
            route: route.into(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// The root item every stack starts with.
    pub fn dashboard() -> Self {
        Self::new(ScreenKind::Dashboard, "Dashboard", DASHBOARD_ROUTE)
    }

    /// Whether `other` names the same place for push de-duplication.
    ///
    /// Items match on `(kind, id)`. Items without an id never match unless
    /// `dedupe_idless` is set, in which case two id-less items of the same
    /// kind do.
    pub fn same_place(&self, other: &Self, dedupe_idless: bool) -> bool {
        if self.kind != other.kind {
            return false;
        }
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => dedupe_idless,
            _ => false,
        }
    }

    /// Whether this item is the screen the host UI reports as focused.
    fn is_screen(&self, route: &str, screen_id: Option<&str>) -> bool {
        if self.route == route {
            return true;
        }
        match (screen_id, self.id.as_deref()) {
            (Some(screen_id), Some(id)) => id == screen_id && self.route.contains(screen_id),
            _ => false,
        }
    }
}

/// Root-anchored ordered stack. Never empty; the first item is the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationStack {
    items: Vec<NavigationStackItem>,
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self {
            items: vec![NavigationStackItem::dashboard()],
        }
    }
}

impl NavigationStack {
    /// Build a stack from persisted items, restoring the root if missing.
    pub fn from_items(mut items: Vec<NavigationStackItem>) -> Self {
        if items.first().map(|i| i.kind) != Some(ScreenKind::Dashboard) {
            items.insert(0, NavigationStackItem::dashboard());
        }
        Self { items }
    }

    pub fn items(&self) -> &[NavigationStackItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<NavigationStackItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_at_root(&self) -> bool {
        self.items.len() <= 1
    }

    /// Push `item`, or truncate back to an existing entry for the same place.
    ///
    /// Returns the items discarded by truncation (empty when appending).
    pub fn push(
        &mut self,
        item: NavigationStackItem,
        dedupe_idless: bool,
    ) -> Vec<NavigationStackItem> {
        match self
            .items
            .iter()
            .position(|existing| existing.same_place(&item, dedupe_idless))
        {
            Some(index) => self.truncate_to(index),
            None => {
                self.items.push(item);
                Vec::new()
            }
        }
    }

    /// Remove the top item. No-op at the root.
    pub fn pop(&mut self) -> Option<NavigationStackItem> {
        if self.is_at_root() {
            return None;
        }
        self.items.pop()
    }

    /// Remove up to `count` items, always keeping the root.
    ///
    /// Removed items are returned top-first.
    pub fn pop_multiple(&mut self, count: usize) -> Vec<NavigationStackItem> {
        let actual = count.min(self.items.len().saturating_sub(1));
        let keep = self.items.len() - actual;
        let mut removed = self.items.split_off(keep);
        removed.reverse();
        removed
    }

    /// Reset to the root, returning everything above it top-first.
    pub fn clear(&mut self) -> Vec<NavigationStackItem> {
        let removed = self.pop_multiple(self.items.len());
        // Re-seat the canonical root in case a stale one was persisted.
        self.items = vec![NavigationStackItem::dashboard()];
        removed
    }

    /// Keep items `0..=index`, returning the discarded tail top-first.
    pub fn truncate_to(&mut self, index: usize) -> Vec<NavigationStackItem> {
        if index + 1 >= self.items.len() {
            return Vec::new();
        }
        let mut removed = self.items.split_off(index + 1);
        removed.reverse();
        removed
    }

    /// Index of the top-most item matching the focused screen.
    pub fn find_screen(&self, route: &str, screen_id: Option<&str>) -> Option<usize> {
        self.items
            .iter()
            .rposition(|item| item.is_screen(route, screen_id))
    }

    /// Reconcile with the screen the host UI is showing.
    ///
    /// When the focused screen sits below the top of the stack the user went
    /// back natively; everything above it is discarded and returned. A match at
    /// the top, or no match, leaves the stack untouched.
    pub fn sync_to_screen(
        &mut self,
        route: &str,
        screen_id: Option<&str>,
    ) -> Option<Vec<NavigationStackItem>> {
        let index = self.find_screen(route, screen_id)?;
        if index + 1 == self.items.len() {
            return None;
        }
        Some(self.truncate_to(index))
    }

    pub fn current(&self) -> Option<&NavigationStackItem> {
        self.items.last()
    }

    pub fn parent(&self) -> Option<&NavigationStackItem> {
        self.items.len().checked_sub(2).map(|i| &self.items[i])
    }

    pub fn breadcrumbs(&self) -> String {
        self.items
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(" > ")
    }
}
