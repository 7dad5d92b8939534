// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted navigation stack with change notification.
//!
//! The stack lives inside the application snapshot so it survives restarts.
//! Each mutation is a read-modify-write of the snapshot followed by
//! synchronous delivery to listeners in registration order, and a publish on
//! the watch channel handed out by [`NavigationManager::watch`].
//!
//! Listeners must not mutate the stack from inside their callback.

use crate::db::SnapshotStore;
use crate::error::AppError;
use crate::models::{NavigationStack, NavigationStackItem};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;

/// Callback receiving the full stack after each change.
pub type StackListener = Arc<dyn Fn(&[NavigationStackItem]) + Send + Sync>;

/// Hook releasing data tied to a screen that left the stack.
pub type CleanupHook = Arc<dyn Fn(&NavigationStackItem) -> anyhow::Result<()> + Send + Sync>;

/// Handle for removing a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Owns the navigation stack and its observers.
pub struct NavigationManager {
    snapshots: SnapshotStore,
    dedupe_idless: bool,
    listeners: Mutex<Vec<(SubscriptionId, StackListener)>>,
    next_id: AtomicU64,
    /// Bumped under the listener lock on every notification.
    generation: AtomicU64,
    cleanup: CleanupHook,
    published: watch::Sender<Vec<NavigationStackItem>>,
}

impl NavigationManager {
    pub fn new(snapshots: SnapshotStore, dedupe_idless: bool) -> Self {
        let (published, _) = watch::channel(NavigationStack::default().into_items());
        Self {
            snapshots,
            dedupe_idless,
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            generation: AtomicU64::new(0),
            cleanup: Arc::new(|_| Ok(())),
            published,
        }
    }

    /// Install the hook run for every item removed from the stack.
    pub fn with_cleanup(mut self, hook: CleanupHook) -> Self {
        self.cleanup = hook;
        self
    }

    // ─── Reads ───────────────────────────────────────────────────────────────

    /// Current stack. Falls back to `[dashboard]` if the snapshot is unreadable.
    pub async fn load_stack(&self) -> Vec<NavigationStackItem> {
        self.load().await.into_items()
    }

    async fn load(&self) -> NavigationStack {
        match self.snapshots.load().await {
            Ok(snapshot) => snapshot.stack(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load navigation stack, using root");
                NavigationStack::default()
            }
        }
    }

    pub async fn current_item(&self) -> Option<NavigationStackItem> {
        self.load().await.current().cloned()
    }

    pub async fn parent_item(&self) -> Option<NavigationStackItem> {
        self.load().await.parent().cloned()
    }

    /// Item names joined with `" > "`.
    pub async fn breadcrumbs(&self) -> String {
        self.load().await.breadcrumbs()
    }

    // ─── Mutations ───────────────────────────────────────────────────────────

    /// Push a place, or truncate back to it if it is already on the stack.
    pub async fn push(
        &self,
        item: NavigationStackItem,
    ) -> Result<Vec<NavigationStackItem>, AppError> {
        let dedupe = self.dedupe_idless;
        tracing::debug!(kind = ?item.kind, id = ?item.id, route = %item.route, "Navigation push");
        self.mutate(move |stack| Some(stack.push(item, dedupe)))
            .await
    }

    /// Drop the top item. No-op at the root.
    pub async fn pop(&self) -> Result<Vec<NavigationStackItem>, AppError> {
        self.mutate(|stack| stack.pop().map(|item| vec![item]))
            .await
    }

    /// Drop up to `count` items, never the root.
    pub async fn pop_multiple(
        &self,
        count: usize,
    ) -> Result<Vec<NavigationStackItem>, AppError> {
        self.mutate(move |stack| {
            if stack.is_at_root() || count == 0 {
                None
            } else {
                Some(stack.pop_multiple(count))
            }
        })
        .await
    }

    /// Reset to `[dashboard]`.
    pub async fn clear(&self) -> Result<Vec<NavigationStackItem>, AppError> {
        self.mutate(|stack| Some(stack.clear())).await
    }

    /// Reconcile with the screen the host UI just focused.
    ///
    /// Called when a screen regains focus, which covers native back gestures
    /// that bypass [`push`](Self::push)/[`pop`](Self::pop). If the focused
    /// screen is below the top of the stack, everything above it is dropped.
    pub async fn sync_to_current_screen(
        &self,
        current_route: &str,
        screen_id: Option<&str>,
    ) -> Result<(), AppError> {
        let route = current_route.to_string();
        let screen_id = screen_id.map(str::to_string);
        self.mutate(move |stack| {
            let removed = stack.sync_to_screen(&route, screen_id.as_deref())?;
            tracing::debug!(
                route = %route,
                removed = removed.len(),
                "Native back navigation detected, truncating stack"
            );
            Some(removed)
        })
        .await?;
        Ok(())
    }

    /// Apply `op` to the persisted stack.
    ///
    /// `op` returns the items it removed, or `None` for a no-op, in which case
    /// nothing is written and nobody is notified.
    async fn mutate(
        &self,
        op: impl FnOnce(&mut NavigationStack) -> Option<Vec<NavigationStackItem>> + Send,
    ) -> Result<Vec<NavigationStackItem>, AppError> {
        let mut snapshot = self.snapshots.load().await?;
        let mut stack = snapshot.stack();

        let Some(removed) = op(&mut stack) else {
            return Ok(stack.into_items());
        };

        for item in &removed {
            self.release(item);
        }

        snapshot.set_stack(stack.clone());
        self.snapshots.save(&snapshot).await?;

        let items = stack.into_items();
        self.notify(&items);
        Ok(items)
    }

    /// Run the cleanup hook; failures never block navigation.
    fn release(&self, item: &NavigationStackItem) {
        if let Err(e) = (self.cleanup)(item) {
            tracing::warn!(
                kind = ?item.kind,
                id = ?item.id,
                error = %e,
                "Cleanup for navigation item failed"
            );
        }
    }

    // ─── Observers ───────────────────────────────────────────────────────────

    /// Register a listener. It is called right away with the current stack.
    ///
    /// Registration happens only once a load completes with no mutation
    /// published in between, so the first delivery is never older than a
    /// later one.
    pub async fn subscribe(&self, listener: StackListener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));

        loop {
            let seen = self.generation.load(Ordering::Acquire);
            let items = self.load_stack().await;

            {
                let mut listeners = self.lock_listeners();
                if self.generation.load(Ordering::Acquire) != seen {
                    continue;
                }
                listeners.push((id, listener.clone()));
            }

            listener(&items);
            return id;
        }
    }

    /// Remove one registration. Returns whether it was registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.lock_listeners();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Receiver that always holds the latest stack.
    pub async fn watch(&self) -> watch::Receiver<Vec<NavigationStackItem>> {
        let items = self.load_stack().await;
        self.published.send_replace(items);
        self.published.subscribe()
    }

    fn notify(&self, items: &[NavigationStackItem]) {
        // Snapshot the registry so listeners run without the lock held.
        let listeners: Vec<StackListener> = {
            let registry = self.lock_listeners();
            self.generation.fetch_add(1, Ordering::AcqRel);
            registry.iter().map(|(_, listener)| listener.clone()).collect()
        };

        for listener in listeners {
            listener(items);
        }
        self.published.send_replace(items.to_vec());
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<(SubscriptionId, StackListener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
