//! Coalescing of rapid slider and color-picker edits.
//!
//! Dragging an opacity slider produces an edit every frame. Only the last
//! value of a burst reaches the history, once no newer edit with the same
//! [`CoalesceKey`] arrived for the debounce window.

use bevy::prelude::*;
use std::time::Duration;

use crate::constants::DEFAULT_DEBOUNCE_MS;
use crate::document::{CoalesceKey, EditAction};

#[derive(Debug, Clone)]
struct Pending {
    key: CoalesceKey,
    action: EditAction,
    updated_at: Duration,
}

#[derive(Resource, Debug)]
pub struct ActionDebouncer {
    window: Duration,
    pending: Option<Pending>,
}

impl Default for ActionDebouncer {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_DEBOUNCE_MS))
    }
}

impl ActionDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn set_window(&mut self, window: Duration) {
        self.window = window;
    }

    /// Offer an edit at time `now`.
    ///
    /// Returns the edits that are ready to dispatch, in order. An edit with
    /// the pending key replaces it and nothing is returned. Any other edit
    /// releases the pending one first.
    pub fn offer(&mut self, action: EditAction, now: Duration) -> Vec<EditAction> {
        let Some(key) = action.coalesce_key() else {
            let mut ready: Vec<_> = self.flush().into_iter().collect();
            ready.push(action);
            return ready;
        };

        let released = match self.pending.take() {
            Some(pending) if pending.key != key => Some(pending.action),
            _ => None,
        };
        self.pending = Some(Pending {
            key,
            action,
            updated_at: now,
        });
        released.into_iter().collect()
    }

    /// Release the pending edit once the window has passed without updates
    pub fn poll(&mut self, now: Duration) -> Option<EditAction> {
        let settled = self
            .pending
            .as_ref()
            .is_some_and(|p| now.saturating_sub(p.updated_at) >= self.window);
        if settled { self.flush() } else { None }
    }

    /// Release the pending edit immediately
    pub fn flush(&mut self) -> Option<EditAction> {
        self.pending.take().map(|p| p.action)
    }

    /// The not-yet-dispatched edit for `key`, for widgets that display it
    pub fn pending_for(&self, key: CoalesceKey) -> Option<&EditAction> {
        self.pending
            .as_ref()
            .filter(|p| p.key == key)
            .map(|p| &p.action)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop the pending edit, e.g. when the document it targets is replaced
    pub fn discard(&mut self) {
        self.pending = None;
    }
}
