//! Undo/redo history for document edits.
//!
//! Every change to the [`Document`](crate::document::Document) is dispatched
//! as an [`Action`] through the [`HistoryEngine`]. Tracked edits are
//! snapshotted before they apply and recorded in a bounded log; undo applies
//! the inverse built from the snapshot, redo replays the original edit.
//!
//! ## Usage
//!
//! - **Ctrl+Z**: Undo the last edit
//! - **Ctrl+Y** or **Ctrl+Shift+Z**: Redo the last undone edit
//!
//! ## Module Structure
//!
//! - [`action`] - the dispatchable [`Action`] type
//! - [`log`] - bounded undo/redo lists
//! - [`registry`] - snapshot and invert functions per edit kind
//! - [`engine`] - the [`HistoryEngine`] resource
//! - [`debounce`] - coalescing of slider and color edits
//! - [`systems`] - Bevy systems for shortcuts and dispatch

mod action;
mod debounce;
mod engine;
mod log;
mod registry;
mod systems;

#[cfg(test)]
mod tests;

pub use action::Action;
pub use debounce::ActionDebouncer;
pub use engine::{DispatchOutcome, HistoryEngine};
pub use systems::{DebouncedEdit, DispatchRequest};

// Engine internals, reachable for inspection and tests
#[allow(unused_imports)]
pub use engine::{HistoryError, Processing, UndoRedoAction};
#[allow(unused_imports)]
pub use log::ActionLog;
#[allow(unused_imports)]
pub use registry::{Revert, Snapshot, revert_for};

use bevy::prelude::*;

use crate::config::ConfigLoaded;

pub(crate) use crate::constants::HISTORY_LIMIT;

pub struct HistoryPlugin;

impl Plugin for HistoryPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(HistoryEngine::new(HISTORY_LIMIT, true))
            .init_resource::<ActionDebouncer>()
            .add_message::<DispatchRequest>()
            .add_message::<DebouncedEdit>()
            .add_systems(Startup, systems::apply_history_settings.after(ConfigLoaded))
            .add_systems(
                Update,
                (
                    systems::handle_history_shortcuts,
                    systems::process_dispatches,
                )
                    .chain(),
            );
    }
}
