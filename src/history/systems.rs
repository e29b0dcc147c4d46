//! Bevy systems feeding actions into the history engine.

use bevy::prelude::*;
use bevy_egui::EguiContexts;
use std::time::Duration;

use crate::config::AppConfig;
use crate::document::{Document, EditAction};

use super::action::Action;
use super::debounce::ActionDebouncer;
use super::engine::{DispatchOutcome, HistoryEngine};

/// Request to dispatch an action. The only write path into the document.
#[derive(Message, Debug, Clone)]
pub struct DispatchRequest(pub Action);

/// Edit routed through the debouncer before it is dispatched
#[derive(Message, Debug, Clone)]
pub struct DebouncedEdit(pub EditAction);

/// Apply the `history` section of the config
pub fn apply_history_settings(
    config: Res<AppConfig>,
    mut history: ResMut<HistoryEngine>,
    mut debouncer: ResMut<ActionDebouncer>,
) {
    let settings = &config.data.history;
    history.set_limit(settings.limit);
    history.set_restore_view(settings.restore_view);
    debouncer.set_window(Duration::from_millis(settings.debounce_ms));
    debug!(
        "History configured: limit {}, restore view {}, debounce {} ms",
        settings.limit, settings.restore_view, settings.debounce_ms
    );
}

/// Ctrl+Z undoes, Ctrl+Y or Ctrl+Shift+Z redoes
pub fn handle_history_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut contexts: EguiContexts,
    mut requests: MessageWriter<DispatchRequest>,
) {
    // Text fields keep their own undo
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    let shift = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);

    if ctrl && !shift && keyboard.just_pressed(KeyCode::KeyZ) {
        requests.write(DispatchRequest(Action::HistoryUndo));
    }

    let redo_pressed = (ctrl && keyboard.just_pressed(KeyCode::KeyY))
        || (ctrl && shift && keyboard.just_pressed(KeyCode::KeyZ));
    if redo_pressed {
        requests.write(DispatchRequest(Action::HistoryRedo));
    }
}

/// Drain debounced edits and dispatch requests into the engine, in order.
///
/// A pending debounced edit is released before any direct request so that an
/// undo issued right after a slider drag reverts that drag.
pub fn process_dispatches(
    time: Res<Time>,
    mut debounced: MessageReader<DebouncedEdit>,
    mut requests: MessageReader<DispatchRequest>,
    mut debouncer: ResMut<ActionDebouncer>,
    mut history: ResMut<HistoryEngine>,
    mut document: ResMut<Document>,
) {
    let now = time.elapsed();

    let mut queue: Vec<Action> = Vec::new();
    for DebouncedEdit(edit) in debounced.read() {
        queue.extend(debouncer.offer(edit.clone(), now).into_iter().map(Action::Edit));
    }

    let direct: Vec<Action> = requests.read().map(|r| r.0.clone()).collect();
    let released = if direct.is_empty() {
        debouncer.poll(now)
    } else {
        debouncer.flush()
    };
    queue.extend(released.map(Action::Edit));
    queue.extend(direct);

    for action in queue {
        let label = describe(&action);
        match history.dispatch(&mut document, action) {
            Ok(DispatchOutcome::Noop) => debug!("Nothing to {}", label),
            Ok(_) => {}
            Err(e) if e.is_configuration_fault() => error!("History fault on {}: {}", label, e),
            Err(e) => warn!("Failed to {}: {}", label, e),
        }
    }
}

fn describe(action: &Action) -> &'static str {
    match action {
        Action::HistoryUndo => "undo",
        Action::HistoryRedo => "redo",
        Action::Edit(edit) => edit.description(),
        Action::View(_) => "change selection",
    }
}
