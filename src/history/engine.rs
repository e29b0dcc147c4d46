//! The interception layer between dispatched actions and the document.

use bevy::prelude::*;
use thiserror::Error;

use crate::document::{Document, DocumentError, EditAction, EditKind, EditorView};

use super::action::Action;
use super::log::ActionLog;
use super::registry::{Snapshot, revert_for};

/// One recorded edit
#[derive(Debug, Clone, PartialEq)]
pub struct UndoRedoAction {
    /// The forward edit as originally dispatched
    pub action: EditAction,
    /// Pre-edit state owned by this entry
    pub before: Option<Snapshot>,
    /// View state before the edit, when view restore is enabled
    pub view: Option<EditorView>,
}

/// What the engine is currently doing.
///
/// Tracking is suppressed while applying an undo or redo so the synthetic
/// document changes are never recorded themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Processing {
    #[default]
    Idle,
    ApplyingForward,
    ApplyingUndo,
    ApplyingRedo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Applied without touching the log
    Untracked,
    /// Applied and pushed onto the undo list
    Recorded,
    /// Undo or redo requested with an empty list
    Noop,
    Undone,
    Redone,
}

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("No snapshot recorded for {kind:?}")]
    MissingSnapshot { kind: EditKind },

    #[error("Snapshot of shape {found} cannot invert {kind:?}")]
    SnapshotMismatch { kind: EditKind, found: &'static str },

    #[error("Snapshot for {kind:?} has no target layer")]
    UntargetedCapture { kind: EditKind },

    #[error("Document no longer matches the recorded state before {kind:?}")]
    BaselineDiverged { kind: EditKind },

    #[error("History request while {state:?}")]
    Reentrant { state: Processing },
}

impl HistoryError {
    /// Faults in the revert registry itself rather than in the edit
    pub fn is_configuration_fault(&self) -> bool {
        matches!(
            self,
            HistoryError::MissingSnapshot { .. }
                | HistoryError::SnapshotMismatch { .. }
                | HistoryError::UntargetedCapture { .. }
        )
    }
}

/// Undo/redo engine owning the action log
#[derive(Resource, Debug, Default)]
pub struct HistoryEngine {
    log: ActionLog<UndoRedoAction>,
    processing: Processing,
    restore_view: bool,
}

impl HistoryEngine {
    pub fn new(limit: usize, restore_view: bool) -> Self {
        Self {
            log: ActionLog::with_limit(limit),
            processing: Processing::Idle,
            restore_view,
        }
    }

    /// Route one action through the history.
    ///
    /// On error the log is unchanged. Document changes are validated before
    /// they mutate anything, so the document is unchanged as well.
    pub fn dispatch(
        &mut self,
        doc: &mut Document,
        action: Action,
    ) -> Result<DispatchOutcome, HistoryError> {
        match action {
            Action::View(view) => {
                doc.apply_view(&view)?;
                Ok(DispatchOutcome::Untracked)
            }
            Action::Edit(edit) => match self.processing {
                Processing::Idle => self.record(doc, edit),
                Processing::ApplyingUndo | Processing::ApplyingRedo => {
                    doc.apply(&edit)?;
                    Ok(DispatchOutcome::Untracked)
                }
                state @ Processing::ApplyingForward => Err(HistoryError::Reentrant { state }),
            },
            Action::HistoryUndo => {
                self.ensure_idle()?;
                self.undo(doc)
            }
            Action::HistoryRedo => {
                self.ensure_idle()?;
                self.redo(doc)
            }
        }
    }

    fn ensure_idle(&self) -> Result<(), HistoryError> {
        match self.processing {
            Processing::Idle => Ok(()),
            state => Err(HistoryError::Reentrant { state }),
        }
    }

    fn capture(&self, doc: &Document, action: &EditAction) -> Result<Option<Snapshot>, HistoryError> {
        let revert = revert_for(action.kind());
        revert.snapshot.map(|capture| capture(doc, action)).transpose()
    }

    fn record(&mut self, doc: &mut Document, action: EditAction) -> Result<DispatchOutcome, HistoryError> {
        let before = self.capture(doc, &action).inspect_err(|e| {
            warn!("Not recording {}: snapshot failed: {}", action.description(), e);
        })?;
        let view = self.restore_view.then(|| doc.view_state());

        self.processing = Processing::ApplyingForward;
        let result = doc.apply(&action);
        self.processing = Processing::Idle;
        result?;

        debug!("Recorded {}", action.description());
        self.log.push(UndoRedoAction {
            action,
            before,
            view,
        });
        Ok(DispatchOutcome::Recorded)
    }

    fn undo(&mut self, doc: &mut Document) -> Result<DispatchOutcome, HistoryError> {
        let Some(entry) = self.log.peek_undo() else {
            return Ok(DispatchOutcome::Noop);
        };

        let invert = revert_for(entry.action.kind()).invert;
        let inverse = invert(&entry.action, entry.before.as_ref()).inspect_err(|e| {
            error!("Cannot undo {}: {}", entry.action.description(), e);
        })?;
        let view = entry.view.clone();
        let description = entry.action.description();

        self.processing = Processing::ApplyingUndo;
        let result = doc.apply_inverse(&inverse);
        if result.is_ok()
            && let Some(view) = view
        {
            doc.set_view_state(view);
        }
        self.processing = Processing::Idle;
        result?;

        self.log.pop_undo();
        debug!("Undid {}", description);
        Ok(DispatchOutcome::Undone)
    }

    fn redo(&mut self, doc: &mut Document) -> Result<DispatchOutcome, HistoryError> {
        let Some(entry) = self.log.peek_redo() else {
            return Ok(DispatchOutcome::Noop);
        };
        let action = entry.action.clone();

        // The undo that moved this entry left the document at its baseline.
        // Anything else means the document was written outside dispatch.
        if let Some(before) = &entry.before {
            let current = self.capture(doc, &action)?;
            if current.as_ref() != Some(before) {
                warn!("Refusing to redo {}: document changed since undo", action.description());
                return Err(HistoryError::BaselineDiverged { kind: action.kind() });
            }
        }

        let description = action.description();
        self.processing = Processing::ApplyingRedo;
        let result = self.dispatch(doc, Action::Edit(action));
        self.processing = Processing::Idle;
        result?;

        self.log.pop_redo();
        debug!("Redid {}", description);
        Ok(DispatchOutcome::Redone)
    }

    /// Drop all history (project replaced or closed)
    pub fn clear(&mut self) {
        self.log.clear();
    }

    pub fn is_pristine(&self) -> bool {
        self.log.is_pristine()
    }

    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    pub fn undo_len(&self) -> usize {
        self.log.undo_len()
    }

    pub fn redo_len(&self) -> usize {
        self.log.redo_len()
    }

    pub fn processing(&self) -> Processing {
        self.processing
    }

    pub fn log(&self) -> &ActionLog<UndoRedoAction> {
        &self.log
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.log.set_limit(limit);
    }

    pub fn set_restore_view(&mut self, restore_view: bool) {
        self.restore_view = restore_view;
    }

    /// Label of the edit the next undo reverts
    pub fn undo_description(&self) -> Option<&'static str> {
        self.log.peek_undo().map(|e| e.action.description())
    }

    /// Label of the edit the next redo replays
    pub fn redo_description(&self) -> Option<&'static str> {
        self.log.peek_redo().map(|e| e.action.description())
    }
}
