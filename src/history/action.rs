use crate::document::{EditAction, ViewAction};

/// Everything that can be dispatched to the [`HistoryEngine`](super::HistoryEngine)
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Revert the most recent recorded edit
    HistoryUndo,
    /// Replay the most recently undone edit
    HistoryRedo,
    /// Tracked document edit
    Edit(EditAction),
    /// Untracked selection change
    View(ViewAction),
}

impl From<EditAction> for Action {
    fn from(edit: EditAction) -> Self {
        Action::Edit(edit)
    }
}

impl From<ViewAction> for Action {
    fn from(view: ViewAction) -> Self {
        Action::View(view)
    }
}
