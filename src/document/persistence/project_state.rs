//! New project system.

use bevy::prelude::*;

use crate::config::AppConfig;
use crate::document::Document;
use crate::history::{ActionDebouncer, HistoryEngine};

use super::messages::NewProjectRequest;
use super::resources::CurrentProjectFile;

pub fn new_project_system(
    mut events: MessageReader<NewProjectRequest>,
    config: Res<AppConfig>,
    mut document: ResMut<Document>,
    mut history: ResMut<HistoryEngine>,
    mut debouncer: ResMut<ActionDebouncer>,
    mut current_file: ResMut<CurrentProjectFile>,
) {
    for _ in events.read() {
        *document = Document::new(config.data.default_canvas.to_canvas());
        history.clear();
        debouncer.discard();
        current_file.path = None;

        info!(
            "Created new project ({}x{} tiles)",
            document.canvas.width, document.canvas.height
        );
    }
}
