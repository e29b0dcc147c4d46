//! Project save and TMX export systems and task polling.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;
use std::path::PathBuf;

use crate::config::AddRecentProjectRequest;
use crate::document::{Document, write_tmx};

use super::SavedProject;
use super::messages::{ExportTmxRequest, SaveProjectRequest};
use super::resources::{AsyncProjectOperation, CurrentProjectFile, ProjectIoError, SaveProjectTask};
use super::results::{SaveResult, WriteKind};

fn file_label(path: &std::path::Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project")
        .to_string()
}

/// Write already-encoded contents on the IO pool
fn spawn_write(commands: &mut Commands, path: PathBuf, kind: WriteKind, contents: Result<String, String>) {
    let task_pool = IoTaskPool::get();
    let task = task_pool.spawn(async move {
        let error = match contents {
            Ok(text) => std::fs::write(&path, text)
                .err()
                .map(|e| format!("Failed to write file: {}", e)),
            Err(e) => Some(e),
        };
        SaveResult { path, kind, error }
    });
    commands.spawn(SaveProjectTask(task));
}

/// Starts an async project save
pub fn save_project_system(
    mut commands: Commands,
    mut events: MessageReader<SaveProjectRequest>,
    document: Res<Document>,
    mut async_op: ResMut<AsyncProjectOperation>,
) {
    for event in events.read() {
        if async_op.is_busy() {
            warn!("Save operation already in progress");
            continue;
        }

        async_op.is_saving = true;
        async_op.operation_description = Some(format!("Saving {}...", file_label(&event.path)));

        let contents = SavedProject::from_document(&document).to_json();
        spawn_write(&mut commands, event.path.clone(), WriteKind::Project, contents);
    }
}

/// Starts an async TMX export
pub fn export_tmx_system(
    mut commands: Commands,
    mut events: MessageReader<ExportTmxRequest>,
    document: Res<Document>,
    mut async_op: ResMut<AsyncProjectOperation>,
) {
    for event in events.read() {
        if async_op.is_busy() {
            warn!("Save operation already in progress");
            continue;
        }

        async_op.is_saving = true;
        async_op.operation_description = Some(format!("Exporting {}...", file_label(&event.path)));

        let mut xml = String::new();
        let contents = write_tmx(&document, &mut xml)
            .map(|_| xml)
            .map_err(|e| format!("Failed to encode TMX: {}", e));
        spawn_write(&mut commands, event.path.clone(), WriteKind::TmxExport, contents);
    }
}

/// Polls save and export tasks and handles completion
pub fn poll_save_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut SaveProjectTask)>,
    mut async_op: ResMut<AsyncProjectOperation>,
    mut current_file: ResMut<CurrentProjectFile>,
    mut io_error: ResMut<ProjectIoError>,
    mut document: ResMut<Document>,
    mut config_events: MessageWriter<AddRecentProjectRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            async_op.is_saving = false;
            async_op.operation_description = None;

            match result.error {
                None => {
                    io_error.message = None;
                    match result.kind {
                        WriteKind::Project => {
                            info!("Project saved to {:?}", result.path);
                            if let Some(stem) = result.path.file_stem().and_then(|n| n.to_str()) {
                                document.name = stem.to_string();
                            }
                            current_file.path = Some(result.path.clone());
                            config_events.write(AddRecentProjectRequest { path: result.path });
                        }
                        WriteKind::TmxExport => {
                            info!("Map exported to {:?}", result.path);
                        }
                    }
                }
                Some(error) => {
                    error!("{}", error);
                    io_error.message = Some(error);
                }
            }

            commands.entity(entity).despawn();
        }
    }
}
