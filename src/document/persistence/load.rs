//! Project load system and task polling.

use bevy::prelude::*;
use bevy::tasks::IoTaskPool;
use futures_lite::future;

use crate::config::AddRecentProjectRequest;
use crate::document::Document;
use crate::history::{ActionDebouncer, HistoryEngine};

use super::SavedProject;
use super::messages::LoadProjectRequest;
use super::resources::{AsyncProjectOperation, CurrentProjectFile, LoadProjectTask, ProjectIoError};
use super::results::LoadResult;

/// Starts an async load operation (file I/O and parsing only)
pub fn load_project_system(
    mut commands: Commands,
    mut events: MessageReader<LoadProjectRequest>,
    mut async_op: ResMut<AsyncProjectOperation>,
) {
    for event in events.read() {
        if async_op.is_busy() {
            warn!("Load operation already in progress");
            continue;
        }

        let path = event.path.clone();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("project")
            .to_string();

        async_op.is_loading = true;
        async_op.operation_description = Some(format!("Loading {}...", name));

        let task_pool = IoTaskPool::get();
        let task = task_pool.spawn(async move {
            let json = match std::fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    return LoadResult {
                        path,
                        project: None,
                        error: Some(format!("Failed to read file: {}", e)),
                    };
                }
            };

            match SavedProject::from_json(&json) {
                Ok(project) => LoadResult {
                    path,
                    project: Some(project),
                    error: None,
                },
                Err(e) => LoadResult {
                    path,
                    project: None,
                    error: Some(e),
                },
            }
        });

        commands.spawn(LoadProjectTask(task));
    }
}

/// Polls load tasks and swaps in the loaded document
#[allow(clippy::too_many_arguments)]
pub fn poll_load_tasks(
    mut commands: Commands,
    mut tasks: Query<(Entity, &mut LoadProjectTask)>,
    mut async_op: ResMut<AsyncProjectOperation>,
    mut document: ResMut<Document>,
    mut history: ResMut<HistoryEngine>,
    mut debouncer: ResMut<ActionDebouncer>,
    mut current_file: ResMut<CurrentProjectFile>,
    mut io_error: ResMut<ProjectIoError>,
    mut config_events: MessageWriter<AddRecentProjectRequest>,
) {
    for (entity, mut task) in tasks.iter_mut() {
        if let Some(result) = future::block_on(future::poll_once(&mut task.0)) {
            async_op.is_loading = false;
            async_op.operation_description = None;

            if let Some(error) = result.error {
                error!("{}", error);
                io_error.message = Some(error);
                commands.entity(entity).despawn();
                continue;
            }

            let Some(project) = result.project else {
                commands.entity(entity).despawn();
                continue;
            };

            io_error.message = None;

            let mut loaded = project.document;
            loaded.view.active_layer = loaded.layers.last().map(|l| l.id);
            loaded.view.selected_tile = 1;
            *document = loaded;

            history.clear();
            debouncer.discard();

            current_file.path = Some(result.path.clone());
            config_events.write(AddRecentProjectRequest {
                path: result.path.clone(),
            });

            info!(
                "Loaded project {:?} ({} layers)",
                result.path,
                document.layers.len()
            );
            commands.entity(entity).despawn();
        }
    }
}
