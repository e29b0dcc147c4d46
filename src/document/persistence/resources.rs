//! Resource types for project persistence state tracking.

use bevy::prelude::*;
use bevy::tasks::Task;
use std::path::PathBuf;

use super::results::{LoadResult, SaveResult};

/// Resource tracking the last I/O error for display to the user
#[derive(Resource, Default)]
pub struct ProjectIoError {
    pub message: Option<String>,
}

/// Resource tracking async project I/O for the busy indicator
#[derive(Resource, Default)]
pub struct AsyncProjectOperation {
    pub is_saving: bool,
    pub is_loading: bool,
    pub operation_description: Option<String>,
}

impl AsyncProjectOperation {
    pub fn is_busy(&self) -> bool {
        self.is_saving || self.is_loading
    }
}

/// Resource tracking the file the open project was loaded from or saved to
#[derive(Resource, Default)]
pub struct CurrentProjectFile {
    pub path: Option<PathBuf>,
}

/// Component for save and export tasks
#[derive(Component)]
pub struct SaveProjectTask(pub Task<SaveResult>);

/// Component for load tasks
#[derive(Component)]
pub struct LoadProjectTask(pub Task<LoadResult>);
