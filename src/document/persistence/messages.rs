//! Message types for project persistence operations.

use bevy::prelude::*;
use std::path::PathBuf;

#[derive(Message)]
pub struct SaveProjectRequest {
    pub path: PathBuf,
}

#[derive(Message)]
pub struct LoadProjectRequest {
    pub path: PathBuf,
}

/// Replace the open document with a blank one sized from the config
#[derive(Message)]
pub struct NewProjectRequest;

#[derive(Message)]
pub struct ExportTmxRequest {
    pub path: PathBuf,
}
