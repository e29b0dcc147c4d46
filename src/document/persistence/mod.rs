//! Project persistence: new, save, load and TMX export.
//!
//! File I/O runs on Bevy's `IoTaskPool`; results are polled back on the main
//! schedule. Loading or creating a project discards the undo history, since
//! history is never written to disk.
//!
//! ## Module Structure
//!
//! - [`messages`] - Message types for project operations
//! - [`resources`] - Resource types for state tracking
//! - [`results`] - Result types for async operations
//! - [`save`] - Save/export systems and task polling
//! - [`load`] - Load system and task polling
//! - [`project_state`] - New project system

mod load;
mod messages;
mod project_state;
mod resources;
mod results;
mod save;

#[cfg(test)]
mod tests;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::Document;

// Re-exports - Messages
pub use messages::{ExportTmxRequest, LoadProjectRequest, NewProjectRequest, SaveProjectRequest};

// Re-exports - Resources
pub use resources::{AsyncProjectOperation, CurrentProjectFile, ProjectIoError};

// Re-exports - Systems
pub use load::{load_project_system, poll_load_tasks};
pub use project_state::new_project_system;
pub use save::{export_tmx_system, poll_save_tasks, save_project_system};

/// Current on-disk project format
pub const PROJECT_FORMAT_VERSION: u32 = 1;

/// On-disk project file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedProject {
    pub version: u32,
    pub document: Document,
}

impl SavedProject {
    pub fn from_document(document: &Document) -> Self {
        Self {
            version: PROJECT_FORMAT_VERSION,
            document: document.clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self).map_err(|e| format!("Failed to serialize project: {}", e))
    }

    /// Parse and validate a project file
    pub fn from_json(json: &str) -> Result<Self, String> {
        let project: SavedProject = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse project file: {}", e))?;

        if project.version > PROJECT_FORMAT_VERSION {
            return Err(format!(
                "Project format version {} is newer than supported version {}",
                project.version, PROJECT_FORMAT_VERSION
            ));
        }

        project
            .document
            .validate()
            .map_err(|e| format!("Project file is inconsistent: {}", e))?;

        Ok(project)
    }
}

/// Startup system creating the default projects directory
pub fn ensure_projects_directory() {
    let dir = crate::paths::projects_dir();
    if !dir.exists()
        && let Err(e) = std::fs::create_dir_all(&dir)
    {
        warn!("Failed to create projects directory: {}", e);
    }
}
