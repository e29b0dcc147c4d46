//! The tile map document: canvas, tile layers and tileset.
//!
//! All edits go through [`Document::apply`], [`Document::apply_inverse`] and
//! [`Document::apply_view`]; systems outside the history module never mutate
//! layer data directly.

mod actions;
mod document_data;
mod error;
mod layer;
pub mod persistence;
mod tile_buffer;
mod tileset;
mod tmx;

pub use actions::{CoalesceKey, EditAction, EditKind, InverseAction, ViewAction};
pub use document_data::{Canvas, Document, EditorView};
pub use error::DocumentError;
pub use layer::{ImageRef, LayerId, LayerOffset, LayerProps, TileLayer, clamp_opacity};
pub use persistence::{
    AsyncProjectOperation, CurrentProjectFile, ExportTmxRequest, LoadProjectRequest,
    NewProjectRequest, ProjectIoError, SaveProjectRequest,
};
pub use tile_buffer::{EMPTY_TILE, TileBuffer, TilePatch, TileWrite};
pub use tileset::Tileset;
pub use tmx::write_tmx;

use bevy::prelude::*;

use crate::config::{AppConfig, ConfigLoaded};

/// Startup system sizing the initial document from the config defaults
fn init_document(config: Res<AppConfig>, mut document: ResMut<Document>) {
    *document = Document::new(config.data.default_canvas.to_canvas());
}

pub struct DocumentPlugin;

impl Plugin for DocumentPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Document>()
            .init_resource::<CurrentProjectFile>()
            .init_resource::<ProjectIoError>()
            .init_resource::<AsyncProjectOperation>()
            .add_message::<SaveProjectRequest>()
            .add_message::<LoadProjectRequest>()
            .add_message::<NewProjectRequest>()
            .add_message::<ExportTmxRequest>()
            .add_systems(
                Startup,
                (persistence::ensure_projects_directory, init_document).after(ConfigLoaded),
            )
            .add_systems(
                Update,
                (
                    persistence::save_project_system.run_if(on_message::<SaveProjectRequest>),
                    persistence::export_tmx_system.run_if(on_message::<ExportTmxRequest>),
                    persistence::load_project_system.run_if(on_message::<LoadProjectRequest>),
                    persistence::new_project_system.run_if(on_message::<NewProjectRequest>),
                    persistence::poll_save_tasks,
                    persistence::poll_load_tasks,
                ),
            );
    }
}
