mod canvas_panel;
pub mod file_menu;
mod layers_panel;
mod tileset_panel;
mod toolbar;

use bevy::prelude::*;
use bevy_egui::EguiPrimaryContextPass;

use crate::config::{ConfigResetNotification, MissingProjectWarning};
use crate::document::{AsyncProjectOperation, ProjectIoError};

/// Resource that tracks whether any modal dialog is currently open.
/// The canvas ignores pointer input while one is.
#[derive(Resource, Default)]
pub struct DialogState {
    pub any_modal_open: bool,
}

/// Aggregate all dialog open states into a single resource.
/// Runs in First schedule before input handlers.
fn update_dialog_state(
    file_menu: Res<file_menu::FileMenuState>,
    missing_project: Res<MissingProjectWarning>,
    config_reset: Res<ConfigResetNotification>,
    io_error: Res<ProjectIoError>,
    async_op: Res<AsyncProjectOperation>,
    mut dialog_state: ResMut<DialogState>,
) {
    dialog_state.any_modal_open = file_menu.pending.is_some()
        || missing_project.show
        || config_reset.show
        || io_error.message.is_some()
        || async_op.is_busy();
}

/// egui draws into the primary camera
fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DialogState>()
            .init_resource::<file_menu::FileMenuState>()
            .init_resource::<layers_panel::LayersPanelState>()
            .init_resource::<tileset_panel::TilesetPanelState>()
            .init_resource::<canvas_panel::CanvasViewState>()
            .add_systems(Startup, spawn_camera)
            // Top bar, then side panels, then the central canvas in the space left over
            .add_systems(
                EguiPrimaryContextPass,
                (
                    toolbar::toolbar_ui,
                    tileset_panel::tileset_panel_ui,
                    layers_panel::layers_panel_ui,
                    canvas_panel::canvas_panel_ui,
                )
                    .chain(),
            )
            .add_systems(
                EguiPrimaryContextPass,
                (
                    file_menu::confirm_discard_ui,
                    file_menu::missing_project_warning_ui,
                    file_menu::config_reset_notification_ui,
                    file_menu::io_error_dialog_ui,
                    file_menu::async_operation_modal_ui,
                )
                    .after(canvas_panel::canvas_panel_ui),
            )
            .add_systems(First, update_dialog_state);
    }
}
