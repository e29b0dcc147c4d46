use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};
use std::path::{Path, PathBuf};

use crate::config::{AppConfig, ConfigResetNotification, MissingProjectWarning, SaveConfigRequest};
use crate::constants::PROJECT_EXTENSION;
use crate::document::{
    AsyncProjectOperation, LoadProjectRequest, NewProjectRequest, ProjectIoError,
};
use crate::history::HistoryEngine;

/// File action waiting for the user to confirm discarding history
#[derive(Debug, Clone, PartialEq)]
pub enum PendingFileAction {
    New,
    Open(PathBuf),
}

#[derive(Resource, Default)]
pub struct FileMenuState {
    pub pending: Option<PendingFileAction>,
}

impl FileMenuState {
    /// Run `action` now when there is nothing to lose, otherwise ask first.
    /// Returns the action when it may proceed immediately.
    pub fn guard(&mut self, history: &HistoryEngine, action: PendingFileAction) -> Option<PendingFileAction> {
        if history.is_pristine() {
            Some(action)
        } else {
            self.pending = Some(action);
            None
        }
    }
}

pub fn run_file_action(
    action: PendingFileAction,
    new_events: &mut MessageWriter<NewProjectRequest>,
    load_events: &mut MessageWriter<LoadProjectRequest>,
) {
    match action {
        PendingFileAction::New => {
            new_events.write(NewProjectRequest);
        }
        PendingFileAction::Open(path) => {
            load_events.write(LoadProjectRequest { path });
        }
    }
}

fn with_extension(path: PathBuf, extension: &str) -> PathBuf {
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(extension)
    }
}

pub fn pick_project_to_open() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Tileforge Projects", &[PROJECT_EXTENSION])
        .set_directory(crate::paths::projects_dir())
        .set_title("Open Project")
        .pick_file()
}

pub fn pick_project_save_path(name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Tileforge Projects", &[PROJECT_EXTENSION])
        .set_directory(crate::paths::projects_dir())
        .set_file_name(format!("{}.{}", sanitize_filename(name), PROJECT_EXTENSION))
        .set_title("Save Project")
        .save_file()
        .map(|p| with_extension(p, PROJECT_EXTENSION))
}

pub fn pick_tmx_export_path(name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .add_filter("Tiled Map", &["tmx"])
        .set_file_name(format!("{}.tmx", sanitize_filename(name)))
        .set_title("Export TMX")
        .save_file()
        .map(|p| with_extension(p, "tmx"))
}

fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim();
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

fn shorten_path(path: &Path) -> String {
    let path_str = path.to_string_lossy();
    let chars: Vec<char> = path_str.chars().collect();
    if chars.len() > 50 {
        let tail: String = chars[chars.len() - 47..].iter().collect();
        format!("...{}", tail)
    } else {
        path_str.to_string()
    }
}

/// Confirmation before New/Open throws away the undo history
pub fn confirm_discard_ui(
    mut contexts: EguiContexts,
    mut menu_state: ResMut<FileMenuState>,
    mut new_events: MessageWriter<NewProjectRequest>,
    mut load_events: MessageWriter<LoadProjectRequest>,
) -> Result {
    let Some(action) = menu_state.pending.clone() else {
        return Ok(());
    };

    let title = match action {
        PendingFileAction::New => "New Project",
        PendingFileAction::Open(_) => "Open Project",
    };

    egui::Window::new(title)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Unsaved changes and the undo history will be lost.");
            ui.horizontal(|ui| {
                if ui.button("Continue").clicked() {
                    run_file_action(action.clone(), &mut new_events, &mut load_events);
                    menu_state.pending = None;
                }
                if ui.button("Cancel").clicked() {
                    menu_state.pending = None;
                }
            });
        });

    Ok(())
}

/// Shown at startup if the last project no longer exists
pub fn missing_project_warning_ui(
    mut contexts: EguiContexts,
    mut warning: ResMut<MissingProjectWarning>,
    mut config: ResMut<AppConfig>,
    mut save_events: MessageWriter<SaveConfigRequest>,
) -> Result {
    if !warning.show {
        return Ok(());
    }

    egui::Window::new("Project Not Found")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("The last opened project no longer exists:");

            if let Some(ref path) = warning.path {
                ui.add_space(5.0);
                ui.label(egui::RichText::new(shorten_path(path)).weak())
                    .on_hover_text(path.to_string_lossy().to_string());
                ui.add_space(10.0);
            }

            ui.horizontal(|ui| {
                if ui.button("OK").clicked() {
                    warning.show = false;
                }

                if ui.button("Forget it").clicked() {
                    if let Some(path) = warning.path.take() {
                        config.data.recent_projects.retain(|p| p != &path);
                    }
                    config.data.last_project_path = None;
                    config.dirty = true;
                    save_events.write(SaveConfigRequest);
                    warning.show = false;
                }
            });
        });

    Ok(())
}

pub fn config_reset_notification_ui(
    mut contexts: EguiContexts,
    mut notification: ResMut<ConfigResetNotification>,
) -> Result {
    if !notification.show {
        return Ok(());
    }

    egui::Window::new("Settings Reset")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.label("Your settings could not be loaded and were reset to defaults.");
            if let Some(ref reason) = notification.reason {
                ui.add_space(5.0);
                ui.label(egui::RichText::new(reason).weak().small());
            }
            ui.add_space(10.0);
            if ui.button("OK").clicked() {
                notification.show = false;
                notification.reason = None;
            }
        });

    Ok(())
}

pub fn io_error_dialog_ui(mut contexts: EguiContexts, mut io_error: ResMut<ProjectIoError>) -> Result {
    let Some(message) = io_error.message.clone() else {
        return Ok(());
    };

    egui::Window::new("File Error")
        .collapsible(false)
        .resizable(true)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            egui::ScrollArea::vertical().max_height(200.0).show(ui, |ui| {
                ui.colored_label(egui::Color32::RED, message);
            });
            if ui.button("OK").clicked() {
                io_error.message = None;
            }
        });

    Ok(())
}

/// Blocking spinner while a save, export or load runs
pub fn async_operation_modal_ui(
    mut contexts: EguiContexts,
    async_op: Res<AsyncProjectOperation>,
) -> Result {
    if !async_op.is_busy() {
        return Ok(());
    }

    egui::Window::new("Working")
        .title_bar(false)
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(
                    async_op
                        .operation_description
                        .as_deref()
                        .unwrap_or("Working..."),
                );
            });
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, EditAction, LayerId};
    use crate::history::Action;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Dungeon: level/1"), "Dungeon_ level_1");
        assert_eq!(sanitize_filename("  "), "untitled");
    }

    #[test]
    fn test_with_extension_keeps_existing() {
        assert_eq!(with_extension(PathBuf::from("a.tmx"), "tmx"), PathBuf::from("a.tmx"));
        assert_eq!(
            with_extension(PathBuf::from("map"), PROJECT_EXTENSION),
            PathBuf::from("map.tfproj")
        );
    }

    #[test]
    fn test_guard_asks_only_with_history() {
        let mut state = FileMenuState::default();
        let mut history = HistoryEngine::default();
        assert_eq!(
            state.guard(&history, PendingFileAction::New),
            Some(PendingFileAction::New)
        );
        assert!(state.pending.is_none());

        let mut doc = Document::default();
        history
            .dispatch(&mut doc, Action::Edit(EditAction::paint_tile(LayerId(1), 0, 1)))
            .unwrap();
        assert_eq!(state.guard(&history, PendingFileAction::New), None);
        assert_eq!(state.pending, Some(PendingFileAction::New));
    }
}
