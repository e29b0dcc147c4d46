use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::config::AppConfig;
use crate::document::{
    CurrentProjectFile, Document, ExportTmxRequest, LoadProjectRequest, NewProjectRequest,
    SaveProjectRequest,
};
use crate::editor::{CurrentTool, EditorTool};
use crate::history::{Action, DispatchRequest, HistoryEngine};

use super::file_menu::{
    FileMenuState, PendingFileAction, pick_project_save_path, pick_project_to_open,
    pick_tmx_export_path, run_file_action,
};

/// Messages the toolbar can emit
#[derive(bevy::ecs::system::SystemParam)]
pub struct ToolbarWriters<'w> {
    new_events: MessageWriter<'w, NewProjectRequest>,
    load_events: MessageWriter<'w, LoadProjectRequest>,
    save_events: MessageWriter<'w, SaveProjectRequest>,
    export_events: MessageWriter<'w, ExportTmxRequest>,
    requests: MessageWriter<'w, DispatchRequest>,
}

fn history_button(ui: &mut egui::Ui, label: &str, enabled: bool, hint: Option<&str>) -> bool {
    let response = ui.add_enabled(enabled, egui::Button::new(label));
    let response = match hint {
        Some(hint) => response.on_hover_text(hint),
        None => response,
    };
    response.clicked()
}

/// Menu bar, history buttons, tools and project status
#[allow(clippy::too_many_arguments)]
pub fn toolbar_ui(
    mut contexts: EguiContexts,
    mut current_tool: ResMut<CurrentTool>,
    mut menu_state: ResMut<FileMenuState>,
    mut writers: ToolbarWriters,
    history: Res<HistoryEngine>,
    document: Res<Document>,
    current_file: Res<CurrentProjectFile>,
    config: Res<AppConfig>,
) -> Result {
    let mut file_action = None;

    egui::TopBottomPanel::top("main_toolbar")
        .frame(
            egui::Frame::side_top_panel(&contexts.ctx_mut()?.style())
                .inner_margin(egui::Margin::symmetric(12, 6)),
        )
        .show(contexts.ctx_mut()?, |ui| {
            ui.horizontal(|ui| {
                ui.menu_button("File", |ui| {
                    if ui.button("New Project").clicked() {
                        file_action = menu_state.guard(&history, PendingFileAction::New);
                        ui.close();
                    }

                    if ui.button("Open Project...").clicked() {
                        if let Some(path) = pick_project_to_open() {
                            file_action = menu_state.guard(&history, PendingFileAction::Open(path));
                        }
                        ui.close();
                    }

                    ui.add_enabled_ui(!config.data.recent_projects.is_empty(), |ui| {
                        ui.menu_button("Open Recent", |ui| {
                            for path in &config.data.recent_projects {
                                let label = path
                                    .file_name()
                                    .map(|n| n.to_string_lossy().to_string())
                                    .unwrap_or_else(|| path.to_string_lossy().to_string());
                                if ui
                                    .button(label)
                                    .on_hover_text(path.to_string_lossy().to_string())
                                    .clicked()
                                {
                                    file_action = menu_state
                                        .guard(&history, PendingFileAction::Open(path.clone()));
                                    ui.close();
                                }
                            }
                        });
                    });

                    ui.separator();

                    if ui.button("Save").clicked() {
                        let path = current_file
                            .path
                            .clone()
                            .or_else(|| pick_project_save_path(&document.name));
                        if let Some(path) = path {
                            writers.save_events.write(SaveProjectRequest { path });
                        }
                        ui.close();
                    }

                    if ui.button("Save As...").clicked() {
                        if let Some(path) = pick_project_save_path(&document.name) {
                            writers.save_events.write(SaveProjectRequest { path });
                        }
                        ui.close();
                    }

                    ui.separator();

                    if ui.button("Export TMX...").clicked() {
                        if let Some(path) = pick_tmx_export_path(&document.name) {
                            writers.export_events.write(ExportTmxRequest { path });
                        }
                        ui.close();
                    }
                });

                ui.menu_button("Edit", |ui| {
                    let undo_label = match history.undo_description() {
                        Some(what) => format!("Undo {} (Ctrl+Z)", what),
                        None => "Undo (Ctrl+Z)".to_string(),
                    };
                    if history_button(ui, &undo_label, history.can_undo(), None) {
                        writers.requests.write(DispatchRequest(Action::HistoryUndo));
                        ui.close();
                    }

                    let redo_label = match history.redo_description() {
                        Some(what) => format!("Redo {} (Ctrl+Y)", what),
                        None => "Redo (Ctrl+Y)".to_string(),
                    };
                    if history_button(ui, &redo_label, history.can_redo(), None) {
                        writers.requests.write(DispatchRequest(Action::HistoryRedo));
                        ui.close();
                    }
                });

                ui.separator();

                if history_button(ui, "⟲", history.can_undo(), history.undo_description()) {
                    writers.requests.write(DispatchRequest(Action::HistoryUndo));
                }
                if history_button(ui, "⟳", history.can_redo(), history.redo_description()) {
                    writers.requests.write(DispatchRequest(Action::HistoryRedo));
                }

                ui.separator();

                for tool in EditorTool::all() {
                    let selected = current_tool.tool == *tool;
                    if ui.add(egui::Button::new(tool.display_name()).selected(selected)).clicked() {
                        current_tool.tool = *tool;
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if !history.is_pristine() {
                        ui.colored_label(egui::Color32::from_rgb(230, 180, 80), "●")
                            .on_hover_text(format!(
                                "{} undo / {} redo steps",
                                history.undo_len(),
                                history.redo_len()
                            ));
                    }
                    ui.label(egui::RichText::new(&document.name).strong());
                });
            });
        });

    if let Some(action) = file_action {
        run_file_action(action, &mut writers.new_events, &mut writers.load_events);
    }

    Ok(())
}
