//! Right panel: layer stack, active layer properties, canvas settings.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::document::{CoalesceKey, Document, EditAction, ImageRef, LayerId, TileLayer, ViewAction};
use crate::history::{Action, ActionDebouncer, DebouncedEdit, DispatchRequest, HistoryEngine};

#[derive(Resource, Default)]
pub struct LayersPanelState {
    /// Layer whose name is being edited, and the text so far
    rename: Option<(LayerId, String)>,
    crop: CropFields,
}

#[derive(Default)]
struct CropFields {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    /// Canvas size the fields were last synced to
    synced: Option<(u32, u32)>,
}

impl CropFields {
    /// Reset to the full canvas whenever its size changes
    fn sync(&mut self, width: u32, height: u32) {
        if self.synced != Some((width, height)) {
            self.x = 0;
            self.y = 0;
            self.width = width;
            self.height = height;
            self.synced = Some((width, height));
        }
    }

    fn to_action(&self) -> EditAction {
        EditAction::CropCanvas {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }
}

/// Collects dispatches made while drawing the panel
#[derive(Default)]
struct Outbox {
    direct: Vec<Action>,
    debounced: Vec<EditAction>,
}

impl Outbox {
    fn edit(&mut self, edit: EditAction) {
        self.direct.push(Action::Edit(edit));
    }

    fn view(&mut self, view: ViewAction) {
        self.direct.push(Action::View(view));
    }
}

fn render_layer_row(
    ui: &mut egui::Ui,
    layer: &TileLayer,
    index: usize,
    count: usize,
    active: bool,
    out: &mut Outbox,
) {
    ui.horizontal(|ui| {
        let mut visible = layer.visible;
        if ui.checkbox(&mut visible, "").changed() {
            out.edit(EditAction::SetLayerVisibility {
                layer: layer.id,
                visible,
            });
        }

        if ui.selectable_label(active, &layer.name).clicked() && !active {
            out.view(ViewAction::SelectLayer(Some(layer.id)));
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("🗑").on_hover_text("Remove layer").clicked() {
                out.edit(EditAction::RemoveLayer { layer: layer.id });
            }
            // Rows are listed top layer first, so "up" moves toward the end of the stack
            if ui
                .add_enabled(index > 0, egui::Button::new("⏷").small())
                .on_hover_text("Move down")
                .clicked()
            {
                out.edit(EditAction::MoveLayer {
                    layer: layer.id,
                    to: index - 1,
                });
            }
            if ui
                .add_enabled(index + 1 < count, egui::Button::new("⏶").small())
                .on_hover_text("Move up")
                .clicked()
            {
                out.edit(EditAction::MoveLayer {
                    layer: layer.id,
                    to: index + 1,
                });
            }
        });
    });
}

fn render_layer_properties(
    ui: &mut egui::Ui,
    doc: &Document,
    layer: &TileLayer,
    state: &mut LayersPanelState,
    debouncer: &ActionDebouncer,
    out: &mut Outbox,
) {
    ui.label(egui::RichText::new("Layer").heading().size(16.0));

    // Name, committed when the field loses focus
    if state.rename.as_ref().is_none_or(|(id, _)| *id != layer.id) {
        state.rename = Some((layer.id, layer.name.clone()));
    }
    let Some((_, name)) = &mut state.rename else {
        return;
    };
    let response = ui.text_edit_singleline(name);
    if response.lost_focus() && *name != layer.name && !name.trim().is_empty() {
        out.edit(EditAction::RenameLayer {
            layer: layer.id,
            name: name.trim().to_string(),
        });
    }
    if !response.has_focus() && !response.lost_focus() {
        // Follow undo/redo of the name
        name.clone_from(&layer.name);
    }

    let mut opacity = match debouncer.pending_for(CoalesceKey::LayerOpacity(layer.id)) {
        Some(EditAction::SetLayerOpacity { opacity, .. }) => *opacity,
        _ => layer.opacity,
    };
    if ui
        .add(egui::Slider::new(&mut opacity, 0.0..=1.0).text("Opacity"))
        .changed()
    {
        out.debounced.push(EditAction::SetLayerOpacity {
            layer: layer.id,
            opacity,
        });
    }

    ui.horizontal(|ui| {
        ui.label(format!("Offset {}, {}", layer.offset.x, layer.offset.y));
        let step_x = doc.canvas.tile_width as i32;
        let step_y = doc.canvas.tile_height as i32;
        for (label, dx, dy) in [
            ("◀", -step_x, 0),
            ("▶", step_x, 0),
            ("▲", 0, -step_y),
            ("▼", 0, step_y),
        ] {
            if ui.small_button(label).clicked() {
                out.edit(EditAction::OffsetLayer {
                    layer: layer.id,
                    dx,
                    dy,
                });
            }
        }
    });

    ui.horizontal(|ui| {
        match &layer.image {
            Some(image) => {
                ui.label(image.display_name());
                if ui.small_button("Detach").clicked() {
                    out.edit(EditAction::SetLayerImage {
                        layer: layer.id,
                        image: None,
                    });
                }
            }
            None => {
                ui.weak("No image");
            }
        }
        if ui.small_button("Attach image...").clicked()
            && let Some(path) = rfd::FileDialog::new()
                .add_filter("Images", &["png", "jpg", "jpeg", "webp", "gif", "bmp", "tiff"])
                .set_title("Attach Layer Image")
                .pick_file()
        {
            out.edit(EditAction::SetLayerImage {
                layer: layer.id,
                image: Some(ImageRef::new(path)),
            });
        }
    });

    ui.horizontal(|ui| {
        if ui.button("Fill with tile").clicked() {
            out.edit(EditAction::FillLayer {
                layer: layer.id,
                value: doc.view.selected_tile,
            });
        }
        if ui.button("Clear").clicked() {
            out.edit(EditAction::FillLayer {
                layer: layer.id,
                value: 0,
            });
        }
    });
}

fn render_canvas_settings(
    ui: &mut egui::Ui,
    doc: &Document,
    state: &mut LayersPanelState,
    debouncer: &ActionDebouncer,
    out: &mut Outbox,
) {
    ui.label(egui::RichText::new("Canvas").heading().size(16.0));
    ui.label(format!(
        "{} × {} tiles of {} × {} px",
        doc.canvas.width, doc.canvas.height, doc.canvas.tile_width, doc.canvas.tile_height
    ));

    let mut color = match debouncer.pending_for(CoalesceKey::Background) {
        Some(EditAction::SetBackground { color }) => *color,
        _ => doc.canvas.background,
    };
    ui.horizontal(|ui| {
        ui.label("Background");
        if ui.color_edit_button_srgba_unmultiplied(&mut color).changed() {
            out.debounced.push(EditAction::SetBackground { color });
        }
    });

    let crop = &mut state.crop;
    crop.sync(doc.canvas.width, doc.canvas.height);
    ui.horizontal(|ui| {
        ui.label("Crop");
        ui.add(egui::DragValue::new(&mut crop.x).prefix("x ").range(0..=doc.canvas.width - 1));
        ui.add(egui::DragValue::new(&mut crop.y).prefix("y ").range(0..=doc.canvas.height - 1));
    });
    ui.horizontal(|ui| {
        ui.add(egui::DragValue::new(&mut crop.width).prefix("w ").range(1..=doc.canvas.width));
        ui.add(egui::DragValue::new(&mut crop.height).prefix("h ").range(1..=doc.canvas.height));
        let fits = crop.x + crop.width <= doc.canvas.width && crop.y + crop.height <= doc.canvas.height;
        let unchanged = crop.width == doc.canvas.width && crop.height == doc.canvas.height;
        if ui.add_enabled(fits && !unchanged, egui::Button::new("Apply")).clicked() {
            out.edit(crop.to_action());
        }
    });
}

fn render_history(ui: &mut egui::Ui, history: &HistoryEngine, out: &mut Outbox) {
    ui.label(egui::RichText::new("History").heading().size(16.0));
    ui.horizontal(|ui| {
        if ui.add_enabled(history.can_undo(), egui::Button::new("Undo")).clicked() {
            out.direct.push(Action::HistoryUndo);
        }
        if ui.add_enabled(history.can_redo(), egui::Button::new("Redo")).clicked() {
            out.direct.push(Action::HistoryRedo);
        }
        ui.weak(format!(
            "{} / {}",
            history.undo_len(),
            history.undo_len() + history.redo_len()
        ));
    });
    for entry in history.log().undo_entries().take(8) {
        ui.weak(entry.action.description());
    }
}

pub fn layers_panel_ui(
    mut contexts: EguiContexts,
    document: Res<Document>,
    history: Res<HistoryEngine>,
    debouncer: Res<ActionDebouncer>,
    mut state: ResMut<LayersPanelState>,
    mut requests: MessageWriter<DispatchRequest>,
    mut debounced: MessageWriter<DebouncedEdit>,
) -> Result {
    let mut out = Outbox::default();
    let doc = &*document;

    egui::SidePanel::right("layers_panel")
        .default_width(240.0)
        .show(contexts.ctx_mut()?, |ui| {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Layers").heading().size(18.0));
            ui.separator();

            let count = doc.layers.len();
            for (index, layer) in doc.layers.iter().enumerate().rev() {
                let active = doc.view.active_layer == Some(layer.id);
                render_layer_row(ui, layer, index, count, active, &mut out);
            }

            if ui.button("+ Add Layer").clicked() {
                out.edit(EditAction::AddLayer {
                    name: format!("Layer {}", doc.next_layer_id()),
                });
            }

            ui.separator();
            let active = doc.view.active_layer.and_then(|id| doc.layer(id).ok());
            if let Some(layer) = active {
                render_layer_properties(ui, doc, layer, &mut state, &debouncer, &mut out);
                ui.separator();
            }

            render_canvas_settings(ui, doc, &mut state, &debouncer, &mut out);
            ui.separator();
            render_history(ui, &history, &mut out);
        });

    for action in out.direct {
        requests.write(DispatchRequest(action));
    }
    for edit in out.debounced {
        debounced.write(DebouncedEdit(edit));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_fields_follow_canvas_size() {
        let mut crop = CropFields::default();
        crop.sync(10, 8);
        assert_eq!((crop.width, crop.height), (10, 8));

        crop.x = 2;
        crop.width = 4;
        crop.sync(10, 8);
        assert_eq!(crop.x, 2, "same size keeps user input");

        crop.sync(4, 8);
        assert_eq!((crop.x, crop.width), (0, 4));
        assert_eq!(
            crop.to_action(),
            EditAction::CropCanvas {
                x: 0,
                y: 0,
                width: 4,
                height: 8
            }
        );
    }
}
