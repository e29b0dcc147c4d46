//! Left panel: tileset loading and the tile picker.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::document::{Document, EMPTY_TILE, EditAction, Tileset, ViewAction};
use crate::history::{Action, DispatchRequest};

const SWATCH_SIZE: f32 = 28.0;
/// Picker cap for very large atlases
const MAX_PICKER_TILES: u32 = 1024;

#[derive(Resource)]
pub struct TilesetPanelState {
    pub tile_width: u32,
    pub tile_height: u32,
    pub error: Option<String>,
}

impl Default for TilesetPanelState {
    fn default() -> Self {
        Self {
            tile_width: 16,
            tile_height: 16,
            error: None,
        }
    }
}

/// Stand-in color for a tile index.
///
/// Tiles are shown as hue swatches spread with the golden angle so
/// neighbouring indices stay distinguishable.
pub fn tile_color(tile: u32) -> egui::Color32 {
    if tile == EMPTY_TILE {
        return egui::Color32::TRANSPARENT;
    }
    let hue = (tile as f32 * 0.618_034).fract();
    egui::ecolor::Hsva::new(hue, 0.55, 0.85, 1.0).into()
}

fn tile_swatch(ui: &mut egui::Ui, tile: u32, selected: bool) -> egui::Response {
    let (rect, response) =
        ui.allocate_exact_size(egui::vec2(SWATCH_SIZE, SWATCH_SIZE), egui::Sense::click());
    let painter = ui.painter();

    if tile == EMPTY_TILE {
        painter.rect_filled(rect, 2.0, egui::Color32::from_rgb(60, 60, 60));
        painter.line_segment(
            [rect.left_bottom(), rect.right_top()],
            egui::Stroke::new(1.5, egui::Color32::from_rgb(200, 100, 100)),
        );
    } else {
        painter.rect_filled(rect, 2.0, tile_color(tile));
        painter.text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            tile.to_string(),
            egui::FontId::proportional(10.0),
            egui::Color32::BLACK,
        );
    }

    if selected {
        painter.rect_stroke(
            rect,
            2.0,
            egui::Stroke::new(2.0, egui::Color32::WHITE),
            egui::StrokeKind::Inside,
        );
    }

    let label = if tile == EMPTY_TILE {
        "Eraser".to_string()
    } else {
        format!("Tile {}", tile)
    };
    response.on_hover_text(label)
}

fn load_tileset(state: &mut TilesetPanelState) -> Option<Tileset> {
    let path = rfd::FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg", "webp", "gif", "bmp", "tiff"])
        .set_title("Load Tileset Image")
        .pick_file()?;

    match Tileset::from_image(&path, state.tile_width, state.tile_height) {
        Ok(tileset) => {
            info!(
                "Loaded tileset {:?}: {} tiles in {} columns",
                path, tileset.tile_count, tileset.columns
            );
            state.error = None;
            Some(tileset)
        }
        Err(e) => {
            warn!("Failed to load tileset {:?}: {}", path, e);
            state.error = Some(e.to_string());
            None
        }
    }
}

pub fn tileset_panel_ui(
    mut contexts: EguiContexts,
    document: Res<Document>,
    mut state: ResMut<TilesetPanelState>,
    mut requests: MessageWriter<DispatchRequest>,
) -> Result {
    let mut actions = Vec::new();

    egui::SidePanel::left("tileset_panel")
        .default_width(200.0)
        .show(contexts.ctx_mut()?, |ui| {
            ui.add_space(4.0);
            ui.label(egui::RichText::new("Tileset").heading().size(18.0));
            ui.separator();

            ui.horizontal(|ui| {
                ui.label("Tile");
                ui.add(egui::DragValue::new(&mut state.tile_width).range(1..=512).suffix(" px"));
                ui.label("×");
                ui.add(egui::DragValue::new(&mut state.tile_height).range(1..=512).suffix(" px"));
            });

            ui.horizontal(|ui| {
                if ui.button("Load Tileset...").clicked()
                    && let Some(tileset) = load_tileset(&mut state)
                {
                    actions.push(Action::Edit(EditAction::SetTileset {
                        tileset: Some(tileset),
                    }));
                }
                if ui
                    .add_enabled(document.tileset.is_some(), egui::Button::new("Remove"))
                    .clicked()
                {
                    actions.push(Action::Edit(EditAction::SetTileset { tileset: None }));
                }
            });

            if let Some(ref error) = state.error {
                ui.colored_label(egui::Color32::from_rgb(200, 100, 100), error);
            }

            let tile_count = match &document.tileset {
                Some(tileset) => {
                    ui.label(egui::RichText::new(&tileset.name).strong())
                        .on_hover_text(tileset.image.path.to_string_lossy().to_string());
                    ui.weak(format!(
                        "{} tiles, {} × {} px",
                        tileset.tile_count, tileset.tile_width, tileset.tile_height
                    ));
                    tileset.tile_count
                }
                None => {
                    ui.weak("No tileset. Painting uses numbered placeholder tiles.");
                    64
                }
            };

            ui.separator();

            let selected = document.view.selected_tile;
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.horizontal_wrapped(|ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(2.0, 2.0);
                    for tile in 0..=tile_count.min(MAX_PICKER_TILES) {
                        if tile_swatch(ui, tile, tile == selected).clicked() && tile != selected {
                            actions.push(Action::View(ViewAction::SelectTile(tile)));
                        }
                    }
                });
            });
        });

    for action in actions {
        requests.write(DispatchRequest(action));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_tile_has_no_color() {
        assert_eq!(tile_color(EMPTY_TILE), egui::Color32::TRANSPARENT);
    }

    #[test]
    fn test_neighbouring_tiles_differ() {
        for tile in 1..32 {
            assert_ne!(tile_color(tile), tile_color(tile + 1), "tile {}", tile);
            assert_eq!(tile_color(tile).a(), 255);
        }
    }
}
