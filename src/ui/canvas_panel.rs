//! Central canvas: draws the layer stack and turns pointer input into edits.

use bevy::prelude::*;
use bevy_egui::{EguiContexts, egui};

use crate::constants::{MAX_CANVAS_ZOOM, MIN_CANVAS_ZOOM};
use crate::document::{Canvas, Document, EMPTY_TILE, EditAction, LayerOffset, ViewAction};
use crate::editor::{CurrentTool, EditorTool, PaintStroke};
use crate::history::{Action, DispatchRequest};

use super::DialogState;
use super::tileset_panel::tile_color;

#[derive(Resource)]
pub struct CanvasViewState {
    pub zoom: f32,
    /// Screen offset of the canvas origin from the panel's top-left corner
    pub pan: egui::Vec2,
    pub show_grid: bool,
}

impl Default for CanvasViewState {
    fn default() -> Self {
        Self {
            zoom: 2.0,
            pan: egui::vec2(16.0, 16.0),
            show_grid: true,
        }
    }
}

impl CanvasViewState {
    /// Zoom by `factor` keeping the canvas point under `anchor` fixed
    fn zoom_around(&mut self, factor: f32, anchor: egui::Vec2) {
        let zoom = (self.zoom * factor).clamp(MIN_CANVAS_ZOOM, MAX_CANVAS_ZOOM);
        let applied = zoom / self.zoom;
        self.pan = anchor - (anchor - self.pan) * applied;
        self.zoom = zoom;
    }
}

/// Cell index under a point in unzoomed canvas pixels, for a layer drawn at `offset`
fn cell_at(canvas: &Canvas, offset: LayerOffset, point: egui::Pos2) -> Option<usize> {
    let x = point.x - offset.x as f32;
    let y = point.y - offset.y as f32;
    if x < 0.0 || y < 0.0 {
        return None;
    }
    let column = (x / canvas.tile_width as f32) as u32;
    let row = (y / canvas.tile_height as f32) as u32;
    canvas.index_of(column, row)
}

fn draw_canvas(
    painter: &egui::Painter,
    origin: egui::Pos2,
    doc: &Document,
    stroke: &PaintStroke,
    view: &CanvasViewState,
) {
    let canvas = &doc.canvas;
    let cell = egui::vec2(
        canvas.tile_width as f32 * view.zoom,
        canvas.tile_height as f32 * view.zoom,
    );
    let bounds = egui::Rect::from_min_size(
        origin,
        egui::vec2(cell.x * canvas.width as f32, cell.y * canvas.height as f32),
    );

    painter.rect_filled(bounds, 0.0, egui::Color32::from_rgb(40, 40, 40));
    let [r, g, b, a] = canvas.background;
    painter.rect_filled(bounds, 0.0, egui::Color32::from_rgba_unmultiplied(r, g, b, a));

    for layer in doc.layers.iter().filter(|l| l.visible) {
        let shift = egui::vec2(layer.offset.x as f32, layer.offset.y as f32) * view.zoom;
        let previewing = stroke.layer() == Some(layer.id);

        for (index, &stored) in layer.tiles.as_slice().iter().enumerate() {
            let tile = if previewing {
                stroke.preview(index).unwrap_or(stored)
            } else {
                stored
            };
            if tile == EMPTY_TILE {
                continue;
            }
            let column = (index % canvas.width as usize) as f32;
            let row = (index / canvas.width as usize) as f32;
            let min = origin + shift + egui::vec2(column * cell.x, row * cell.y);
            painter.rect_filled(
                egui::Rect::from_min_size(min, cell),
                0.0,
                tile_color(tile).gamma_multiply(layer.opacity),
            );
        }
    }

    if view.show_grid && cell.x >= 4.0 && cell.y >= 4.0 {
        let grid = egui::Stroke::new(1.0, egui::Color32::from_white_alpha(24));
        for column in 0..=canvas.width {
            let x = origin.x + column as f32 * cell.x;
            painter.line_segment([egui::pos2(x, bounds.top()), egui::pos2(x, bounds.bottom())], grid);
        }
        for row in 0..=canvas.height {
            let y = origin.y + row as f32 * cell.y;
            painter.line_segment([egui::pos2(bounds.left(), y), egui::pos2(bounds.right(), y)], grid);
        }
    }

    painter.rect_stroke(
        bounds,
        0.0,
        egui::Stroke::new(1.0, egui::Color32::from_gray(120)),
        egui::StrokeKind::Outside,
    );
}

/// Apply the current tool to a pointer interaction with the canvas
fn handle_tool_input(
    response: &egui::Response,
    primary_held: bool,
    pointer: Option<egui::Pos2>,
    doc: &Document,
    tool: EditorTool,
    stroke: &mut PaintStroke,
    actions: &mut Vec<Action>,
) {
    let Some(layer) = doc.view.active_layer.and_then(|id| doc.layer(id).ok()) else {
        stroke.cancel();
        return;
    };
    let cell = pointer.and_then(|p| cell_at(&doc.canvas, layer.offset, p));

    match tool {
        EditorTool::Brush | EditorTool::Eraser => {
            let value = if tool == EditorTool::Brush {
                doc.view.selected_tile
            } else {
                EMPTY_TILE
            };
            if primary_held {
                if stroke.layer() != Some(layer.id) {
                    stroke.begin(layer.id);
                }
                if let Some(index) = cell {
                    stroke.add(index, value);
                }
            } else if stroke.is_active() {
                if let Some(edit) = stroke.finish(&layer.tiles) {
                    actions.push(Action::Edit(edit));
                }
            }
        }
        EditorTool::Fill => {
            if response.clicked() && cell.is_some() {
                actions.push(Action::Edit(EditAction::FillLayer {
                    layer: layer.id,
                    value: doc.view.selected_tile,
                }));
            }
        }
        EditorTool::Picker => {
            if response.clicked()
                && let Some(tile) = cell.and_then(|index| layer.tiles.get(index))
            {
                actions.push(Action::View(ViewAction::SelectTile(tile)));
            }
        }
    }
}

pub fn canvas_panel_ui(
    mut contexts: EguiContexts,
    document: Res<Document>,
    current_tool: Res<CurrentTool>,
    dialog_state: Res<DialogState>,
    mut view: ResMut<CanvasViewState>,
    mut stroke: ResMut<PaintStroke>,
    mut requests: MessageWriter<DispatchRequest>,
) -> Result {
    let mut actions = Vec::new();
    let doc = &*document;

    egui::CentralPanel::default().show(contexts.ctx_mut()?, |ui| {
        ui.horizontal(|ui| {
            ui.checkbox(&mut view.show_grid, "Grid");
            ui.label(format!("{:.0}%", view.zoom * 100.0));
            if ui.small_button("Reset view").clicked() {
                *view = CanvasViewState {
                    show_grid: view.show_grid,
                    ..default()
                };
            }
        });

        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        let painter = ui.painter_at(rect);

        if dialog_state.any_modal_open {
            stroke.cancel();
        } else {
            if response.hovered() {
                let scroll = ui.input(|i| i.smooth_scroll_delta.y);
                if scroll != 0.0
                    && let Some(hover) = response.hover_pos()
                {
                    view.zoom_around(1.0 + scroll * 0.002, hover - rect.min);
                }
            }
            if response.dragged_by(egui::PointerButton::Middle) {
                view.pan += response.drag_delta();
            }

            let origin = rect.min + view.pan;
            let pointer = response
                .interact_pointer_pos()
                .or(response.hover_pos())
                .map(|p| egui::pos2((p.x - origin.x) / view.zoom, (p.y - origin.y) / view.zoom));
            let primary_held =
                response.is_pointer_button_down_on() && ui.input(|i| i.pointer.primary_down());
            handle_tool_input(
                &response,
                primary_held,
                pointer,
                doc,
                current_tool.tool,
                &mut stroke,
                &mut actions,
            );
        }

        draw_canvas(&painter, rect.min + view.pan, doc, &stroke, &view);
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
    fn test_cell_at_maps_pixels_to_cells() {
        let canvas = Canvas {
            width: 4,
            height: 3,
            ..Canvas::default()
        };
        let origin = LayerOffset::default();
        assert_eq!(cell_at(&canvas, origin, egui::pos2(0.0, 0.0)), Some(0));
        assert_eq!(cell_at(&canvas, origin, egui::pos2(17.0, 16.0)), Some(5));
        assert_eq!(cell_at(&canvas, origin, egui::pos2(64.0, 0.0)), None);
        assert_eq!(cell_at(&canvas, origin, egui::pos2(-1.0, 0.0)), None);
    }

    #[test]
    fn test_cell_at_follows_layer_offset() {
        let canvas = Canvas::default();
        let offset = LayerOffset { x: 16, y: 0 };
        assert_eq!(cell_at(&canvas, offset, egui::pos2(8.0, 0.0)), None);
        assert_eq!(cell_at(&canvas, offset, egui::pos2(20.0, 0.0)), Some(0));
    }

    #[test]
    fn test_zoom_is_clamped_and_keeps_anchor() {
        let mut view = CanvasViewState {
            zoom: 1.0,
            pan: egui::vec2(0.0, 0.0),
            show_grid: true,
        };
        view.zoom_around(2.0, egui::vec2(100.0, 100.0));
        assert_eq!(view.zoom, 2.0);
        assert_eq!(view.pan, egui::vec2(-100.0, -100.0));

        view.zoom_around(100.0, egui::Vec2::ZERO);
        assert_eq!(view.zoom, MAX_CANVAS_ZOOM);
        view.zoom_around(0.0001, egui::Vec2::ZERO);
        assert_eq!(view.zoom, MIN_CANVAS_ZOOM);
    }
}
