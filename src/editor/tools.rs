use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::document::{Document, LayerId, ViewAction};
use crate::history::{Action, DispatchRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorTool {
    /// Paint the selected tile
    #[default]
    Brush,
    /// Paint the empty tile
    Eraser,
    /// Fill the whole active layer
    Fill,
    /// Pick the tile under the cursor
    Picker,
}

impl EditorTool {
    pub fn display_name(&self) -> &'static str {
        match self {
            EditorTool::Brush => "Brush (B)",
            EditorTool::Eraser => "Eraser (E)",
            EditorTool::Fill => "Fill (G)",
            EditorTool::Picker => "Picker (I)",
        }
    }

    pub fn all() -> &'static [EditorTool] {
        &[
            EditorTool::Brush,
            EditorTool::Eraser,
            EditorTool::Fill,
            EditorTool::Picker,
        ]
    }

    fn shortcut(&self) -> KeyCode {
        match self {
            EditorTool::Brush => KeyCode::KeyB,
            EditorTool::Eraser => KeyCode::KeyE,
            EditorTool::Fill => KeyCode::KeyG,
            EditorTool::Picker => KeyCode::KeyI,
        }
    }
}

#[derive(Resource, Default)]
pub struct CurrentTool {
    pub tool: EditorTool,
}

/// Layer `step` positions away from `current` in draw order, wrapping around
pub fn cycle_layer(layers: &[LayerId], current: Option<LayerId>, step: isize) -> Option<LayerId> {
    if layers.is_empty() {
        return None;
    }
    let len = layers.len() as isize;
    let index = match current.and_then(|id| layers.iter().position(|l| *l == id)) {
        Some(index) => (index as isize + step).rem_euclid(len),
        None => 0,
    };
    Some(layers[index as usize])
}

pub fn handle_tool_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut current_tool: ResMut<CurrentTool>,
    document: Res<Document>,
    mut requests: MessageWriter<DispatchRequest>,
    mut contexts: EguiContexts,
) {
    // Don't change tools if typing in a text field
    if let Ok(ctx) = contexts.ctx_mut()
        && ctx.wants_keyboard_input()
    {
        return;
    }

    let ctrl = keyboard.pressed(KeyCode::ControlLeft) || keyboard.pressed(KeyCode::ControlRight);
    if ctrl {
        return;
    }

    if let Some(tool) = EditorTool::all()
        .iter()
        .find(|t| keyboard.just_pressed(t.shortcut()))
    {
        current_tool.tool = *tool;
    }

    // C / Shift+C cycles the active layer
    if keyboard.just_pressed(KeyCode::KeyC) {
        let shift = keyboard.pressed(KeyCode::ShiftLeft) || keyboard.pressed(KeyCode::ShiftRight);
        let ids: Vec<LayerId> = document.layers.iter().map(|l| l.id).collect();
        let step = if shift { -1 } else { 1 };
        if let Some(next) = cycle_layer(&ids, document.view.active_layer, step) {
            requests.write(DispatchRequest(Action::View(ViewAction::SelectLayer(Some(next)))));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_contain_shortcuts() {
        for tool in EditorTool::all() {
            let name = tool.display_name();
            assert!(name.contains('('), "Display name should contain shortcut: {}", name);
            assert!(name.contains(')'), "Display name should contain shortcut: {}", name);
        }
    }

    #[test]
    fn test_shortcuts_are_unique() {
        let all = EditorTool::all();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a.shortcut(), b.shortcut());
            }
        }
    }

    #[test]
    fn test_cycle_layer_wraps() {
        let ids = [LayerId(1), LayerId(4), LayerId(7)];
        assert_eq!(cycle_layer(&ids, Some(LayerId(7)), 1), Some(LayerId(1)));
        assert_eq!(cycle_layer(&ids, Some(LayerId(1)), -1), Some(LayerId(7)));
        assert_eq!(cycle_layer(&ids, Some(LayerId(4)), 1), Some(LayerId(7)));
    }

    #[test]
    fn test_cycle_layer_without_selection_starts_at_bottom() {
        let ids = [LayerId(3), LayerId(5)];
        assert_eq!(cycle_layer(&ids, None, 1), Some(LayerId(3)));
        assert_eq!(cycle_layer(&[], None, 1), None);
    }
}
