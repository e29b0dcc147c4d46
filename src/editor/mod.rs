mod stroke;
pub mod tools;

pub use stroke::PaintStroke;
pub use tools::{CurrentTool, EditorTool};

use bevy::prelude::*;

pub struct EditorPlugin;

impl Plugin for EditorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CurrentTool>()
            .init_resource::<PaintStroke>()
            .add_systems(Update, tools::handle_tool_shortcuts);
    }
}
