//! Action payloads that mutate a [`Document`](super::Document).
//!
//! - [`EditAction`] - user edits, recorded by the undo history
//! - [`InverseAction`] - restore operations built from history snapshots
//! - [`ViewAction`] - selection changes, never recorded

use super::{Canvas, ImageRef, LayerId, LayerProps, TileBuffer, TileLayer, TilePatch, TileWrite, Tileset};

/// A trackable edit of the document.
///
/// Every input an edit needs is carried in its payload, so re-applying the
/// same edit to the same document always produces the same result.
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    /// Write tile indices into a layer (a single click or a whole stroke)
    PaintTiles { layer: LayerId, writes: Vec<TileWrite> },
    /// Set every cell of a layer to one tile index
    FillLayer { layer: LayerId, value: u32 },
    /// Shift a layer's pixel offset by a delta
    OffsetLayer { layer: LayerId, dx: i32, dy: i32 },
    /// Crop the canvas and every layer to a tile rectangle
    CropCanvas { x: u32, y: u32, width: u32, height: u32 },
    /// Swap (or remove) the document tileset
    SetTileset { tileset: Option<Tileset> },
    SetLayerOpacity { layer: LayerId, opacity: f32 },
    SetLayerVisibility { layer: LayerId, visible: bool },
    RenameLayer { layer: LayerId, name: String },
    /// Attach (or detach) a raster image to a layer
    SetLayerImage { layer: LayerId, image: Option<ImageRef> },
    /// Append a new empty layer on top of the stack
    AddLayer { name: String },
    RemoveLayer { layer: LayerId },
    /// Move a layer to a new position in draw order
    MoveLayer { layer: LayerId, to: usize },
    /// Canvas background color as straight RGBA
    SetBackground { color: [u8; 4] },
}

/// Payload-free tag of an [`EditAction`] variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    PaintTiles,
    FillLayer,
    OffsetLayer,
    CropCanvas,
    SetTileset,
    SetLayerOpacity,
    SetLayerVisibility,
    RenameLayer,
    SetLayerImage,
    AddLayer,
    RemoveLayer,
    MoveLayer,
    SetBackground,
}

/// Identity under which rapid edits replace each other while debounced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoalesceKey {
    Background,
    LayerOpacity(LayerId),
}

impl EditAction {
    /// Convenience constructor for a single-cell paint
    pub fn paint_tile(layer: LayerId, index: usize, value: u32) -> Self {
        EditAction::PaintTiles {
            layer,
            writes: vec![TileWrite::new(index, value)],
        }
    }

    pub fn kind(&self) -> EditKind {
        match self {
            EditAction::PaintTiles { .. } => EditKind::PaintTiles,
            EditAction::FillLayer { .. } => EditKind::FillLayer,
            EditAction::OffsetLayer { .. } => EditKind::OffsetLayer,
            EditAction::CropCanvas { .. } => EditKind::CropCanvas,
            EditAction::SetTileset { .. } => EditKind::SetTileset,
            EditAction::SetLayerOpacity { .. } => EditKind::SetLayerOpacity,
            EditAction::SetLayerVisibility { .. } => EditKind::SetLayerVisibility,
            EditAction::RenameLayer { .. } => EditKind::RenameLayer,
            EditAction::SetLayerImage { .. } => EditKind::SetLayerImage,
            EditAction::AddLayer { .. } => EditKind::AddLayer,
            EditAction::RemoveLayer { .. } => EditKind::RemoveLayer,
            EditAction::MoveLayer { .. } => EditKind::MoveLayer,
            EditAction::SetBackground { .. } => EditKind::SetBackground,
        }
    }

    /// Key for debounced edits; `None` for edits that dispatch immediately
    pub fn coalesce_key(&self) -> Option<CoalesceKey> {
        match self {
            EditAction::SetBackground { .. } => Some(CoalesceKey::Background),
            EditAction::SetLayerOpacity { layer, .. } => Some(CoalesceKey::LayerOpacity(*layer)),
            _ => None,
        }
    }

    /// Short human-readable label (used for undo/redo tooltips and logs)
    pub fn description(&self) -> &'static str {
        match self.kind() {
            EditKind::PaintTiles => "Paint tiles",
            EditKind::FillLayer => "Fill layer",
            EditKind::OffsetLayer => "Offset layer",
            EditKind::CropCanvas => "Crop canvas",
            EditKind::SetTileset => "Change tileset",
            EditKind::SetLayerOpacity => "Change layer opacity",
            EditKind::SetLayerVisibility => "Toggle layer visibility",
            EditKind::RenameLayer => "Rename layer",
            EditKind::SetLayerImage => "Change layer image",
            EditKind::AddLayer => "Add layer",
            EditKind::RemoveLayer => "Remove layer",
            EditKind::MoveLayer => "Move layer",
            EditKind::SetBackground => "Change background",
        }
    }
}

/// Restore operation produced by inverting a recorded edit
#[derive(Debug, Clone, PartialEq)]
pub enum InverseAction {
    RestoreTiles { layer: LayerId, patch: TilePatch },
    RestoreBuffer { layer: LayerId, tiles: TileBuffer },
    OffsetLayer { layer: LayerId, dx: i32, dy: i32 },
    RestoreCanvas { canvas: Canvas, buffers: Vec<(LayerId, TileBuffer)> },
    SetTileset(Option<Tileset>),
    RestoreLayerProps { layer: LayerId, props: LayerProps },
    /// Drop a layer and rewind the id counter to `next_layer_id`
    RemoveLayer { layer: LayerId, next_layer_id: u32 },
    InsertLayer { index: usize, layer: TileLayer },
    MoveLayer { layer: LayerId, to: usize },
    SetBackground([u8; 4]),
}

/// Untracked edit of the editor view state
#[derive(Debug, Clone, PartialEq)]
pub enum ViewAction {
    SelectLayer(Option<LayerId>),
    SelectTile(u32),
}
