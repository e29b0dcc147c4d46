use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::actions::{EditAction, InverseAction, ViewAction};
use super::{DocumentError, LayerId, LayerOffset, TileBuffer, TileLayer, Tileset, clamp_opacity};

/// Canvas geometry and background
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    /// Width in tiles
    pub width: u32,
    /// Height in tiles
    pub height: u32,
    /// Tile width in pixels
    pub tile_width: u32,
    /// Tile height in pixels
    pub tile_height: u32,
    /// Straight RGBA background color
    pub background: [u8; 4],
}

impl Canvas {
    pub fn tile_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Linear buffer index of the cell at (`x`, `y`)
    pub fn index_of(&self, x: u32, y: u32) -> Option<usize> {
        if x < self.width && y < self.height {
            Some((y as usize) * (self.width as usize) + x as usize)
        } else {
            None
        }
    }
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 32,
            height: 32,
            tile_width: 16,
            tile_height: 16,
            background: [0, 0, 0, 0],
        }
    }
}

/// Editor view state that lives beside the document data.
///
/// Not persisted. The history restores it on undo so the user lands back on
/// the layer and tile they were using before the edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorView {
    pub active_layer: Option<LayerId>,
    /// Tile index used by the brush (0 erases)
    pub selected_tile: u32,
}

/// `offset` moved by (`dx`, `dy`).
///
/// Fails rather than clamping, and also when a delta has no negation, so an
/// applied offset can always be undone exactly.
fn shifted_offset(layer: LayerId, offset: LayerOffset, dx: i32, dy: i32) -> Result<LayerOffset, DocumentError> {
    let shift = |value: i32, delta: i32| delta.checked_neg().and_then(|_| value.checked_add(delta));
    match (shift(offset.x, dx), shift(offset.y, dy)) {
        (Some(x), Some(y)) => Ok(LayerOffset { x, y }),
        _ => Err(DocumentError::OffsetOverflow {
            layer,
            x: offset.x,
            y: offset.y,
            dx,
            dy,
        }),
    }
}

/// The tile map being edited
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub canvas: Canvas,
    /// Layers in draw order (index 0 is drawn first)
    pub layers: Vec<TileLayer>,
    #[serde(default)]
    pub tileset: Option<Tileset>,
    next_layer_id: u32,
    #[serde(skip)]
    pub view: EditorView,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(Canvas::default())
    }
}

impl Document {
    /// Create a document with a single empty layer
    pub fn new(canvas: Canvas) -> Self {
        let first = TileLayer::new(LayerId(1), "Layer 1", canvas.tile_count());
        Self {
            name: "Untitled Map".to_string(),
            canvas,
            layers: vec![first],
            tileset: None,
            next_layer_id: 2,
            view: EditorView {
                active_layer: Some(LayerId(1)),
                selected_tile: 1,
            },
        }
    }

    pub fn tile_count(&self) -> usize {
        self.canvas.tile_count()
    }

    /// Id the next added layer will receive
    pub fn next_layer_id(&self) -> u32 {
        self.next_layer_id
    }

    pub fn layer(&self, id: LayerId) -> Result<&TileLayer, DocumentError> {
        self.layers
            .iter()
            .find(|l| l.id == id)
            .ok_or(DocumentError::UnknownLayer(id))
    }

    pub fn layer_mut(&mut self, id: LayerId) -> Result<&mut TileLayer, DocumentError> {
        self.layers
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(DocumentError::UnknownLayer(id))
    }

    pub fn layer_index(&self, id: LayerId) -> Result<usize, DocumentError> {
        self.layers
            .iter()
            .position(|l| l.id == id)
            .ok_or(DocumentError::UnknownLayer(id))
    }

    pub fn view_state(&self) -> EditorView {
        self.view.clone()
    }

    pub fn set_view_state(&mut self, view: EditorView) {
        self.view = view;
    }

    fn check_buffer(&self, tiles: &TileBuffer) -> Result<(), DocumentError> {
        if tiles.len() == self.tile_count() {
            Ok(())
        } else {
            Err(DocumentError::BufferSizeMismatch {
                expected: self.tile_count(),
                actual: tiles.len(),
            })
        }
    }

    fn check_layer_slot(&self, index: usize, count: usize) -> Result<(), DocumentError> {
        if index < count {
            Ok(())
        } else {
            Err(DocumentError::LayerIndexOutOfBounds { index, count })
        }
    }

    fn move_layer(&mut self, id: LayerId, to: usize) -> Result<(), DocumentError> {
        let from = self.layer_index(id)?;
        self.check_layer_slot(to, self.layers.len())?;
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        Ok(())
    }

    fn remove_layer(&mut self, id: LayerId) -> Result<TileLayer, DocumentError> {
        let index = self.layer_index(id)?;
        if self.view.active_layer == Some(id) {
            self.view.active_layer = None;
        }
        Ok(self.layers.remove(index))
    }

    /// Apply a forward edit. Validation happens before anything is mutated,
    /// so an error leaves the document unchanged.
    pub fn apply(&mut self, action: &EditAction) -> Result<(), DocumentError> {
        match action {
            EditAction::PaintTiles { layer, writes } => {
                self.layer_mut(*layer)?.tiles.write_all(writes)?;
            }
            EditAction::FillLayer { layer, value } => {
                self.layer_mut(*layer)?.tiles.fill(*value);
            }
            EditAction::OffsetLayer { layer, dx, dy } => {
                let target = self.layer_mut(*layer)?;
                target.offset = shifted_offset(*layer, target.offset, *dx, *dy)?;
            }
            EditAction::CropCanvas {
                x,
                y,
                width,
                height,
            } => {
                let fits = *width > 0
                    && *height > 0
                    && x.checked_add(*width).is_some_and(|r| r <= self.canvas.width)
                    && y.checked_add(*height).is_some_and(|b| b <= self.canvas.height);
                if !fits {
                    return Err(DocumentError::InvalidCrop {
                        x: *x,
                        y: *y,
                        width: *width,
                        height: *height,
                        canvas_width: self.canvas.width,
                        canvas_height: self.canvas.height,
                    });
                }
                let row_width = self.canvas.width;
                for layer in &mut self.layers {
                    layer.tiles = layer.tiles.cropped(row_width, *x, *y, *width, *height);
                }
                self.canvas.width = *width;
                self.canvas.height = *height;
            }
            EditAction::SetTileset { tileset } => {
                self.tileset = tileset.clone();
            }
            EditAction::SetLayerOpacity { layer, opacity } => {
                self.layer_mut(*layer)?.opacity = clamp_opacity(*opacity);
            }
            EditAction::SetLayerVisibility { layer, visible } => {
                self.layer_mut(*layer)?.visible = *visible;
            }
            EditAction::RenameLayer { layer, name } => {
                self.layer_mut(*layer)?.name = name.clone();
            }
            EditAction::SetLayerImage { layer, image } => {
                self.layer_mut(*layer)?.image = image.clone();
            }
            EditAction::AddLayer { name } => {
                let id = LayerId(self.next_layer_id);
                self.next_layer_id += 1;
                self.layers.push(TileLayer::new(id, name.clone(), self.tile_count()));
            }
            EditAction::RemoveLayer { layer } => {
                self.remove_layer(*layer)?;
            }
            EditAction::MoveLayer { layer, to } => {
                self.move_layer(*layer, *to)?;
            }
            EditAction::SetBackground { color } => {
                self.canvas.background = *color;
            }
        }
        Ok(())
    }

    /// Apply a restore operation built by the undo history
    pub fn apply_inverse(&mut self, inverse: &InverseAction) -> Result<(), DocumentError> {
        match inverse {
            InverseAction::RestoreTiles { layer, patch } => {
                self.layer_mut(*layer)?.tiles.apply_patch(patch)?;
            }
            InverseAction::RestoreBuffer { layer, tiles } => {
                self.check_buffer(tiles)?;
                self.layer_mut(*layer)?.tiles = tiles.clone();
            }
            InverseAction::OffsetLayer { layer, dx, dy } => {
                self.apply(&EditAction::OffsetLayer {
                    layer: *layer,
                    dx: *dx,
                    dy: *dy,
                })?;
            }
            InverseAction::RestoreCanvas { canvas, buffers } => {
                for (id, tiles) in buffers {
                    self.layer(*id)?;
                    if tiles.len() != canvas.tile_count() {
                        return Err(DocumentError::BufferSizeMismatch {
                            expected: canvas.tile_count(),
                            actual: tiles.len(),
                        });
                    }
                }
                for (id, tiles) in buffers {
                    self.layer_mut(*id)?.tiles = tiles.clone();
                }
                self.canvas = *canvas;
            }
            InverseAction::SetTileset(tileset) => {
                self.tileset = tileset.clone();
            }
            InverseAction::RestoreLayerProps { layer, props } => {
                self.layer_mut(*layer)?.set_props(props.clone());
            }
            InverseAction::RemoveLayer {
                layer,
                next_layer_id,
            } => {
                self.remove_layer(*layer)?;
                self.next_layer_id = *next_layer_id;
            }
            InverseAction::InsertLayer { index, layer } => {
                self.check_layer_slot(*index, self.layers.len() + 1)?;
                self.check_buffer(&layer.tiles)?;
                self.layers.insert(*index, layer.clone());
            }
            InverseAction::MoveLayer { layer, to } => {
                self.move_layer(*layer, *to)?;
            }
            InverseAction::SetBackground(color) => {
                self.canvas.background = *color;
            }
        }
        Ok(())
    }

    /// Apply an untracked view change
    pub fn apply_view(&mut self, action: &ViewAction) -> Result<(), DocumentError> {
        match action {
            ViewAction::SelectLayer(layer) => {
                if let Some(id) = layer {
                    self.layer(*id)?;
                }
                self.view.active_layer = *layer;
            }
            ViewAction::SelectTile(tile) => {
                self.view.selected_tile = *tile;
            }
        }
        Ok(())
    }

    /// Check structural invariants of a document read from disk
    pub fn validate(&self) -> Result<(), DocumentError> {
        let canvas = &self.canvas;
        if canvas.width == 0 || canvas.height == 0 || canvas.tile_width == 0 || canvas.tile_height == 0 {
            return Err(DocumentError::InvalidCanvas {
                width: canvas.width,
                height: canvas.height,
                tile_width: canvas.tile_width,
                tile_height: canvas.tile_height,
            });
        }
        if let Some(tileset) = &self.tileset {
            tileset.validate()?;
        }

        let mut seen = HashSet::new();
        for layer in &self.layers {
            self.check_buffer(&layer.tiles)?;
            if !(0.0..=1.0).contains(&layer.opacity) {
                // NaN fails the range check too
                return Err(DocumentError::InvalidOpacity {
                    layer: layer.id,
                    opacity: layer.opacity,
                });
            }
            if !seen.insert(layer.id) || layer.id.0 >= self.next_layer_id {
                // Duplicate or unallocated ids would break AddLayer replay
                return Err(DocumentError::InvalidLayerId(layer.id));
            }
        }
        Ok(())
    }
}
