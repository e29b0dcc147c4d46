//! Batching of pointer paint writes into a single undo step.

use bevy::prelude::*;
use std::collections::BTreeMap;

use crate::document::{EditAction, LayerId, TileBuffer, TileWrite};

/// A paint stroke in progress.
///
/// Writes are shown immediately as a preview by the canvas but only reach
/// the document, as one `PaintTiles` edit, when the stroke finishes.
#[derive(Resource, Debug, Default)]
pub struct PaintStroke {
    layer: Option<LayerId>,
    /// Cell index to tile value, last write wins
    cells: BTreeMap<usize, u32>,
}

impl PaintStroke {
    /// Start a stroke on `layer`, discarding any unfinished one
    pub fn begin(&mut self, layer: LayerId) {
        self.layer = Some(layer);
        self.cells.clear();
    }

    pub fn is_active(&self) -> bool {
        self.layer.is_some()
    }

    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }

    /// Record a write. Ignored when no stroke is active.
    pub fn add(&mut self, index: usize, value: u32) {
        if self.layer.is_some() {
            self.cells.insert(index, value);
        }
    }

    /// Pending value of a cell, for previewing the stroke
    pub fn preview(&self, index: usize) -> Option<u32> {
        self.cells.get(&index).copied()
    }

    /// End the stroke.
    ///
    /// Returns the edit to dispatch, or `None` when every write matches what
    /// `tiles` already holds.
    pub fn finish(&mut self, tiles: &TileBuffer) -> Option<EditAction> {
        let layer = self.layer.take()?;
        let writes: Vec<TileWrite> = std::mem::take(&mut self.cells)
            .into_iter()
            .filter(|(index, value)| tiles.get(*index) != Some(*value))
            .map(|(index, value)| TileWrite::new(index, value))
            .collect();

        if writes.is_empty() {
            None
        } else {
            Some(EditAction::PaintTiles { layer, writes })
        }
    }

    /// Abandon the stroke without dispatching
    pub fn cancel(&mut self) {
        self.layer = None;
        self.cells.clear();
    }
}
