//! Flat tile-index storage for a single layer.
//!
//! A [`TileBuffer`] is a fixed-size array of tile indices addressed by linear
//! index (`y * width + x`). Index value `0` means "no tile"; any other value
//! `n` refers to tile `n - 1` of the document tileset.
//!
//! [`TilePatch`] is a sparse copy of selected buffer cells. Patches are always
//! built by copying values out of a buffer, never by borrowing it, so a patch
//! held in the undo history cannot observe later edits to the layer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::DocumentError;

/// Tile index that marks an empty cell
pub const EMPTY_TILE: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileBuffer {
    tiles: Vec<u32>,
}

impl TileBuffer {
    /// Create a buffer of `len` empty cells
    pub fn new(len: usize) -> Self {
        Self {
            tiles: vec![EMPTY_TILE; len],
        }
    }

    pub fn from_vec(tiles: Vec<u32>) -> Self {
        Self { tiles }
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.tiles
    }

    pub fn get(&self, index: usize) -> Option<u32> {
        self.tiles.get(index).copied()
    }

    fn check_index(&self, index: usize) -> Result<(), DocumentError> {
        if index < self.tiles.len() {
            Ok(())
        } else {
            Err(DocumentError::TileIndexOutOfBounds {
                index,
                len: self.tiles.len(),
            })
        }
    }

    /// Set a single cell, returning its previous value
    pub fn set(&mut self, index: usize, value: u32) -> Result<u32, DocumentError> {
        self.check_index(index)?;
        Ok(std::mem::replace(&mut self.tiles[index], value))
    }

    /// Write several cells. All indices are validated before any cell changes.
    pub fn write_all(&mut self, writes: &[TileWrite]) -> Result<(), DocumentError> {
        for write in writes {
            self.check_index(write.index)?;
        }
        for write in writes {
            self.tiles[write.index] = write.value;
        }
        Ok(())
    }

    pub fn fill(&mut self, value: u32) {
        self.tiles.fill(value);
    }

    /// Copy the current values at `indices` into a new patch.
    ///
    /// Fails without copying anything if any index is out of bounds.
    pub fn capture<I>(&self, indices: I) -> Result<TilePatch, DocumentError>
    where
        I: IntoIterator<Item = usize>,
    {
        let mut cells = BTreeMap::new();
        for index in indices {
            self.check_index(index)?;
            cells.insert(index, self.tiles[index]);
        }
        Ok(TilePatch { cells })
    }

    /// Write a patch back into the buffer. All indices are validated first.
    pub fn apply_patch(&mut self, patch: &TilePatch) -> Result<(), DocumentError> {
        for &index in patch.cells.keys() {
            self.check_index(index)?;
        }
        for (&index, &value) in &patch.cells {
            self.tiles[index] = value;
        }
        Ok(())
    }

    /// Extract the `width` x `height` rectangle at (`x`, `y`) of a buffer laid
    /// out with `row_width` cells per row.
    ///
    /// The caller is responsible for checking the rectangle lies inside the
    /// source grid.
    pub fn cropped(&self, row_width: u32, x: u32, y: u32, width: u32, height: u32) -> TileBuffer {
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for row in y..y + height {
            let start = (row * row_width + x) as usize;
            tiles.extend_from_slice(&self.tiles[start..start + width as usize]);
        }
        TileBuffer { tiles }
    }
}

/// A single cell write: put `value` at linear `index`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileWrite {
    pub index: usize,
    pub value: u32,
}

impl TileWrite {
    pub fn new(index: usize, value: u32) -> Self {
        Self { index, value }
    }
}

/// Sparse copy of buffer cells, keyed by linear index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TilePatch {
    cells: BTreeMap<usize, u32>,
}

impl TilePatch {
    pub fn get(&self, index: usize) -> Option<u32> {
        self.cells.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.cells.iter().map(|(&index, &value)| (index, value))
    }
}

impl FromIterator<(usize, u32)> for TilePatch {
    fn from_iter<T: IntoIterator<Item = (usize, u32)>>(iter: T) -> Self {
        Self {
            cells: iter.into_iter().collect(),
        }
    }
}
