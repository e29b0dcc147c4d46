//! Error type for document mutations.

use thiserror::Error;

use super::LayerId;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Unknown layer {0}")]
    UnknownLayer(LayerId),

    #[error("Layer id {0} is duplicated or was never allocated")]
    InvalidLayerId(LayerId),

    #[error("Tile index {index} out of bounds (buffer holds {len} tiles)")]
    TileIndexOutOfBounds { index: usize, len: usize },

    #[error("Layer index {index} out of bounds ({count} layers)")]
    LayerIndexOutOfBounds { index: usize, count: usize },

    #[error("Tile buffer holds {actual} tiles, expected {expected}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("Crop {width}x{height} at ({x}, {y}) does not fit a {canvas_width}x{canvas_height} canvas")]
    InvalidCrop {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
        canvas_width: u32,
        canvas_height: u32,
    },

    #[error("Invalid tile size {tile_width}x{tile_height} for a {image_width}x{image_height} image")]
    InvalidTileSize {
        tile_width: u32,
        tile_height: u32,
        image_width: u32,
        image_height: u32,
    },

    #[error("Offset ({x}, {y}) of layer {layer} moved by ({dx}, {dy}) leaves the i32 range")]
    OffsetOverflow {
        layer: LayerId,
        x: i32,
        y: i32,
        dx: i32,
        dy: i32,
    },

    #[error("Tileset {name} has {tile_count} tiles in {columns} columns, inconsistent with its image")]
    InconsistentTileset {
        name: String,
        columns: u32,
        tile_count: u32,
    },

    #[error("Layer {layer} opacity {opacity} is outside 0..=1")]
    InvalidOpacity { layer: LayerId, opacity: f32 },

    #[error("Canvas {width}x{height} of {tile_width}x{tile_height} px tiles has a zero dimension")]
    InvalidCanvas {
        width: u32,
        height: u32,
        tile_width: u32,
        tile_height: u32,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}
