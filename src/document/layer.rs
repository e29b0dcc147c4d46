use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use super::TileBuffer;

/// Stable identifier of a tile layer, unique within a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u32);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Reference to an external image file (tileset atlas or layer raster)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub path: PathBuf,
}

impl ImageRef {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File name for display, falling back to the full path
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
            .unwrap_or_else(|| self.path.to_string_lossy().into_owned())
    }
}

/// Pixel offset of a layer relative to the canvas origin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerOffset {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileLayer {
    pub id: LayerId,
    pub name: String,
    pub tiles: TileBuffer,
    #[serde(default)]
    pub offset: LayerOffset,
    pub opacity: f32,
    pub visible: bool,
    /// Optional raster image drawn with the layer
    #[serde(default)]
    pub image: Option<ImageRef>,
}

impl TileLayer {
    pub fn new(id: LayerId, name: impl Into<String>, tile_count: usize) -> Self {
        Self {
            id,
            name: name.into(),
            tiles: TileBuffer::new(tile_count),
            offset: LayerOffset::default(),
            opacity: 1.0,
            visible: true,
            image: None,
        }
    }

    /// Copy of the scalar properties (everything except tiles and offset)
    pub fn props(&self) -> LayerProps {
        LayerProps {
            name: self.name.clone(),
            opacity: self.opacity,
            visible: self.visible,
            image: self.image.clone(),
        }
    }

    pub fn set_props(&mut self, props: LayerProps) {
        self.name = props.name;
        self.opacity = props.opacity;
        self.visible = props.visible;
        self.image = props.image;
    }
}

/// Scalar layer properties restored as a unit on undo
#[derive(Debug, Clone, PartialEq)]
pub struct LayerProps {
    pub name: String,
    pub opacity: f32,
    pub visible: bool,
    pub image: Option<ImageRef>,
}

/// Clamp an opacity value into `0.0..=1.0`, mapping NaN to fully opaque
pub fn clamp_opacity(opacity: f32) -> f32 {
    if opacity.is_nan() {
        1.0
    } else {
        opacity.clamp(0.0, 1.0)
    }
}
