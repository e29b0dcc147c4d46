//! Tileset derived from a single atlas image.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{DocumentError, ImageRef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tileset {
    pub name: String,
    pub image: ImageRef,
    pub image_width: u32,
    pub image_height: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub tile_count: u32,
}

impl Tileset {
    /// Build a tileset by slicing an image of the given size into a grid.
    ///
    /// Partial tiles at the right and bottom edges are ignored, matching how
    /// Tiled slices atlases without margin or spacing.
    pub fn from_dimensions(
        image: ImageRef,
        image_width: u32,
        image_height: u32,
        tile_width: u32,
        tile_height: u32,
    ) -> Result<Self, DocumentError> {
        check_tile_size(image_width, image_height, tile_width, tile_height)?;

        let columns = image_width / tile_width;
        let rows = image_height / tile_height;
        let name = image
            .path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("tileset")
            .to_string();

        Ok(Self {
            name,
            image,
            image_width,
            image_height,
            tile_width,
            tile_height,
            columns,
            tile_count: columns * rows,
        })
    }

    /// Read the image header at `path` and build a tileset from its dimensions
    pub fn from_image(path: &Path, tile_width: u32, tile_height: u32) -> Result<Self, DocumentError> {
        let (width, height) = image::image_dimensions(path)?;
        Self::from_dimensions(ImageRef::new(path), width, height, tile_width, tile_height)
    }

    /// Check a tileset read from disk against its own image dimensions
    pub fn validate(&self) -> Result<(), DocumentError> {
        check_tile_size(self.image_width, self.image_height, self.tile_width, self.tile_height)?;
        let rows = self.image_height / self.tile_height;
        if self.columns != self.image_width / self.tile_width || self.tile_count > self.columns * rows {
            return Err(DocumentError::InconsistentTileset {
                name: self.name.clone(),
                columns: self.columns,
                tile_count: self.tile_count,
            });
        }
        Ok(())
    }
}

fn check_tile_size(
    image_width: u32,
    image_height: u32,
    tile_width: u32,
    tile_height: u32,
) -> Result<(), DocumentError> {
    if tile_width == 0 || tile_height == 0 || tile_width > image_width || tile_height > image_height {
        return Err(DocumentError::InvalidTileSize {
            tile_width,
            tile_height,
            image_width,
            image_height,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tileset {
        Tileset::from_dimensions(ImageRef::new("art/dungeon.png"), 64, 48, 16, 16).unwrap()
    }

    #[test]
    fn test_grid_dimensions() {
        let tileset = sample();
        assert_eq!(tileset.columns, 4);
        assert_eq!(tileset.tile_count, 12);
        assert_eq!(tileset.name, "dungeon");
    }

    #[test]
    fn test_partial_tiles_ignored() {
        let tileset =
            Tileset::from_dimensions(ImageRef::new("a.png"), 70, 40, 16, 16).unwrap();
        assert_eq!(tileset.columns, 4);
        assert_eq!(tileset.tile_count, 8);
    }

    #[test]
    fn test_zero_tile_size_rejected() {
        let result = Tileset::from_dimensions(ImageRef::new("a.png"), 64, 64, 0, 16);
        assert!(matches!(result, Err(DocumentError::InvalidTileSize { .. })));
    }

    #[test]
    fn test_tile_larger_than_image_rejected() {
        let result = Tileset::from_dimensions(ImageRef::new("a.png"), 8, 8, 16, 16);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_accepts_sliced_tileset() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_inconsistent_grid() {
        let mut tileset = sample();
        tileset.columns = 0;
        assert!(matches!(
            tileset.validate(),
            Err(DocumentError::InconsistentTileset { columns: 0, .. })
        ));

        let mut tileset = sample();
        tileset.tile_count = 13;
        assert!(tileset.validate().is_err());

        let mut tileset = sample();
        tileset.tile_height = 0;
        assert!(matches!(
            tileset.validate(),
            Err(DocumentError::InvalidTileSize { .. })
        ));
    }

    #[test]
    fn test_from_image_missing_file() {
        let result = Tileset::from_image(Path::new("does/not/exist.png"), 16, 16);
        assert!(matches!(result, Err(DocumentError::Image(_))));
    }
}
