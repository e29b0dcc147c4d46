//! Unit tests for the persistence module.

use crate::document::{Canvas, Document, EditAction, ImageRef, LayerId, TileBuffer, Tileset};

use super::{PROJECT_FORMAT_VERSION, SavedProject};

fn painted_document() -> Document {
    let mut doc = Document::new(Canvas {
        width: 3,
        height: 2,
        ..Canvas::default()
    });
    doc.apply(&EditAction::paint_tile(LayerId(1), 4, 7)).unwrap();
    doc.apply(&EditAction::AddLayer {
        name: "Decor".to_string(),
    })
    .unwrap();
    doc
}

#[test]
fn test_saved_project_uses_current_version() {
    let project = SavedProject::from_document(&painted_document());
    assert_eq!(project.version, PROJECT_FORMAT_VERSION);
}

#[test]
fn test_project_json_roundtrip() {
    let doc = painted_document();
    let json = SavedProject::from_document(&doc).to_json().unwrap();
    let parsed = SavedProject::from_json(&json).unwrap();

    assert_eq!(parsed.document.layers, doc.layers);
    assert_eq!(parsed.document.canvas, doc.canvas);
    assert_eq!(parsed.document.next_layer_id(), doc.next_layer_id());
}

#[test]
fn test_project_json_has_no_history_or_view() {
    let json = SavedProject::from_document(&painted_document())
        .to_json()
        .unwrap();
    assert!(!json.contains("undo"));
    assert!(!json.contains("active_layer"));
}

#[test]
fn test_newer_version_rejected() {
    let mut project = SavedProject::from_document(&painted_document());
    project.version = PROJECT_FORMAT_VERSION + 1;
    let json = project.to_json().unwrap();

    let err = SavedProject::from_json(&json).unwrap_err();
    assert!(err.contains("newer"));
}

#[test]
fn test_inconsistent_document_rejected() {
    let mut project = SavedProject::from_document(&painted_document());
    project.document.layers[0].tiles = TileBuffer::new(1);
    let json = project.to_json().unwrap();

    let err = SavedProject::from_json(&json).unwrap_err();
    assert!(err.contains("inconsistent"));
}

#[test]
fn test_tileset_with_zero_columns_rejected() {
    let mut tileset = Tileset::from_dimensions(ImageRef::new("a.png"), 64, 64, 16, 16).unwrap();
    tileset.columns = 0;
    let mut project = SavedProject::from_document(&painted_document());
    project.document.tileset = Some(tileset);
    let json = project.to_json().unwrap();

    let err = SavedProject::from_json(&json).unwrap_err();
    assert!(err.contains("inconsistent"));
}

#[test]
fn test_tileset_with_excess_tiles_rejected() {
    let mut tileset = Tileset::from_dimensions(ImageRef::new("a.png"), 64, 32, 16, 16).unwrap();
    tileset.tile_count = 9;
    let mut project = SavedProject::from_document(&painted_document());
    project.document.tileset = Some(tileset);
    let json = project.to_json().unwrap();

    assert!(SavedProject::from_json(&json).is_err());
}

#[test]
fn test_out_of_range_opacity_and_empty_canvas_rejected() {
    let mut project = SavedProject::from_document(&painted_document());
    project.document.layers[1].opacity = 1.5;
    let json = project.to_json().unwrap();
    assert!(SavedProject::from_json(&json).unwrap_err().contains("opacity"));

    let mut project = SavedProject::from_document(&painted_document());
    project.document.canvas.tile_height = 0;
    let json = project.to_json().unwrap();
    assert!(SavedProject::from_json(&json).unwrap_err().contains("inconsistent"));
}

#[test]
fn test_garbage_rejected() {
    let err = SavedProject::from_json("{ not json").unwrap_err();
    assert!(err.starts_with("Failed to parse project file"));
}
