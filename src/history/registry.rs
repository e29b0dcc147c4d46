//! Revert registry: how each trackable edit is snapshotted and inverted.
//!
//! [`revert_for`] is an exhaustive match over [`EditKind`]. A new edit variant
//! does not compile until it has an arm here.
//!
//! Snapshot functions run against the document *before* the edit is applied
//! and copy every value they keep. Invert functions are pure: they look only
//! at the recorded edit and its snapshot.

use crate::document::{
    Canvas, Document, DocumentError, EditAction, EditKind, InverseAction, LayerId, LayerProps,
    TileBuffer, TileLayer, TilePatch, Tileset,
};

use super::HistoryError;

/// Pre-edit state captured for a log entry
#[derive(Debug, Clone, PartialEq)]
pub enum Snapshot {
    /// Prior values of the cells a paint touches
    Tiles { layer: LayerId, patch: TilePatch },
    /// Full copy of one layer's tiles
    Buffer { layer: LayerId, tiles: TileBuffer },
    /// Canvas geometry plus a copy of every layer's tiles
    Canvas {
        canvas: Canvas,
        buffers: Vec<(LayerId, TileBuffer)>,
    },
    Tileset(Option<Tileset>),
    LayerProps { layer: LayerId, props: LayerProps },
    /// Id counter before a layer was added
    NextLayerId(u32),
    /// Full copy of a removed layer and where it sat
    Layer { index: usize, layer: TileLayer },
    LayerIndex { layer: LayerId, index: usize },
    Background([u8; 4]),
}

impl Snapshot {
    fn shape(&self) -> &'static str {
        match self {
            Snapshot::Tiles { .. } => "Tiles",
            Snapshot::Buffer { .. } => "Buffer",
            Snapshot::Canvas { .. } => "Canvas",
            Snapshot::Tileset(_) => "Tileset",
            Snapshot::LayerProps { .. } => "LayerProps",
            Snapshot::NextLayerId(_) => "NextLayerId",
            Snapshot::Layer { .. } => "Layer",
            Snapshot::LayerIndex { .. } => "LayerIndex",
            Snapshot::Background(_) => "Background",
        }
    }
}

pub type InvertFn = fn(&EditAction, Option<&Snapshot>) -> Result<InverseAction, HistoryError>;
pub type SnapshotFn = fn(&Document, &EditAction) -> Result<Snapshot, HistoryError>;

/// Registry entry for one edit kind
#[derive(Clone, Copy)]
pub struct Revert {
    pub invert: InvertFn,
    pub snapshot: Option<SnapshotFn>,
}

pub fn revert_for(kind: EditKind) -> Revert {
    match kind {
        EditKind::PaintTiles => Revert {
            invert: invert_paint,
            snapshot: Some(capture_painted_cells),
        },
        EditKind::FillLayer => Revert {
            invert: invert_fill,
            snapshot: Some(capture_layer_buffer),
        },
        EditKind::OffsetLayer => Revert {
            invert: invert_offset,
            snapshot: None,
        },
        EditKind::CropCanvas => Revert {
            invert: invert_crop,
            snapshot: Some(capture_canvas),
        },
        EditKind::SetTileset => Revert {
            invert: invert_tileset,
            snapshot: Some(capture_tileset),
        },
        EditKind::SetLayerOpacity
        | EditKind::SetLayerVisibility
        | EditKind::RenameLayer
        | EditKind::SetLayerImage => Revert {
            invert: invert_layer_props,
            snapshot: Some(capture_layer_props),
        },
        EditKind::AddLayer => Revert {
            invert: invert_add_layer,
            snapshot: Some(capture_next_layer_id),
        },
        EditKind::RemoveLayer => Revert {
            invert: invert_remove_layer,
            snapshot: Some(capture_removed_layer),
        },
        EditKind::MoveLayer => Revert {
            invert: invert_move_layer,
            snapshot: Some(capture_layer_index),
        },
        EditKind::SetBackground => Revert {
            invert: invert_background,
            snapshot: Some(capture_background),
        },
    }
}

/// Layer targeted by edits that address a single layer
fn target_layer(action: &EditAction) -> Option<LayerId> {
    match action {
        EditAction::PaintTiles { layer, .. }
        | EditAction::FillLayer { layer, .. }
        | EditAction::OffsetLayer { layer, .. }
        | EditAction::SetLayerOpacity { layer, .. }
        | EditAction::SetLayerVisibility { layer, .. }
        | EditAction::RenameLayer { layer, .. }
        | EditAction::SetLayerImage { layer, .. }
        | EditAction::RemoveLayer { layer }
        | EditAction::MoveLayer { layer, .. } => Some(*layer),
        EditAction::CropCanvas { .. }
        | EditAction::SetTileset { .. }
        | EditAction::AddLayer { .. }
        | EditAction::SetBackground { .. } => None,
    }
}

fn required_layer(doc: &Document, action: &EditAction) -> Result<(usize, LayerId), HistoryError> {
    let id = target_layer(action).ok_or(HistoryError::UntargetedCapture { kind: action.kind() })?;
    Ok((doc.layer_index(id)?, id))
}

// Snapshot functions

fn capture_painted_cells(doc: &Document, action: &EditAction) -> Result<Snapshot, HistoryError> {
    let (index, layer) = required_layer(doc, action)?;
    let writes = match action {
        EditAction::PaintTiles { writes, .. } => writes.as_slice(),
        _ => &[],
    };
    let patch = doc.layers[index]
        .tiles
        .capture(writes.iter().map(|w| w.index))?;
    Ok(Snapshot::Tiles { layer, patch })
}

fn capture_layer_buffer(doc: &Document, action: &EditAction) -> Result<Snapshot, HistoryError> {
    let (index, layer) = required_layer(doc, action)?;
    Ok(Snapshot::Buffer {
        layer,
        tiles: doc.layers[index].tiles.clone(),
    })
}

fn capture_canvas(doc: &Document, _action: &EditAction) -> Result<Snapshot, HistoryError> {
    Ok(Snapshot::Canvas {
        canvas: doc.canvas,
        buffers: doc
            .layers
            .iter()
            .map(|l| (l.id, l.tiles.clone()))
            .collect(),
    })
}

fn capture_tileset(doc: &Document, _action: &EditAction) -> Result<Snapshot, HistoryError> {
    Ok(Snapshot::Tileset(doc.tileset.clone()))
}

fn capture_layer_props(doc: &Document, action: &EditAction) -> Result<Snapshot, HistoryError> {
    let (index, layer) = required_layer(doc, action)?;
    Ok(Snapshot::LayerProps {
        layer,
        props: doc.layers[index].props(),
    })
}

fn capture_next_layer_id(doc: &Document, _action: &EditAction) -> Result<Snapshot, HistoryError> {
    Ok(Snapshot::NextLayerId(doc.next_layer_id()))
}

fn capture_removed_layer(doc: &Document, action: &EditAction) -> Result<Snapshot, HistoryError> {
    let (index, _) = required_layer(doc, action)?;
    Ok(Snapshot::Layer {
        index,
        layer: doc.layers[index].clone(),
    })
}

fn capture_layer_index(doc: &Document, action: &EditAction) -> Result<Snapshot, HistoryError> {
    let (index, layer) = required_layer(doc, action)?;
    Ok(Snapshot::LayerIndex { layer, index })
}

fn capture_background(doc: &Document, _action: &EditAction) -> Result<Snapshot, HistoryError> {
    Ok(Snapshot::Background(doc.canvas.background))
}

// Invert functions

fn require<'a>(action: &EditAction, before: Option<&'a Snapshot>) -> Result<&'a Snapshot, HistoryError> {
    before.ok_or(HistoryError::MissingSnapshot { kind: action.kind() })
}

fn mismatch(action: &EditAction, found: &Snapshot) -> HistoryError {
    HistoryError::SnapshotMismatch {
        kind: action.kind(),
        found: found.shape(),
    }
}

fn invert_paint(action: &EditAction, before: Option<&Snapshot>) -> Result<InverseAction, HistoryError> {
    match require(action, before)? {
        Snapshot::Tiles { layer, patch } => Ok(InverseAction::RestoreTiles {
            layer: *layer,
            patch: patch.clone(),
        }),
        other => Err(mismatch(action, other)),
    }
}

fn invert_fill(action: &EditAction, before: Option<&Snapshot>) -> Result<InverseAction, HistoryError> {
    match require(action, before)? {
        Snapshot::Buffer { layer, tiles } => Ok(InverseAction::RestoreBuffer {
            layer: *layer,
            tiles: tiles.clone(),
        }),
        other => Err(mismatch(action, other)),
    }
}

fn invert_offset(action: &EditAction, _before: Option<&Snapshot>) -> Result<InverseAction, HistoryError> {
    match action {
        EditAction::OffsetLayer { layer, dx, dy } => match (dx.checked_neg(), dy.checked_neg()) {
            (Some(back_x), Some(back_y)) => Ok(InverseAction::OffsetLayer {
                layer: *layer,
                dx: back_x,
                dy: back_y,
            }),
            _ => Err(DocumentError::OffsetOverflow {
                layer: *layer,
                x: 0,
                y: 0,
                dx: *dx,
                dy: *dy,
            }
            .into()),
        },
        _ => Err(HistoryError::MissingSnapshot { kind: action.kind() }),
    }
}

fn invert_crop(action: &EditAction, before: Option<&Snapshot>) -> Result<InverseAction, HistoryError> {
    match require(action, before)? {
        Snapshot::Canvas { canvas, buffers } => Ok(InverseAction::RestoreCanvas {
            canvas: *canvas,
            buffers: buffers.clone(),
        }),
        other => Err(mismatch(action, other)),
    }
}

fn invert_tileset(action: &EditAction, before: Option<&Snapshot>) -> Result<InverseAction, HistoryError> {
    match require(action, before)? {
        Snapshot::Tileset(tileset) => Ok(InverseAction::SetTileset(tileset.clone())),
        other => Err(mismatch(action, other)),
    }
}

fn invert_layer_props(
    action: &EditAction,
    before: Option<&Snapshot>,
) -> Result<InverseAction, HistoryError> {
    match require(action, before)? {
        Snapshot::LayerProps { layer, props } => Ok(InverseAction::RestoreLayerProps {
            layer: *layer,
            props: props.clone(),
        }),
        other => Err(mismatch(action, other)),
    }
}

fn invert_add_layer(action: &EditAction, before: Option<&Snapshot>) -> Result<InverseAction, HistoryError> {
    match require(action, before)? {
        // The added layer received the id the counter held before the edit
        Snapshot::NextLayerId(id) => Ok(InverseAction::RemoveLayer {
            layer: LayerId(*id),
            next_layer_id: *id,
        }),
        other => Err(mismatch(action, other)),
    }
}

fn invert_remove_layer(
    action: &EditAction,
    before: Option<&Snapshot>,
) -> Result<InverseAction, HistoryError> {
    match require(action, before)? {
        Snapshot::Layer { index, layer } => Ok(InverseAction::InsertLayer {
            index: *index,
            layer: layer.clone(),
        }),
        other => Err(mismatch(action, other)),
    }
}

fn invert_move_layer(action: &EditAction, before: Option<&Snapshot>) -> Result<InverseAction, HistoryError> {
    match require(action, before)? {
        Snapshot::LayerIndex { layer, index } => Ok(InverseAction::MoveLayer {
            layer: *layer,
            to: *index,
        }),
        other => Err(mismatch(action, other)),
    }
}

fn invert_background(action: &EditAction, before: Option<&Snapshot>) -> Result<InverseAction, HistoryError> {
    match require(action, before)? {
        Snapshot::Background(color) => Ok(InverseAction::SetBackground(*color)),
        other => Err(mismatch(action, other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::TileWrite;

    fn doc() -> Document {
        Document::new(Canvas {
            width: 4,
            height: 4,
            ..Canvas::default()
        })
    }

    fn all_actions() -> Vec<EditAction> {
        vec![
            EditAction::paint_tile(LayerId(1), 0, 1),
            EditAction::FillLayer {
                layer: LayerId(1),
                value: 2,
            },
            EditAction::OffsetLayer {
                layer: LayerId(1),
                dx: 1,
                dy: 1,
            },
            EditAction::CropCanvas {
                x: 0,
                y: 0,
                width: 2,
                height: 2,
            },
            EditAction::SetTileset { tileset: None },
            EditAction::SetLayerOpacity {
                layer: LayerId(1),
                opacity: 0.5,
            },
            EditAction::SetLayerVisibility {
                layer: LayerId(1),
                visible: false,
            },
            EditAction::RenameLayer {
                layer: LayerId(1),
                name: "x".into(),
            },
            EditAction::SetLayerImage {
                layer: LayerId(1),
                image: None,
            },
            EditAction::AddLayer { name: "y".into() },
            EditAction::RemoveLayer { layer: LayerId(1) },
            EditAction::MoveLayer {
                layer: LayerId(1),
                to: 0,
            },
            EditAction::SetBackground {
                color: [1, 2, 3, 4],
            },
        ]
    }

    #[test]
    fn test_every_snapshot_inverts() {
        let doc = doc();
        for action in all_actions() {
            let revert = revert_for(action.kind());
            let before = revert
                .snapshot
                .map(|capture| capture(&doc, &action).unwrap());
            assert!(
                (revert.invert)(&action, before.as_ref()).is_ok(),
                "{:?} should invert from its own snapshot",
                action.kind()
            );
        }
    }

    #[test]
    fn test_paint_snapshot_holds_prior_values() {
        let mut doc = doc();
        doc.apply(&EditAction::paint_tile(LayerId(1), 5, 3)).unwrap();

        let action = EditAction::PaintTiles {
            layer: LayerId(1),
            writes: vec![TileWrite::new(5, 7), TileWrite::new(6, 7)],
        };
        let before = capture_painted_cells(&doc, &action).unwrap();

        let Snapshot::Tiles { layer, patch } = before else {
            panic!("expected a tile snapshot");
        };
        assert_eq!(layer, LayerId(1));
        assert_eq!(patch.get(5), Some(3));
        assert_eq!(patch.get(6), Some(0));
    }

    #[test]
    fn test_snapshot_of_unknown_layer_fails() {
        let action = EditAction::FillLayer {
            layer: LayerId(42),
            value: 1,
        };
        let capture = revert_for(EditKind::FillLayer).snapshot.unwrap();
        assert!(matches!(
            capture(&doc(), &action),
            Err(HistoryError::Document(DocumentError::UnknownLayer(LayerId(42))))
        ));
    }

    #[test]
    fn test_layer_capture_without_target_is_configuration_fault() {
        let action = EditAction::SetBackground { color: [1, 2, 3, 255] };
        let err = capture_layer_buffer(&doc(), &action).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::UntargetedCapture {
                kind: EditKind::SetBackground
            }
        ));
        assert!(err.is_configuration_fault());
    }

    #[test]
    fn test_offset_inverse_rejects_unnegatable_delta() {
        let action = EditAction::OffsetLayer {
            layer: LayerId(1),
            dx: i32::MIN,
            dy: 0,
        };
        let result = (revert_for(EditKind::OffsetLayer).invert)(&action, None);
        assert!(matches!(
            result,
            Err(HistoryError::Document(DocumentError::OffsetOverflow { dx: i32::MIN, .. }))
        ));
    }

    #[test]
    fn test_offset_needs_no_snapshot() {
        let revert = revert_for(EditKind::OffsetLayer);
        assert!(revert.snapshot.is_none());

        let action = EditAction::OffsetLayer {
            layer: LayerId(1),
            dx: 3,
            dy: -2,
        };
        let inverse = (revert.invert)(&action, None).unwrap();
        assert_eq!(
            inverse,
            InverseAction::OffsetLayer {
                layer: LayerId(1),
                dx: -3,
                dy: 2
            }
        );
    }

    #[test]
    fn test_missing_snapshot_is_configuration_fault() {
        let action = EditAction::paint_tile(LayerId(1), 0, 1);
        let err = (revert_for(EditKind::PaintTiles).invert)(&action, None).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::MissingSnapshot {
                kind: EditKind::PaintTiles
            }
        ));
        assert!(err.is_configuration_fault());
    }

    #[test]
    fn test_mismatched_snapshot_is_configuration_fault() {
        let action = EditAction::paint_tile(LayerId(1), 0, 1);
        let wrong = Snapshot::Background([0; 4]);
        let err = (revert_for(EditKind::PaintTiles).invert)(&action, Some(&wrong)).unwrap_err();
        assert!(matches!(
            err,
            HistoryError::SnapshotMismatch {
                found: "Background",
                ..
            }
        ));
    }

    #[test]
    fn test_add_layer_inverse_targets_allocated_id() {
        let doc = doc();
        let action = EditAction::AddLayer { name: "New".into() };
        let revert = revert_for(EditKind::AddLayer);
        let before = (revert.snapshot.unwrap())(&doc, &action).unwrap();
        let inverse = (revert.invert)(&action, Some(&before)).unwrap();
        assert_eq!(
            inverse,
            InverseAction::RemoveLayer {
                layer: LayerId(2),
                next_layer_id: 2
            }
        );
    }
}
