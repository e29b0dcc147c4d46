//! Engine scenarios across the whole dispatch path.

use super::{Action, DispatchOutcome, HISTORY_LIMIT, HistoryEngine, HistoryError, Snapshot};
use crate::document::{
    Canvas, Document, EditAction, ImageRef, LayerId, TileWrite, Tileset, ViewAction,
};

fn small_doc() -> Document {
    Document::new(Canvas {
        width: 4,
        height: 4,
        ..Canvas::default()
    })
}

fn engine() -> HistoryEngine {
    HistoryEngine::new(HISTORY_LIMIT, true)
}

fn edit(engine: &mut HistoryEngine, doc: &mut Document, action: EditAction) -> DispatchOutcome {
    engine.dispatch(doc, Action::Edit(action)).unwrap()
}

fn undo(engine: &mut HistoryEngine, doc: &mut Document) -> DispatchOutcome {
    engine.dispatch(doc, Action::HistoryUndo).unwrap()
}

fn redo(engine: &mut HistoryEngine, doc: &mut Document) -> DispatchOutcome {
    engine.dispatch(doc, Action::HistoryRedo).unwrap()
}

#[test]
fn test_paint_tile_undo_redo() {
    let mut engine = engine();
    let mut doc = small_doc();
    assert_eq!(doc.layers[0].tiles.get(5), Some(0));

    let outcome = edit(&mut engine, &mut doc, EditAction::paint_tile(LayerId(1), 5, 7));
    assert_eq!(outcome, DispatchOutcome::Recorded);
    assert_eq!(engine.undo_len(), 1);

    let entry = engine.log().peek_undo().unwrap();
    let Some(Snapshot::Tiles { layer, patch }) = &entry.before else {
        panic!("paint should record a tile snapshot");
    };
    assert_eq!(*layer, LayerId(1));
    assert_eq!(patch.iter().collect::<Vec<_>>(), vec![(5, 0)]);

    assert_eq!(undo(&mut engine, &mut doc), DispatchOutcome::Undone);
    assert_eq!(doc.layers[0].tiles.get(5), Some(0));
    assert_eq!(engine.undo_len(), 0);
    assert_eq!(engine.redo_len(), 1);

    assert_eq!(redo(&mut engine, &mut doc), DispatchOutcome::Redone);
    assert_eq!(doc.layers[0].tiles.get(5), Some(7));
    assert_eq!(engine.undo_len(), 1);
    assert_eq!(engine.redo_len(), 0);
}

#[test]
fn test_new_edit_after_undo_discards_redo() {
    let mut engine = engine();
    let mut doc = small_doc();

    edit(&mut engine, &mut doc, EditAction::paint_tile(LayerId(1), 0, 1));
    edit(&mut engine, &mut doc, EditAction::FillLayer { layer: LayerId(1), value: 2 });
    edit(&mut engine, &mut doc, EditAction::SetBackground { color: [9, 9, 9, 255] });

    undo(&mut engine, &mut doc);
    undo(&mut engine, &mut doc);
    assert_eq!(engine.redo_len(), 2);

    edit(&mut engine, &mut doc, EditAction::AddLayer { name: "Top".into() });
    assert_eq!(engine.redo_len(), 0);
    assert_eq!(engine.undo_len(), 2);
    assert!(!engine.can_redo());
}

fn every_edit() -> Vec<EditAction> {
    vec![
        EditAction::PaintTiles {
            layer: LayerId(1),
            writes: vec![TileWrite::new(0, 3), TileWrite::new(7, 4), TileWrite::new(0, 5)],
        },
        EditAction::FillLayer { layer: LayerId(1), value: 6 },
        EditAction::OffsetLayer { layer: LayerId(1), dx: 8, dy: -16 },
        EditAction::CropCanvas { x: 1, y: 1, width: 2, height: 3 },
        EditAction::SetTileset {
            tileset: Some(Tileset::from_dimensions(ImageRef::new("tiles.png"), 64, 32, 16, 16).unwrap()),
        },
        EditAction::SetLayerOpacity { layer: LayerId(1), opacity: 0.25 },
        EditAction::SetLayerVisibility { layer: LayerId(1), visible: false },
        EditAction::RenameLayer { layer: LayerId(1), name: "Ground".into() },
        EditAction::SetLayerImage { layer: LayerId(1), image: Some(ImageRef::new("sky.png")) },
        EditAction::AddLayer { name: "Decor".into() },
        EditAction::RemoveLayer { layer: LayerId(1) },
        EditAction::MoveLayer { layer: LayerId(1), to: 1 },
        EditAction::SetBackground { color: [10, 20, 30, 255] },
    ]
}

/// Document with two painted layers so every edit has something to change
fn busy_doc() -> Document {
    let mut doc = small_doc();
    doc.apply(&EditAction::AddLayer { name: "Second".into() }).unwrap();
    let writes: Vec<_> = (0..16).map(|i| TileWrite::new(i, i as u32 % 3)).collect();
    doc.apply(&EditAction::PaintTiles { layer: LayerId(1), writes }).unwrap();
    doc
}

#[test]
fn test_round_trip_for_every_edit() {
    for action in every_edit() {
        let mut engine = engine();
        let mut doc = busy_doc();
        let s0 = doc.clone();

        edit(&mut engine, &mut doc, action.clone());
        let s1 = doc.clone();
        assert_ne!(s0, s1, "{:?} should change the document", action.kind());

        undo(&mut engine, &mut doc);
        assert_eq!(doc, s0, "undo of {:?} should restore the original", action.kind());

        redo(&mut engine, &mut doc);
        assert_eq!(doc, s1, "redo of {:?} should reproduce the edit", action.kind());
    }
}

#[test]
fn test_full_sequence_unwinds() {
    let mut engine = engine();
    let mut doc = busy_doc();
    let original = doc.clone();

    let mut states = vec![];
    for action in every_edit() {
        // Skip edits invalidated by earlier ones (crop shrinks, remove drops L1)
        if engine.dispatch(&mut doc, Action::Edit(action)).is_ok() {
            states.push(doc.clone());
        }
    }
    assert_eq!(engine.undo_len(), states.len());

    while engine.can_undo() {
        undo(&mut engine, &mut doc);
    }
    assert_eq!(doc, original);

    for expected in &states {
        redo(&mut engine, &mut doc);
        assert_eq!(&doc, expected);
    }
}

#[test]
fn test_log_is_bounded() {
    let mut engine = engine();
    let mut doc = small_doc();

    for i in 0..150u32 {
        edit(&mut engine, &mut doc, EditAction::paint_tile(LayerId(1), 0, i + 1));
    }
    assert_eq!(engine.undo_len(), HISTORY_LIMIT);

    // Newest first: values 150 down to 51
    let values: Vec<u32> = engine
        .log()
        .undo_entries()
        .map(|e| match &e.action {
            EditAction::PaintTiles { writes, .. } => writes[0].value,
            _ => unreachable!(),
        })
        .collect();
    let expected: Vec<u32> = (51..=150).rev().collect();
    assert_eq!(values, expected);
}

#[test]
fn test_empty_undo_and_redo_are_noops() {
    let mut engine = engine();
    let mut doc = small_doc();
    let before = doc.clone();

    assert_eq!(undo(&mut engine, &mut doc), DispatchOutcome::Noop);
    assert_eq!(redo(&mut engine, &mut doc), DispatchOutcome::Noop);
    assert!(engine.is_pristine());
    assert_eq!(doc, before);

    edit(&mut engine, &mut doc, EditAction::paint_tile(LayerId(1), 1, 1));
    let log = engine.log().clone();
    assert_eq!(redo(&mut engine, &mut doc), DispatchOutcome::Noop);
    assert_eq!(engine.log(), &log);
}

#[test]
fn test_pristine_tracking() {
    let mut engine = engine();
    let mut doc = small_doc();
    assert!(engine.is_pristine());

    edit(&mut engine, &mut doc, EditAction::paint_tile(LayerId(1), 1, 1));
    assert!(!engine.is_pristine());

    engine.clear();
    assert!(engine.is_pristine());
}

#[test]
fn test_view_actions_are_not_recorded() {
    let mut engine = engine();
    let mut doc = small_doc();

    let outcome = engine
        .dispatch(&mut doc, Action::View(ViewAction::SelectTile(12)))
        .unwrap();
    assert_eq!(outcome, DispatchOutcome::Untracked);
    assert_eq!(doc.view.selected_tile, 12);
    assert!(engine.is_pristine());
}

#[test]
fn test_failed_snapshot_is_not_recorded() {
    let mut engine = engine();
    let mut doc = small_doc();
    let before = doc.clone();

    let result = engine.dispatch(
        &mut doc,
        Action::Edit(EditAction::FillLayer { layer: LayerId(77), value: 1 }),
    );
    assert!(matches!(result, Err(HistoryError::Document(_))));
    assert!(engine.is_pristine());
    assert_eq!(doc, before);
}

#[test]
fn test_failed_apply_is_not_recorded() {
    let mut engine = engine();
    let mut doc = small_doc();

    // Index 99 is captured as out of bounds before the write is attempted
    let result = engine.dispatch(&mut doc, Action::Edit(EditAction::paint_tile(LayerId(1), 99, 1)));
    assert!(result.is_err());

    let result = engine.dispatch(
        &mut doc,
        Action::Edit(EditAction::CropCanvas { x: 0, y: 0, width: 9, height: 9 }),
    );
    assert!(result.is_err());
    assert!(engine.is_pristine());
}

#[test]
fn test_offset_near_i32_edge_round_trips() {
    let mut engine = engine();
    let mut doc = small_doc();
    doc.layers[0].offset.x = i32::MAX - 1;

    let result = engine.dispatch(
        &mut doc,
        Action::Edit(EditAction::OffsetLayer { layer: LayerId(1), dx: 5, dy: 0 }),
    );
    assert!(result.is_err());
    assert!(!engine.can_undo());
    assert_eq!(doc.layers[0].offset.x, i32::MAX - 1);

    edit(&mut engine, &mut doc, EditAction::OffsetLayer { layer: LayerId(1), dx: 1, dy: -7 });
    assert_eq!(doc.layers[0].offset.x, i32::MAX);
    assert_eq!(undo(&mut engine, &mut doc), DispatchOutcome::Undone);
    assert_eq!(doc.layers[0].offset.x, i32::MAX - 1);
    assert_eq!(doc.layers[0].offset.y, 0);
    assert_eq!(redo(&mut engine, &mut doc), DispatchOutcome::Redone);
    assert_eq!(doc.layers[0].offset.x, i32::MAX);
    assert_eq!(doc.layers[0].offset.y, -7);
}

#[test]
fn test_add_layer_replay_reuses_id() {
    let mut engine = engine();
    let mut doc = small_doc();

    edit(&mut engine, &mut doc, EditAction::AddLayer { name: "Decor".into() });
    let added = doc.layers.last().map(|l| l.id);
    assert_eq!(added, Some(LayerId(2)));

    undo(&mut engine, &mut doc);
    assert_eq!(doc.layers.len(), 1);
    assert_eq!(doc.next_layer_id(), 2);

    redo(&mut engine, &mut doc);
    assert_eq!(doc.layers.last().map(|l| l.id), added);

    // A later edit that targets the replayed layer still undoes cleanly
    edit(&mut engine, &mut doc, EditAction::paint_tile(LayerId(2), 3, 9));
    undo(&mut engine, &mut doc);
    undo(&mut engine, &mut doc);
    assert_eq!(doc.layers.len(), 1);
}

#[test]
fn test_undo_restores_view_state() {
    let mut engine = engine();
    let mut doc = small_doc();
    doc.apply(&EditAction::AddLayer { name: "Top".into() }).unwrap();
    engine
        .dispatch(&mut doc, Action::View(ViewAction::SelectLayer(Some(LayerId(2)))))
        .unwrap();

    edit(&mut engine, &mut doc, EditAction::RemoveLayer { layer: LayerId(2) });
    assert_eq!(doc.view.active_layer, None);

    undo(&mut engine, &mut doc);
    assert_eq!(doc.view.active_layer, Some(LayerId(2)));
}

#[test]
fn test_view_restore_can_be_disabled() {
    let mut engine = HistoryEngine::new(HISTORY_LIMIT, false);
    let mut doc = small_doc();

    edit(&mut engine, &mut doc, EditAction::RemoveLayer { layer: LayerId(1) });
    assert!(engine.log().peek_undo().unwrap().view.is_none());

    undo(&mut engine, &mut doc);
    assert_eq!(doc.layers.len(), 1);
    assert_eq!(doc.view.active_layer, None);
}

#[test]
fn test_redo_refuses_diverged_document() {
    let mut engine = engine();
    let mut doc = small_doc();

    edit(&mut engine, &mut doc, EditAction::FillLayer { layer: LayerId(1), value: 3 });
    undo(&mut engine, &mut doc);

    // Written behind the engine's back
    doc.apply(&EditAction::paint_tile(LayerId(1), 0, 8)).unwrap();

    let result = engine.dispatch(&mut doc, Action::HistoryRedo);
    assert!(matches!(result, Err(HistoryError::BaselineDiverged { .. })));
    assert_eq!(engine.redo_len(), 1);
}

#[test]
fn test_lowering_limit_drops_oldest() {
    let mut engine = engine();
    let mut doc = small_doc();
    for i in 0..10 {
        edit(&mut engine, &mut doc, EditAction::paint_tile(LayerId(1), i, 1));
    }
    engine.set_limit(4);
    assert_eq!(engine.undo_len(), 4);
    assert_eq!(engine.undo_description(), Some("Paint tiles"));
    assert_eq!(engine.redo_description(), None);
}
