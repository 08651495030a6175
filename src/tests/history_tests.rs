//! Undo/redo stack discipline across editor actions.

use super::loaded_editor;
use crate::geometry::Rect;
use crate::history::HistoryEntry;
use crate::model::{OverlayDraft, OverlayPatch, Stamp, TextOverlay};

#[test]
fn test_each_action_pushes_one_entry() {
    let mut editor = loaded_editor();
    let a = editor
        .add_text_overlay(OverlayDraft::new(1, 10.0, 10.0, "First"))
        .unwrap();
    editor
        .add_text_overlay(OverlayDraft::new(2, 10.0, 10.0, "Second"))
        .unwrap();
    editor.update_overlay(a, &OverlayPatch::text("First!")).unwrap();
    editor.rotate_page(3, 90).unwrap();
    editor
        .add_stamp(1, Rect::new(300.0, 20.0, 120.0, 40.0), "APPROVED", "#1565c0")
        .unwrap();
    editor.delete_overlay(a);

    let history = editor.store().history();
    assert_eq!(history.undo_count(), 6);
    assert_eq!(history.redo_count(), 0);
}

#[test]
fn test_undo_then_new_action_clears_redo() {
    let mut editor = loaded_editor();
    for text in ["a", "b", "c"] {
        editor
            .add_text_overlay(OverlayDraft::new(1, 0.0, 0.0, text))
            .unwrap();
    }
    assert_eq!(editor.store().history().undo_count(), 3);

    assert!(editor.undo());
    assert_eq!(editor.store().history().undo_count(), 2);
    assert_eq!(editor.store().history().redo_count(), 1);
    assert_eq!(editor.store().items::<TextOverlay>().len(), 2);

    editor
        .add_text_overlay(OverlayDraft::new(1, 0.0, 0.0, "d"))
        .unwrap();
    assert_eq!(editor.store().history().undo_count(), 3);
    assert_eq!(editor.store().history().redo_count(), 0);
    assert!(!editor.redo());
}

#[test]
fn test_passive_changes_are_not_recorded() {
    let mut editor = loaded_editor();
    editor.set_page(2).unwrap();
    editor.set_scale(1.5);
    editor.set_tool(crate::model::Tool::Erase);
    assert!(!editor.can_undo());
}

#[test]
fn test_rejected_action_records_nothing() {
    let mut editor = loaded_editor();
    assert!(editor.add_stamp(1, Rect::new(0.0, 0.0, 0.0, 10.0), "PAID", "#000").is_err());
    assert!(editor.rotate_page(1, 30).is_err());
    assert!(editor.store().items::<Stamp>().is_empty());
    assert!(!editor.can_undo());
    assert_eq!(editor.take_notices().len(), 2);
}

#[test]
fn test_undo_delete_restores_position() {
    let mut editor = loaded_editor();
    let ids: Vec<_> = ["a", "b", "c"]
        .iter()
        .map(|t| {
            editor
                .add_text_overlay(OverlayDraft::new(1, 0.0, 0.0, *t))
                .unwrap()
        })
        .collect();
    editor.delete_overlay(ids[1]);
    assert!(matches!(
        editor.store().history().undo_entries().last(),
        Some(HistoryEntry::Removed { index: 1, .. })
    ));

    editor.undo();
    let texts: Vec<&str> = editor
        .store()
        .items::<TextOverlay>()
        .iter()
        .map(|o| o.text.as_str())
        .collect();
    assert_eq!(texts, vec!["a", "b", "c"]);

    editor.redo();
    assert_eq!(editor.store().items::<TextOverlay>().len(), 2);
}

#[test]
fn test_history_limit_from_config() {
    let mut config = crate::config::EditorConfig::default();
    config.history.max_history = 2;
    let mut editor = crate::Editor::new(&config, crate::session::MemoryStorage::new());
    editor.load_document(super::DOC, 1);
    for text in ["a", "b", "c"] {
        editor
            .add_text_overlay(OverlayDraft::new(1, 0.0, 0.0, text))
            .unwrap();
    }
    assert_eq!(editor.store().history().undo_count(), 2);
    assert!(editor.undo());
    assert!(editor.undo());
    assert!(!editor.undo());
    assert_eq!(editor.store().items::<TextOverlay>().len(), 1);
}
