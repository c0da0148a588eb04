use super::*;
use crate::resource::{ResourceKind, ResourceRef, Snapshot};

fn session(data: &[(&str, &str)]) -> EditSession {
    let resource = ResourceRef {
        kind: ResourceKind::Config,
        name: String::from("web"),
        namespace: String::from("default"),
    };
    let data = data
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    EditSession::load(Snapshot::new(resource, data))
}

#[test]
fn test_preview_masks_and_escapes() {
    assert_eq!(preview("hunter2", true), SECRET_MASK);
    assert_eq!(preview("a\nb\tc", false), "a\\nb\\tc");
    assert_eq!(preview("", false), "");
}

#[test]
fn test_preview_truncates_long_values() {
    let long = "x".repeat(MAX_VALUE_PREVIEW + 10);
    let shown = preview(&long, false);

    assert_eq!(shown.chars().count(), MAX_VALUE_PREVIEW);
    assert!(shown.ends_with('…'));

    let exact = "y".repeat(MAX_VALUE_PREVIEW);
    assert_eq!(preview(&exact, false), exact);
}

#[test]
fn test_size_and_change_labels() {
    assert_eq!(size_label("a"), "1 byte");
    assert_eq!(size_label(&"a".repeat(12_345)), "12,345 bytes");
    assert_eq!(changes_label(0), "no pending changes");
    assert_eq!(changes_label(1), "1 pending change");
    assert_eq!(changes_label(1_200), "1,200 pending changes");
    assert_eq!(count_label(3, "change"), "3 changes");
}

#[test]
fn test_entry_lines_align_keys() {
    let mut session = session(&[("A", "1"), ("LONG_KEY", "2")]);
    session.add("NEW", "3").unwrap();
    session.delete("A").unwrap();

    let lines = entry_lines(&session, false);

    assert_eq!(
        lines,
        [
            "- A         1",
            "  LONG_KEY  2",
            "+ NEW       3",
        ]
    );
}

#[test]
fn test_change_lines() {
    let mut session = session(&[("A", "1"), ("B", "x"), ("C", "same")]);
    session.edit("A", "2").unwrap();
    session.delete("B").unwrap();
    session.edit("C", "same").unwrap();
    session.add("D", "new").unwrap();

    let lines = change_lines(&session, false);
    assert_eq!(
        lines,
        [
            "~ A: 1 → 2 (1 byte)",
            "- B (1 byte)",
            "+ D = new (3 bytes)",
        ]
    );

    let masked = change_lines(&session, true);
    assert_eq!(masked[0], format!("~ A: {SECRET_MASK} → {SECRET_MASK} (1 byte)"));
}
