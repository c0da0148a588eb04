use super::*;
use crate::api::memory::MemoryBackend;
use crate::resource::{ResourceKind, Snapshot};
use crate::staging::Entry;

fn resource() -> ResourceRef {
    ResourceRef {
        kind: ResourceKind::Config,
        name: String::from("web"),
        namespace: String::from("default"),
    }
}

fn author() -> Author {
    Author {
        name: String::from("ci"),
        email: None,
    }
}

fn sets(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

fn unsets(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| (*k).to_string()).collect()
}

fn fresh_session() -> EditSession {
    let data = BTreeMap::from([
        (String::from("PORT"), String::from("8080")),
        (String::from("DEBUG"), String::from("true")),
    ]);
    EditSession::load(Snapshot::new(resource(), data))
}

#[test]
fn test_apply_edits_adds_and_deletes() {
    let mut session = fresh_session();

    apply(
        &mut session,
        &sets(&[("PORT", "9090"), ("LOG_LEVEL", "info")]),
        &unsets(&["DEBUG"]),
    )
    .unwrap();

    assert!(matches!(session.get("PORT"), Some(Entry::Edited { .. })));
    assert!(matches!(session.get("LOG_LEVEL"), Some(Entry::New { .. })));
    assert!(matches!(session.get("DEBUG"), Some(Entry::Deleted { .. })));
    assert_eq!(session.changes_count(), 3);
}

#[test]
fn test_apply_repeated_set_keeps_last_value() {
    let mut session = fresh_session();

    apply(&mut session, &sets(&[("NEW", "1"), ("NEW", "2")]), &[]).unwrap();

    assert_eq!(session.get("NEW").unwrap().current(), "2");
}

#[test]
fn test_apply_rejects_conflicting_operations() {
    let mut session = fresh_session();

    let err = apply(&mut session, &sets(&[("PORT", "1")]), &unsets(&["PORT"])).unwrap_err();

    assert!(err.to_string().contains("both set and unset"));
    assert_eq!(session.changes_count(), 0);
}

#[test]
fn test_apply_rejects_invalid_key_and_unknown_unset() {
    let mut session = fresh_session();
    assert!(apply(&mut session, &sets(&[("bad key", "1")]), &[]).is_err());

    let mut session = fresh_session();
    assert!(apply(&mut session, &[], &unsets(&["MISSING"])).is_err());
}

#[test]
fn test_run_saves_changes() {
    let backend = MemoryBackend::with_resource(&resource(), &[("PORT", "8080"), ("DEBUG", "true")]);

    run(
        &backend,
        &resource(),
        &author(),
        &sets(&[("PORT", "9090")]),
        &unsets(&["DEBUG"]),
        false,
        false,
    )
    .unwrap();

    let updates = backend.updates();
    assert_eq!(updates.len(), 1);
    assert_eq!(
        updates[0].data,
        BTreeMap::from([(String::from("PORT"), String::from("9090"))])
    );
    assert_eq!(backend.data(&resource()), Some(updates[0].data.clone()));
}

#[test]
fn test_run_dry_run_does_not_save() {
    let backend = MemoryBackend::with_resource(&resource(), &[("PORT", "8080")]);

    run(
        &backend,
        &resource(),
        &author(),
        &sets(&[("PORT", "9090")]),
        &[],
        true,
        true,
    )
    .unwrap();

    assert!(backend.updates().is_empty());
}

#[test]
fn test_run_reports_update_failure() {
    let backend = MemoryBackend::with_resource(&resource(), &[("PORT", "8080")]);
    backend.fail_next_update();

    let err = run(
        &backend,
        &resource(),
        &author(),
        &sets(&[("PORT", "9090")]),
        &[],
        false,
        false,
    )
    .unwrap_err();

    assert!(format!("{err:#}").contains("failed to update config default/web"));
    assert_eq!(backend.data(&resource()).unwrap()["PORT"], "8080");
}
