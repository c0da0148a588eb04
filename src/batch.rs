use crate::api::Backend;
use crate::identity::Author;
use crate::resource::ResourceRef;
use crate::staging::{CommitOutcome, EditSession};
use crate::view::{change_lines, changes_label, count_label, preview};
use crate::{info, status, warning};
use anyhow::{Result, bail};
use std::collections::BTreeMap;

/// stage `--set` and `--unset` operations on a session
pub fn apply(session: &mut EditSession, sets: &[(String, String)], unsets: &[String]) -> Result<()> {
    if let Some(key) = unsets.iter().find(|key| sets.iter().any(|(k, _)| k == *key)) {
        bail!("key '{key}' is both set and unset");
    }

    for (key, value) in sets {
        if session.get(key).is_some() {
            session.edit(key, value)?;
        } else {
            session.check_new_key(key)?;
            session.add(key, value)?;
        }
    }

    for key in unsets {
        session.delete(key)?;
    }

    Ok(())
}

/// fetch, stage the operations, then save (or print with `dry_run`)
pub fn run(
    backend: &dyn Backend,
    resource: &ResourceRef,
    author: &Author,
    sets: &[(String, String)],
    unsets: &[String],
    dry_run: bool,
    masked: bool,
) -> Result<()> {
    let mut session = EditSession::load(backend.fetch(resource)?);
    apply(&mut session, sets, unsets)?;

    status!("{}: {}", resource, changes_label(session.changes_count()));
    for line in change_lines(&session, masked) {
        info!(line);
    }

    if dry_run {
        let payload: BTreeMap<String, String> = session
            .payload()
            .into_iter()
            .map(|(k, v)| {
                let shown = if masked { preview(&v, true) } else { v };
                (k, shown)
            })
            .collect();
        info!(serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    match session.commit(backend, author)? {
        CommitOutcome::NothingToCommit => status!("nothing to save"),
        CommitOutcome::Committed { changes } => {
            status!("saved {}", count_label(changes, "change"));
        }
        CommitOutcome::CommittedUnverified {
            changes,
            reload_error,
        } => {
            status!("saved {}", count_label(changes, "change"));
            warning!("could not reload {}: {:#}", resource, reload_error);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests;
