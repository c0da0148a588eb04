use crate::api::Backend;
use crate::constants::MAX_KEY_LENGTH;
use crate::identity::Author;
use crate::resource::Snapshot;
use anyhow::{Context, Result, bail};
use std::collections::BTreeMap;

/// staged state of a single key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// present in the snapshot, untouched
    Unmodified { value: String },
    /// present in the snapshot with a pending replacement
    Edited { value: String, new_value: String },
    /// present in the snapshot, staged for removal
    Deleted { value: String },
    /// added this session, unknown to the server
    New { value: String },
}

impl Entry {
    /// the server-confirmed value, if the server has seen this key
    pub fn original(&self) -> Option<&str> {
        match self {
            Entry::Unmodified { value } | Entry::Edited { value, .. } | Entry::Deleted { value } => {
                Some(value)
            }
            Entry::New { .. } => None,
        }
    }

    /// the value this entry would commit (pending edit first)
    pub fn current(&self) -> &str {
        match self {
            Entry::Edited { new_value, .. } => new_value,
            Entry::Unmodified { value } | Entry::Deleted { value } | Entry::New { value } => value,
        }
    }

    pub fn is_dirty(&self) -> bool {
        match self {
            Entry::Unmodified { .. } => false,
            Entry::Edited { value, new_value } => value != new_value,
            Entry::Deleted { .. } | Entry::New { .. } => true,
        }
    }

    pub fn is_deleted(&self) -> bool {
        matches!(self, Entry::Deleted { .. })
    }

    /// single character marker used in listings
    pub fn marker(&self) -> char {
        match self {
            Entry::New { .. } => '+',
            Entry::Deleted { .. } => '-',
            Entry::Edited { .. } if self.is_dirty() => '~',
            Entry::Edited { .. } | Entry::Unmodified { .. } => ' ',
        }
    }
}

/// result of a commit attempt that reached (or skipped) the server
#[derive(Debug)]
pub enum CommitOutcome {
    NothingToCommit,
    Committed {
        changes: usize,
    },
    /// the update was accepted but re-fetching failed; the session was
    /// rebuilt from the payload that was sent
    CommittedUnverified {
        changes: usize,
        reload_error: anyhow::Error,
    },
}

/// local draft of a key/value resource: the loaded snapshot plus the
/// staged per-key changes on top of it
#[derive(Debug, Clone)]
pub struct EditSession {
    snapshot: Snapshot,
    entries: BTreeMap<String, Entry>,
}

impl EditSession {
    pub fn load(snapshot: Snapshot) -> Self {
        let entries = entries_from(&snapshot);
        Self { snapshot, entries }
    }

    /// replace the snapshot and drop every staged change
    pub fn reload(&mut self, snapshot: Snapshot) {
        self.entries = entries_from(&snapshot);
        self.snapshot = snapshot;
    }

    /// drop every staged change, keeping the current snapshot
    pub fn discard(&mut self) {
        self.entries = entries_from(&self.snapshot);
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// validate a key typed into the add form before it reaches the session
    pub fn check_new_key(&self, key: &str) -> Result<()> {
        validate_key(key)?;
        match self.entries.get(key) {
            Some(Entry::Deleted { .. }) => {
                bail!("key '{key}' is staged for deletion, restore it instead")
            }
            Some(_) => bail!("key '{key}' already exists"),
            None => Ok(()),
        }
    }

    /// stage a new key; re-adding a key that was added this session
    /// replaces its value
    pub fn add(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(entry) = self.entries.get(key)
            && entry.original().is_some()
        {
            bail!("key '{key}' exists on the server");
        }
        self.entries.insert(
            key.to_string(),
            Entry::New {
                value: value.to_string(),
            },
        );
        Ok(())
    }

    /// stage a new value; the server-confirmed value is never overwritten
    pub fn edit(&mut self, key: &str, new_value: &str) -> Result<()> {
        let Some(entry) = self.entries.get_mut(key) else {
            bail!("no such key: {key}");
        };
        *entry = match &mut *entry {
            Entry::New { .. } => Entry::New {
                value: new_value.to_string(),
            },
            Entry::Unmodified { value } | Entry::Edited { value, .. } | Entry::Deleted { value } => {
                Entry::Edited {
                    value: std::mem::take(value),
                    new_value: new_value.to_string(),
                }
            }
        };
        Ok(())
    }

    /// soft-delete a server key, or forget a key added this session
    pub fn delete(&mut self, key: &str) -> Result<()> {
        let Some(entry) = self.entries.remove(key) else {
            bail!("no such key: {key}");
        };
        match entry {
            // the server never saw it, nothing to tombstone
            Entry::New { .. } => {}
            Entry::Unmodified { value } | Entry::Edited { value, .. } | Entry::Deleted { value } => {
                self.entries.insert(key.to_string(), Entry::Deleted { value });
            }
        }
        Ok(())
    }

    /// return a key to its snapshot state
    ///
    /// keys absent from the snapshot are removed, keys present are reset to
    /// their original value. returns whether anything changed
    pub fn restore(&mut self, key: &str) -> bool {
        match self.snapshot.data.get(key) {
            Some(original) => {
                let restored = Entry::Unmodified {
                    value: original.clone(),
                };
                let changed = self.entries.get(key) != Some(&restored);
                self.entries.insert(key.to_string(), restored);
                changed
            }
            None => self.entries.remove(key).is_some(),
        }
    }

    pub fn changes_count(&self) -> usize {
        self.entries.values().filter(|e| e.is_dirty()).count()
    }

    pub fn has_changes(&self) -> bool {
        self.entries.values().any(Entry::is_dirty)
    }

    /// entries that differ from the snapshot, in key order
    pub fn changes(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries().filter(|(_, e)| e.is_dirty())
    }

    /// reduce the staged map to the flat map sent to the update mutation
    pub fn payload(&self) -> BTreeMap<String, String> {
        self.entries
            .iter()
            .filter(|(_, e)| !e.is_deleted())
            .map(|(k, e)| (k.clone(), e.current().to_string()))
            .collect()
    }

    /// send the staged state to the backend as one update
    ///
    /// on error the staged changes are left untouched so the commit can be
    /// retried
    pub fn commit(&mut self, backend: &dyn Backend, author: &Author) -> Result<CommitOutcome> {
        let changes = self.changes_count();
        if changes == 0 {
            return Ok(CommitOutcome::NothingToCommit);
        }

        let payload = self.payload();
        let resource = self.snapshot.resource.clone();
        backend
            .update(&resource, &payload, author)
            .with_context(|| format!("failed to update {resource}"))?;

        match backend.fetch(&resource) {
            Ok(fresh) => {
                self.reload(fresh);
                Ok(CommitOutcome::Committed { changes })
            }
            Err(reload_error) => {
                self.reload(Snapshot::new(resource, payload));
                Ok(CommitOutcome::CommittedUnverified {
                    changes,
                    reload_error,
                })
            }
        }
    }
}

fn entries_from(snapshot: &Snapshot) -> BTreeMap<String, Entry> {
    snapshot
        .data
        .iter()
        .map(|(k, v)| (k.clone(), Entry::Unmodified { value: v.clone() }))
        .collect()
}

/// check a key is acceptable as a data key (`[-._a-zA-Z0-9]+`)
pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        bail!("key cannot be empty");
    }
    if key.len() > MAX_KEY_LENGTH {
        bail!("key is too long ({} chars, max {MAX_KEY_LENGTH})", key.len());
    }
    if let Some(c) = key
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
    {
        bail!("key contains invalid character '{c}'");
    }
    if key == "." || key == ".." {
        bail!("key cannot be '{key}'");
    }
    Ok(())
}
