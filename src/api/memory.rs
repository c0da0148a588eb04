//! in-memory backend used by tests

use super::Backend;
use crate::identity::Author;
use crate::resource::{ResourceRef, Snapshot};
use anyhow::{Result, bail};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// a recorded update call
#[derive(Debug, Clone)]
pub struct UpdateCall {
    pub resource: ResourceRef,
    pub data: BTreeMap<String, String>,
    pub author: Author,
}

#[derive(Default)]
pub struct MemoryBackend {
    resources: RefCell<Vec<(ResourceRef, BTreeMap<String, String>)>>,
    updates: RefCell<Vec<UpdateCall>>,
    fail_next_update: Cell<bool>,
    fail_fetch: Cell<bool>,
}

impl MemoryBackend {
    pub fn with_resource(resource: &ResourceRef, data: &[(&str, &str)]) -> Self {
        let backend = Self::default();
        backend.resources.borrow_mut().push((
            resource.clone(),
            data.iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        ));
        backend
    }

    pub fn fail_next_update(&self) {
        self.fail_next_update.set(true);
    }

    pub fn set_fail_fetch(&self, fail: bool) {
        self.fail_fetch.set(fail);
    }

    pub fn updates(&self) -> Vec<UpdateCall> {
        self.updates.borrow().clone()
    }

    pub fn data(&self, resource: &ResourceRef) -> Option<BTreeMap<String, String>> {
        self.resources
            .borrow()
            .iter()
            .find(|(r, _)| r == resource)
            .map(|(_, data)| data.clone())
    }
}

impl Backend for MemoryBackend {
    fn fetch(&self, resource: &ResourceRef) -> Result<Snapshot> {
        if self.fail_fetch.get() {
            bail!("connection refused");
        }
        match self.data(resource) {
            Some(data) => Ok(Snapshot::new(resource.clone(), data)),
            None => bail!("{resource} not found"),
        }
    }

    fn update(
        &self,
        resource: &ResourceRef,
        data: &BTreeMap<String, String>,
        author: &Author,
    ) -> Result<()> {
        if self.fail_next_update.replace(false) {
            bail!("server rejected request: internal error");
        }

        let mut resources = self.resources.borrow_mut();
        let Some((_, stored)) = resources.iter_mut().find(|entry| &entry.0 == resource) else {
            bail!("{resource} not found");
        };
        stored.clone_from(data);

        self.updates.borrow_mut().push(UpdateCall {
            resource: resource.clone(),
            data: data.clone(),
            author: author.clone(),
        });
        Ok(())
    }
}
