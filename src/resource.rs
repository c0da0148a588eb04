use clap::ValueEnum;
use std::collections::BTreeMap;
use std::fmt;

/// kind of key/value resource that can be edited
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Secret,
    Config,
}

impl ResourceKind {
    pub fn label(self) -> &'static str {
        match self {
            ResourceKind::Secret => "secret",
            ResourceKind::Config => "config",
        }
    }

    /// whether values should be hidden unless explicitly revealed
    pub fn masks_values(self) -> bool {
        matches!(self, ResourceKind::Secret)
    }
}

/// identity of a remote resource
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.kind.label(), self.namespace, self.name)
    }
}

/// the server-confirmed state of a resource at load time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub resource: ResourceRef,
    pub data: BTreeMap<String, String>,
}

impl Snapshot {
    pub fn new(resource: ResourceRef, data: BTreeMap<String, String>) -> Self {
        Self { resource, data }
    }
}
