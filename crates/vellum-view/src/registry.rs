//! Concrete ↔ view mapping registry
//!
//! Per-tree association between concrete-node identities and view nodes.
//! The registry stores opaque host-assigned keys, never the concrete
//! resources themselves, so an entry can never keep a concrete node alive.
//! The host sweeps stale entries with `unbind`/`retain` when concrete
//! nodes are torn down.

use std::collections::HashMap;

use crate::NodeId;

/// Identity of a concrete (externally rendered) node, assigned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct ExternalKey(pub u64);

/// Non-owning concrete → view association
#[derive(Debug, Default)]
pub struct BindingRegistry {
    map: HashMap<ExternalKey, NodeId>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live bindings
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Register a binding, returning the view node it displaced, if any
    pub fn bind(&mut self, key: ExternalKey, node: NodeId) -> Option<NodeId> {
        self.map.insert(key, node)
    }

    /// Look up the view node currently bound to a concrete node
    pub fn lookup(&self, key: ExternalKey) -> Option<NodeId> {
        self.map.get(&key).copied()
    }

    /// Drop a binding, returning the view node it pointed at
    pub fn unbind(&mut self, key: ExternalKey) -> Option<NodeId> {
        self.map.remove(&key)
    }

    /// Iterate currently bound keys
    pub fn keys(&self) -> impl Iterator<Item = ExternalKey> + '_ {
        self.map.keys().copied()
    }
}
