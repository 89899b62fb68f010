//! Vellum View - Editable-content view tree
//!
//! In-memory mirror of editable content, independent of any concrete
//! rendering surface. The tree records which parts changed since the
//! last synchronization and keeps an identity-preserving association
//! between its own nodes and their externally rendered counterparts.

mod attrs;
mod dirty;
mod document;
mod external;
mod node;
mod registry;
mod sync;
mod tree;

pub use attrs::{Attr, AttrMap};
pub use dirty::{DirtyFlags, DirtyReason};
pub use document::Document;
pub use external::{ConcreteKind, ConcreteNode};
pub use node::{ElementData, Node, NodeData, TextData};
pub use registry::{BindingRegistry, ExternalKey};
pub use sync::{flush, Synchronizer};
pub use tree::{ViewError, ViewResult, ViewTree};

/// Node identifier (index into the tree arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(transparent)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Sentinel for "no node" (absent parent link)
    pub(crate) const NONE: NodeId = NodeId(u32::MAX);

    #[inline]
    pub(crate) fn is_valid(self) -> bool {
        self != Self::NONE
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}
