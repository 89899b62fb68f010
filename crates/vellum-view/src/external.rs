//! Concrete-tree boundary
//!
//! Read capabilities a host rendering surface must expose for its nodes,
//! and reconstruction of view subtrees from an existing concrete tree.
//! Reconstruction is the cold path taken when no binding exists yet; it
//! consults the registry first so repeated imports of the same concrete
//! node always return the same view node.

use crate::registry::ExternalKey;
use crate::tree::{ViewResult, ViewTree};
use crate::{NodeId, ViewError};

/// Kind of a concrete node: a closed two-way discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConcreteKind {
    Element,
    Text,
}

/// Minimal read capabilities of a concrete-tree node.
///
/// The host rendering surface implements this for whatever node type it
/// renders; the view tree only ever reads through it and never holds on
/// to a concrete node beyond the duration of a call.
pub trait ConcreteNode {
    /// Stable identity of this node within its surface
    fn key(&self) -> ExternalKey;

    /// Leaf/composite discriminator
    fn kind(&self) -> ConcreteKind;

    /// Tag name; meaningful for `Element` nodes
    fn name(&self) -> &str;

    /// Payload; meaningful for `Text` nodes
    fn text(&self) -> &str;

    /// Ordered attribute list
    fn attributes(&self) -> Vec<(&str, &str)>;

    /// Number of children, in document order
    fn child_count(&self) -> usize;

    /// Child at `index` in document order
    fn child(&self, index: usize) -> Option<&Self>;
}

impl ViewTree {
    /// Build (or retrieve) the view subtree mirroring a concrete tree.
    ///
    /// If the registry already binds `target`, the existing view node is
    /// returned untouched. Otherwise a fresh subtree is built: tag name and
    /// attributes are copied, children are reconstructed recursively in
    /// document order, and every built node is bound to its concrete
    /// counterpart so the next import of the same node is a cheap lookup.
    /// Built nodes carry no dirty reasons; they mirror the surface exactly.
    pub fn import_external<C: ConcreteNode>(&mut self, target: &C) -> NodeId {
        if let Some(existing) = self.view_of(target.key()) {
            return existing;
        }

        let id = match target.kind() {
            ConcreteKind::Text => self.create_text(target.text()),
            ConcreteKind::Element => {
                let id = self.create_element(target.name());
                if let Some(elem) = self.get_mut(id).and_then(|n| n.as_element_mut()) {
                    for (name, value) in target.attributes() {
                        elem.attrs.set(name, value);
                    }
                }
                for index in 0..target.child_count() {
                    let Some(child) = target.child(index) else {
                        break;
                    };
                    let child_id = self.import_external(child);
                    self.attach_fresh(id, child_id);
                }
                id
            }
        };

        self.bind_external(id, target.key());
        tracing::trace!(key = target.key().0, "built view node for concrete node");
        id
    }

    /// Copy every attribute of `target` onto an element node.
    ///
    /// Union-merge: attributes present on the node but absent from the
    /// target are kept. Marks the node `AttributesChanged`.
    pub fn clone_external_attrs<C: ConcreteNode>(
        &mut self,
        node: NodeId,
        target: &C,
    ) -> ViewResult<()> {
        let attrs: Vec<(String, String)> = target
            .attributes()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect();
        if attrs.iter().any(|(name, _)| name.is_empty()) {
            return Err(ViewError::EmptyAttributeName);
        }
        // Validate the target node up front so the merge is all-or-none
        if self.get(node).is_none() {
            return Err(ViewError::NodeNotFound);
        }

        let Some(elem) = self.get_mut(node).and_then(|n| n.as_element_mut()) else {
            return Err(ViewError::NotAnElement);
        };
        for (name, value) in &attrs {
            elem.attrs.set(name, value);
        }
        self.mark_dirty(node, crate::DirtyReason::AttributesChanged);
        Ok(())
    }
}
