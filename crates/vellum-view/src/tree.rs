//! View tree (arena-based allocation)
//!
//! Nodes live in a flat arena and are addressed by `NodeId` handles, so the
//! structure carries no ownership cycles and detachment is a table edit.
//! All mutation goes through the tree: structural and attribute operations
//! validate their preconditions fully before touching any state, record a
//! dirty reason on the mutated node, and collect that node into a working
//! set for the next synchronization pass.
//!
//! Callers serialize access; no operation suspends or re-enters the tree.

use crate::dirty::{DirtyFlags, DirtyReason};
use crate::node::{ElementData, Node, NodeData};
use crate::registry::{BindingRegistry, ExternalKey};
use crate::NodeId;

/// Result type for view-tree operations
pub type ViewResult<T> = Result<T, ViewError>;

/// View-tree operation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("node not found")]
    NodeNotFound,

    #[error("node is not an element")]
    NotAnElement,

    #[error("child index {index} out of bounds (child count {len})")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("invalid child range: index {index}, count {count}, child count {len}")]
    InvalidRange {
        index: usize,
        count: usize,
        len: usize,
    },

    #[error("node already has a parent")]
    AlreadyAttached,

    #[error("node is the insertion target or one of its ancestors")]
    HierarchyViolation,

    #[error("attribute name must not be empty")]
    EmptyAttributeName,
}

/// Arena-based view tree with per-tree binding registry
#[derive(Debug, Default)]
pub struct ViewTree {
    nodes: Vec<Node>,
    registry: BindingRegistry,
    /// Nodes marked dirty since the last drain, each at most once
    dirty_queue: Vec<NodeId>,
}

impl ViewTree {
    /// Create a new empty view tree
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree with pre-allocated arena capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            registry: BindingRegistry::new(),
            dirty_queue: Vec::new(),
        }
    }

    /// Number of nodes ever allocated in this tree (detached nodes included)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// The concrete ↔ view mapping registry owned by this tree
    pub fn registry(&self) -> &BindingRegistry {
        &self.registry
    }

    // === Construction ===

    /// Create a fresh detached element
    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.alloc(Node::element(name))
    }

    /// Create an element with initial attributes and children.
    ///
    /// The children must exist and be detached. The new element carries no
    /// dirty reasons: there is nothing to synchronize for a node that has
    /// never been rendered.
    pub fn create_element_with<'a>(
        &mut self,
        name: &str,
        attrs: impl IntoIterator<Item = (&'a str, &'a str)>,
        children: &[NodeId],
    ) -> ViewResult<NodeId> {
        let attrs: Vec<(&str, &str)> = attrs.into_iter().collect();
        if attrs.iter().any(|(key, _)| key.is_empty()) {
            return Err(ViewError::EmptyAttributeName);
        }
        for (i, &child) in children.iter().enumerate() {
            let node = self.node(child)?;
            if node.parent.is_valid() || children[..i].contains(&child) {
                return Err(ViewError::AlreadyAttached);
            }
        }

        let mut data = ElementData::new(name);
        for &(key, value) in &attrs {
            data.attrs.set(key, value);
        }
        data.children.extend_from_slice(children);

        let id = self.alloc(Node {
            parent: NodeId::NONE,
            dirty: DirtyFlags::clean(),
            binding: None,
            data: NodeData::Element(data),
        });
        for &child in children {
            self.nodes[child.index()].parent = id;
        }
        Ok(id)
    }

    /// Create a fresh detached text leaf
    pub fn create_text(&mut self, content: &str) -> NodeId {
        self.alloc(Node::text(content))
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    // === Structure ===

    /// Insert a single child at `index`
    pub fn insert_child(&mut self, parent: NodeId, index: usize, node: NodeId) -> ViewResult<()> {
        self.insert_children(parent, index, &[node])
    }

    /// Insert children starting at `index`, preserving their given order.
    ///
    /// Every node must exist, be detached, and not be the parent or one of
    /// its ancestors. Validation happens before any mutation: on error the
    /// tree is unchanged (insert-all-or-none).
    pub fn insert_children(
        &mut self,
        parent: NodeId,
        index: usize,
        nodes: &[NodeId],
    ) -> ViewResult<()> {
        let len = self.element(parent)?.children().len();
        if index > len {
            return Err(ViewError::IndexOutOfBounds { index, len });
        }
        for (i, &node) in nodes.iter().enumerate() {
            if self.node(node)?.parent.is_valid() || nodes[..i].contains(&node) {
                return Err(ViewError::AlreadyAttached);
            }
            if self.is_self_or_ancestor(node, parent) {
                return Err(ViewError::HierarchyViolation);
            }
        }

        for &node in nodes {
            self.nodes[node.index()].parent = parent;
        }
        let elem = self.element_mut(parent)?;
        elem.children.splice(index..index, nodes.iter().copied());
        self.mark_dirty(parent, DirtyReason::ChildrenChanged);
        Ok(())
    }

    /// Append a single child
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> ViewResult<()> {
        self.append_children(parent, &[node])
    }

    /// Append children, preserving their given order
    pub fn append_children(&mut self, parent: NodeId, nodes: &[NodeId]) -> ViewResult<()> {
        let len = self.element(parent)?.children().len();
        self.insert_children(parent, len, nodes)
    }

    /// Remove `count` children starting at `index`, returning them in order.
    ///
    /// Fails fast with `InvalidRange` when the range exceeds the current
    /// child count; a silent truncation would corrupt the structure the
    /// synchronizer mirrors.
    pub fn remove_children(
        &mut self,
        parent: NodeId,
        index: usize,
        count: usize,
    ) -> ViewResult<Vec<NodeId>> {
        let len = self.element(parent)?.children().len();
        if index > len || count > len - index {
            return Err(ViewError::InvalidRange { index, count, len });
        }

        let removed: Vec<NodeId> = self
            .element_mut(parent)?
            .children
            .drain(index..index + count)
            .collect();
        for &node in &removed {
            self.nodes[node.index()].parent = NodeId::NONE;
        }
        self.mark_dirty(parent, DirtyReason::ChildrenChanged);
        Ok(removed)
    }

    /// Child at `index`, or `None` when out of range or not an element
    pub fn child(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.get(parent)?.as_element()?.children().get(index).copied()
    }

    /// Number of children (0 for text nodes and unknown handles)
    pub fn child_count(&self, parent: NodeId) -> usize {
        self.get(parent)
            .and_then(|n| n.as_element())
            .map_or(0, |e| e.children().len())
    }

    /// Index of a child by identity, or `None` when not a child of `parent`
    pub fn child_index(&self, parent: NodeId, node: NodeId) -> Option<usize> {
        self.get(parent)?
            .as_element()?
            .children()
            .iter()
            .position(|&c| c == node)
    }

    /// Iterate the current children; each call yields a fresh single-pass
    /// view over the child list as it stands at call time
    pub fn children(&self, parent: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(parent)
            .and_then(|n| n.as_element())
            .map(|e| e.children())
            .unwrap_or(&[])
            .iter()
            .copied()
    }

    /// Parent of a node, or `None` when detached
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.get(node)?.parent;
        parent.is_valid().then_some(parent)
    }

    /// Tag name of an element node
    pub fn name(&self, node: NodeId) -> Option<&str> {
        self.get(node)?.as_element().map(|e| e.name())
    }

    /// Payload of a text node
    pub fn text(&self, node: NodeId) -> Option<&str> {
        self.get(node)?.as_text()
    }

    /// Walk the parent chain of `cursor` (inclusive) looking for `node`
    fn is_self_or_ancestor(&self, node: NodeId, mut cursor: NodeId) -> bool {
        while cursor.is_valid() {
            if cursor == node {
                return true;
            }
            cursor = match self.nodes.get(cursor.index()) {
                Some(n) => n.parent,
                None => NodeId::NONE,
            };
        }
        false
    }

    // === Attributes ===

    /// Set an attribute; a prior value for the same key is overwritten
    pub fn set_attr(&mut self, node: NodeId, key: &str, value: &str) -> ViewResult<()> {
        if key.is_empty() {
            return Err(ViewError::EmptyAttributeName);
        }
        self.element_mut(node)?.attrs.set(key, value);
        self.mark_dirty(node, DirtyReason::AttributesChanged);
        Ok(())
    }

    /// Remove an attribute, reporting whether an entry existed
    pub fn remove_attr(&mut self, node: NodeId, key: &str) -> ViewResult<bool> {
        let removed = self.element_mut(node)?.attrs.remove(key);
        self.mark_dirty(node, DirtyReason::AttributesChanged);
        Ok(removed)
    }

    /// Attribute value, or `None` when absent (never an error)
    pub fn attr(&self, node: NodeId, key: &str) -> Option<&str> {
        self.get(node)?.as_element()?.attrs().get(key)
    }

    /// Check attribute presence
    pub fn has_attr(&self, node: NodeId, key: &str) -> bool {
        self.get(node)
            .and_then(|n| n.as_element())
            .is_some_and(|e| e.attrs().contains(key))
    }

    /// Iterate attribute names
    pub fn attr_keys(&self, node: NodeId) -> impl Iterator<Item = &str> {
        self.get(node)
            .and_then(|n| n.as_element())
            .map(|e| e.attrs().keys())
            .into_iter()
            .flatten()
    }

    /// Number of attributes (0 for text nodes and unknown handles)
    pub fn attr_count(&self, node: NodeId) -> usize {
        self.get(node)
            .and_then(|n| n.as_element())
            .map_or(0, |e| e.attrs().len())
    }

    // === Dirty protocol ===

    /// Record a dirty reason on a node.
    ///
    /// The mark stays local to the node; ancestors are untouched. On the
    /// clean→dirty transition the node also enters the working set drained
    /// by `take_dirty`. Unknown handles are ignored.
    pub fn mark_dirty(&mut self, id: NodeId, reason: DirtyReason) {
        let Some(node) = self.nodes.get_mut(id.index()) else {
            return;
        };
        let was_clean = node.dirty.is_clean();
        node.dirty.insert(reason);
        if was_clean {
            self.dirty_queue.push(id);
        }
    }

    /// Dirty reasons currently recorded on a node
    pub fn dirty_reasons(&self, id: NodeId) -> DirtyFlags {
        self.get(id).map_or(DirtyFlags::clean(), |n| n.dirty())
    }

    /// Check whether a node has unacknowledged dirty reasons
    pub fn is_dirty(&self, id: NodeId) -> bool {
        !self.dirty_reasons(id).is_clean()
    }

    /// Acknowledge a node: clear its dirty reasons.
    ///
    /// Called by the synchronizer after it has applied the node's current
    /// state to the concrete surface.
    pub fn clear_dirty(&mut self, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(id.index()) {
            node.dirty.clear();
        }
    }

    /// Drain the working set of dirty nodes, each listed once.
    ///
    /// Nodes whose reasons were cleared since they were queued are skipped.
    pub fn take_dirty(&mut self) -> Vec<NodeId> {
        let mut pending = std::mem::take(&mut self.dirty_queue);
        pending.retain(|&id| self.is_dirty(id));
        pending
    }

    /// Iterate the nodes currently waiting for synchronization
    pub fn dirty_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.dirty_queue
            .iter()
            .copied()
            .filter(|&id| self.is_dirty(id))
    }

    pub(crate) fn requeue_dirty(&mut self, ids: &[NodeId]) {
        for &id in ids {
            if self.is_dirty(id) && !self.dirty_queue.contains(&id) {
                self.dirty_queue.push(id);
            }
        }
    }

    // === Binding ===

    /// Record `key` as the node's concrete counterpart and register the
    /// reverse mapping.
    ///
    /// Overwrite-on-conflict: a prior binding of this node and a prior
    /// binding of this key are both dissolved first, so the association
    /// stays unique in both directions. Unknown handles are ignored.
    pub fn bind_external(&mut self, node: NodeId, key: ExternalKey) {
        if self.get(node).is_none() {
            return;
        }
        if let Some(old_key) = self.nodes[node.index()].binding {
            if old_key != key && self.registry.lookup(old_key) == Some(node) {
                self.registry.unbind(old_key);
            }
        }
        if let Some(displaced) = self.registry.bind(key, node) {
            if displaced != node {
                if let Some(prev) = self.nodes.get_mut(displaced.index()) {
                    prev.binding = None;
                }
            }
        }
        self.nodes[node.index()].binding = Some(key);
    }

    /// Dissolve the node's binding, if any
    pub fn unbind_external(&mut self, node: NodeId) {
        let Some(key) = self.get(node).and_then(|n| n.binding()) else {
            return;
        };
        if self.registry.lookup(key) == Some(node) {
            self.registry.unbind(key);
        }
        self.nodes[node.index()].binding = None;
    }

    /// Concrete counterpart of a view node, if bound
    pub fn binding(&self, node: NodeId) -> Option<ExternalKey> {
        self.get(node)?.binding()
    }

    /// View node bound to a concrete node, if any
    pub fn view_of(&self, key: ExternalKey) -> Option<NodeId> {
        self.registry.lookup(key)
    }

    /// Sweep bindings whose concrete node is gone.
    ///
    /// The registry stores bare keys and cannot observe concrete-node
    /// teardown itself; the host calls this with its liveness predicate.
    pub fn retain_bindings(&mut self, mut live: impl FnMut(ExternalKey) -> bool) {
        let dead: Vec<ExternalKey> = self.registry.keys().filter(|&k| !live(k)).collect();
        for key in dead {
            if let Some(node) = self.registry.unbind(key) {
                if let Some(n) = self.nodes.get_mut(node.index()) {
                    if n.binding == Some(key) {
                        n.binding = None;
                    }
                }
            }
        }
    }

    // === Internal accessors ===

    fn node(&self, id: NodeId) -> ViewResult<&Node> {
        self.get(id).ok_or(ViewError::NodeNotFound)
    }

    fn element(&self, id: NodeId) -> ViewResult<&ElementData> {
        self.node(id)?.as_element().ok_or(ViewError::NotAnElement)
    }

    fn element_mut(&mut self, id: NodeId) -> ViewResult<&mut ElementData> {
        self.nodes
            .get_mut(id.index())
            .ok_or(ViewError::NodeNotFound)?
            .as_element_mut()
            .ok_or(ViewError::NotAnElement)
    }

    /// Attach a freshly imported child without dirty marking; a node the
    /// concrete tree repeats is left where it already sits
    pub(crate) fn attach_fresh(&mut self, parent: NodeId, child: NodeId) {
        if self.nodes[child.index()].parent.is_valid() {
            return;
        }
        self.nodes[child.index()].parent = parent;
        if let Some(elem) = self.nodes[parent.index()].as_element_mut() {
            elem.children.push(child);
        }
    }
}
