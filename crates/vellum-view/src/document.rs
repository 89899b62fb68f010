//! Document - High-level view document API
//!
//! One view tree plus its root element. The binding registry lives inside
//! the tree, so two documents never share mapping state and the mapping
//! dies with the document.

use crate::tree::ViewTree;
use crate::NodeId;

/// A view document
pub struct Document {
    tree: ViewTree,
    root: NodeId,
}

impl Document {
    /// Create a document whose root element carries the given tag
    pub fn new(root_name: &str) -> Self {
        let mut tree = ViewTree::new();
        let root = tree.create_element(root_name);
        Self { tree, root }
    }

    /// Root element of the document
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Access the view tree
    pub fn tree(&self) -> &ViewTree {
        &self.tree
    }

    /// Access the view tree mutably
    pub fn tree_mut(&mut self) -> &mut ViewTree {
        &mut self.tree
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("div")
    }
}
