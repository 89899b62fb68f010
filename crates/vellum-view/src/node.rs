//! View node
//!
//! Arena slot holding the parent back-reference, the dirty reasons, the
//! optional binding to a concrete counterpart, and the element/text payload.
//! The parent link is used for upward navigation only, never for ownership.

use crate::attrs::AttrMap;
use crate::dirty::DirtyFlags;
use crate::registry::ExternalKey;
use crate::NodeId;

/// View tree node
#[derive(Debug)]
pub struct Node {
    /// Parent node (NONE when detached)
    pub(crate) parent: NodeId,
    /// Reasons recorded since the last acknowledged synchronization
    pub(crate) dirty: DirtyFlags,
    /// Concrete counterpart this node currently represents
    pub(crate) binding: Option<ExternalKey>,
    /// Node-specific data
    pub(crate) data: NodeData,
}

impl Node {
    pub(crate) fn element(name: &str) -> Self {
        Self {
            parent: NodeId::NONE,
            dirty: DirtyFlags::clean(),
            binding: None,
            data: NodeData::Element(ElementData::new(name)),
        }
    }

    pub(crate) fn text(content: &str) -> Self {
        Self {
            parent: NodeId::NONE,
            dirty: DirtyFlags::clean(),
            binding: None,
            data: NodeData::Text(TextData {
                content: content.into(),
            }),
        }
    }

    /// Check if this is an element
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    /// Check if this is a text leaf
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    /// Get element data if this is an element
    #[inline]
    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    #[inline]
    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Get text content if this is a text leaf
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match &self.data {
            NodeData::Text(t) => Some(&t.content),
            _ => None,
        }
    }

    /// Dirty reasons currently recorded on this node
    #[inline]
    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Concrete counterpart this node is bound to, if any
    #[inline]
    pub fn binding(&self) -> Option<ExternalKey> {
        self.binding
    }
}

/// Node-specific data
#[derive(Debug)]
pub enum NodeData {
    /// Composite node: named, with attributes and ordered children
    Element(ElementData),
    /// Leaf node: immutable payload
    Text(TextData),
}

/// Element-specific data
#[derive(Debug)]
pub struct ElementData {
    /// Tag identifier, fixed at construction
    pub(crate) name: Box<str>,
    /// Attributes
    pub(crate) attrs: AttrMap,
    /// Ordered children; order is rendering order
    pub(crate) children: Vec<NodeId>,
}

impl ElementData {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            attrs: AttrMap::new(),
            children: Vec::new(),
        }
    }

    /// Tag name
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attribute map
    #[inline]
    pub fn attrs(&self) -> &AttrMap {
        &self.attrs
    }

    /// Current children, in rendering order
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Text node data
#[derive(Debug)]
pub struct TextData {
    pub(crate) content: Box<str>,
}

impl TextData {
    /// Payload string
    #[inline]
    pub fn content(&self) -> &str {
        &self.content
    }
}
