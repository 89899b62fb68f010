//! Edge case and stress tests for vellum-view
//!
//! Boundary indices, degenerate batches, deep and wide reconstruction,
//! and binding churn.

use vellum_view::{
    flush, ConcreteKind, ConcreteNode, DirtyReason, ExternalKey, NodeId, Synchronizer, ViewError,
    ViewTree,
};

struct Concrete {
    key: u64,
    kind: ConcreteKind,
    name: String,
    text: String,
    attrs: Vec<(String, String)>,
    children: Vec<Concrete>,
}

impl Concrete {
    fn element(key: u64, name: &str) -> Self {
        Self {
            key,
            kind: ConcreteKind::Element,
            name: name.to_string(),
            text: String::new(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    fn text(key: u64, text: &str) -> Self {
        Self {
            key,
            kind: ConcreteKind::Text,
            name: String::new(),
            text: text.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }
}

impl ConcreteNode for Concrete {
    fn key(&self) -> ExternalKey {
        ExternalKey(self.key)
    }

    fn kind(&self) -> ConcreteKind {
        self.kind
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn text(&self) -> &str {
        &self.text
    }

    fn attributes(&self) -> Vec<(&str, &str)> {
        self.attrs
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
            .collect()
    }

    fn child_count(&self) -> usize {
        self.children.len()
    }

    fn child(&self, index: usize) -> Option<&Self> {
        self.children.get(index)
    }
}

// ============================================================================
// BOUNDARY INDICES
// ============================================================================

#[test]
fn test_insert_at_exact_end() {
    let mut tree = ViewTree::new();
    let parent = tree.create_element("p");
    let a = tree.create_text("a");
    let b = tree.create_text("b");

    tree.insert_children(parent, 0, &[a]).unwrap();
    // index == child_count is the append position, not out of range
    tree.insert_children(parent, 1, &[b]).unwrap();

    assert_eq!(tree.child(parent, 1), Some(b));
}

#[test]
fn test_remove_full_range() {
    let mut tree = ViewTree::new();
    let parent = tree.create_element("p");
    let a = tree.create_text("a");
    let b = tree.create_text("b");
    tree.insert_children(parent, 0, &[a, b]).unwrap();

    let removed = tree.remove_children(parent, 0, 2).unwrap();
    assert_eq!(removed, vec![a, b]);
    assert_eq!(tree.child_count(parent), 0);
    assert_eq!(tree.children(parent).count(), 0);
}

#[test]
fn test_remove_zero_count() {
    let mut tree = ViewTree::new();
    let parent = tree.create_element("p");
    let a = tree.create_text("a");
    tree.append_child(parent, a).unwrap();
    tree.clear_dirty(parent);

    let removed = tree.remove_children(parent, 1, 0).unwrap();
    assert!(removed.is_empty());
    assert_eq!(tree.child_count(parent), 1);
    // The operation still counts as a child mutation
    assert!(tree
        .dirty_reasons(parent)
        .contains(DirtyReason::ChildrenChanged));
}

#[test]
fn test_empty_insert_batch() {
    let mut tree = ViewTree::new();
    let parent = tree.create_element("p");

    tree.insert_children(parent, 0, &[]).unwrap();
    assert_eq!(tree.child_count(parent), 0);
}

#[test]
fn test_remove_range_overflow_does_not_wrap() {
    let mut tree = ViewTree::new();
    let parent = tree.create_element("p");
    let a = tree.create_text("a");
    tree.append_child(parent, a).unwrap();

    // index + count would overflow a naive addition
    let err = tree.remove_children(parent, usize::MAX, 2).unwrap_err();
    assert!(matches!(err, ViewError::InvalidRange { .. }));
}

// ============================================================================
// DEGENERATE TARGETS
// ============================================================================

#[test]
fn test_structure_ops_on_text_node() {
    let mut tree = ViewTree::new();
    let text = tree.create_text("x");
    let other = tree.create_text("y");

    assert_eq!(
        tree.insert_children(text, 0, &[other]).unwrap_err(),
        ViewError::NotAnElement
    );
    assert_eq!(
        tree.remove_children(text, 0, 0).unwrap_err(),
        ViewError::NotAnElement
    );
    assert_eq!(tree.child_count(text), 0);
    assert_eq!(tree.children(text).count(), 0);
    assert_eq!(tree.attr_keys(text).count(), 0);
}

#[test]
fn test_text_payload_is_fixed() {
    let mut tree = ViewTree::new();
    let text = tree.create_text("immutable");

    assert_eq!(tree.text(text), Some("immutable"));
    assert_eq!(tree.name(text), None);

    let div = tree.create_element("div");
    assert_eq!(tree.text(div), None);
    assert_eq!(tree.name(div), Some("div"));
}

// ============================================================================
// DEEP AND WIDE RECONSTRUCTION
// ============================================================================

#[test]
fn test_import_deep_chain() {
    // 200 nested elements with a text leaf at the bottom
    let mut concrete = Concrete::text(0, "leaf");
    for depth in 1..=200 {
        let mut wrapper = Concrete::element(depth, "div");
        wrapper.children.push(concrete);
        concrete = wrapper;
    }

    let mut tree = ViewTree::new();
    let root = tree.import_external(&concrete);
    assert_eq!(tree.len(), 201);

    let mut cursor = root;
    let mut hops = 0;
    while let Some(next) = tree.child(cursor, 0) {
        cursor = next;
        hops += 1;
    }
    assert_eq!(hops, 200);
    assert_eq!(tree.text(cursor), Some("leaf"));
}

#[test]
fn test_import_wide_element() {
    let mut concrete = Concrete::element(0, "ul");
    for i in 1..=500 {
        let mut li = Concrete::element(i, "li");
        li.children.push(Concrete::text(10_000 + i, "item"));
        concrete.children.push(li);
    }

    let mut tree = ViewTree::new();
    let root = tree.import_external(&concrete);

    assert_eq!(tree.child_count(root), 500);
    // Document order survives a wide fan-out
    for i in 0..500 {
        let li = tree.child(root, i).unwrap();
        assert_eq!(tree.binding(li), Some(ExternalKey(i as u64 + 1)));
    }
}

#[test]
fn test_import_duplicate_key_in_one_tree() {
    // The surface repeats one concrete node in two positions; the second
    // occurrence resolves to the same view node, which stays where it was
    // placed first
    let mut concrete = Concrete::element(1, "div");
    concrete.children.push(Concrete::text(7, "x"));
    concrete.children.push(Concrete::text(7, "x"));

    let mut tree = ViewTree::new();
    let root = tree.import_external(&concrete);

    assert_eq!(tree.child_count(root), 1);
    let only = tree.child(root, 0).unwrap();
    assert_eq!(tree.binding(only), Some(ExternalKey(7)));
}

// ============================================================================
// BINDING CHURN
// ============================================================================

#[test]
fn test_rebinding_storm() {
    let mut tree = ViewTree::new();
    let nodes: Vec<NodeId> = (0..10).map(|_| tree.create_element("div")).collect();

    // Every node fights over one key; last writer owns it
    for &node in &nodes {
        tree.bind_external(node, ExternalKey(42));
    }

    assert_eq!(tree.view_of(ExternalKey(42)), Some(nodes[9]));
    assert_eq!(tree.registry().len(), 1);
    for &node in &nodes[..9] {
        assert_eq!(tree.binding(node), None);
    }
}

#[test]
fn test_retain_after_surface_teardown() {
    let mut concrete = Concrete::element(1, "div");
    concrete.children.push(Concrete::text(2, "x"));
    concrete.children.push(Concrete::text(3, "y"));

    let mut tree = ViewTree::new();
    let root = tree.import_external(&concrete);
    assert_eq!(tree.registry().len(), 3);

    // The surface dropped every concrete node except the root
    tree.retain_bindings(|key| key == ExternalKey(1));

    assert_eq!(tree.registry().len(), 1);
    assert_eq!(tree.binding(root), Some(ExternalKey(1)));
    let child = tree.child(root, 0).unwrap();
    assert_eq!(tree.binding(child), None);

    // The structure itself is untouched by a sweep
    assert_eq!(tree.child_count(root), 2);
}

#[test]
fn test_reimport_after_unbind_builds_fresh() {
    let concrete = Concrete::element(1, "div");

    let mut tree = ViewTree::new();
    let first = tree.import_external(&concrete);
    tree.unbind_external(first);

    let second = tree.import_external(&concrete);
    assert_ne!(first, second);
    assert_eq!(tree.view_of(ExternalKey(1)), Some(second));
}

// ============================================================================
// DIRTY QUEUE CHURN
// ============================================================================

struct CountingSync {
    attribute_updates: usize,
    child_updates: usize,
}

impl Synchronizer for CountingSync {
    type Error = std::convert::Infallible;

    fn update_attributes(&mut self, _tree: &ViewTree, _node: NodeId) -> Result<(), Self::Error> {
        self.attribute_updates += 1;
        Ok(())
    }

    fn update_children(&mut self, _tree: &ViewTree, _node: NodeId) -> Result<(), Self::Error> {
        self.child_updates += 1;
        Ok(())
    }
}

#[test]
fn test_many_mutations_one_update_per_node() {
    let mut tree = ViewTree::new();
    let div = tree.create_element("div");
    for i in 0..100 {
        tree.set_attr(div, "n", &i.to_string()).unwrap();
    }

    let mut sync = CountingSync {
        attribute_updates: 0,
        child_updates: 0,
    };
    let applied = flush(&mut tree, &mut sync).unwrap();

    assert_eq!(applied, 1);
    assert_eq!(sync.attribute_updates, 1);
    assert_eq!(sync.child_updates, 0);
    assert_eq!(tree.attr(div, "n"), Some("99"));
}

#[test]
fn test_mutate_between_flushes() {
    let mut tree = ViewTree::new();
    let div = tree.create_element("div");
    let mut sync = CountingSync {
        attribute_updates: 0,
        child_updates: 0,
    };

    for round in 0..3 {
        tree.set_attr(div, "round", &round.to_string()).unwrap();
        let applied = flush(&mut tree, &mut sync).unwrap();
        assert_eq!(applied, 1);
    }
    assert_eq!(sync.attribute_updates, 3);
    assert!(!tree.is_dirty(div));
}

#[test]
fn test_clear_without_flush() {
    let mut tree = ViewTree::new();
    let div = tree.create_element("div");
    tree.set_attr(div, "id", "a").unwrap();

    // A host that applies updates by hand can acknowledge directly
    tree.clear_dirty(div);
    assert!(!tree.is_dirty(div));
    assert!(tree.take_dirty().is_empty());
}
