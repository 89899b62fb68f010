//! Synchronization protocol
//!
//! The synchronizer owns the render-surface update. It drains the tree's
//! dirty working set, applies attribute and child deltas to the concrete
//! surface through the `Synchronizer` callbacks, and acknowledges each node
//! by clearing its reasons. A node whose update fails keeps its reasons and
//! stays queued for the next flush.

use crate::dirty::DirtyReason;
use crate::tree::ViewTree;
use crate::NodeId;

/// Render-surface update callbacks.
///
/// Implementations read the node's current state through the tree accessors
/// (`attr_keys`/`attr`, `children`/`child`/`child_count`) and apply the
/// delta to the concrete surface. Callbacks must not mutate the tree.
pub trait Synchronizer {
    type Error;

    /// Apply the node's current attributes to its concrete counterpart
    fn update_attributes(&mut self, tree: &ViewTree, node: NodeId) -> Result<(), Self::Error>;

    /// Apply the node's current child list to its concrete counterpart
    fn update_children(&mut self, tree: &ViewTree, node: NodeId) -> Result<(), Self::Error>;
}

/// Drain the dirty working set and apply updates.
///
/// Returns the number of nodes synchronized. On a callback error the failed
/// node and every node not yet visited are re-queued, their dirty reasons
/// intact, and the error is returned.
pub fn flush<S: Synchronizer>(tree: &mut ViewTree, sync: &mut S) -> Result<usize, S::Error> {
    let pending = tree.take_dirty();
    let mut applied = 0;

    for (i, &id) in pending.iter().enumerate() {
        let reasons = tree.dirty_reasons(id);
        if reasons.is_clean() {
            continue;
        }

        let result = apply(tree, sync, id, reasons);
        match result {
            Ok(()) => {
                tree.clear_dirty(id);
                applied += 1;
            }
            Err(err) => {
                tree.requeue_dirty(&pending[i..]);
                return Err(err);
            }
        }
    }

    tracing::trace!(applied, "synchronized dirty view nodes");
    Ok(applied)
}

fn apply<S: Synchronizer>(
    tree: &ViewTree,
    sync: &mut S,
    id: NodeId,
    reasons: crate::DirtyFlags,
) -> Result<(), S::Error> {
    if reasons.contains(DirtyReason::AttributesChanged) {
        sync.update_attributes(tree, id)?;
    }
    if reasons.contains(DirtyReason::ChildrenChanged) {
        sync.update_children(tree, id)?;
    }
    Ok(())
}
