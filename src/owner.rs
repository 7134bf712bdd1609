//! Copy-on-write node ownership (Sections 4.4, 9).
//!
//! Every [`Node`](crate::node::Node) carries an [`OwnerTag`] identifying the
//! [`Tree`](crate::tree::Tree) that may edit it in place. A tree holds its own
//! tag and compares it against a node's tag by pointer identity before
//! mutating that node: matching tags mean the node is privately owned and can
//! be edited directly; a mismatch means the node is (or was) shared with
//! another tree and must be copied first.
//!
//! [`Tree::clone`](crate::tree::Tree::clone) hands both the original tree and
//! the new clone a fresh tag. Every node that existed before the clone keeps
//! its old tag, which now matches neither tree, so the first mutation through
//! either one copies that node before editing it. This is what makes clone
//! O(1) and the first post-clone mutation O(height) rather than O(n).

use std::sync::Arc;

/// An opaque, pointer-comparable ownership identity.
///
/// Two tags are equal only if they were produced by the same
/// [`OwnerTag::new`] call; there is no notion of value equality.
#[derive(Clone, Debug)]
pub(crate) struct OwnerTag(Arc<()>);

impl OwnerTag {
    /// Mints a fresh identity, distinct from every tag minted before it.
    pub(crate) fn new() -> Self {
        OwnerTag(Arc::new(()))
    }

    /// Whether `self` and `other` name the same owner.
    pub(crate) fn same(&self, other: &OwnerTag) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
