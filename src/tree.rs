//! The public ordered container (Section 4.2).
//!
//! `Tree<I>` generalizes the donor's `BTree<K, V>`
//! (`chapter_18/b_tree.rs`) from a key/value pair under `Ord` to a single
//! opaque item ordered by a runtime `less` callback, and adds O(1) logical
//! cloning via the owner-tag copy-on-write scheme in [`crate::owner`].

use std::cell::RefCell;
use std::sync::Arc;

use crate::cursor::Cursor;
use crate::node::{DeleteMode, Node};
use crate::owner::OwnerTag;
use crate::traversal;

/// The caller-supplied strict weak order: `less(a, b)` is `true` exactly
/// when `a` sorts strictly before `b`.
type LessFn<I> = Arc<dyn Fn(&I, &I) -> bool + Send + Sync>;

/// An in-memory ordered associative container under a caller-supplied total
/// order, supporting O(1) logical cloning.
///
/// `Tree` is `Send`: a clone can be moved to another thread and mutated
/// there independently of the original. It is intentionally not `Sync` —
/// concurrent readers sharing a single `&Tree` across threads need external
/// synchronization (e.g. an `RwLock`), matching the single-writer-per-clone
/// concurrency model this crate targets (see `SPEC_FULL.md` §5). Clone the
/// tree instead of sharing it when you need independent access from
/// multiple execution contexts.
pub struct Tree<I> {
    pub(crate) root: Option<Arc<Node<I>>>,
    len: usize,
    degree: usize,
    pub(crate) less: LessFn<I>,
    owner: RefCell<OwnerTag>,
}

impl<I: Clone> Tree<I> {
    /// Creates an empty tree with the given branching `degree` and ordering
    /// callback.
    ///
    /// # Panics
    ///
    /// Panics if `degree < 2`: a B-tree of degree less than two cannot
    /// satisfy the node-occupancy invariants (mirrors `BTree::new`'s own
    /// `assert!` in the donor).
    pub fn new<F>(degree: usize, less: F) -> Self
    where
        F: Fn(&I, &I) -> bool + Send + Sync + 'static,
    {
        assert!(degree >= 2, "tree degree must be at least 2");
        Tree {
            root: None,
            len: 0,
            degree,
            less: Arc::new(less),
            owner: RefCell::new(OwnerTag::new()),
        }
    }

    /// Convenience constructor for items with a natural [`Ord`]
    /// implementation.
    pub fn ordered(degree: usize) -> Self
    where
        I: Ord + Send + Sync + 'static,
    {
        Self::new(degree, |a, b| a < b)
    }

    fn current_owner(&self) -> OwnerTag {
        self.owner.borrow().clone()
    }

    /// Number of items currently stored.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the stored item equivalent to `key`, if any.
    pub fn get(&self, key: &I) -> Option<&I> {
        self.root.as_ref().and_then(|r| r.get(key, self.less.as_ref()))
    }

    /// Whether an item equivalent to `key` is stored.
    pub fn has(&self, key: &I) -> bool {
        self.get(key).is_some()
    }

    /// Returns the smallest item, or `None` if the tree is empty.
    pub fn min(&self) -> Option<&I> {
        self.root.as_ref().and_then(|r| r.min())
    }

    /// Returns the largest item, or `None` if the tree is empty.
    pub fn max(&self) -> Option<&I> {
        self.root.as_ref().and_then(|r| r.max())
    }

    /// Inserts `item`, replacing and returning any previously stored item
    /// equivalent to it.
    pub fn insert(&mut self, item: I) -> Option<I> {
        let owner = self.current_owner();
        if self.root.is_none() {
            let mut leaf = Node::new_leaf(owner);
            leaf.items.push(item);
            self.root = Some(Arc::new(leaf));
            self.len += 1;
            return None;
        }
        if self.root.as_ref().expect("checked above").is_full(self.degree) {
            let old_root = self.root.take().expect("checked above");
            let mut new_root = Node::new_internal(owner.clone());
            new_root.children.push(old_root);
            new_root.split_child(0, &owner, self.degree);
            self.root = Some(Arc::new(new_root));
        }
        let root_arc = self.root.as_mut().expect("root exists after split check");
        ensure_owned_root(root_arc, &owner);
        let root = Arc::get_mut(root_arc).expect("root exclusively owned after COW check");
        let previous = root.insert_non_full(item, &owner, self.less.as_ref(), self.degree);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Removes and returns the item equivalent to `key`, if any.
    pub fn delete(&mut self, key: &I) -> Option<I> {
        self.delete_with(DeleteMode::Key(key))
    }

    /// Removes and returns the smallest item, if any.
    pub fn delete_min(&mut self) -> Option<I> {
        self.delete_with(DeleteMode::Min)
    }

    /// Removes and returns the largest item, if any.
    pub fn delete_max(&mut self) -> Option<I> {
        self.delete_with(DeleteMode::Max)
    }

    fn delete_with(&mut self, mode: DeleteMode<'_, I>) -> Option<I> {
        if self.root.is_none() {
            return None;
        }
        let owner = self.current_owner();
        let root_arc = self.root.as_mut().expect("checked above");
        ensure_owned_root(root_arc, &owner);
        let root = Arc::get_mut(root_arc).expect("root exclusively owned after COW check");
        let result = root.delete_mode(mode, &owner, self.less.as_ref(), self.degree);
        if result.is_some() {
            self.len -= 1;
        }
        self.shrink_root();
        result
    }

    /// After a root-level delete, collapses an empty internal root into its
    /// single remaining child, or clears the root entirely if it was a leaf.
    fn shrink_root(&mut self) {
        let collapse = match &self.root {
            Some(root) if root.items.is_empty() => Some(root.is_leaf()),
            _ => None,
        };
        match collapse {
            Some(true) => self.root = None,
            Some(false) => {
                let root = self.root.as_ref().expect("checked above");
                let only_child = root.children[0].clone();
                self.root = Some(only_child);
            }
            None => {}
        }
    }

    /// Visits every item in ascending order, stopping early if `f` returns
    /// `false`.
    pub fn ascend<F: FnMut(&I) -> bool>(&self, mut f: F) {
        if let Some(root) = &self.root {
            traversal::ascend_range(root, self.less.as_ref(), None, None, &mut f);
        }
    }

    /// Visits every item in descending order, stopping early if `f` returns
    /// `false`.
    pub fn descend<F: FnMut(&I) -> bool>(&self, mut f: F) {
        if let Some(root) = &self.root {
            traversal::descend_range(root, self.less.as_ref(), None, None, &mut f);
        }
    }

    /// Visits items in `[lo, hi)` ascending order.
    pub fn ascend_range<F: FnMut(&I) -> bool>(&self, lo: &I, hi: &I, mut f: F) {
        if let Some(root) = &self.root {
            traversal::ascend_range(root, self.less.as_ref(), Some(lo), Some(hi), &mut f);
        }
    }

    /// Visits items in `(lo, hi]` descending order: `hi` is the inclusive
    /// starting point, `lo` the exclusive stopping point.
    pub fn descend_range<F: FnMut(&I) -> bool>(&self, hi: &I, lo: &I, mut f: F) {
        if let Some(root) = &self.root {
            traversal::descend_range(root, self.less.as_ref(), Some(hi), Some(lo), &mut f);
        }
    }

    /// Visits items strictly less than `pivot`, ascending.
    pub fn ascend_less_than<F: FnMut(&I) -> bool>(&self, pivot: &I, mut f: F) {
        if let Some(root) = &self.root {
            traversal::ascend_range(root, self.less.as_ref(), None, Some(pivot), &mut f);
        }
    }

    /// Visits items greater than or equal to `pivot`, ascending.
    pub fn ascend_greater_or_equal<F: FnMut(&I) -> bool>(&self, pivot: &I, mut f: F) {
        if let Some(root) = &self.root {
            traversal::ascend_range(root, self.less.as_ref(), Some(pivot), None, &mut f);
        }
    }

    /// Visits items less than or equal to `pivot`, descending.
    pub fn descend_less_or_equal<F: FnMut(&I) -> bool>(&self, pivot: &I, mut f: F) {
        if let Some(root) = &self.root {
            traversal::descend_range(root, self.less.as_ref(), Some(pivot), None, &mut f);
        }
    }

    /// Visits items strictly greater than `pivot`, descending.
    pub fn descend_greater_than<F: FnMut(&I) -> bool>(&self, pivot: &I, mut f: F) {
        if let Some(root) = &self.root {
            traversal::descend_range(root, self.less.as_ref(), None, Some(pivot), &mut f);
        }
    }

    /// Opens a bidirectional cursor over this tree. The cursor borrows the
    /// tree, so the borrow checker rejects any mutation while it is alive.
    pub fn cursor(&self) -> Cursor<'_, I> {
        Cursor::new(self)
    }
}

fn ensure_owned_root<I: Clone>(root: &mut Arc<Node<I>>, owner: &OwnerTag) {
    if !root.owner.same(owner) {
        *root = Arc::new(root.shallow_clone(owner.clone()));
    }
}

/// Produces an independent logical copy of a tree in O(1) time. Shared
/// structure is copied lazily, on first mutation through either tree, at
/// O(height) cost per touched path (see [`crate::owner`]).
impl<I: Clone> Clone for Tree<I> {
    fn clone(&self) -> Self {
        *self.owner.borrow_mut() = OwnerTag::new();
        Tree {
            root: self.root.clone(),
            len: self.len,
            degree: self.degree,
            less: Arc::clone(&self.less),
            owner: RefCell::new(OwnerTag::new()),
        }
    }
}
