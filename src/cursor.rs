//! A stateful bidirectional cursor over a tree (Section 4.3).
//!
//! Mirrors the explicit-path idiom of
//! `other_examples/0d056394_johncf-unitree__src-cursor_mut.rs.rs`'s
//! `CursorMutT` (a stack of `(node, index)` steps), adapted to a read-only,
//! immutable-borrow cursor over [`Node`] and sized with `smallvec` per
//! `SPEC_FULL.md` §10.5 instead of a heap-allocated `Vec`.
//!
//! Every frame's `slot` carries one overloaded meaning depending on its
//! position in the path: for the top frame it is the index of the item the
//! cursor currently rests on (`node.items[slot]`); for every frame beneath
//! it, it is the index of the child that was most recently descended into.
//! Because an internal node's item `i` sits exactly between children `i` and
//! `i + 1`, these two meanings coincide the moment a frame becomes top again
//! after being popped back into — which is what lets `next`/`prev` reuse the
//! same field without a separate "visited" flag.

use smallvec::SmallVec;
use std::sync::Arc;

use crate::node::Node;
use crate::tree::Tree;

/// Typical tree heights stay well under this bound (see `SPEC_FULL.md` §10.5
/// and `spec.md` §9: "≤ 16 for degree 32 and 2^40 keys"), so a cursor's path
/// almost never spills to the heap.
const INLINE_PATH_DEPTH: usize = 16;

struct Frame<I> {
    node: Arc<Node<I>>,
    slot: usize,
}

/// Which sentinel an empty path represents.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Edge {
    BeforeFirst,
    AfterLast,
}

/// A bidirectional iterator over a [`Tree`](crate::tree::Tree) that survives
/// between calls.
///
/// Borrowing the tree for the cursor's lifetime is this crate's
/// compile-time tightening of `spec.md`'s caller contract ("mutating the
/// tree invalidates any outstanding cursor"): the borrow checker rejects any
/// mutation of the tree while a cursor over it is alive, rather than leaving
/// that misuse as undefined behavior.
pub struct Cursor<'a, I> {
    tree: &'a Tree<I>,
    path: SmallVec<[Frame<I>; INLINE_PATH_DEPTH]>,
    edge: Edge,
}

impl<'a, I: Clone> Cursor<'a, I> {
    pub(crate) fn new(tree: &'a Tree<I>) -> Self {
        Cursor {
            tree,
            path: SmallVec::new(),
            edge: Edge::BeforeFirst,
        }
    }

    /// The item the cursor currently rests on, or `None` if positioned
    /// before the first item or after the last.
    pub fn current(&self) -> Option<&I> {
        self.path.last().map(|frame| &frame.node.items[frame.slot])
    }

    /// Positions the cursor on the smallest item.
    pub fn first(&mut self) -> Option<&I> {
        self.path.clear();
        if let Some(root) = &self.tree.root {
            self.descend_leftmost(Arc::clone(root));
        }
        self.edge = Edge::AfterLast; // irrelevant once path is non-empty
        self.current()
    }

    /// Positions the cursor on the largest item.
    pub fn last(&mut self) -> Option<&I> {
        self.path.clear();
        if let Some(root) = &self.tree.root {
            self.descend_rightmost(Arc::clone(root));
        }
        self.edge = Edge::BeforeFirst; // irrelevant once path is non-empty
        self.current()
    }

    /// Positions the cursor on the item equivalent to `key`, or, if absent,
    /// on the first item greater than `key`. Returns `None` if no such item
    /// exists (every stored item is less than `key`).
    pub fn seek(&mut self, key: &I) -> Option<&I> {
        self.path.clear();
        let less = self.tree.less.as_ref();
        let mut next = self.tree.root.clone();
        while let Some(node) = next {
            let (idx, found) = locate(&node, key, less);
            let descend = if found || node.is_leaf() {
                None
            } else {
                Some(Arc::clone(&node.children[idx]))
            };
            self.path.push(Frame { node, slot: idx });
            if found {
                self.edge = Edge::AfterLast;
                return self.current();
            }
            next = descend;
        }
        // Landed on a leaf without a match: `slot` is either the first item
        // greater than `key` in that leaf, or (if it equals the leaf's item
        // count) the leaf held nothing greater and we must unwind.
        if self.rest_if_valid() {
            self.edge = Edge::AfterLast;
            self.current()
        } else {
            self.edge = Edge::AfterLast;
            None
        }
    }

    /// Advances to the next item in ascending order.
    pub fn next(&mut self) -> Option<&I> {
        if self.path.is_empty() {
            return match self.edge {
                Edge::BeforeFirst => self.first(),
                Edge::AfterLast => None,
            };
        }
        let top = self.path.last().expect("checked non-empty above");
        if !top.node.is_leaf() {
            let child = Arc::clone(&top.node.children[top.slot + 1]);
            self.descend_leftmost(child);
            return self.current();
        }
        let slot = top.slot;
        let len = top.node.items.len();
        if slot + 1 < len {
            self.path.last_mut().expect("checked non-empty above").slot = slot + 1;
            return self.current();
        }
        self.path.pop();
        if self.rest_after_pop_ascending() {
            self.current()
        } else {
            self.edge = Edge::AfterLast;
            None
        }
    }

    /// Retreats to the previous item in descending order.
    pub fn prev(&mut self) -> Option<&I> {
        if self.path.is_empty() {
            return match self.edge {
                Edge::AfterLast => self.last(),
                Edge::BeforeFirst => None,
            };
        }
        let top = self.path.last().expect("checked non-empty above");
        if !top.node.is_leaf() {
            let child = Arc::clone(&top.node.children[top.slot]);
            self.descend_rightmost(child);
            return self.current();
        }
        let slot = top.slot;
        if slot > 0 {
            self.path.last_mut().expect("checked non-empty above").slot = slot - 1;
            return self.current();
        }
        self.path.pop();
        if self.rest_after_pop_descending() {
            self.current()
        } else {
            self.edge = Edge::BeforeFirst;
            None
        }
    }

    fn descend_leftmost(&mut self, mut node: Arc<Node<I>>) {
        loop {
            let leaf = node.is_leaf();
            let child = if leaf { None } else { Some(Arc::clone(&node.children[0])) };
            self.path.push(Frame { node, slot: 0 });
            match child {
                Some(next) => node = next,
                None => break,
            }
        }
    }

    fn descend_rightmost(&mut self, mut node: Arc<Node<I>>) {
        loop {
            if node.is_leaf() {
                let slot = node.items.len() - 1;
                self.path.push(Frame { node, slot });
                break;
            }
            let slot = node.children.len() - 1;
            let next = Arc::clone(&node.children[slot]);
            self.path.push(Frame { node, slot });
            node = next;
        }
    }

    /// After `seek` lands on a leaf frame whose `slot` may equal the leaf's
    /// item count (no match within that leaf), unwinds to the nearest
    /// ancestor whose descended-from child index still names a pending
    /// item. Returns whether such a position exists.
    fn rest_if_valid(&mut self) -> bool {
        if let Some(frame) = self.path.last() {
            if frame.slot < frame.node.items.len() {
                return true;
            }
        }
        self.path.pop();
        self.rest_after_pop_ascending()
    }

    /// Shared unwind step for `next` and `seek`: called with the exhausted
    /// frame already popped, walks upward until an ancestor's "descended via
    /// child `slot`" marker names a pending item (`slot < items.len()`).
    fn rest_after_pop_ascending(&mut self) -> bool {
        loop {
            match self.path.last() {
                None => return false,
                Some(frame) if frame.slot < frame.node.items.len() => return true,
                Some(_) => {
                    self.path.pop();
                }
            }
        }
    }

    /// Mirror of `rest_after_pop_ascending` for `prev`: an ancestor's
    /// descended-via child index `c` has a pending predecessor item at
    /// `c - 1` unless `c == 0`.
    fn rest_after_pop_descending(&mut self) -> bool {
        loop {
            match self.path.last() {
                None => return false,
                Some(frame) if frame.slot > 0 => {
                    let new_slot = frame.slot - 1;
                    self.path.last_mut().expect("checked above").slot = new_slot;
                    return true;
                }
                Some(_) => {
                    self.path.pop();
                }
            }
        }
    }
}

/// Binary search within `node`, mirroring `Node::get`'s private `locate`.
fn locate<I>(node: &Node<I>, key: &I, less: &dyn Fn(&I, &I) -> bool) -> (usize, bool) {
    let idx = node.items.partition_point(|x| less(x, key));
    let found = idx < node.items.len() && !less(key, &node.items[idx]);
    (idx, found)
}

#[cfg(test)]
mod tests {
    use crate::tree::Tree;

    fn sample(degree: usize, n: i32) -> Tree<i32> {
        let mut tree = Tree::ordered(degree);
        for i in 0..n {
            tree.insert(i);
        }
        tree
    }

    #[test]
    fn first_then_next_matches_ascend() {
        let tree = sample(3, 50);
        let mut cursor = tree.cursor();
        let mut seen = Vec::new();
        let mut item = cursor.first();
        while let Some(x) = item {
            seen.push(*x);
            item = cursor.next();
        }
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn last_then_prev_matches_descend() {
        let tree = sample(4, 50);
        let mut cursor = tree.cursor();
        let mut seen = Vec::new();
        let mut item = cursor.last();
        while let Some(x) = item {
            seen.push(*x);
            item = cursor.prev();
        }
        assert_eq!(seen, (0..50).rev().collect::<Vec<_>>());
        assert_eq!(cursor.prev(), None);
    }

    #[test]
    fn seek_present_key_then_next_yields_rest() {
        let tree = sample(3, 30);
        let mut cursor = tree.cursor();
        assert_eq!(cursor.seek(&10), Some(&10));
        let mut seen = vec![10];
        let mut item = cursor.next();
        while let Some(x) = item {
            seen.push(*x);
            item = cursor.next();
        }
        assert_eq!(seen, (10..30).collect::<Vec<_>>());
    }

    #[test]
    fn seek_absent_key_lands_on_successor() {
        let mut tree: Tree<i32> = Tree::ordered(3);
        for i in (0..60).step_by(2) {
            tree.insert(i);
        }
        let mut cursor = tree.cursor();
        assert_eq!(cursor.seek(&7), Some(&8));
        assert_eq!(cursor.next(), Some(&10));
    }

    #[test]
    fn seek_past_every_key_returns_none() {
        let tree = sample(2, 20);
        let mut cursor = tree.cursor();
        assert_eq!(cursor.seek(&1000), None);
    }

    #[test]
    fn next_then_prev_is_an_involution() {
        let tree = sample(3, 40);
        let mut cursor = tree.cursor();
        cursor.first();
        for _ in 0..10 {
            cursor.next();
        }
        let at = *cursor.current().unwrap();
        cursor.next();
        let after = *cursor.current().unwrap();
        assert_eq!(cursor.prev(), Some(&at));
        assert_eq!(cursor.prev().copied(), Some(at - 1));
        let _ = after;
    }

    #[test]
    fn cursor_on_empty_tree_stays_none() {
        let tree: Tree<i32> = Tree::ordered(3);
        let mut cursor = tree.cursor();
        assert_eq!(cursor.first(), None);
        assert_eq!(cursor.last(), None);
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.prev(), None);
    }
}
