//! `cowtree`: an in-memory ordered associative container.
//!
//! A B-tree keyed by an opaque item type under a caller-supplied total
//! order, supporting point lookup, insert-or-replace, deletion (by key, of
//! the minimum, or of the maximum), in-order and reverse traversal with
//! early-stopping predicates, half-open range traversal, a bidirectional
//! cursor, and O(1) logical cloning through copy-on-write path copying.
//!
//! See `SPEC_FULL.md` in the repository root for the full design.

mod cursor;
mod node;
mod owner;
mod traversal;
mod tree;

pub use cursor::Cursor;
pub use tree::Tree;
