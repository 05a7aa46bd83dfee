//! Revision Tree
//!
//! A per-document structure derived from index entries. It is never
//! persisted; it is rebuilt from the index whenever it is needed.
//!
//! # Winner rule
//!
//! Among all leaves, the winner is the one with the highest generation;
//! ties are broken by comparing hashes lexicographically, higher wins.
//! The rule depends only on revision ids, so two nodes holding the same
//! entries always agree on the winner.
//!
//! The winner's root-to-leaf path is the default branch. Every other leaf
//! heads a conflicting branch: it stays in the tree and in the index but is
//! not what ordinary reads see.

mod node;
mod tree;

pub use node::RevisionNode;
pub use tree::RevisionTree;
