//! RevisionTree - branch enumeration and default-branch selection

use std::collections::BTreeMap;

use super::RevisionNode;
use crate::rev_index::{IndexEntry, RevisionStatus};
use crate::revision::{DocumentId, RevisionId, WorkspaceId};

/// The revision tree of one document.
///
/// Only live entries (`pending` or `available`) become nodes. Orphaned
/// entries are counted but take no part in branches. Nodes whose parent is
/// not a live node are unreachable from any root and are reported as
/// detached instead of forming branches of their own.
#[derive(Debug, Clone)]
pub struct RevisionTree {
    document: DocumentId,
    nodes: BTreeMap<RevisionId, RevisionNode>,
    roots: Vec<RevisionId>,
    detached: Vec<RevisionId>,
    orphaned: Vec<RevisionId>,
}

impl RevisionTree {
    /// Builds the tree from the index entries of `document`.
    ///
    /// Entries of other documents are ignored.
    pub fn build(document: DocumentId, entries: impl IntoIterator<Item = IndexEntry>) -> Self {
        let mut nodes: BTreeMap<RevisionId, RevisionNode> = BTreeMap::new();
        let mut orphaned = Vec::new();

        for entry in entries {
            if entry.document != document {
                continue;
            }
            if entry.status.is_live() {
                nodes.insert(entry.revision.clone(), RevisionNode::from_entry(entry));
            } else {
                orphaned.push(entry.revision);
            }
        }

        let mut roots = Vec::new();
        let mut detached = Vec::new();
        let mut links: Vec<(RevisionId, RevisionId)> = Vec::new();

        for node in nodes.values() {
            match &node.parent {
                None => roots.push(node.revision.clone()),
                Some(parent) if nodes.contains_key(parent) => {
                    links.push((parent.clone(), node.revision.clone()))
                }
                Some(_) => detached.push(node.revision.clone()),
            }
        }

        // BTreeMap iteration is ordered, so children end up sorted
        for (parent, child) in links {
            if let Some(p) = nodes.get_mut(&parent) {
                p.children.push(child);
            }
        }

        let mut tree = Self {
            document,
            nodes,
            roots,
            detached: Vec::new(),
            orphaned,
        };
        // descendants of detached nodes are unreachable too
        tree.detached = tree.collect_unreachable(detached);
        tree.orphaned.sort();
        tree
    }

    /// Builds the tree from the entries written in `workspace` only.
    pub fn build_for_workspace(
        document: DocumentId,
        workspace: &WorkspaceId,
        entries: impl IntoIterator<Item = IndexEntry>,
    ) -> Self {
        Self::build(
            document,
            entries.into_iter().filter(|e| &e.workspace == workspace),
        )
    }

    fn collect_unreachable(&self, starts: Vec<RevisionId>) -> Vec<RevisionId> {
        let mut out = Vec::new();
        let mut stack = starts;
        while let Some(rev) = stack.pop() {
            if let Some(node) = self.nodes.get(&rev) {
                stack.extend(node.children.iter().cloned());
            }
            out.push(rev);
        }
        out.sort();
        out.dedup();
        out
    }

    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// Returns true if the document has no live revisions.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn node(&self, revision: &RevisionId) -> Option<&RevisionNode> {
        self.nodes.get(revision)
    }

    pub fn status_of(&self, revision: &RevisionId) -> Option<RevisionStatus> {
        self.nodes.get(revision).map(|n| n.status)
    }

    /// Generation-1 revisions, ordered.
    pub fn roots(&self) -> &[RevisionId] {
        &self.roots
    }

    /// Orphaned revisions of the document, excluded from all branches.
    pub fn orphaned(&self) -> &[RevisionId] {
        &self.orphaned
    }

    /// Live revisions whose lineage does not reach a root.
    pub fn detached(&self) -> &[RevisionId] {
        &self.detached
    }

    /// Leaves reachable from a root, ordered by revision id.
    pub fn leaves(&self) -> Vec<&RevisionId> {
        let mut leaves: Vec<&RevisionId> = self
            .nodes
            .values()
            .filter(|n| n.is_leaf() && self.detached.binary_search(&n.revision).is_err())
            .map(|n| &n.revision)
            .collect();
        leaves.sort();
        leaves
    }

    /// Every root-to-leaf path, ordered by leaf.
    pub fn branches(&self) -> Vec<Vec<RevisionId>> {
        self.leaves()
            .into_iter()
            .filter_map(|leaf| self.path_to(leaf))
            .collect()
    }

    /// The winning leaf: highest generation, then highest hash.
    pub fn winner(&self) -> Option<&RevisionId> {
        self.leaves().into_iter().max()
    }

    /// Path from the root to the winner. Empty when the tree is empty.
    pub fn default_branch(&self) -> Vec<RevisionId> {
        self.winner()
            .and_then(|w| self.path_to(w))
            .unwrap_or_default()
    }

    /// Default branch paired with each revision's status.
    pub fn default_branch_with_status(&self) -> Vec<(RevisionId, RevisionStatus)> {
        self.default_branch()
            .into_iter()
            .filter_map(|rev| self.status_of(&rev).map(|s| (rev, s)))
            .collect()
    }

    /// Leaves that lost winner selection.
    pub fn conflicts(&self) -> Vec<&RevisionId> {
        let winner = self.winner();
        self.leaves()
            .into_iter()
            .filter(|leaf| Some(*leaf) != winner)
            .collect()
    }

    pub fn has_conflicts(&self) -> bool {
        self.leaves().len() > 1
    }

    /// Winner selection over the `available` subtree.
    ///
    /// This is what ordinary reads resolve to. Pending nodes and everything
    /// below them are pruned first, so a failed write never outranks a
    /// committed sibling.
    pub fn committed_tip(&self) -> Option<&RevisionNode> {
        self.committed_leaves()
            .into_iter()
            .max_by(|a, b| a.revision.cmp(&b.revision))
    }

    /// Path from the root to the committed tip.
    pub fn committed_branch(&self) -> Vec<RevisionId> {
        self.committed_tip()
            .and_then(|tip| self.path_to(&tip.revision))
            .unwrap_or_default()
    }

    fn committed_leaves(&self) -> Vec<&RevisionNode> {
        let mut leaves = Vec::new();
        let mut stack: Vec<&RevisionNode> = self
            .roots
            .iter()
            .filter_map(|rev| self.nodes.get(rev))
            .filter(|node| node.is_available())
            .collect();
        while let Some(node) = stack.pop() {
            let before = stack.len();
            stack.extend(
                node.children
                    .iter()
                    .filter_map(|rev| self.nodes.get(rev))
                    .filter(|child| child.is_available()),
            );
            if stack.len() == before {
                leaves.push(node);
            }
        }
        leaves
    }

    /// Walks parent links from `revision` back to its root.
    fn path_to(&self, revision: &RevisionId) -> Option<Vec<RevisionId>> {
        let mut path = Vec::new();
        let mut current = self.nodes.get(revision)?;
        loop {
            path.push(current.revision.clone());
            match &current.parent {
                None => break,
                Some(parent) => current = self.nodes.get(parent)?,
            }
        }
        path.reverse();
        Some(path)
    }
}
