// driftdb is an embedded, offline-first document datastore
// Copyright (C) 2026  driftdb contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::collections::{HashMap, HashSet};

use crate::error::DatastoreError;
use crate::revision::{DocumentRevision, Sequence, NO_PARENT};
use crate::revision_id::RevisionId;

/// An arena slot holding one revision plus its child edges.
///
/// Children are stored as arena indices rather than owned/boxed nodes, so
/// the tree is a flat `Vec` with no ownership cycles and cache-friendly
/// path walks (see Design Notes).
#[derive(Debug)]
struct Node {
    revision: DocumentRevision,
    children: Vec<usize>,
}

/// The per-document revision forest.
///
/// A tree is built incrementally by [`RevisionTree::add`]; nodes must be
/// added in an order such that each node's parent (if not a root) is
/// already present. The tree never validates the *content* of a revision
/// beyond the structural invariants it owns (generation strictly increasing
/// along an edge, consistent `doc_id`, unique `rev_id`).
#[derive(Debug, Default)]
pub struct RevisionTree {
    arena: Vec<Node>,
    roots: Vec<usize>,
    by_sequence: HashMap<Sequence, usize>,
    by_rev_id: HashMap<RevisionId, usize>,
    doc_id: Option<String>,
}

impl RevisionTree {
    /// An empty tree with no document id bound yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A singleton tree containing `root`, which must have
    /// `parent_sequence == NO_PARENT`.
    pub fn new_with_root(root: DocumentRevision) -> Result<Self, DatastoreError> {
        let mut tree = Self::new();
        tree.add(root)?;
        Ok(tree)
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }

    /// Inserts `rev`. See the module doc comment for the ordering
    /// requirement; returns `&mut Self` so inserts can be chained.
    pub fn add(&mut self, rev: DocumentRevision) -> Result<&mut Self, DatastoreError> {
        if self.by_sequence.contains_key(&rev.sequence) {
            return Err(DatastoreError::InvalidArgument(format!(
                "revision with sequence {} is already present",
                rev.sequence
            )));
        }
        if self.by_rev_id.contains_key(&rev.rev_id) {
            return Err(DatastoreError::InvalidArgument(format!(
                "revision id {} is already present for document {}",
                rev.rev_id, rev.doc_id
            )));
        }

        match &self.doc_id {
            None => self.doc_id = Some(rev.doc_id.clone()),
            Some(doc_id) if doc_id != &rev.doc_id => {
                return Err(DatastoreError::Corruption(format!(
                    "revision for document {} inserted into tree for document {}",
                    rev.doc_id, doc_id
                )));
            }
            Some(_) => {}
        }

        let new_index = self.arena.len();

        if rev.parent_sequence == NO_PARENT {
            self.by_sequence.insert(rev.sequence, new_index);
            self.by_rev_id.insert(rev.rev_id.clone(), new_index);
            self.roots.push(new_index);
            self.arena.push(Node {
                revision: rev,
                children: Vec::new(),
            });
            return Ok(self);
        }

        let Some(&parent_index) = self.by_sequence.get(&rev.parent_sequence) else {
            return Err(DatastoreError::InvalidArgument(format!(
                "parent sequence {} is not present in the tree",
                rev.parent_sequence
            )));
        };

        let parent_generation = self.arena[parent_index].revision.rev_id.generation();
        if rev.rev_id.generation() <= parent_generation {
            return Err(DatastoreError::Corruption(format!(
                "revision {} does not have a strictly greater generation than parent {}",
                rev.rev_id, self.arena[parent_index].revision.rev_id
            )));
        }
        if self.arena[parent_index].revision.doc_id != rev.doc_id {
            return Err(DatastoreError::Corruption(format!(
                "parent sequence {} belongs to document {}, not {}",
                rev.parent_sequence, self.arena[parent_index].revision.doc_id, rev.doc_id
            )));
        }

        self.by_sequence.insert(rev.sequence, new_index);
        self.by_rev_id.insert(rev.rev_id.clone(), new_index);
        self.arena.push(Node {
            revision: rev,
            children: Vec::new(),
        });
        self.arena[parent_index].children.push(new_index);

        Ok(self)
    }

    /// The root nodes, keyed by sequence.
    pub fn roots(&self) -> HashMap<Sequence, &DocumentRevision> {
        self.roots
            .iter()
            .map(|&idx| {
                let rev = &self.arena[idx].revision;
                (rev.sequence, rev)
            })
            .collect()
    }

    /// All leaf revisions (nodes with no children), in unspecified order.
    pub fn leafs(&self) -> Vec<&DocumentRevision> {
        self.arena
            .iter()
            .filter(|node| node.children.is_empty())
            .map(|node| &node.revision)
            .collect()
    }

    pub fn leaf_revision_ids(&self) -> HashSet<RevisionId> {
        self.leafs().into_iter().map(|rev| rev.rev_id.clone()).collect()
    }

    pub fn root(&self, sequence: Sequence) -> Option<&DocumentRevision> {
        let &idx = self.by_sequence.get(&sequence)?;
        if self.roots.contains(&idx) {
            Some(&self.arena[idx].revision)
        } else {
            None
        }
    }

    pub fn by_sequence(&self, sequence: Sequence) -> Option<&DocumentRevision> {
        let &idx = self.by_sequence.get(&sequence)?;
        Some(&self.arena[idx].revision)
    }

    pub fn lookup(&self, doc_id: &str, rev_id: &RevisionId) -> Option<&DocumentRevision> {
        if self.doc_id.as_deref() != Some(doc_id) {
            return None;
        }
        let &idx = self.by_rev_id.get(rev_id)?;
        Some(&self.arena[idx].revision)
    }

    /// Depth from the root (0 at a root), or -1 if `sequence` is unknown.
    pub fn depth(&self, sequence: Sequence) -> i64 {
        let mut idx = match self.by_sequence.get(&sequence) {
            Some(&idx) => idx,
            None => return -1,
        };
        let mut depth = 0i64;
        loop {
            let parent_seq = self.arena[idx].revision.parent_sequence;
            if parent_seq == NO_PARENT {
                return depth;
            }
            match self.by_sequence.get(&parent_seq) {
                Some(&parent_idx) => {
                    idx = parent_idx;
                    depth += 1;
                }
                None => return depth,
            }
        }
    }

    /// The chain from `sequence` up to its root, leaf-first (the target is
    /// first, the root is last).
    pub fn path_for_node(&self, sequence: Sequence) -> Result<Vec<DocumentRevision>, DatastoreError> {
        let mut idx = *self.by_sequence.get(&sequence).ok_or_else(|| {
            DatastoreError::InvalidArgument(format!("sequence {sequence} is not present in the tree"))
        })?;

        let mut path = Vec::new();
        loop {
            let revision = &self.arena[idx].revision;
            path.push(revision.clone());
            if revision.parent_sequence == NO_PARENT {
                break;
            }
            match self.by_sequence.get(&revision.parent_sequence) {
                Some(&parent_idx) => idx = parent_idx,
                None => break,
            }
        }
        Ok(path)
    }

    /// Same as [`RevisionTree::path_for_node`] but returns only revision ids.
    pub fn path(&self, sequence: Sequence) -> Result<Vec<RevisionId>, DatastoreError> {
        Ok(self
            .path_for_node(sequence)?
            .into_iter()
            .map(|rev| rev.rev_id)
            .collect())
    }

    /// True iff more than one non-deleted leaf exists.
    pub fn has_conflicts(&self) -> bool {
        self.leafs().into_iter().filter(|rev| !rev.is_deleted).count() > 1
    }

    /// The winning leaf: among non-deleted leaves, the highest generation,
    /// ties broken by the lexicographically greatest suffix. If every leaf
    /// is deleted, the same rule is applied over the deleted leaves.
    pub fn current_revision(&self) -> Result<DocumentRevision, DatastoreError> {
        let leafs = self.leafs();
        if leafs.is_empty() {
            return Err(DatastoreError::NotFound(
                "tree has no revisions to elect a winner from".to_string(),
            ));
        }

        let mut candidates: Vec<&DocumentRevision> =
            leafs.iter().filter(|rev| !rev.is_deleted).copied().collect();
        if candidates.is_empty() {
            candidates = leafs;
        }

        candidates
            .into_iter()
            .max_by(|a, b| a.rev_id.cmp(&b.rev_id))
            .cloned()
            .ok_or_else(|| DatastoreError::NotFound("tree has no revisions to elect a winner from".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_body::DocumentBody;

    fn rev(
        doc_id: &str,
        rev_id: &str,
        sequence: Sequence,
        parent_sequence: Sequence,
        is_deleted: bool,
    ) -> DocumentRevision {
        DocumentRevision {
            doc_id: doc_id.to_string(),
            rev_id: rev_id.parse().unwrap(),
            body: DocumentBody::empty(),
            sequence,
            internal_id: 1,
            is_local: false,
            is_deleted,
            is_current: false,
            parent_sequence,
        }
    }

    #[test]
    fn single_branch_linear_tree() {
        let mut tree = RevisionTree::new();
        tree.add(rev("doc1", "1-rev", 1, NO_PARENT, false)).unwrap();
        tree.add(rev("doc1", "2-rev", 2, 1, false)).unwrap();
        tree.add(rev("doc1", "3-rev", 3, 2, false)).unwrap();
        tree.add(rev("doc1", "4-rev", 4, 3, false)).unwrap();
        tree.add(rev("doc1", "5-rev", 5, 4, false)).unwrap();

        let leafs = tree.leafs();
        assert_eq!(leafs.len(), 1);
        assert_eq!(leafs[0].rev_id.to_string(), "5-rev");
        assert!(!tree.has_conflicts());

        let path: Vec<String> = tree.path(5).unwrap().into_iter().map(|r| r.to_string()).collect();
        assert_eq!(path, vec!["5-rev", "4-rev", "3-rev", "2-rev", "1-rev"]);
        assert_eq!(tree.depth(5), 4);
        assert_eq!(tree.depth(1), 0);
        assert_eq!(tree.depth(999), -1);
    }

    #[test]
    fn branching_creates_a_conflict() {
        let mut tree = RevisionTree::new();
        tree.add(rev("doc1", "1-rev", 1, NO_PARENT, false)).unwrap();
        tree.add(rev("doc1", "2-rev", 2, 1, false)).unwrap();
        tree.add(rev("doc1", "3-rev", 3, 2, false)).unwrap();
        tree.add(rev("doc1", "4-rev", 4, 3, false)).unwrap();
        tree.add(rev("doc1", "5-rev", 5, 4, false)).unwrap();

        tree.add(rev("doc1", "3-rev2", 6, 2, false)).unwrap();
        tree.add(rev("doc1", "4-rev2", 7, 6, false)).unwrap();

        let leafs = tree.leafs();
        assert_eq!(leafs.len(), 2);
        assert!(tree.has_conflicts());

        let winner = tree.current_revision().unwrap();
        assert_eq!(winner.rev_id.to_string(), "5-rev");
    }

    #[test]
    fn multi_root_tree() {
        let mut tree = RevisionTree::new();
        tree.add(rev("docx", "2-x", 1, NO_PARENT, false)).unwrap();
        tree.add(rev("docx", "3-x", 2, 1, false)).unwrap();
        tree.add(rev("docx", "3-y", 3, 1, false)).unwrap();

        assert_eq!(tree.roots().len(), 1);
        assert_eq!(tree.leafs().len(), 2);
    }

    #[test]
    fn adding_with_missing_parent_fails() {
        let mut tree = RevisionTree::new();
        let err = tree.add(rev("doc1", "2-rev", 2, 1, false)).unwrap_err();
        assert!(matches!(err, DatastoreError::InvalidArgument(_)));
    }

    #[test]
    fn adding_same_sequence_twice_fails() {
        let mut tree = RevisionTree::new();
        tree.add(rev("doc1", "1-rev", 1, NO_PARENT, false)).unwrap();
        let err = tree
            .add(rev("doc1", "1-rev-dup", 1, NO_PARENT, false))
            .unwrap_err();
        assert!(matches!(err, DatastoreError::InvalidArgument(_)));
    }

    #[test]
    fn tree_with_only_deleted_leaves_still_elects_a_winner() {
        let mut tree = RevisionTree::new();
        tree.add(rev("doc1", "1-rev", 1, NO_PARENT, false)).unwrap();
        tree.add(rev("doc1", "2-rev", 2, 1, true)).unwrap();

        let winner = tree.current_revision().unwrap();
        assert_eq!(winner.rev_id.to_string(), "2-rev");
        assert!(winner.is_deleted);
        assert!(!tree.has_conflicts());
    }

    #[test]
    fn current_revision_fails_on_empty_tree() {
        let tree = RevisionTree::new();
        assert!(matches!(
            tree.current_revision(),
            Err(DatastoreError::NotFound(_))
        ));
    }

    #[test]
    fn rejects_non_increasing_generation() {
        let mut tree = RevisionTree::new();
        tree.add(rev("doc1", "5-rev", 1, NO_PARENT, false)).unwrap();
        let err = tree.add(rev("doc1", "5-rev2", 2, 1, false)).unwrap_err();
        assert!(matches!(err, DatastoreError::Corruption(_)));
    }

    #[test]
    fn rejects_foreign_document_parent() {
        let mut tree = RevisionTree::new();
        tree.add(rev("doc1", "1-rev", 1, NO_PARENT, false)).unwrap();
        let err = tree.add(rev("doc2", "2-rev", 2, 1, false)).unwrap_err();
        assert!(matches!(err, DatastoreError::Corruption(_)));
    }

    #[test]
    fn lookup_returns_none_for_wrong_doc_id() {
        let mut tree = RevisionTree::new();
        tree.add(rev("doc1", "1-rev", 1, NO_PARENT, false)).unwrap();
        assert!(tree.lookup("doc2", &"1-rev".parse().unwrap()).is_none());
        assert!(tree.lookup("doc1", &"1-rev".parse().unwrap()).is_some());
    }

    #[test]
    fn depth_equals_path_length_minus_one_invariant() {
        let mut tree = RevisionTree::new();
        tree.add(rev("doc1", "1-rev", 1, NO_PARENT, false)).unwrap();
        tree.add(rev("doc1", "2-rev", 2, 1, false)).unwrap();
        tree.add(rev("doc1", "3-rev", 3, 2, false)).unwrap();

        for seq in [1, 2, 3] {
            let path = tree.path_for_node(seq).unwrap();
            assert_eq!(tree.depth(seq), path.len() as i64 - 1);
        }
    }
}
