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

use serde::Serialize;

use crate::revision_id::RevisionId;
use crate::revision_tree::RevisionTree;

/// The offered side of a revs-diff call: document id -> candidate revision
/// ids. A `HashSet` per document collapses duplicate candidates for free.
pub type OfferedRevisions = HashMap<String, HashSet<RevisionId>>;

/// One document's entry in a `_revs_diff`-shaped response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingRevisions {
    pub missing: Vec<RevisionId>,
}

/// The result of a revs-diff call, shaped like CouchDB's `_revs_diff`
/// response: documents with nothing missing are simply absent from the map.
pub type RevsDiffResult = HashMap<String, MissingRevisions>;

/// Diffs one document's offered revision ids against the revision ids
/// already known to `tree` (or `None` if the document has no tree at all,
/// in which case every offered id is missing).
///
/// This does a single pass over `offered` and one hash lookup per
/// candidate against the tree's existing `by_rev_id` index — no per-item
/// traversal of the tree or trips back out to a persistence layer, which is
/// what keeps a batch of these sublinear in total store size.
pub fn revs_diff_for_tree(
    doc_id: &str,
    offered: &HashSet<RevisionId>,
    tree: Option<&RevisionTree>,
) -> HashSet<RevisionId> {
    match tree {
        Some(tree) => offered
            .iter()
            .filter(|rev_id| tree.lookup(doc_id, rev_id).is_none())
            .cloned()
            .collect(),
        None => offered.clone(),
    }
}

/// Diffs an entire offered multimap against a document->tree lookup
/// function, omitting documents whose offered set is fully known locally.
pub fn revs_diff<'a, F>(offered: &OfferedRevisions, lookup_tree: F) -> RevsDiffResult
where
    F: Fn(&str) -> Option<&'a RevisionTree>,
{
    let mut result = RevsDiffResult::new();
    for (doc_id, candidates) in offered {
        let missing = revs_diff_for_tree(doc_id, candidates, lookup_tree(doc_id));
        if !missing.is_empty() {
            result.insert(
                doc_id.clone(),
                MissingRevisions {
                    missing: missing.into_iter().collect(),
                },
            );
        }
    }
    result
}
