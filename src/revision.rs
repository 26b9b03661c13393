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

use crate::document_body::DocumentBody;
use crate::revision_id::RevisionId;

/// The local, strictly-increasing insertion number of a revision. Unique
/// across a whole datastore, not just within one document.
pub type Sequence = i64;

/// `parent_sequence` value meaning "this revision is a root of its tree".
pub const NO_PARENT: Sequence = -1;

/// A per-document clustering id: every revision of the same logical
/// document shares one `InternalId`.
pub type InternalId = u64;

/// One immutable revision of a document.
///
/// `is_current` is advisory: the [`crate::RevisionTree`] that owns this
/// revision is the source of truth for leaf-ness and recomputes it from
/// topology rather than trusting the stored value (see Design Notes in
/// SPEC_FULL.md). Callers that build a `DocumentRevision` ahead of
/// insertion should simply set it to `false` and let the tree stamp the
/// correct value when handing the revision back out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRevision {
    pub doc_id: String,
    pub rev_id: RevisionId,
    pub body: DocumentBody,
    pub sequence: Sequence,
    pub internal_id: InternalId,
    pub is_local: bool,
    pub is_deleted: bool,
    pub is_current: bool,
    pub parent_sequence: Sequence,
}

impl DocumentRevision {
    /// Builds a root revision (no parent) for `doc_id`.
    pub fn new_root(
        doc_id: impl Into<String>,
        rev_id: RevisionId,
        body: DocumentBody,
        sequence: Sequence,
        internal_id: InternalId,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            rev_id,
            body,
            sequence,
            internal_id,
            is_local: false,
            is_deleted: false,
            is_current: true,
            parent_sequence: NO_PARENT,
        }
    }

    /// Builds a child revision of `parent`, inheriting `doc_id` and
    /// `internal_id` and requiring a strictly greater generation.
    pub fn new_child(
        parent: &DocumentRevision,
        rev_id: RevisionId,
        body: DocumentBody,
        sequence: Sequence,
        is_deleted: bool,
    ) -> Self {
        Self {
            doc_id: parent.doc_id.clone(),
            rev_id,
            body,
            sequence,
            internal_id: parent.internal_id,
            is_local: parent.is_local,
            is_deleted,
            is_current: true,
            parent_sequence: parent.sequence,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent_sequence == NO_PARENT
    }
}
