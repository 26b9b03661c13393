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

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::attachment::{self, PreparedAttachment};
use crate::config::{defaults, DatastoreConfig};
use crate::document_body::DocumentBody;
use crate::error::DatastoreError;
use crate::event_bus::EventBus;
use crate::revision::{DocumentRevision, InternalId, Sequence, NO_PARENT};
use crate::revision_id::RevisionId;
use crate::revs_diff::{revs_diff_for_tree, MissingRevisions, OfferedRevisions, RevsDiffResult};
use crate::revision_tree::RevisionTree;

/// The narrow surface the replication driver is built against.
///
/// Owns one [`RevisionTree`] per document, each behind its own lock, plus a
/// datastore-wide sequence counter that hands out the strictly increasing
/// `sequence` every successful commit stamps onto its revision. The outer
/// `trees` map and the per-document locks compose the two-tier locking
/// scheme from SPEC_FULL.md §5: a reader only ever blocks on the document
/// it touches, never on unrelated documents.
pub struct Datastore {
    name: String,
    attachments_dir: PathBuf,
    config: DatastoreConfig,
    trees: Mutex<HashMap<String, Arc<Mutex<RevisionTree>>>>,
    sequence_counter: AtomicI64,
    internal_id_counter: AtomicU64,
    event_bus: EventBus,
}

impl Datastore {
    /// Opens (creating if necessary) the datastore rooted at `root_path`.
    /// `root_path` is expected to already exist and be owned by this
    /// datastore alone -- directory creation/removal at the named-datastore
    /// level is [`crate::DatastoreManager`]'s job.
    pub(crate) fn open(
        name: impl Into<String>,
        root_path: &Path,
        config: DatastoreConfig,
    ) -> Result<(Arc<Self>, crossbeam_channel::Receiver<crate::event_bus::DatastoreEvent>), DatastoreError>
    {
        let attachments_dir = root_path.join(defaults::ATTACHMENTS_DIR_NAME);
        std::fs::create_dir_all(&attachments_dir)?;

        let (event_bus, event_rx) = EventBus::new(config.event_bus_channel_capacity);

        let store = Arc::new(Self {
            name: name.into(),
            attachments_dir,
            config,
            trees: Mutex::new(HashMap::new()),
            sequence_counter: AtomicI64::new(0),
            internal_id_counter: AtomicU64::new(0),
            event_bus,
        });
        Ok((store, event_rx))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The chunk size a caller should pass to [`crate::attachment::prepare`]
    /// when staging a new attachment for this datastore.
    pub fn config(&self) -> &DatastoreConfig {
        &self.config
    }

    /// The shared directory [`crate::attachment::prepare`] should target
    /// for this datastore. `doc_id` is accepted (rather than the caller
    /// hardcoding a path) even though every document in a datastore shares
    /// one `attachments/` directory today -- see SPEC_FULL.md §6.
    pub fn open_attachments_dir(&self, _doc_id: &str) -> &Path {
        &self.attachments_dir
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    fn next_sequence(&self) -> Sequence {
        self.sequence_counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn next_internal_id(&self) -> InternalId {
        self.internal_id_counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn tree_handle(&self, doc_id: &str) -> Arc<Mutex<RevisionTree>> {
        let mut trees = self.trees.lock();
        trees
            .entry(doc_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(RevisionTree::new())))
            .clone()
    }

    /// The winning revision for `doc_id`.
    pub fn get_document(&self, doc_id: &str) -> Result<DocumentRevision, DatastoreError> {
        let trees = self.trees.lock();
        let tree_lock = trees.get(doc_id).ok_or_else(|| {
            DatastoreError::NotFound(format!("document '{doc_id}' has no revisions"))
        })?;
        let tree = tree_lock.lock();
        // `current_revision` always elects among `tree.leafs()`, so the
        // winner it returns is a leaf by construction: stamp accordingly
        // rather than trusting whatever `is_current` the stored value has.
        tree.current_revision().map(|winner| stamp_is_current(&tree, winner))
    }

    /// Documents currently holding more than one non-deleted leaf.
    pub fn get_conflicted_documents(&self) -> Vec<String> {
        let trees = self.trees.lock();
        trees
            .iter()
            .filter(|(_, tree_lock)| tree_lock.lock().has_conflicts())
            .map(|(doc_id, _)| doc_id.clone())
            .collect()
    }

    /// Diffs `offered` against what is locally known, batched per document:
    /// one tree lookup per document, never one round trip per candidate
    /// revision.
    pub fn revs_diff(&self, offered: &OfferedRevisions) -> RevsDiffResult {
        let _span = tracing::debug_span!("datastore::revs_diff", documents = offered.len()).entered();
        let trees = self.trees.lock();

        let mut result = RevsDiffResult::new();
        for (doc_id, candidates) in offered {
            let missing = match trees.get(doc_id) {
                Some(tree_lock) => {
                    let tree = tree_lock.lock();
                    revs_diff_for_tree(doc_id, candidates, Some(&tree))
                }
                None => revs_diff_for_tree(doc_id, candidates, None),
            };
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

    /// Inserts `revision` into its document's tree, reconciling it with
    /// `parent_path` -- the ancestor chain for `revision`, leaf-first:
    /// `revision`'s immediate parent is `parent_path[0]`, and the chain ends
    /// with the most distant known ancestor (the root, if present in the
    /// offered path). Ancestors missing from the local tree are created as
    /// empty-body stubs, walked from the root end down so each stub's
    /// parent already exists before it is added; `revision` itself is then
    /// attached as their descendant.
    ///
    /// `attachments` are committed (renamed out of staging) *before* any of
    /// this is linked into the tree, so that an I/O failure partway through
    /// never leaves a half-inserted chain visible to a reader: either the
    /// attachments land and the chain goes in right after, or nothing in
    /// the tree changes at all. The whole operation is serialized by the
    /// document's lock throughout.
    pub fn force_insert(
        &self,
        mut revision: DocumentRevision,
        parent_path: &[RevisionId],
        attachments: Vec<PreparedAttachment>,
    ) -> Result<DocumentRevision, DatastoreError> {
        let _span =
            tracing::debug_span!("datastore::force_insert", doc_id = %revision.doc_id, rev_id = %revision.rev_id)
                .entered();

        let tree_lock = self.tree_handle(&revision.doc_id);
        let mut tree = tree_lock.lock();

        if let Some(existing) = tree.lookup(&revision.doc_id, &revision.rev_id) {
            if existing.body != revision.body || existing.is_deleted != revision.is_deleted {
                return Err(DatastoreError::ConflictViolation(format!(
                    "revision {} already exists for document {} with different content",
                    revision.rev_id, revision.doc_id
                )));
            }
            return Ok(stamp_is_current(&tree, existing.clone()));
        }

        let internal_id = tree
            .roots()
            .values()
            .next()
            .map(|rev| rev.internal_id)
            .unwrap_or_else(|| self.next_internal_id());

        for prepared in attachments {
            attachment::commit(prepared, &self.attachments_dir)?;
        }

        let mut parent_sequence = NO_PARENT;
        for ancestor_id in parent_path.iter().rev() {
            if let Some(existing) = tree.lookup(&revision.doc_id, ancestor_id) {
                parent_sequence = existing.sequence;
                continue;
            }

            let stub = DocumentRevision {
                doc_id: revision.doc_id.clone(),
                rev_id: ancestor_id.clone(),
                body: DocumentBody::empty(),
                sequence: self.next_sequence(),
                internal_id,
                is_local: revision.is_local,
                is_deleted: false,
                is_current: false,
                parent_sequence,
            };
            parent_sequence = stub.sequence;
            tree.add(stub)?;
        }

        revision.sequence = self.next_sequence();
        revision.internal_id = internal_id;
        revision.parent_sequence = parent_sequence;
        revision.is_current = false;

        tree.add(revision.clone())?;

        Ok(stamp_is_current(&tree, revision))
    }
}

/// Recomputes `is_current` from `tree`'s live topology rather than trusting
/// whatever was stamped on `rev` earlier -- the tree's leaf set is the only
/// source of truth (SPEC_FULL.md §9).
fn stamp_is_current(tree: &RevisionTree, mut rev: DocumentRevision) -> DocumentRevision {
    rev.is_current = tree.leafs().iter().any(|leaf| leaf.sequence == rev.sequence);
    rev
}
