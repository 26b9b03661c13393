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

//! driftdb is the embedded, offline-first document datastore core: the
//! per-document revision tree, the revs-diff negotiation used during
//! replication, and the content-addressed attachment staging that feeds
//! binary blobs into revisions.
//!
//! This crate deliberately does not include a SQL-backed persistence layer,
//! HTTP transport, a replication driver loop, or a CLI: those are external
//! collaborators that drive the types exposed here.

pub mod attachment;
pub mod config;
pub mod datastore;
pub mod document_body;
pub mod error;
pub mod event_bus;
pub mod manager;
pub mod revision;
pub mod revision_id;
pub mod revision_tree;
pub mod revs_diff;

pub use attachment::{AttachmentEncoding, AttachmentSource, PreparedAttachment};
pub use config::DatastoreConfig;
pub use datastore::Datastore;
pub use document_body::DocumentBody;
pub use error::DatastoreError;
pub use event_bus::{DatastoreEvent, EventBus};
pub use manager::DatastoreManager;
pub use revision::{DocumentRevision, Sequence, NO_PARENT};
pub use revision_id::RevisionId;
pub use revision_tree::RevisionTree;
pub use revs_diff::{revs_diff, revs_diff_for_tree, MissingRevisions, OfferedRevisions, RevsDiffResult};
