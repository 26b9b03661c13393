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

use thiserror::Error;

/// The error kinds produced by the datastore core.
///
/// Every fallible operation in this crate returns one of these variants —
/// never a bare `String` or an opaque `anyhow::Error` — so that callers
/// (in particular the replication driver) can match on failure kind instead
/// of parsing messages.
#[derive(Error, Debug)]
pub enum DatastoreError {
    /// A name, revision id, or argument failed validation, or a revision
    /// was inserted out of order (parent missing, sequence already used).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A lookup with a no-null contract found nothing, or a lifecycle
    /// operation (e.g. delete) targeted a datastore that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A filesystem operation failed during attachment staging or commit.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A stored invariant was violated: a digest mismatch, or a parent
    /// pointer into a sequence belonging to a different document, or a
    /// non-increasing generation along a parent edge.
    #[error("corruption detected: {0}")]
    Corruption(String),

    /// An insert targeted a revision id that already exists in the tree
    /// with different content.
    #[error("conflicting revision: {0}")]
    ConflictViolation(String),

    /// A cooperative cancellation signal was observed mid-operation.
    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, DatastoreError>;
