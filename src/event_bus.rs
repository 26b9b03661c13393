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

use crossbeam_channel::{Receiver, Sender, TrySendError};

/// Lifecycle events published by a [`crate::DatastoreManager`] /
/// [`crate::Datastore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatastoreEvent {
    DatastoreCreated(String),
    DatastoreOpened(String),
    DatastoreClosed(String),
    DatastoreDeleted(String),
}

/// A fire-and-forget, best-effort event bus.
///
/// Subscribers drain a [`Receiver`] they hold themselves (no callback
/// re-entry into the datastore); a publish never blocks the caller, and
/// publishing into a full channel silently drops the event rather than
/// applying backpressure to whatever triggered the lifecycle change.
pub struct EventBus {
    tx: Sender<DatastoreEvent>,
}

impl EventBus {
    /// Creates a bus with the given channel capacity, returning the bus and
    /// the receiver subscribers should drain.
    pub fn new(capacity: usize) -> (Self, Receiver<DatastoreEvent>) {
        let (tx, rx) = crossbeam_channel::bounded(capacity);
        (Self { tx }, rx)
    }

    /// Publishes an event. Best-effort: if no receiver is listening, or the
    /// channel is full, the event is dropped and logged at debug level --
    /// publishers never observe or propagate a subscriber-side failure.
    pub fn publish(&self, event: DatastoreEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                tracing::debug!(?event, "event bus channel full, dropping event");
            }
            Err(TrySendError::Disconnected(event)) => {
                tracing::debug!(?event, "event bus has no receivers, dropping event");
            }
        }
    }
}
