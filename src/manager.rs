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
use std::path::PathBuf;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use parking_lot::Mutex;

use crate::config::DatastoreConfig;
use crate::datastore::Datastore;
use crate::error::DatastoreError;
use crate::event_bus::DatastoreEvent;

/// Placeholder marker file for the relational store this crate does not
/// implement; see SPEC_FULL.md's on-disk layout section.
const RELATIONAL_STORE_MARKER: &str = "store.marker";

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Owns a root directory under which each named datastore lives in its own
/// subdirectory, and the map of currently open instances.
///
/// Opens are idempotent: concurrent callers opening the same name are
/// guaranteed to observe the same `Arc<Datastore>`, per SPEC_FULL.md §4.5.
/// This is the only place in the crate with a true double-checked-locking
/// pattern (a fast read-only check, then a second check under the same lock
/// before inserting) because the open map is the one piece of shared state
/// multiple unrelated callers race to populate at the same key.
pub struct DatastoreManager {
    root: PathBuf,
    config: DatastoreConfig,
    open: Mutex<HashMap<String, (Arc<Datastore>, Receiver<DatastoreEvent>)>>,
}

impl DatastoreManager {
    /// Roots the manager at `root`, creating the directory if it does not
    /// already exist.
    pub fn new(root: impl Into<PathBuf>, config: DatastoreConfig) -> Result<Self, DatastoreError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            config,
            open: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn validate_name(name: &str) -> Result<(), DatastoreError> {
        if is_valid_name(name) {
            Ok(())
        } else {
            Err(DatastoreError::InvalidArgument(format!(
                "datastore name '{name}' does not match ^[A-Za-z][A-Za-z0-9_]*$"
            )))
        }
    }

    fn datastore_dir(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Opens the named datastore, creating its on-disk layout if it does
    /// not exist yet. Returns the same `Arc<Datastore>` for repeated opens
    /// of the same name within this manager's lifetime.
    pub fn open(&self, name: &str) -> Result<Arc<Datastore>, DatastoreError> {
        Self::validate_name(name)?;

        {
            let open = self.open.lock();
            if let Some((store, _rx)) = open.get(name) {
                return Ok(store.clone());
            }
        }

        let mut open = self.open.lock();
        if let Some((store, _rx)) = open.get(name) {
            return Ok(store.clone());
        }

        let dir = self.datastore_dir(name);
        let created = !dir.exists();
        std::fs::create_dir_all(&dir)?;

        let marker = dir.join(RELATIONAL_STORE_MARKER);
        if !marker.exists() {
            std::fs::write(&marker, b"")?;
        }

        let (store, event_rx) = Datastore::open(name, &dir, self.config.clone())?;

        if created {
            store.event_bus().publish(DatastoreEvent::DatastoreCreated(name.to_string()));
        }
        store.event_bus().publish(DatastoreEvent::DatastoreOpened(name.to_string()));

        open.insert(name.to_string(), (store.clone(), event_rx));
        Ok(store)
    }

    /// Clones a handle to the named datastore's event receiver, if it is
    /// currently open. Multiple subscribers may each hold a clone; a given
    /// published event is still delivered to exactly one of them (the
    /// underlying channel is competitive, not a broadcast), matching the
    /// "no ordering guarantee across subscribers" contract in SPEC_FULL.md
    /// §6.
    pub fn subscribe(&self, name: &str) -> Option<Receiver<DatastoreEvent>> {
        let open = self.open.lock();
        open.get(name).map(|(_store, rx)| rx.clone())
    }

    /// Closes the named datastore if open, dropping the manager's
    /// reference to it. Does not remove it from disk; a later `open` with
    /// the same name will succeed. No-op (not an error) if the datastore
    /// was not open.
    pub fn close(&self, name: &str) {
        let mut open = self.open.lock();
        if let Some((store, _rx)) = open.remove(name) {
            store.event_bus().publish(DatastoreEvent::DatastoreClosed(name.to_string()));
        }
    }

    /// Deletes the named datastore's entire subdirectory and drops it from
    /// the open map. Fails with not-found if the datastore does not exist
    /// on disk.
    pub fn delete(&self, name: &str) -> Result<(), DatastoreError> {
        Self::validate_name(name)?;

        let dir = self.datastore_dir(name);
        if !dir.exists() {
            return Err(DatastoreError::NotFound(format!(
                "datastore '{name}' does not exist"
            )));
        }

        let mut open = self.open.lock();
        let removed = open.remove(name);
        if let Some((store, _rx)) = &removed {
            store.event_bus().publish(DatastoreEvent::DatastoreClosed(name.to_string()));
        }

        std::fs::remove_dir_all(&dir)?;

        if let Some((store, _rx)) = &removed {
            store.event_bus().publish(DatastoreEvent::DatastoreDeleted(name.to_string()));
        }

        Ok(())
    }
}
