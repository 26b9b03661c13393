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

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use driftdb::{
        DatastoreConfig, DatastoreError, DatastoreEvent, DatastoreManager, DocumentBody,
        DocumentRevision, OfferedRevisions, NO_PARENT,
    };
    use tempfile::tempdir;

    #[test]
    fn open_force_insert_revs_diff_get_document() -> Result<(), DatastoreError> {
        let root = tempdir().expect("failed to create temp dir");
        let manager = DatastoreManager::new(root.path(), DatastoreConfig::default())?;

        let store = manager.open("mailboxes")?;
        let receiver = manager.subscribe("mailboxes").expect("datastore just opened");
        assert_eq!(
            receiver.recv().unwrap(),
            DatastoreEvent::DatastoreCreated("mailboxes".to_string())
        );
        assert_eq!(
            receiver.recv().unwrap(),
            DatastoreEvent::DatastoreOpened("mailboxes".to_string())
        );

        let root_rev = DocumentRevision {
            doc_id: "inbox-42".to_string(),
            rev_id: "1-a1".parse().unwrap(),
            body: DocumentBody::new(br#"{"subject":"hello"}"#.to_vec()),
            sequence: 0,
            internal_id: 0,
            is_local: false,
            is_deleted: false,
            is_current: false,
            parent_sequence: NO_PARENT,
        };
        let inserted_root = store.force_insert(root_rev, &[], Vec::new())?;
        assert!(inserted_root.is_current);

        let child_rev = DocumentRevision {
            doc_id: "inbox-42".to_string(),
            rev_id: "2-b2".parse().unwrap(),
            body: DocumentBody::new(br#"{"subject":"hello","read":true}"#.to_vec()),
            sequence: 0,
            internal_id: 0,
            is_local: false,
            is_deleted: false,
            is_current: false,
            parent_sequence: NO_PARENT,
        };
        let parent_path = vec!["1-a1".parse().unwrap()];
        let inserted_child = store.force_insert(child_rev, &parent_path, Vec::new())?;
        assert!(inserted_child.is_current);

        let winner = store.get_document("inbox-42")?;
        assert_eq!(winner.rev_id.to_string(), "2-b2");
        assert!(store.get_conflicted_documents().is_empty());

        let mut offered_candidates: HashSet<_> = HashSet::new();
        offered_candidates.insert("1-a1".parse().unwrap());
        offered_candidates.insert("2-b2".parse().unwrap());
        offered_candidates.insert("3-c3".parse().unwrap());
        let mut offered = OfferedRevisions::new();
        offered.insert("inbox-42".to_string(), offered_candidates);

        let diff = store.revs_diff(&offered);
        assert_eq!(diff["inbox-42"].missing, vec!["3-c3".parse().unwrap()]);

        manager.close("mailboxes");
        assert_eq!(
            receiver.recv().unwrap(),
            DatastoreEvent::DatastoreClosed("mailboxes".to_string())
        );

        Ok(())
    }

    #[test]
    fn reopening_a_deleted_datastore_starts_fresh() -> Result<(), DatastoreError> {
        let root = tempdir().expect("failed to create temp dir");
        let manager = DatastoreManager::new(root.path(), DatastoreConfig::default())?;

        let store = manager.open("scratch")?;
        let rev = DocumentRevision {
            doc_id: "doc1".to_string(),
            rev_id: "1-a1".parse().unwrap(),
            body: DocumentBody::empty(),
            sequence: 0,
            internal_id: 0,
            is_local: false,
            is_deleted: false,
            is_current: false,
            parent_sequence: NO_PARENT,
        };
        store.force_insert(rev, &[], Vec::new())?;

        manager.delete("scratch")?;
        assert!(matches!(manager.delete("scratch"), Err(DatastoreError::NotFound(_))));

        let reopened = manager.open("scratch")?;
        assert!(matches!(
            reopened.get_document("doc1"),
            Err(DatastoreError::NotFound(_))
        ));

        Ok(())
    }

    #[test]
    fn rejects_datastore_names_that_fail_validation() {
        let root = tempdir().expect("failed to create temp dir");
        let manager = DatastoreManager::new(root.path(), DatastoreConfig::default()).unwrap();
        assert!(matches!(
            manager.open("9lives"),
            Err(DatastoreError::InvalidArgument(_))
        ));
    }
}
