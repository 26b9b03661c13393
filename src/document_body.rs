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

use serde_json::{Map, Value};

use crate::error::DatastoreError;

/// An immutable, opaque byte sequence carried by a revision.
///
/// The store never interprets these bytes beyond the JSON-object convention
/// exposed by [`DocumentBody::as_json`] — payload schema is a concern for
/// the caller, not this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBody(Vec<u8>);

const EMPTY_BODY: &[u8] = b"{}";

impl DocumentBody {
    /// Wraps raw bytes as a document body. Never fails: the JSON convention
    /// is only checked on demand, by [`DocumentBody::as_json`].
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The canonical empty body, the literal two bytes `{}`.
    pub fn empty() -> Self {
        Self(EMPTY_BODY.to_vec())
    }

    pub fn is_empty(&self) -> bool {
        self.0 == EMPTY_BODY
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Parses the body as a JSON object view. Returns
    /// [`DatastoreError::InvalidArgument`] if the bytes are not valid JSON or
    /// are valid JSON that is not an object (arrays, scalars, etc. are not
    /// a valid document body under the JSON convention).
    pub fn as_json(&self) -> Result<Map<String, Value>, DatastoreError> {
        let value: Value = serde_json::from_slice(&self.0).map_err(|e| {
            DatastoreError::InvalidArgument(format!("document body is not valid JSON: {e}"))
        })?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(DatastoreError::InvalidArgument(format!(
                "document body must be a JSON object, got {other}"
            ))),
        }
    }
}

impl Default for DocumentBody {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Map<String, Value>> for DocumentBody {
    fn from(map: Map<String, Value>) -> Self {
        // `serde_json::to_vec` only fails on types with non-string map keys
        // or on I/O errors, neither of which applies to an already-built
        // `Map<String, Value>`.
        Self(serde_json::to_vec(&map).expect("JSON object serialization is infallible"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_is_the_two_byte_literal() {
        assert_eq!(DocumentBody::empty().as_bytes(), b"{}");
        assert_eq!(DocumentBody::default(), DocumentBody::empty());
    }

    #[test]
    fn round_trips_through_json_view() {
        let body = DocumentBody::new(br#"{"hello":"world","n":1}"#.to_vec());
        let map = body.as_json().unwrap();
        assert_eq!(map.get("hello"), Some(&json!("world")));
        assert_eq!(map.get("n"), Some(&json!(1)));
    }

    #[test]
    fn rejects_non_object_json() {
        let body = DocumentBody::new(b"[1,2,3]".to_vec());
        assert!(body.as_json().is_err());
    }

    #[test]
    fn rejects_invalid_json() {
        let body = DocumentBody::new(b"not json".to_vec());
        assert!(body.as_json().is_err());
    }

    #[test]
    fn arbitrary_bytes_construct_without_failing() {
        // Construction itself never validates JSON-ness.
        let body = DocumentBody::new(vec![0xff, 0x00, 0x01]);
        assert_eq!(body.as_bytes(), &[0xff, 0x00, 0x01]);
    }
}
