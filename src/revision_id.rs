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

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DatastoreError;

/// A parsed `"<generation>-<suffix>"` revision identifier.
///
/// The suffix is opaque bytes in the wire format (a hex digest in practice)
/// but is kept as a `String` here: the tree never interprets it beyond
/// ordering, and round-tripping through `serde_json` is simplest as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RevisionId {
    generation: u64,
    suffix: String,
}

impl RevisionId {
    /// Builds a revision id directly, without going through wire parsing.
    /// `generation` must be >= 1 and `suffix` must be non-empty and free of
    /// whitespace; both are cheap to guarantee at the few call sites that
    /// mint fresh revision ids, so this does not return a `Result`.
    pub fn new(generation: u64, suffix: impl Into<String>) -> Self {
        let suffix = suffix.into();
        debug_assert!(generation >= 1, "generation must be >= 1");
        debug_assert!(!suffix.is_empty(), "suffix must be non-empty");
        debug_assert!(
            !suffix.chars().any(char::is_whitespace),
            "suffix must not contain whitespace"
        );
        Self { generation, suffix }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Returns a revision id one generation ahead of `self`, for minting a
    /// child revision's id given a freshly computed suffix.
    pub fn child(&self, suffix: impl Into<String>) -> Self {
        Self::new(self.generation + 1, suffix)
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.generation, self.suffix)
    }
}

impl PartialOrd for RevisionId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RevisionId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.generation, &self.suffix).cmp(&(other.generation, &other.suffix))
    }
}

impl FromStr for RevisionId {
    type Err = DatastoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((gen_part, suffix)) = s.split_once('-') else {
            return Err(DatastoreError::InvalidArgument(format!(
                "revision id '{s}' is missing the '-' separator"
            )));
        };

        if gen_part.is_empty() || !gen_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(DatastoreError::InvalidArgument(format!(
                "revision id '{s}' has a non-numeric generation"
            )));
        }

        let generation: u64 = gen_part.parse().map_err(|_| {
            DatastoreError::InvalidArgument(format!("revision id '{s}' has an unparsable generation"))
        })?;

        if generation == 0 {
            return Err(DatastoreError::InvalidArgument(format!(
                "revision id '{s}' has generation 0, generation must be >= 1"
            )));
        }

        if suffix.is_empty() || suffix.chars().any(char::is_whitespace) {
            return Err(DatastoreError::InvalidArgument(format!(
                "revision id '{s}' has an empty or malformed suffix"
            )));
        }

        Ok(RevisionId {
            generation,
            suffix: suffix.to_string(),
        })
    }
}

impl TryFrom<String> for RevisionId {
    type Error = DatastoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RevisionId> for String {
    fn from(value: RevisionId) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_ids() {
        let id: RevisionId = "12-deadbeef".parse().unwrap();
        assert_eq!(id.generation(), 12);
        assert_eq!(id.suffix(), "deadbeef");
        assert_eq!(id.to_string(), "12-deadbeef");
    }

    #[test]
    fn rejects_missing_separator() {
        assert!("12deadbeef".parse::<RevisionId>().is_err());
    }

    #[test]
    fn rejects_zero_generation() {
        assert!("0-abc".parse::<RevisionId>().is_err());
    }

    #[test]
    fn rejects_non_numeric_generation() {
        assert!("x-abc".parse::<RevisionId>().is_err());
    }

    #[test]
    fn rejects_empty_suffix() {
        assert!("1-".parse::<RevisionId>().is_err());
    }

    #[test]
    fn rejects_whitespace_in_suffix() {
        assert!("1-ab cd".parse::<RevisionId>().is_err());
    }

    #[test]
    fn orders_by_generation_then_suffix() {
        let a: RevisionId = "2-aaaa".parse().unwrap();
        let b: RevisionId = "10-aaaa".parse().unwrap();
        assert!(a < b, "generation compares numerically, not lexicographically");

        let c: RevisionId = "5-aaaa".parse().unwrap();
        let d: RevisionId = "5-zzzz".parse().unwrap();
        assert!(c < d);
    }

    #[test]
    fn serializes_as_wire_string() {
        let id: RevisionId = "3-cafe".parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"3-cafe\"");
        let back: RevisionId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
