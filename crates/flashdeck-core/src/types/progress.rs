// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::types::card::CardId;

/// The answers recorded so far in a session.
///
/// Every deck position before `current_index` has exactly one entry in either
/// `known` or `unknown`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionProgress {
    pub known: Vec<CardId>,
    pub unknown: Vec<CardId>,
    pub current_index: usize,
}

impl SessionProgress {
    pub fn answered(&self) -> usize {
        self.known.len() + self.unknown.len()
    }

    /// The structural invariants, checked against a deck of `deck_len` cards.
    /// A finished session (cursor at the end) is not resumable and fails.
    pub fn is_resumable(&self, deck_len: usize) -> bool {
        if self.current_index >= deck_len {
            return false;
        }
        if self.answered() != self.current_index {
            return false;
        }
        let known: HashSet<CardId> = self.known.iter().copied().collect();
        self.unknown.iter().all(|id| !known.contains(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_shape() -> Result<(), serde_json::Error> {
        let progress = SessionProgress {
            known: vec![3, 1],
            unknown: vec![2],
            current_index: 3,
        };
        let json = serde_json::to_string(&progress)?;
        assert_eq!(json, r#"{"known":[3,1],"unknown":[2],"currentIndex":3}"#);
        Ok(())
    }

    #[test]
    fn test_resumable() {
        let progress = SessionProgress {
            known: vec![1],
            unknown: vec![2],
            current_index: 2,
        };
        assert!(progress.is_resumable(5));
        assert!(!progress.is_resumable(2));
        assert!(SessionProgress::default().is_resumable(1));
        assert!(!SessionProgress::default().is_resumable(0));
    }

    #[test]
    fn test_not_resumable_when_lists_disagree() {
        let miscounted = SessionProgress {
            known: vec![1],
            unknown: vec![],
            current_index: 2,
        };
        assert!(!miscounted.is_resumable(5));
        let overlapping = SessionProgress {
            known: vec![1],
            unknown: vec![1],
            current_index: 2,
        };
        assert!(!overlapping.is_resumable(5));
    }
}
