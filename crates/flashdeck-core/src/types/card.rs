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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Deserialize;
use serde::Serialize;

use crate::error::Error;
use crate::error::Fallible;

pub type CardId = u64;

/// A question/answer pair. Cards are never edited: a changed card is a
/// deleted card plus a new one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    id: CardId,
    question: String,
    answer: String,
}

impl Card {
    /// Build a card, trimming both sides. Fails if either side is blank.
    pub fn new(id: CardId, question: &str, answer: &str) -> Fallible<Self> {
        let question = question.trim();
        let answer = answer.trim();
        if question.is_empty() {
            return Err(Error::validation("question must not be empty"));
        }
        if answer.is_empty() {
            return Err(Error::validation("answer must not be empty"));
        }
        Ok(Self {
            id,
            question: question.to_string(),
            answer: answer.to_string(),
        })
    }

    /// Build a card from trusted, already-trimmed parts.
    pub(crate) fn from_parts(id: CardId, question: &str, answer: &str) -> Self {
        Self {
            id,
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    pub fn id(&self) -> CardId {
        self.id
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Whether a card read back from storage is usable.
    pub(crate) fn is_well_formed(&self) -> bool {
        !self.question.trim().is_empty() && !self.answer.trim().is_empty()
    }
}

impl Display for Card {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} {} => {}", self.id, self.question, self.answer)
    }
}
