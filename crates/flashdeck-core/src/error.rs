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

use thiserror::Error;

/// Errors surfaced to the caller.
///
/// Corrupt persisted data is deliberately absent: it is logged and replaced
/// with defaults where it is read, and never reaches the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// An input failed a precondition (empty question, flip speed out of range).
    #[error("invalid input: {0}")]
    Validation(String),
    /// An operation was invoked in a state that does not allow it.
    #[error("invalid state: {0}")]
    State(String),
    /// The durable store rejected a read or a write.
    #[error("storage error on key '{key}': {message}")]
    Storage { key: String, message: String },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    pub fn state(msg: impl Into<String>) -> Self {
        Error::State(msg.into())
    }

    pub fn storage(key: &str, msg: impl Into<String>) -> Self {
        Error::Storage {
            key: key.to_string(),
            message: msg.into(),
        }
    }
}

pub type Fallible<T> = Result<T, Error>;

pub fn fail<T>(msg: impl Into<String>) -> Fallible<T> {
    Err(Error::State(msg.into()))
}
