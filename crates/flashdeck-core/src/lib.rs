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

//! flashdeck-core: the state behind a question/answer flashcard trainer.
//!
//! Everything here is platform-free and persists through [`KeyValueStore`]:
//! - [`CardStore`]: the card collection
//! - [`SessionEngine`]: a shuffled deck and the answers given so far
//! - [`PreferencesStore`]: presentation settings
//! - [`Drill`]: the reveal and auto-advance interaction

pub mod cards;
pub mod drill;
pub mod error;
pub mod observer;
pub mod preferences;
pub mod rng;
pub mod session;
pub mod storage;
pub mod types;

// Re-exports for convenience
pub use cards::CardStore;
pub use drill::{AUTO_ADVANCE_DELAY_MS, AdvanceTicket, Drill, Outcome};
pub use error::{Error, Fallible, fail};
pub use observer::SubscriptionId;
pub use preferences::{Difficulty, FontSize, Preferences, PreferencesStore, Theme};
pub use rng::TinyRng;
pub use session::{DeckSource, SessionEngine, SessionState, Summary};
pub use storage::{KeyValueStore, MemoryStore};
pub use types::card::{Card, CardId};
pub use types::progress::SessionProgress;
