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

pub mod cards;
pub mod drill;
pub mod prefs;
pub mod summary;

use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use flashdeck_core::CardStore;
use flashdeck_core::PreferencesStore;
use flashdeck_core::SessionEngine;
use flashdeck_core::TinyRng;

use crate::config::Collection;
use crate::error::Fallible;
use crate::store::FileStore;

/// Everything a command needs, all backed by the collection's data directory.
pub struct Workspace {
    pub cards: CardStore<FileStore>,
    pub session: SessionEngine<FileStore>,
    pub prefs: PreferencesStore<FileStore>,
}

impl Workspace {
    pub fn open(directory: Option<String>) -> Fallible<Self> {
        let collection = Collection::new(directory)?;
        let store = FileStore::new(collection.data_dir());
        let seed = collection.config.seed.unwrap_or_else(clock_seed);
        Ok(Self {
            cards: CardStore::new(store.clone()),
            session: SessionEngine::new(store.clone(), TinyRng::from_seed(seed)),
            prefs: PreferencesStore::new(store),
        })
    }
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
