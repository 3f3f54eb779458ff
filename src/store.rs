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

//! A [`KeyValueStore`] keeping one file per key in a directory.

use std::fs::create_dir_all;
use std::fs::read_to_string;
use std::fs::remove_file;
use std::fs::rename;
use std::fs::write;
use std::io::ErrorKind;
use std::path::PathBuf;

use flashdeck_core::Error;
use flashdeck_core::Fallible;
use flashdeck_core::KeyValueStore;

#[derive(Clone, Debug)]
pub struct FileStore {
    directory: PathBuf,
}

impl FileStore {
    /// The directory is created on the first write.
    pub fn new(directory: PathBuf) -> Self {
        Self { directory }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        match read_to_string(self.path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(key, e.to_string())),
        }
    }

    /// Write to a sibling file and rename it into place, so readers see
    /// either the old record or the new one.
    fn set(&self, key: &str, value: &str) -> Fallible<()> {
        let target = self.path(key);
        let staging = self.directory.join(format!(".{key}.json.tmp"));
        create_dir_all(&self.directory)
            .and_then(|_| write(&staging, value))
            .and_then(|_| rename(&staging, &target))
            .map_err(|e| Error::storage(key, e.to_string()))
    }

    fn remove(&self, key: &str) -> Fallible<()> {
        match remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(key, e.to_string())),
        }
    }
}
