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

//! Per-collection settings read from `flashdeck.toml`.

use std::fs::read_to_string;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;

use crate::error::Fallible;
use crate::error::fail;

pub const CONFIG_FILE: &str = "flashdeck.toml";

const DEFAULT_DATA_DIR: &str = ".flashdeck";

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where the stored keys live, relative to the collection directory.
    pub data_dir: Option<String>,
    /// Fixed shuffle seed. By default every shuffle is seeded from the clock.
    pub seed: Option<u64>,
}

/// A resolved collection: its directory and configuration.
pub struct Collection {
    pub directory: PathBuf,
    pub config: Config,
}

impl Collection {
    /// Open the collection at `directory`, or the current directory.
    pub fn new(directory: Option<String>) -> Fallible<Self> {
        let directory: PathBuf = match directory {
            Some(dir) => PathBuf::from(dir),
            None => std::env::current_dir()?,
        };
        if !directory.is_dir() {
            return fail("directory does not exist.");
        }
        let config = Config::load(&directory)?;
        Ok(Self { directory, config })
    }

    pub fn data_dir(&self) -> PathBuf {
        let name = self.config.data_dir.as_deref().unwrap_or(DEFAULT_DATA_DIR);
        self.directory.join(name)
    }
}

impl Config {
    pub fn load(directory: &Path) -> Fallible<Self> {
        let path = directory.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Config::default());
        }
        let text = read_to_string(&path)?;
        let config: Config = toml::from_str(&text)?;
        log::debug!("Loaded {}: {config:?}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_missing_directory() {
        let result = Collection::new(Some("./derpherp".to_string()));
        assert_eq!(
            result.err().map(|e| e.to_string()),
            Some("error: directory does not exist.".to_string())
        );
    }

    #[test]
    fn test_defaults_without_config_file() -> Fallible<()> {
        let dir = tempdir()?;
        let collection = Collection::new(Some(dir.path().display().to_string()))?;
        assert_eq!(collection.config, Config::default());
        assert_eq!(collection.data_dir(), dir.path().join(".flashdeck"));
        Ok(())
    }

    #[test]
    fn test_reads_config_file() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join(CONFIG_FILE), "data_dir = \"state\"\nseed = 42\n")?;
        let collection = Collection::new(Some(dir.path().display().to_string()))?;
        assert_eq!(collection.config.seed, Some(42));
        assert_eq!(collection.data_dir(), dir.path().join("state"));
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_keys() -> Fallible<()> {
        let dir = tempdir()?;
        write(dir.path().join(CONFIG_FILE), "colour = \"blue\"\n")?;
        assert!(Collection::new(Some(dir.path().display().to_string())).is_err());
        Ok(())
    }
}
