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

//! Presentation settings.

use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;

use crate::error::Error;
use crate::error::Fallible;
use crate::observer::SubscriptionId;
use crate::observer::Subscribers;
use crate::storage::KeyValueStore;
use crate::storage::PREFERENCES_KEY;
use crate::storage::read_or_none;

pub const MIN_FLIP_SPEED_MS: u32 = 200;
pub const MAX_FLIP_SPEED_MS: u32 = 1200;

/// Easy mode never flips faster than this.
const EASY_FLOOR_MS: u32 = 800;

/// Hard mode never flips slower than this.
const HARD_CEILING_MS: u32 = 400;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Dark,
    Vibrant,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

macro_rules! lowercase_names {
    ($ty:ty { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl Display for $ty {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $name),)+
                }
            }
        }

        impl FromStr for $ty {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Self::$variant),)+
                    _ => Err(Error::validation(format!(
                        "unknown {}: '{s}'",
                        stringify!($ty).to_lowercase()
                    ))),
                }
            }
        }
    };
}

lowercase_names!(Theme { Default => "default", Dark => "dark", Vibrant => "vibrant" });
lowercase_names!(FontSize { Small => "small", Medium => "medium", Large => "large" });
lowercase_names!(Difficulty { Easy => "easy", Medium => "medium", Hard => "hard" });

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    pub theme: Theme,
    pub font_size: FontSize,
    /// Card flip animation length, in milliseconds.
    pub flip_speed_ms: u32,
    pub difficulty: Difficulty,
    /// Whether "don't know" advances by itself after the answer is shown.
    pub auto_flip: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            theme: Theme::Default,
            font_size: FontSize::Medium,
            flip_speed_ms: 600,
            difficulty: Difficulty::Medium,
            auto_flip: true,
        }
    }
}

impl Preferences {
    pub fn validate(&self) -> Fallible<()> {
        if !(MIN_FLIP_SPEED_MS..=MAX_FLIP_SPEED_MS).contains(&self.flip_speed_ms) {
            return Err(Error::validation(format!(
                "flip speed must be between {MIN_FLIP_SPEED_MS} and {MAX_FLIP_SPEED_MS} ms, got {}",
                self.flip_speed_ms
            )));
        }
        Ok(())
    }

    /// The flip duration actually used, after the difficulty adjustment.
    pub fn effective_flip_ms(&self) -> u32 {
        match self.difficulty {
            Difficulty::Easy => self.flip_speed_ms.max(EASY_FLOOR_MS),
            Difficulty::Medium => self.flip_speed_ms,
            Difficulty::Hard => self.flip_speed_ms.min(HARD_CEILING_MS),
        }
    }

    /// Recover what can be recovered from a stored record. Each field is read
    /// on its own; anything missing or invalid keeps its default.
    pub fn from_json_lenient(json: &str) -> Self {
        let mut prefs = Self::default();
        let fields: Map<String, Value> = match serde_json::from_str(json) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => {
                log::warn!("Stored preferences are not an object, using defaults");
                return prefs;
            }
            Err(e) => {
                log::warn!("Stored preferences are corrupt, using defaults: {e}");
                return prefs;
            }
        };
        if let Some(theme) = field(&fields, "theme") {
            prefs.theme = theme;
        }
        if let Some(font_size) = field(&fields, "fontSize") {
            prefs.font_size = font_size;
        }
        if let Some(speed) = field::<u32>(&fields, "flipSpeedMs") {
            if (MIN_FLIP_SPEED_MS..=MAX_FLIP_SPEED_MS).contains(&speed) {
                prefs.flip_speed_ms = speed;
            } else {
                log::warn!("Stored flip speed {speed} is out of range, using default");
            }
        }
        if let Some(difficulty) = field(&fields, "difficulty") {
            prefs.difficulty = difficulty;
        }
        if let Some(auto_flip) = field(&fields, "autoFlip") {
            prefs.auto_flip = auto_flip;
        }
        prefs
    }
}

fn field<T: DeserializeOwned>(fields: &Map<String, Value>, name: &str) -> Option<T> {
    let value = fields.get(name)?;
    match serde_json::from_value(value.clone()) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Ignoring stored preference '{name}': {e}");
            None
        }
    }
}

/// Owns the preferences record.
pub struct PreferencesStore<S: KeyValueStore> {
    store: S,
    current: Preferences,
    subscribers: Subscribers<Preferences>,
}

impl<S: KeyValueStore> PreferencesStore<S> {
    /// Open the store, reading whatever is persisted.
    pub fn new(store: S) -> Self {
        let current = load(&store);
        Self {
            store,
            current,
            subscribers: Subscribers::new(),
        }
    }

    /// The settings in effect.
    pub fn load(&self) -> Preferences {
        self.current
    }

    /// Replace all settings at once, persisting them in a single write.
    pub fn apply(&mut self, prefs: Preferences) -> Fallible<()> {
        prefs.validate()?;
        self.store
            .set(PREFERENCES_KEY, &serde_json::to_string(&prefs)?)?;
        self.current = prefs;
        log::debug!("Applied preferences: {prefs:?}");
        self.subscribers.notify(&prefs);
        Ok(())
    }

    /// Re-read from storage, notifying subscribers if anything changed.
    pub fn refresh(&mut self) -> Preferences {
        let fresh = load(&self.store);
        if fresh != self.current {
            self.current = fresh;
            self.subscribers.notify(&fresh);
        }
        self.current
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&Preferences) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }
}

fn load<S: KeyValueStore>(store: &S) -> Preferences {
    match read_or_none(store, PREFERENCES_KEY) {
        Some(json) => Preferences::from_json_lenient(&json),
        None => Preferences::default(),
    }
}
