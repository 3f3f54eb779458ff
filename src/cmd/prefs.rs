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

use flashdeck_core::Difficulty;
use flashdeck_core::FontSize;
use flashdeck_core::Preferences;
use flashdeck_core::Theme;

use crate::cmd::Workspace;
use crate::error::Fallible;

/// Fields to change; unset fields keep their current value.
#[derive(Default)]
pub struct PrefsUpdate {
    pub theme: Option<Theme>,
    pub font_size: Option<FontSize>,
    pub flip_speed: Option<u32>,
    pub difficulty: Option<Difficulty>,
    pub auto_flip: Option<bool>,
}

impl PrefsUpdate {
    fn merge(self, current: Preferences) -> Preferences {
        Preferences {
            theme: self.theme.unwrap_or(current.theme),
            font_size: self.font_size.unwrap_or(current.font_size),
            flip_speed_ms: self.flip_speed.unwrap_or(current.flip_speed_ms),
            difficulty: self.difficulty.unwrap_or(current.difficulty),
            auto_flip: self.auto_flip.unwrap_or(current.auto_flip),
        }
    }
}

pub fn show_prefs(directory: Option<String>) -> Fallible<()> {
    let ws = Workspace::open(directory)?;
    print_prefs(&ws.prefs.load());
    Ok(())
}

pub fn set_prefs(directory: Option<String>, update: PrefsUpdate) -> Fallible<()> {
    let mut ws = Workspace::open(directory)?;
    let next = update.merge(ws.prefs.load());
    ws.prefs.apply(next)?;
    print_prefs(&next);
    Ok(())
}

fn print_prefs(prefs: &Preferences) {
    println!("theme:       {}", prefs.theme);
    println!("font size:   {}", prefs.font_size);
    println!(
        "flip speed:  {} ms ({} ms at {} difficulty)",
        prefs.flip_speed_ms,
        prefs.effective_flip_ms(),
        prefs.difficulty
    );
    println!("difficulty:  {}", prefs.difficulty);
    println!("auto-flip:   {}", prefs.auto_flip);
}
