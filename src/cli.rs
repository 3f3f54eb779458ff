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

use clap::Parser;
use clap::Subcommand;
use flashdeck_core::CardId;
use flashdeck_core::Difficulty;
use flashdeck_core::FontSize;
use flashdeck_core::Theme;

use crate::cmd::cards::add_card;
use crate::cmd::cards::delete_card;
use crate::cmd::cards::list_cards;
use crate::cmd::drill::drill;
use crate::cmd::prefs::PrefsUpdate;
use crate::cmd::prefs::set_prefs;
use crate::cmd::prefs::show_prefs;
use crate::cmd::summary::print_summary;
use crate::cmd::summary::reset_session;
use crate::error::Fallible;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// Study the cards in the terminal.
    Drill {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// Start over with a fresh shuffle instead of resuming.
        #[arg(long)]
        reset: bool,
    },
    /// Manage the card collection.
    Cards {
        #[command(subcommand)]
        command: CardsCommand,
    },
    /// Show or change presentation settings.
    Prefs {
        #[command(subcommand)]
        command: PrefsCommand,
    },
    /// Print how the current session went.
    Summary {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Reshuffle the deck and clear the session's answers.
    Reset {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
}

#[derive(Subcommand)]
enum CardsCommand {
    /// List every card.
    List {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Add a card.
    Add {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[arg(long)]
        question: String,
        #[arg(long)]
        answer: String,
    },
    /// Delete a card by id.
    Delete {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        #[arg(long)]
        id: CardId,
    },
}

#[derive(Subcommand)]
enum PrefsCommand {
    /// Print the current settings.
    Show {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
    },
    /// Change settings. Options left out keep their current value.
    Set {
        /// Path to the collection directory. By default, the current working directory is used.
        directory: Option<String>,
        /// One of: default, dark, vibrant.
        #[arg(long)]
        theme: Option<Theme>,
        /// One of: small, medium, large.
        #[arg(long)]
        font_size: Option<FontSize>,
        /// Flip animation length in milliseconds, 200 to 1200.
        #[arg(long)]
        flip_speed: Option<u32>,
        /// One of: easy, medium, hard.
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// Whether "don't know" moves on by itself.
        #[arg(long)]
        auto_flip: Option<bool>,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Drill { directory, reset } => drill(directory, reset).await,
        Command::Cards { command } => match command {
            CardsCommand::List { directory } => list_cards(directory),
            CardsCommand::Add {
                directory,
                question,
                answer,
            } => add_card(directory, question, answer),
            CardsCommand::Delete { directory, id } => delete_card(directory, id),
        },
        Command::Prefs { command } => match command {
            PrefsCommand::Show { directory } => show_prefs(directory),
            PrefsCommand::Set {
                directory,
                theme,
                font_size,
                flip_speed,
                difficulty,
                auto_flip,
            } => set_prefs(
                directory,
                PrefsUpdate {
                    theme,
                    font_size,
                    flip_speed,
                    difficulty,
                    auto_flip,
                },
            ),
        },
        Command::Summary { directory } => print_summary(directory),
        Command::Reset { directory } => reset_session(directory),
    }
}
