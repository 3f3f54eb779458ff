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

//! Study in the terminal.

use std::io::Write;
use std::io::stdout;
use std::time::Duration;

use flashdeck_core::AUTO_ADVANCE_DELAY_MS;
use flashdeck_core::DeckSource;
use flashdeck_core::Drill;
use flashdeck_core::Outcome;
use flashdeck_core::Summary;
use tokio::io::AsyncBufRead;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::io::stdin;
use tokio::select;
use tokio::signal;
use tokio::time::Instant;
use tokio::time::sleep_until;

use crate::cmd::Workspace;
use crate::error::Fallible;

pub async fn drill(directory: Option<String>, reset: bool) -> Fallible<()> {
    let mut ws = Workspace::open(directory)?;
    let input = BufReader::new(stdin());
    let mut out = stdout();
    let delay = Duration::from_millis(AUTO_ADVANCE_DELAY_MS);
    select! {
        result = run_drill(&mut ws, input, &mut out, delay, reset) => {
            result?;
        },
        _ = signal::ctrl_c() => {
            log::debug!("Received Ctrl+C, stopping; answers so far are saved");
        },
    }
    Ok(())
}

/// Run the session loop over `input` until the deck is done, the user quits,
/// or input runs out.
pub async fn run_drill<R, W>(
    ws: &mut Workspace,
    input: R,
    out: &mut W,
    delay: Duration,
    reset: bool,
) -> Fallible<Summary>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let cards = ws.cards.list()?.to_vec();
    match ws.session.initialize(&cards, reset)? {
        DeckSource::Restored => {
            let progress = ws.session.restore_progress();
            if progress.current_index > 0 {
                writeln!(out, "Resuming at card {}.", progress.current_index + 1)?;
            }
        }
        DeckSource::Shuffled => {}
    }
    let auto_flip = ws.prefs.load().auto_flip;
    let mut drill = Drill::new();
    let mut lines = input.lines();

    'cards: loop {
        let Some(card) = ws.session.current_card() else {
            break;
        };
        let answer = card.answer().to_string();
        if !drill.is_revealed() {
            writeln!(
                out,
                "[{}/{}] {}",
                ws.session.progress().current_index + 1,
                ws.session.deck().len(),
                card.question()
            )?;
        }
        writeln!(out, "(k) know, (d) don't know, (q) quit")?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let outcome = match line.trim() {
            "k" => drill.know(&mut ws.session)?,
            "d" => drill.dont_know(&mut ws.session, auto_flip)?,
            "q" => break,
            other => {
                writeln!(out, "Unknown command '{other}'.")?;
                continue;
            }
        };
        let Outcome::Revealed(ticket) = outcome else {
            continue;
        };
        writeln!(out, "Answer: {answer}")?;
        let Some(ticket) = ticket else {
            continue;
        };
        writeln!(out, "Moving on in {} s.", delay.as_secs_f32())?;
        let deadline = Instant::now() + delay;
        loop {
            select! {
                _ = sleep_until(deadline) => {
                    drill.auto_advance(&mut ws.session, ticket)?;
                    break;
                },
                line = lines.next_line() => match line? {
                    Some(line) if line.trim() == "q" => {
                        drill.cancel_auto_advance();
                        break 'cards;
                    }
                    // Input is locked until the card moves on.
                    Some(_) => continue,
                    None => {
                        sleep_until(deadline).await;
                        drill.auto_advance(&mut ws.session, ticket)?;
                        break;
                    }
                },
            }
        }
    }

    let summary = ws.session.summary();
    if ws.session.is_complete() {
        writeln!(out, "Done! You knew {} of {} cards.", summary.known, summary.total)?;
    }
    Ok(summary)
}
