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

//! The reveal/answer interaction on top of a session.
//!
//! Answering "don't know" first shows the answer. With auto-flip on, an
//! auto-advance is armed and the platform is expected to call
//! [`Drill::auto_advance`] after [`AUTO_ADVANCE_DELAY_MS`]; until then the
//! card does not accept answers. Without auto-flip, a second "don't know"
//! records the answer.

use crate::error::Fallible;
use crate::session::SessionEngine;
use crate::session::SessionState;
use crate::storage::KeyValueStore;
use crate::types::card::CardId;

/// How long the answer stays visible before auto-advancing.
pub const AUTO_ADVANCE_DELAY_MS: u64 = 2000;

/// Identifies one armed auto-advance. A ticket whose advance was cancelled or
/// superseded, or whose session has since been rebuilt, does nothing when it
/// fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdvanceTicket {
    generation: u64,
    epoch: u64,
    card_id: CardId,
}

impl AdvanceTicket {
    pub fn card_id(&self) -> CardId {
        self.card_id
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The input was ignored: no current card, or an auto-advance is pending.
    Ignored,
    /// The answer is now showing. Carries the ticket to fire later when
    /// auto-flip is on.
    Revealed(Option<AdvanceTicket>),
    /// An answer was recorded; the session is now in this state.
    Answered(SessionState),
}

#[derive(Debug, Default)]
pub struct Drill {
    revealed: bool,
    pending: Option<AdvanceTicket>,
    generation: u64,
}

impl Drill {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub fn pending(&self) -> Option<AdvanceTicket> {
        self.pending
    }

    pub fn know<S: KeyValueStore>(&mut self, session: &mut SessionEngine<S>) -> Fallible<Outcome> {
        if self.pending.is_some() || session.current_card().is_none() {
            return Ok(Outcome::Ignored);
        }
        let state = session.record_answer(true)?;
        self.revealed = false;
        Ok(Outcome::Answered(state))
    }

    pub fn dont_know<S: KeyValueStore>(
        &mut self,
        session: &mut SessionEngine<S>,
        auto_flip: bool,
    ) -> Fallible<Outcome> {
        if self.pending.is_some() {
            return Ok(Outcome::Ignored);
        }
        let Some(card) = session.current_card() else {
            return Ok(Outcome::Ignored);
        };
        if !self.revealed {
            self.revealed = true;
            if !auto_flip {
                return Ok(Outcome::Revealed(None));
            }
            self.generation += 1;
            let ticket = AdvanceTicket {
                generation: self.generation,
                epoch: session.epoch(),
                card_id: card.id(),
            };
            self.pending = Some(ticket);
            return Ok(Outcome::Revealed(Some(ticket)));
        }
        let state = session.record_answer(false)?;
        self.revealed = false;
        Ok(Outcome::Answered(state))
    }

    /// Fire an auto-advance. Stale tickets, tickets from an earlier
    /// initialization of the session, and tickets for a card that is no longer
    /// current are ignored.
    pub fn auto_advance<S: KeyValueStore>(
        &mut self,
        session: &mut SessionEngine<S>,
        ticket: AdvanceTicket,
    ) -> Fallible<Outcome> {
        if self.pending != Some(ticket) {
            return Ok(Outcome::Ignored);
        }
        self.pending = None;
        let current = session.current_card().map(|card| card.id());
        if session.epoch() != ticket.epoch || current != Some(ticket.card_id) {
            self.revealed = false;
            return Ok(Outcome::Ignored);
        }
        let state = session.record_answer(false)?;
        self.revealed = false;
        Ok(Outcome::Answered(state))
    }

    /// Drop any pending auto-advance and hide the answer. Call this whenever
    /// the session or the card set changes under the view.
    pub fn cancel_auto_advance(&mut self) -> Option<AdvanceTicket> {
        self.revealed = false;
        self.pending.take()
    }
}
