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

//! Study sessions: the shuffled deck and the answers given so far.

use std::collections::HashSet;

use crate::error::Fallible;
use crate::error::fail;
use crate::rng::TinyRng;
use crate::rng::shuffle;
use crate::storage::DECK_KEY;
use crate::storage::KeyValueStore;
use crate::storage::PROGRESS_KEY;
use crate::storage::read_or_none;
use crate::types::card::Card;
use crate::types::card::CardId;
use crate::types::progress::SessionProgress;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No deck yet.
    Uninitialized,
    /// There is a card waiting for an answer.
    Active,
    /// Every card in the deck has been answered.
    Complete,
}

/// Where the deck of an initialized session came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeckSource {
    /// The persisted order still matched the cards and was reused.
    Restored,
    /// A new order was drawn.
    Shuffled,
}

/// What the summary screen shows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub known: usize,
    pub unknown: usize,
    pub answered: usize,
    /// Share of answered cards marked known, from 0 to 100.
    pub percent_known: f64,
}

impl Summary {
    pub fn of(progress: &SessionProgress, total: usize) -> Self {
        let known = progress.known.len();
        let unknown = progress.unknown.len();
        let answered = known + unknown;
        let percent_known = if answered == 0 {
            0.0
        } else {
            known as f64 * 100.0 / answered as f64
        };
        Self {
            total,
            known,
            unknown,
            answered,
            percent_known,
        }
    }
}

pub struct SessionEngine<S: KeyValueStore> {
    store: S,
    rng: TinyRng,
    deck: Vec<Card>,
    progress: SessionProgress,
    initialized: bool,
    epoch: u64,
}

impl<S: KeyValueStore> SessionEngine<S> {
    pub fn new(store: S, rng: TinyRng) -> Self {
        Self {
            store,
            rng,
            deck: Vec::new(),
            progress: SessionProgress::default(),
            initialized: false,
            epoch: 0,
        }
    }

    /// Build the deck for `cards`.
    ///
    /// With `force_reset` the order is always redrawn and the progress
    /// cleared. Otherwise a persisted order is reused when it holds exactly
    /// the same cards; when it does not, a new order is drawn and the
    /// persisted progress, which belonged to the old order, is dropped.
    pub fn initialize(&mut self, cards: &[Card], force_reset: bool) -> Fallible<DeckSource> {
        if !force_reset {
            if let Some(deck) = self.persisted_deck(cards) {
                log::debug!("Reusing saved order of {} cards", deck.len());
                self.deck = deck;
                self.progress = SessionProgress::default();
                self.initialized = true;
                self.epoch += 1;
                return Ok(DeckSource::Restored);
            }
        }
        let deck = shuffle(cards.to_vec(), &mut self.rng);
        // Progress goes first: an old order with no progress is consistent,
        // a new order with old progress is not.
        self.store.remove(PROGRESS_KEY)?;
        self.store.set(DECK_KEY, &serde_json::to_string(&deck)?)?;
        log::debug!("Shuffled a new order of {} cards", deck.len());
        self.deck = deck;
        self.progress = SessionProgress::default();
        self.initialized = true;
        self.epoch += 1;
        Ok(DeckSource::Shuffled)
    }

    /// Reshuffle and clear progress in one step.
    pub fn reset(&mut self, cards: &[Card]) -> Fallible<()> {
        self.initialize(cards, true)?;
        Ok(())
    }

    /// Adopt the persisted progress if it fits the current deck, otherwise
    /// start from the first card. Never fails: unusable progress is logged and
    /// discarded.
    pub fn restore_progress(&mut self) -> SessionProgress {
        let progress = match read_or_none(&self.store, PROGRESS_KEY) {
            None => SessionProgress::default(),
            Some(json) => match serde_json::from_str::<SessionProgress>(&json) {
                Ok(progress) if progress.is_resumable(self.deck.len()) => progress,
                Ok(progress) => {
                    log::warn!(
                        "Saved progress at index {} does not fit a deck of {}, starting over",
                        progress.current_index,
                        self.deck.len()
                    );
                    SessionProgress::default()
                }
                Err(e) => {
                    log::warn!("Saved progress is corrupt, starting over: {e}");
                    SessionProgress::default()
                }
            },
        };
        self.progress = progress.clone();
        progress
    }

    /// The card awaiting an answer, if any.
    pub fn current_card(&self) -> Option<&Card> {
        self.deck.get(self.progress.current_index)
    }

    /// Record the answer for the current card and move on. This is the only
    /// way progress changes.
    pub fn record_answer(&mut self, known: bool) -> Fallible<SessionState> {
        let id: CardId = match (self.initialized, self.current_card()) {
            (true, Some(card)) => card.id(),
            (false, _) => return fail("session has not been initialized"),
            (true, None) => return fail("session is complete, there is no card to answer"),
        };
        let mut next = self.progress.clone();
        if known {
            next.known.push(id);
        } else {
            next.unknown.push(id);
        }
        next.current_index += 1;
        self.store
            .set(PROGRESS_KEY, &serde_json::to_string(&next)?)?;
        self.progress = next;
        let state = self.state();
        if state == SessionState::Complete {
            log::debug!("Session complete");
        }
        Ok(state)
    }

    /// Counts successful initializations. Changes whenever the deck is
    /// rebuilt, even if the new order happens to match the old one.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_complete(&self) -> bool {
        self.initialized && self.progress.current_index == self.deck.len()
    }

    pub fn state(&self) -> SessionState {
        if !self.initialized {
            SessionState::Uninitialized
        } else if self.is_complete() {
            SessionState::Complete
        } else {
            SessionState::Active
        }
    }

    pub fn deck(&self) -> &[Card] {
        &self.deck
    }

    pub fn progress(&self) -> &SessionProgress {
        &self.progress
    }

    /// Fraction of the deck answered, from 0 to 1. An empty deck is done.
    pub fn progress_ratio(&self) -> f64 {
        if self.deck.is_empty() {
            1.0
        } else {
            self.progress.current_index as f64 / self.deck.len() as f64
        }
    }

    pub fn summary(&self) -> Summary {
        Summary::of(&self.progress, self.deck.len())
    }

    /// Summarize what is in storage without touching it. Unlike
    /// [`SessionEngine::restore_progress`], a finished session is accepted:
    /// this is what a summary screen shows after the last answer.
    pub fn saved_summary(&self) -> Option<Summary> {
        let deck: Vec<Card> = serde_json::from_str(&read_or_none(&self.store, DECK_KEY)?).ok()?;
        let progress: SessionProgress =
            serde_json::from_str(&read_or_none(&self.store, PROGRESS_KEY)?).ok()?;
        if progress.current_index > deck.len() || progress.answered() != progress.current_index {
            return None;
        }
        Some(Summary::of(&progress, deck.len()))
    }

    /// The persisted deck, if it is an ordering of exactly `cards`.
    fn persisted_deck(&self, cards: &[Card]) -> Option<Vec<Card>> {
        let json = read_or_none(&self.store, DECK_KEY)?;
        let deck: Vec<Card> = match serde_json::from_str(&json) {
            Ok(deck) => deck,
            Err(e) => {
                log::warn!("Saved card order is corrupt, reshuffling: {e}");
                return None;
            }
        };
        if deck.len() != cards.len() {
            log::debug!(
                "Saved order has {} cards but there are {}, reshuffling",
                deck.len(),
                cards.len()
            );
            return None;
        }
        let wanted: HashSet<CardId> = cards.iter().map(Card::id).collect();
        let stored: HashSet<CardId> = deck.iter().map(Card::id).collect();
        if wanted != stored || stored.len() != deck.len() {
            log::debug!("Saved order holds different cards, reshuffling");
            return None;
        }
        Some(deck)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::storage::MemoryStore;
    use crate::storage::testing::FullStore;
    use crate::storage::testing::StickyStore;

    fn make_cards(n: u64) -> Vec<Card> {
        (1..=n)
            .map(|id| Card::from_parts(id, &format!("Q{id}"), &format!("A{id}")))
            .collect()
    }

    fn engine(store: &MemoryStore, seed: u64) -> SessionEngine<MemoryStore> {
        SessionEngine::new(store.clone(), TinyRng::from_seed(seed))
    }

    fn sorted_ids(cards: &[Card]) -> Vec<CardId> {
        let mut ids: Vec<CardId> = cards.iter().map(Card::id).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_shuffle_is_a_permutation() -> Fallible<()> {
        for n in [0, 1, 2, 7, 12] {
            let cards = make_cards(n);
            for seed in 0..10 {
                let mut session = engine(&MemoryStore::new(), seed);
                assert_eq!(session.initialize(&cards, true)?, DeckSource::Shuffled);
                assert_eq!(session.deck().len(), cards.len());
                assert_eq!(sorted_ids(session.deck()), sorted_ids(&cards));
            }
        }
        Ok(())
    }

    #[test]
    fn test_state_machine() -> Fallible<()> {
        let mut session = engine(&MemoryStore::new(), 1);
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(!session.is_complete());
        assert!(matches!(session.record_answer(true), Err(Error::State(_))));

        session.initialize(&make_cards(2), true)?;
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.record_answer(true)?, SessionState::Active);
        assert_eq!(session.record_answer(false)?, SessionState::Complete);
        assert!(session.current_card().is_none());
        assert!(matches!(session.record_answer(true), Err(Error::State(_))));

        session.reset(&make_cards(2))?;
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.progress(), &SessionProgress::default());
        Ok(())
    }

    #[test]
    fn test_progress_invariant_holds_after_every_answer() -> Fallible<()> {
        let cards = make_cards(9);
        let mut session = engine(&MemoryStore::new(), 3);
        session.initialize(&cards, true)?;
        let mut rng = TinyRng::from_seed(99);
        while !session.is_complete() {
            session.record_answer(rng.generate(2) == 0)?;
            let p = session.progress();
            assert_eq!(p.known.len() + p.unknown.len(), p.current_index);
            assert!(p.known.iter().all(|id| !p.unknown.contains(id)));
        }
        assert_eq!(session.progress().current_index, 9);
        Ok(())
    }

    #[test]
    fn test_end_to_end() -> Fallible<()> {
        let store = MemoryStore::new();
        let mut cards = crate::cards::CardStore::new(store.clone());
        for id in 4..=12 {
            cards.delete(id)?;
        }
        let ids: Vec<CardId> = cards.list()?.iter().map(Card::id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let mut session = engine(&store, 5);
        session.initialize(cards.list()?, true)?;
        let order: Vec<CardId> = session.deck().iter().map(Card::id).collect();
        session.record_answer(true)?;
        session.record_answer(false)?;
        session.record_answer(true)?;

        let progress = session.progress();
        assert_eq!(progress.known, vec![order[0], order[2]]);
        assert_eq!(progress.unknown, vec![order[1]]);
        assert_eq!(progress.current_index, 3);
        assert!(session.is_complete());

        let summary = session.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.known, 2);
        assert_eq!(summary.unknown, 1);
        assert!((summary.percent_known - 66.666).abs() < 0.01);
        Ok(())
    }

    #[test]
    fn test_reload_resumes_same_order_and_position() -> Fallible<()> {
        let store = MemoryStore::new();
        let cards = make_cards(6);
        let mut first = engine(&store, 11);
        first.initialize(&cards, false)?;
        first.record_answer(true)?;
        first.record_answer(false)?;

        let mut second = engine(&store, 12);
        assert_eq!(second.initialize(&cards, false)?, DeckSource::Restored);
        assert_eq!(second.deck(), first.deck());
        let progress = second.restore_progress();
        assert_eq!(&progress, first.progress());
        assert_eq!(second.current_card(), first.current_card());
        Ok(())
    }

    #[test]
    fn test_stale_deck_is_reshuffled() -> Fallible<()> {
        let store = MemoryStore::new();
        let mut old = engine(&store, 2);
        old.initialize(&make_cards(5), true)?;
        old.record_answer(true)?;

        let mut session = engine(&store, 2);
        let six = make_cards(6);
        assert_eq!(session.initialize(&six, false)?, DeckSource::Shuffled);
        assert_eq!(session.deck().len(), 6);
        assert_eq!(sorted_ids(session.deck()), sorted_ids(&six));
        // Progress made against the old order is gone.
        assert_eq!(session.restore_progress(), SessionProgress::default());
        Ok(())
    }

    #[test]
    fn test_same_length_but_different_cards_is_reshuffled() -> Fallible<()> {
        let store = MemoryStore::new();
        engine(&store, 2).initialize(&make_cards(3), true)?;
        let swapped = vec![
            Card::from_parts(1, "Q1", "A1"),
            Card::from_parts(2, "Q2", "A2"),
            Card::from_parts(4, "Q4", "A4"),
        ];
        let mut session = engine(&store, 2);
        assert_eq!(session.initialize(&swapped, false)?, DeckSource::Shuffled);
        assert_eq!(sorted_ids(session.deck()), vec![1, 2, 4]);
        Ok(())
    }

    #[test]
    fn test_corrupt_deck_is_reshuffled() -> Fallible<()> {
        let store = MemoryStore::new();
        store.set(DECK_KEY, "[{]")?;
        let mut session = engine(&store, 2);
        assert_eq!(session.initialize(&make_cards(4), false)?, DeckSource::Shuffled);
        assert_eq!(session.deck().len(), 4);
        Ok(())
    }

    #[test]
    fn test_out_of_bounds_progress_is_rejected() -> Fallible<()> {
        let store = MemoryStore::new();
        let mut session = engine(&store, 8);
        session.initialize(&make_cards(5), true)?;
        store.set(
            PROGRESS_KEY,
            r#"{"known":[1,2,3,4,5],"unknown":[6,7,8,9,10],"currentIndex":10}"#,
        )?;
        let progress = session.restore_progress();
        assert_eq!(progress.current_index, 0);
        assert_eq!(progress, SessionProgress::default());
        assert_eq!(session.state(), SessionState::Active);
        Ok(())
    }

    #[test]
    fn test_malformed_progress_is_rejected() -> Fallible<()> {
        let store = MemoryStore::new();
        let mut session = engine(&store, 8);
        session.initialize(&make_cards(5), true)?;
        for junk in [
            "null",
            "garbage",
            r#"{"known":"1","unknown":[],"currentIndex":1}"#,
            r#"{"known":[],"unknown":[],"currentIndex":"2"}"#,
            r#"{"known":[1],"unknown":[],"currentIndex":3}"#,
        ] {
            store.set(PROGRESS_KEY, junk)?;
            assert_eq!(session.restore_progress(), SessionProgress::default(), "input: {junk}");
        }
        Ok(())
    }

    #[test]
    fn test_forced_reset_discards_saved_progress() -> Fallible<()> {
        let store = MemoryStore::new();
        let cards = make_cards(4);
        let mut session = engine(&store, 4);
        session.initialize(&cards, true)?;
        session.record_answer(true)?;
        session.initialize(&cards, true)?;
        assert!(store.get(PROGRESS_KEY)?.is_none());
        assert_eq!(session.restore_progress(), SessionProgress::default());
        Ok(())
    }

    #[test]
    fn test_saved_summary_accepts_finished_sessions() -> Fallible<()> {
        let store = MemoryStore::new();
        let mut session = engine(&store, 6);
        assert!(session.saved_summary().is_none());
        session.initialize(&make_cards(2), true)?;
        session.record_answer(false)?;
        session.record_answer(true)?;
        let summary = engine(&store, 0).saved_summary().unwrap();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.known, 1);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.percent_known, 50.0);
        Ok(())
    }

    #[test]
    fn test_empty_deck_is_complete() -> Fallible<()> {
        let mut session = engine(&MemoryStore::new(), 4);
        session.initialize(&[], true)?;
        assert!(session.is_complete());
        assert_eq!(session.progress_ratio(), 1.0);
        assert!(matches!(session.record_answer(true), Err(Error::State(_))));
        Ok(())
    }

    #[test]
    fn test_answer_write_failure_does_not_advance() -> Fallible<()> {
        let store = FullStore::default();
        let mut session = SessionEngine::new(store.clone(), TinyRng::from_seed(1));
        store.inner.set(DECK_KEY, &serde_json::to_string(&make_cards(3))?)?;
        assert_eq!(session.initialize(&make_cards(3), false)?, DeckSource::Restored);
        assert!(matches!(session.record_answer(true), Err(Error::Storage { .. })));
        assert_eq!(session.progress().current_index, 0);
        assert!(matches!(session.initialize(&make_cards(3), true), Err(Error::Storage { .. })));
        Ok(())
    }

    fn answered_ids(session: &SessionEngine<MemoryStore>) -> Vec<CardId> {
        let progress = session.progress();
        let mut ids: Vec<CardId> = progress
            .known
            .iter()
            .chain(&progress.unknown)
            .copied()
            .collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_failed_progress_removal_leaves_storage_untouched() -> Fallible<()> {
        let store = StickyStore::default();
        let cards = make_cards(6);
        let mut first = engine(&store.inner, 3);
        first.initialize(&cards, true)?;
        first.record_answer(true)?;
        first.record_answer(false)?;
        let deck = store.inner.get(DECK_KEY)?;
        let progress = store.inner.get(PROGRESS_KEY)?;

        let mut failed = SessionEngine::new(store.clone(), TinyRng::from_seed(9));
        assert!(matches!(failed.initialize(&cards, true), Err(Error::Storage { .. })));
        assert_eq!(store.inner.get(DECK_KEY)?, deck);
        assert_eq!(store.inner.get(PROGRESS_KEY)?, progress);

        let mut resumed = engine(&store.inner, 5);
        assert_eq!(resumed.initialize(&cards, false)?, DeckSource::Restored);
        assert_eq!(resumed.restore_progress().current_index, 2);
        while !resumed.is_complete() {
            resumed.record_answer(true)?;
        }
        // Every card classified exactly once.
        assert_eq!(answered_ids(&resumed), sorted_ids(&cards));
        Ok(())
    }

    #[test]
    fn test_failed_deck_write_keeps_old_order_without_progress() -> Fallible<()> {
        let store = FullStore::default();
        let cards = make_cards(6);
        let mut first = engine(&store.inner, 3);
        first.initialize(&cards, true)?;
        first.record_answer(true)?;
        let order: Vec<CardId> = first.deck().iter().map(Card::id).collect();

        let mut failed = SessionEngine::new(store.clone(), TinyRng::from_seed(9));
        assert!(matches!(failed.initialize(&cards, true), Err(Error::Storage { .. })));
        assert!(store.inner.get(PROGRESS_KEY)?.is_none());

        let mut resumed = engine(&store.inner, 5);
        assert_eq!(resumed.initialize(&cards, false)?, DeckSource::Restored);
        assert_eq!(resumed.deck().iter().map(Card::id).collect::<Vec<_>>(), order);
        assert_eq!(resumed.restore_progress(), SessionProgress::default());
        Ok(())
    }

    #[test]
    fn test_epoch_advances_on_every_initialize() -> Fallible<()> {
        let store = MemoryStore::new();
        let cards = make_cards(3);
        let mut session = engine(&store, 1);
        assert_eq!(session.epoch(), 0);
        session.initialize(&cards, true)?;
        assert_eq!(session.epoch(), 1);
        assert_eq!(session.initialize(&cards, false)?, DeckSource::Restored);
        assert_eq!(session.epoch(), 2);
        session.reset(&cards)?;
        assert_eq!(session.epoch(), 3);
        Ok(())
    }
}
