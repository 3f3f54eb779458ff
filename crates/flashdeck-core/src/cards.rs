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

//! The card collection.

use crate::error::Fallible;
use crate::observer::SubscriptionId;
use crate::observer::Subscribers;
use crate::storage::CARDS_KEY;
use crate::storage::KeyValueStore;
use crate::storage::read_or_none;
use crate::types::card::Card;
use crate::types::card::CardId;

/// The cards a fresh collection starts with.
const DEFAULT_CARDS: [(&str, &str); 12] = [
    ("What is the capital of France?", "Paris"),
    ("What is 2 + 2?", "4"),
    ("Who wrote Hamlet?", "William Shakespeare"),
    ("What is the boiling point of water in Celsius?", "100°C"),
    ("What planet is known as the Red Planet?", "Mars"),
    ("Who painted the Mona Lisa?", "Leonardo da Vinci"),
    ("What is the largest mammal?", "Blue Whale"),
    ("What is the chemical symbol for gold?", "Au"),
    ("Who discovered penicillin?", "Alexander Fleming"),
    ("What is the square root of 64?", "8"),
    ("What is the fastest land animal?", "Cheetah"),
    ("What is the main language spoken in Brazil?", "Portuguese"),
];

/// The default set, with ids starting at 1.
pub fn default_cards() -> Vec<Card> {
    DEFAULT_CARDS
        .iter()
        .zip(1..)
        .map(|((question, answer), id)| Card::from_parts(id, question, answer))
        .collect()
}

/// Owns the card collection and keeps storage in step with it.
///
/// The list is loaded lazily on first access and then served from memory.
/// Call [`CardStore::refresh`] to pick up changes made by someone else
/// sharing the same storage.
pub struct CardStore<S: KeyValueStore> {
    store: S,
    cards: Option<Vec<Card>>,
    subscribers: Subscribers<[Card]>,
}

impl<S: KeyValueStore> CardStore<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cards: None,
            subscribers: Subscribers::new(),
        }
    }

    /// The current cards, in insertion order.
    pub fn list(&mut self) -> Fallible<&[Card]> {
        if self.cards.is_none() {
            self.cards = Some(self.load()?);
        }
        Ok(self.cards.as_deref().unwrap_or_default())
    }

    pub fn len(&mut self) -> Fallible<usize> {
        Ok(self.list()?.len())
    }

    pub fn is_empty(&mut self) -> Fallible<bool> {
        Ok(self.list()?.is_empty())
    }

    pub fn get(&mut self, id: CardId) -> Fallible<Option<Card>> {
        Ok(self.list()?.iter().find(|card| card.id() == id).cloned())
    }

    /// Add a card. The new id is one more than the largest id present.
    pub fn add(&mut self, question: &str, answer: &str) -> Fallible<Card> {
        let next_id = self.list()?.iter().map(Card::id).max().unwrap_or(0) + 1;
        let card = Card::new(next_id, question, answer)?;
        let mut cards = self.list()?.to_vec();
        cards.push(card.clone());
        self.commit(cards)?;
        log::debug!("Added card {next_id}");
        Ok(card)
    }

    /// Delete a card. Deleting an absent id is not an error.
    pub fn delete(&mut self, id: CardId) -> Fallible<()> {
        let cards: Vec<Card> = self
            .list()?
            .iter()
            .filter(|card| card.id() != id)
            .cloned()
            .collect();
        self.commit(cards)?;
        log::debug!("Deleted card {id}");
        Ok(())
    }

    /// Re-read the collection from storage and notify subscribers.
    pub fn refresh(&mut self) -> Fallible<&[Card]> {
        let cards = self.load()?;
        self.subscribers.notify(&cards);
        self.cards = Some(cards);
        self.list()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&[Card]) + 'static) -> SubscriptionId {
        self.subscribers.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.unsubscribe(id)
    }

    /// Persist the whole list, then adopt it. Memory is left untouched when
    /// the write fails, so the two never disagree.
    fn commit(&mut self, cards: Vec<Card>) -> Fallible<()> {
        let json = serde_json::to_string(&cards)?;
        self.store.set(CARDS_KEY, &json)?;
        self.subscribers.notify(&cards);
        self.cards = Some(cards);
        Ok(())
    }

    /// Read the persisted list, seeding the defaults when there is nothing
    /// usable.
    fn load(&self) -> Fallible<Vec<Card>> {
        if let Some(cards) = read_or_none(&self.store, CARDS_KEY).and_then(|s| parse_cards(&s)) {
            return Ok(cards);
        }
        let defaults = default_cards();
        self.store
            .set(CARDS_KEY, &serde_json::to_string(&defaults)?)?;
        log::debug!("Seeded {} default cards", defaults.len());
        Ok(defaults)
    }
}

/// Parse a persisted card list. Empty, malformed, or blank-sided lists count
/// as no data.
pub(crate) fn parse_cards(json: &str) -> Option<Vec<Card>> {
    match serde_json::from_str::<Vec<Card>>(json) {
        Ok(cards) if cards.is_empty() => None,
        Ok(cards) if !cards.iter().all(Card::is_well_formed) => {
            log::warn!("Stored cards contain a blank question or answer, ignoring them");
            None
        }
        Ok(cards) => Some(cards),
        Err(e) => {
            log::warn!("Stored cards are corrupt, ignoring them: {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::error::Error;
    use crate::storage::MemoryStore;
    use crate::storage::testing::FullStore;

    fn stored_ids(store: &MemoryStore) -> Fallible<Vec<CardId>> {
        let json = store.get(CARDS_KEY)?.unwrap_or_default();
        let cards: Vec<Card> = serde_json::from_str(&json)?;
        Ok(cards.iter().map(Card::id).collect())
    }

    #[test]
    fn test_seeds_defaults_on_first_access() -> Fallible<()> {
        let store = MemoryStore::new();
        let mut cards = CardStore::new(store.clone());
        assert_eq!(cards.len()?, 12);
        assert_eq!(stored_ids(&store)?, (1..=12).collect::<Vec<_>>());
        let first = cards.get(1)?.unwrap();
        assert_eq!(first.question(), "What is the capital of France?");
        assert_eq!(first.answer(), "Paris");
        Ok(())
    }

    #[test]
    fn test_corrupt_storage_falls_back_to_defaults() -> Fallible<()> {
        for junk in ["{not json", "[]", "{\"id\":1}", r#"[{"id":1,"question":" ","answer":"a"}]"#] {
            let store = MemoryStore::new();
            store.set(CARDS_KEY, junk)?;
            let mut cards = CardStore::new(store.clone());
            assert_eq!(cards.len()?, 12, "input: {junk}");
            assert_eq!(stored_ids(&store)?.len(), 12);
        }
        Ok(())
    }

    #[test]
    fn test_loads_existing_cards() -> Fallible<()> {
        let store = MemoryStore::new();
        store.set(
            CARDS_KEY,
            r#"[{"id":4,"question":"Q4","answer":"A4"},{"id":9,"question":"Q9","answer":"A9"}]"#,
        )?;
        let mut cards = CardStore::new(store);
        let ids: Vec<CardId> = cards.list()?.iter().map(Card::id).collect();
        assert_eq!(ids, vec![4, 9]);
        Ok(())
    }

    #[test]
    fn test_add_assigns_increasing_ids() -> Fallible<()> {
        let store = MemoryStore::new();
        let mut cards = CardStore::new(store.clone());
        let max_before = cards.list()?.iter().map(Card::id).max().unwrap();
        let mut last = max_before;
        for n in 0..5 {
            let card = cards.add(&format!("Question {n}"), &format!("Answer {n}"))?;
            assert!(card.id() > last);
            last = card.id();
        }
        assert_eq!(cards.len()?, 17);
        assert_eq!(stored_ids(&store)?.len(), 17);
        Ok(())
    }

    #[test]
    fn test_ids_are_not_reused_after_deleting_below_max() -> Fallible<()> {
        let mut cards = CardStore::new(MemoryStore::new());
        cards.delete(5)?;
        let card = cards.add("New", "Card")?;
        assert_eq!(card.id(), 13);
        Ok(())
    }

    #[test]
    fn test_add_trims_and_validates() -> Fallible<()> {
        let mut cards = CardStore::new(MemoryStore::new());
        let card = cards.add("  Who wrote Faust? ", " Goethe ")?;
        assert_eq!(card.question(), "Who wrote Faust?");
        assert_eq!(card.answer(), "Goethe");
        assert!(matches!(cards.add("", "x"), Err(Error::Validation(_))));
        assert!(matches!(cards.add("x", "  \n"), Err(Error::Validation(_))));
        assert_eq!(cards.len()?, 13);
        Ok(())
    }

    #[test]
    fn test_delete_is_idempotent() -> Fallible<()> {
        let store = MemoryStore::new();
        let mut cards = CardStore::new(store.clone());
        cards.delete(3)?;
        let after_first: Vec<Card> = cards.list()?.to_vec();
        assert_eq!(after_first.len(), 11);
        cards.delete(3)?;
        cards.delete(999)?;
        assert_eq!(cards.list()?, after_first.as_slice());
        assert!(!stored_ids(&store)?.contains(&3));
        Ok(())
    }

    #[test]
    fn test_write_failure_is_surfaced() -> Fallible<()> {
        let store = FullStore::default();
        store.inner.set(CARDS_KEY, r#"[{"id":1,"question":"Q","answer":"A"}]"#)?;
        let mut cards = CardStore::new(store);
        assert!(matches!(cards.add("Q2", "A2"), Err(Error::Storage { .. })));
        assert!(matches!(cards.delete(1), Err(Error::Storage { .. })));
        // Memory still matches what was durably stored.
        assert_eq!(cards.len()?, 1);
        Ok(())
    }

    #[test]
    fn test_seeding_write_failure_is_surfaced() {
        let mut cards = CardStore::new(FullStore::default());
        assert!(matches!(cards.list(), Err(Error::Storage { .. })));
    }

    #[test]
    fn test_refresh_sees_other_writers() -> Fallible<()> {
        let store = MemoryStore::new();
        let mut mine = CardStore::new(store.clone());
        let mut theirs = CardStore::new(store);
        assert_eq!(mine.len()?, 12);
        theirs.add("From another tab", "Yes")?;
        assert_eq!(mine.len()?, 12);
        assert_eq!(mine.refresh()?.len(), 13);
        Ok(())
    }

    #[test]
    fn test_subscribers_see_mutations() -> Fallible<()> {
        let seen: Rc<RefCell<Vec<usize>>> = Rc::new(RefCell::new(Vec::new()));
        let mut cards = CardStore::new(MemoryStore::new());
        let sink = seen.clone();
        let id = cards.subscribe(move |list| sink.borrow_mut().push(list.len()));
        cards.add("Q", "A")?;
        cards.delete(1)?;
        cards.refresh()?;
        assert!(cards.unsubscribe(id));
        cards.delete(2)?;
        assert_eq!(*seen.borrow(), vec![13, 12, 12]);
        Ok(())
    }
}
