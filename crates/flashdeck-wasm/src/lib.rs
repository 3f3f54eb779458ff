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

//! WASM bindings for flashdeck - runs the flashcard trainer in the browser.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::StorageEvent;
use web_sys::console;

use flashdeck_core::AUTO_ADVANCE_DELAY_MS;
use flashdeck_core::AdvanceTicket;
use flashdeck_core::CardId;
use flashdeck_core::CardStore;
use flashdeck_core::DeckSource;
use flashdeck_core::Drill;
use flashdeck_core::Error;
use flashdeck_core::Outcome;
use flashdeck_core::Preferences;
use flashdeck_core::PreferencesStore;
use flashdeck_core::SessionEngine;
use flashdeck_core::SessionState;
use flashdeck_core::TinyRng;
use flashdeck_core::storage::CARDS_KEY;
use flashdeck_core::storage::PREFERENCES_KEY;

mod console_log;
mod storage;

use storage::LocalStorage;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    console_log::init(log::LevelFilter::Debug);
    console::log_1(&"flashdeck WASM initialized".into());
}

fn js_error(e: Error) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Largest integer a JS number holds exactly.
const MAX_SAFE_ID: CardId = (1 << 53) - 1;

fn id_to_js(id: CardId) -> Result<f64, Error> {
    if id > MAX_SAFE_ID {
        return Err(Error::validation(format!(
            "card id {id} cannot be represented in JavaScript"
        )));
    }
    Ok(id as f64)
}

fn id_from_js(id: f64) -> Result<CardId, Error> {
    if !id.is_finite() || id.fract() != 0.0 || id < 0.0 || id > MAX_SAFE_ID as f64 {
        return Err(Error::validation(format!("{id} is not a valid card id")));
    }
    Ok(id as CardId)
}

fn random_seed() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(e) => {
            log::warn!("getrandom failed, seeding from the clock: {e}");
            js_sys::Date::now() as u64
        }
    }
}

struct Inner {
    cards: CardStore<LocalStorage>,
    session: SessionEngine<LocalStorage>,
    prefs: PreferencesStore<LocalStorage>,
    drill: Drill,
    /// Handle of the pending `setTimeout`, if an auto-advance is armed.
    timer: Option<i32>,
    /// Called after anything the view shows has changed.
    on_change: Option<js_sys::Function>,
}

/// Tell the view to re-render. No borrow may be held: the callback is free to
/// call back into the app.
fn notify(inner: &RefCell<Inner>) {
    let callback = inner.borrow().on_change.clone();
    if let Some(callback) = callback {
        if let Err(e) = callback.call0(&JsValue::NULL) {
            log::error!("change callback threw: {e:?}");
        }
    }
}

impl Inner {
    fn cancel_timer(&mut self) {
        self.drill.cancel_auto_advance();
        if let Some(handle) = self.timer.take() {
            if let Some(window) = web_sys::window() {
                window.clear_timeout_with_handle(handle);
            }
        }
    }

    /// The card set changed: rebuild the deck if a session is running.
    fn cards_changed(&mut self) -> Result<(), JsValue> {
        self.cancel_timer();
        if self.session.state() != SessionState::Uninitialized {
            let cards = self.cards.list().map_err(js_error)?.to_vec();
            if self.session.initialize(&cards, false).map_err(js_error)? == DeckSource::Restored {
                self.session.restore_progress();
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryView {
    total: usize,
    known: usize,
    unknown: usize,
    percent_known: f64,
}

/// The application state managed from JavaScript.
#[wasm_bindgen]
pub struct FlashdeckApp {
    inner: Rc<RefCell<Inner>>,
    storage_listener: Option<Closure<dyn FnMut(StorageEvent)>>,
}

#[wasm_bindgen]
impl FlashdeckApp {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        let store = LocalStorage::new();
        let inner = Inner {
            cards: CardStore::new(store.clone()),
            session: SessionEngine::new(store.clone(), TinyRng::from_seed(random_seed())),
            prefs: PreferencesStore::new(store),
            drill: Drill::new(),
            timer: None,
            on_change: None,
        };
        let mut app = Self {
            inner: Rc::new(RefCell::new(inner)),
            storage_listener: None,
        };
        app.listen_for_other_tabs();
        app
    }

    /// Register a callback invoked whenever the view should re-render.
    #[wasm_bindgen]
    pub fn set_on_change(&mut self, callback: js_sys::Function) {
        self.inner.borrow_mut().on_change = Some(callback);
    }

    /// Start or resume a session. Returns "restored" when the previous order
    /// was reused, "shuffled" otherwise.
    #[wasm_bindgen]
    pub fn start_session(&mut self, force_reset: bool) -> Result<String, JsValue> {
        let mut inner = self.inner.borrow_mut();
        inner.cancel_timer();
        let cards = inner.cards.list().map_err(js_error)?.to_vec();
        let source = inner
            .session
            .initialize(&cards, force_reset)
            .map_err(js_error)?;
        let name = match source {
            DeckSource::Restored => {
                inner.session.restore_progress();
                "restored"
            }
            DeckSource::Shuffled => "shuffled",
        };
        Ok(name.to_string())
    }

    /// Reshuffle and clear progress.
    #[wasm_bindgen]
    pub fn reset_session(&mut self) -> Result<(), JsValue> {
        self.start_session(true).map(|_| ())
    }

    #[wasm_bindgen]
    pub fn current_question(&self) -> Option<String> {
        let inner = self.inner.borrow();
        inner.session.current_card().map(|c| c.question().to_string())
    }

    #[wasm_bindgen]
    pub fn current_answer(&self) -> Option<String> {
        let inner = self.inner.borrow();
        inner.session.current_card().map(|c| c.answer().to_string())
    }

    #[wasm_bindgen]
    pub fn is_revealed(&self) -> bool {
        self.inner.borrow().drill.is_revealed()
    }

    /// Whether an auto-advance countdown is running.
    #[wasm_bindgen]
    pub fn is_auto_advancing(&self) -> bool {
        self.inner.borrow().drill.pending().is_some()
    }

    #[wasm_bindgen]
    pub fn is_complete(&self) -> bool {
        self.inner.borrow().session.is_complete()
    }

    /// Zero-based index of the current card.
    #[wasm_bindgen]
    pub fn position(&self) -> usize {
        self.inner.borrow().session.progress().current_index
    }

    #[wasm_bindgen]
    pub fn total_cards(&self) -> usize {
        self.inner.borrow().session.deck().len()
    }

    #[wasm_bindgen]
    pub fn progress(&self) -> f64 {
        self.inner.borrow().session.progress_ratio()
    }

    /// Mark the current card as known. Returns true when the session is now
    /// complete and the view should move to the summary.
    #[wasm_bindgen]
    pub fn know(&mut self) -> Result<bool, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let Inner { session, drill, .. } = &mut *inner;
        let outcome = drill.know(session).map_err(js_error)?;
        Ok(outcome == Outcome::Answered(SessionState::Complete))
    }

    /// Reveal the answer, or mark the card as unknown if it is already shown.
    /// Returns true when the session is now complete.
    #[wasm_bindgen]
    pub fn dont_know(&mut self) -> Result<bool, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let auto_flip = inner.prefs.load().auto_flip;
        let Inner { session, drill, .. } = &mut *inner;
        match drill.dont_know(session, auto_flip).map_err(js_error)? {
            Outcome::Revealed(Some(ticket)) => {
                drop(inner);
                self.schedule(ticket)?;
                Ok(false)
            }
            outcome => Ok(outcome == Outcome::Answered(SessionState::Complete)),
        }
    }

    /// Summary of the session as JSON: {total, known, unknown, percentKnown}.
    #[wasm_bindgen]
    pub fn summary(&self) -> Result<String, JsValue> {
        let summary = self.inner.borrow().session.summary();
        let view = SummaryView {
            total: summary.total,
            known: summary.known,
            unknown: summary.unknown,
            percent_known: summary.percent_known,
        };
        serde_json::to_string(&view).map_err(|e| js_error(e.into()))
    }

    /// All cards as a JSON array of {id, question, answer}.
    #[wasm_bindgen]
    pub fn list_cards(&mut self) -> Result<String, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let cards = inner.cards.list().map_err(js_error)?;
        serde_json::to_string(cards).map_err(|e| js_error(e.into()))
    }

    /// Add a card, returning its id.
    #[wasm_bindgen]
    pub fn add_card(&mut self, question: &str, answer: &str) -> Result<f64, JsValue> {
        let mut inner = self.inner.borrow_mut();
        let card = inner.cards.add(question, answer).map_err(js_error)?;
        inner.cards_changed()?;
        id_to_js(card.id()).map_err(js_error)
    }

    #[wasm_bindgen]
    pub fn delete_card(&mut self, id: f64) -> Result<(), JsValue> {
        let id = id_from_js(id).map_err(js_error)?;
        let mut inner = self.inner.borrow_mut();
        inner.cards.delete(id).map_err(js_error)?;
        inner.cards_changed()
    }

    /// The settings as JSON, in the same shape they are stored in.
    #[wasm_bindgen]
    pub fn preferences(&self) -> Result<String, JsValue> {
        let prefs = self.inner.borrow().prefs.load();
        serde_json::to_string(&prefs).map_err(|e| js_error(e.into()))
    }

    /// Apply a full settings record given as JSON.
    #[wasm_bindgen]
    pub fn apply_preferences(&mut self, json: &str) -> Result<(), JsValue> {
        let prefs: Preferences = serde_json::from_str(json)
            .map_err(|e| JsValue::from_str(&format!("Failed to parse preferences: {}", e)))?;
        let mut inner = self.inner.borrow_mut();
        inner.prefs.apply(prefs).map_err(js_error)?;
        if !prefs.auto_flip && inner.timer.is_some() {
            inner.cancel_timer();
        }
        Ok(())
    }

    /// Flip animation length after the difficulty adjustment, in ms.
    #[wasm_bindgen]
    pub fn effective_flip_ms(&self) -> u32 {
        self.inner.borrow().prefs.load().effective_flip_ms()
    }

    // Private helper methods

    fn schedule(&mut self, ticket: AdvanceTicket) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let weak = Rc::downgrade(&self.inner);
        let fire = Closure::once_into_js(move || {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let result = {
                let mut inner = shared.borrow_mut();
                inner.timer = None;
                let Inner { session, drill, .. } = &mut *inner;
                drill.auto_advance(session, ticket)
            };
            match result {
                Ok(Outcome::Answered(_)) => notify(&shared),
                Ok(_) => {}
                Err(e) => log::error!("auto-advance failed: {e}"),
            }
        });
        let handle = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            fire.unchecked_ref(),
            AUTO_ADVANCE_DELAY_MS as i32,
        )?;
        self.inner.borrow_mut().timer = Some(handle);
        Ok(())
    }

    /// Other tabs write to the same storage; pick their changes up.
    fn listen_for_other_tabs(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let weak = Rc::downgrade(&self.inner);
        let listener = Closure::<dyn FnMut(StorageEvent)>::new(move |event: StorageEvent| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut inner = shared.borrow_mut();
            let key = event.key();
            // A null key means the whole storage was cleared.
            let all = key.is_none();
            if all || key.as_deref() == Some(CARDS_KEY) {
                if let Err(e) = inner.cards.refresh() {
                    log::error!("failed to reload cards: {e}");
                }
                if let Err(e) = inner.cards_changed() {
                    log::error!("failed to rebuild the deck: {e:?}");
                }
            }
            if all || key.as_deref() == Some(PREFERENCES_KEY) {
                inner.prefs.refresh();
            }
            drop(inner);
            notify(&shared);
        });
        match window.add_event_listener_with_callback("storage", listener.as_ref().unchecked_ref()) {
            Ok(()) => self.storage_listener = Some(listener),
            Err(e) => log::warn!("cannot watch storage for other tabs: {e:?}"),
        }
    }
}

impl Default for FlashdeckApp {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FlashdeckApp {
    fn drop(&mut self) {
        self.inner.borrow_mut().cancel_timer();
        if let (Some(window), Some(listener)) = (web_sys::window(), self.storage_listener.take()) {
            if let Err(e) = window
                .remove_event_listener_with_callback("storage", listener.as_ref().unchecked_ref())
            {
                log::warn!("cannot stop watching storage: {e:?}");
            }
        }
    }
}
