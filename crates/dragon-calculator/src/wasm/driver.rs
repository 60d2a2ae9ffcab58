//! Mock-DOM drivers
//!
//! [`WasmDriver`] clicks calculator keypad buttons by element id so the
//! unified checks in [`crate::driver`] exercise the same path as a browser.
//! [`QuizDriver`] does the same for the quiz overlay on a manual clock.

use super::dom::{DomEvent, MockDom, CALC_INPUT_ID, CALC_RESULT_ID, OPEN_GAME_ID, QUIZ_OVERLAY_ID};
use super::keypad::{AnswerKey, Keypad, PadKey};
use crate::audio::RecordingAudio;
use crate::config::QuizConfig;
use crate::core::{CalcError, CalcKey, Calculator};
use crate::driver::CalculatorDriver;
use crate::quiz::{MemoryStore, QuizEvent, Screen};
use crate::runtime::{MockScheduler, QuizSession};
use crate::view::{BadgeGalleryView, CalculatorView, LevelMapView, QuizView};

/// Calculator widget over a mock DOM
#[derive(Debug)]
pub struct WasmDriver {
    calculator: Calculator,
    keypad: Keypad<CalcKey>,
    dom: MockDom,
}

impl Default for WasmDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl WasmDriver {
    /// Driver over a fresh widget
    #[must_use]
    pub fn new() -> Self {
        Self {
            calculator: Calculator::new(),
            keypad: Keypad::calculator(),
            dom: MockDom::calculator(),
        }
    }

    /// The wrapped calculator
    #[must_use]
    pub const fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    /// The rendered document
    #[must_use]
    pub const fn dom(&self) -> &MockDom {
        &self.dom
    }

    /// Clicks a keypad button; returns false if no button has that id
    pub fn click(&mut self, element_id: &str) -> bool {
        self.dom.dispatch_event(DomEvent::click(element_id));
        let Some(key) = self.keypad.handle_click(element_id) else {
            return false;
        };
        self.calculator.press(key);
        self.sync_dom();
        true
    }

    /// Presses a keyboard key; returns false if it maps to no calculator key
    pub fn key_press(&mut self, key: &str) -> bool {
        self.dom.dispatch_event(DomEvent::key_press(key));
        let Some(calc_key) = CalcKey::from_keyboard(key) else {
            return false;
        };
        self.calculator.press(calc_key);
        self.sync_dom();
        true
    }

    fn sync_dom(&mut self) {
        self.dom
            .render_calculator(&CalculatorView::build(&self.calculator));
    }
}

impl CalculatorDriver for WasmDriver {
    fn press_key(&mut self, key: CalcKey) {
        self.click(&key.element_id());
    }

    fn get_result(&self) -> String {
        self.dom
            .get_element_text(CALC_RESULT_ID)
            .unwrap_or_default()
            .to_string()
    }

    fn get_input(&self) -> String {
        self.dom
            .get_element_text(CALC_INPUT_ID)
            .unwrap_or_default()
            .to_string()
    }

    fn last_error(&self) -> Option<CalcError> {
        self.calculator.last_error().cloned()
    }
}

/// Session type driven by [`QuizDriver`]
pub type MockQuizSession = QuizSession<MockScheduler, MemoryStore, RecordingAudio>;

/// Quiz overlay over a mock DOM and a manual clock
#[derive(Debug)]
pub struct QuizDriver {
    session: MockQuizSession,
    pad: Keypad<AnswerKey>,
    dom: MockDom,
}

impl Default for QuizDriver {
    fn default() -> Self {
        Self::new(QuizConfig::default())
    }
}

impl QuizDriver {
    /// Driver with fresh progress
    #[must_use]
    pub fn new(config: QuizConfig) -> Self {
        Self::with_session(QuizSession::new(
            config,
            MockScheduler::new(),
            MemoryStore::new(),
            RecordingAudio::new(),
        ))
    }

    /// Driver over an existing session
    #[must_use]
    pub fn with_session(session: MockQuizSession) -> Self {
        let mut driver = Self {
            session,
            pad: Keypad::answer_pad(),
            dom: MockDom::with_quiz(),
        };
        driver.sync_dom();
        driver
    }

    /// The wrapped session
    #[must_use]
    pub const fn session(&self) -> &MockQuizSession {
        &self.session
    }

    /// The rendered document
    #[must_use]
    pub const fn dom(&self) -> &MockDom {
        &self.dom
    }

    /// Current screen
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.session.screen()
    }

    /// Returns true while the overlay is shown
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.dom.is_visible(QUIZ_OVERLAY_ID)
    }

    /// Clicks an element; returns false if the click did nothing
    pub fn click(&mut self, element_id: &str) -> bool {
        self.dom.dispatch_event(DomEvent::click(element_id));
        if element_id == OPEN_GAME_ID {
            let opened = !self.is_open();
            self.dom.set_visible(QUIZ_OVERLAY_ID, true);
            self.sync_dom();
            return opened;
        }
        if !self.is_open() {
            return false;
        }

        let event = match element_id {
            "btn-start" => Some(QuizEvent::OpenLevelMap),
            "btn-next" => Some(QuizEvent::NextLevel),
            "btn-retry" => Some(QuizEvent::Retry),
            "btn-menu" => Some(QuizEvent::BackToMenu),
            "btn-close" => Some(QuizEvent::Close),
            id => id
                .strip_prefix("level-")
                .and_then(|n| n.parse().ok())
                .map(QuizEvent::SelectLevel)
                .or_else(|| self.pad.handle_click(id).map(AnswerKey::to_event)),
        };
        let Some(event) = event else {
            return false;
        };
        self.dispatch(event)
    }

    /// Presses a keyboard key inside the overlay
    pub fn key_press(&mut self, key: &str) -> bool {
        self.dom.dispatch_event(DomEvent::key_press(key));
        if !self.is_open() {
            return false;
        }
        if key == "Escape" {
            return self.dispatch(QuizEvent::Close);
        }
        match AnswerKey::from_keyboard(key) {
            Some(pad_key) => self.dispatch(pad_key.to_event()),
            None => false,
        }
    }

    /// Types `value` on the number pad and submits it
    pub fn answer(&mut self, value: u32) {
        for digit in value.to_string().bytes() {
            self.click(&AnswerKey::Digit(digit - b'0').element_id());
        }
        self.click(&AnswerKey::Submit.element_id());
    }

    /// Answer to the question on screen
    #[must_use]
    pub fn expected_answer(&self) -> Option<u32> {
        self.session
            .engine()
            .round()
            .filter(|_| self.screen() == Screen::Playing)
            .map(|round| round.question.answer)
    }

    /// Advances the manual clock, firing due timers
    pub fn advance_time(&mut self, ms: u64) {
        self.session.run_for(ms);
        self.sync_dom();
    }

    fn dispatch(&mut self, event: QuizEvent) -> bool {
        let transition = self.session.dispatch(event);
        if event == QuizEvent::Close {
            self.dom.set_visible(QUIZ_OVERLAY_ID, false);
        }
        self.sync_dom();
        !transition.is_noop()
    }

    fn sync_dom(&mut self) {
        let engine = self.session.engine();
        self.dom.render_quiz(&QuizView::build(engine));
        self.dom
            .render_level_map(&LevelMapView::build(engine.progress(), engine.config()));
        self.dom
            .render_badges(&BadgeGalleryView::build(engine.progress(), engine.config()));
    }
}
