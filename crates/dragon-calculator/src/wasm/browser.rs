//! Browser bindings
//!
//! [`BrowserCalculator`] and [`BrowserQuiz`] are the wasm-bindgen entry
//! points. The quiz runs on `window.setInterval`/`setTimeout`, saves to
//! `localStorage` and plays cues through Web Audio.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, AudioContext, OscillatorType, Storage, Window};

use crate::audio::{AudioSink, Cue, Mutable, Tone, Waveform};
use crate::config::AppConfig;
use crate::core::{CalcKey, Calculator};
use crate::quiz::{GameProgress, ProgressStore, QuestionGenerator, QuizEvent, StoreError, StoreResult};
use crate::runtime::{QuizSession, Scheduler, TimerId};
use crate::view::{BadgeGalleryView, CalculatorView, LevelMapView, QuizView};
use crate::wasm::keypad::{AnswerKey, Keypad};

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no window"))
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Calculator widget for the page
#[derive(Debug)]
#[wasm_bindgen]
pub struct BrowserCalculator {
    calculator: Calculator,
    keypad: Keypad<CalcKey>,
}

#[wasm_bindgen]
impl BrowserCalculator {
    /// Fresh calculator
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        console_error_panic_hook::set_once();
        Self {
            calculator: Calculator::new(),
            keypad: Keypad::calculator(),
        }
    }

    /// Handles a keypad click by element id
    pub fn handle_button(&mut self, button_id: &str) -> bool {
        match self.keypad.handle_click(button_id) {
            Some(key) => {
                self.calculator.press(key);
                true
            }
            None => false,
        }
    }

    /// Handles a `KeyboardEvent.key`
    pub fn handle_key(&mut self, key: &str) -> bool {
        match CalcKey::from_keyboard(key) {
            Some(key) => {
                self.calculator.press(key);
                true
            }
            None => false,
        }
    }

    /// Input line
    #[wasm_bindgen(getter)]
    pub fn input(&self) -> String {
        self.calculator.input_display().to_string()
    }

    /// Result line
    #[wasm_bindgen(getter)]
    pub fn result(&self) -> String {
        self.calculator.result().to_string()
    }

    /// Display snapshot as JSON
    pub fn view_json(&self) -> String {
        to_json(&CalculatorView::build(&self.calculator))
    }
}

impl Default for BrowserCalculator {
    fn default() -> Self {
        Self::new()
    }
}

/// `localStorage` progress record
#[derive(Debug)]
pub struct BrowserStore {
    key: String,
}

impl BrowserStore {
    /// Store under `key`
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    fn storage() -> StoreResult<Storage> {
        window()
            .ok()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| StoreError::unavailable("localStorage is not available"))
    }
}

impl ProgressStore for BrowserStore {
    fn try_load(&self) -> StoreResult<Option<GameProgress>> {
        let raw = Self::storage()?
            .get_item(&self.key)
            .map_err(|_| StoreError::unavailable("localStorage read failed"))?;
        raw.map(|raw| {
            serde_json::from_str::<GameProgress>(&raw)
                .map(GameProgress::normalized)
                .map_err(StoreError::from)
        })
        .transpose()
    }

    fn try_save(&mut self, progress: &GameProgress) -> StoreResult<()> {
        let raw = serde_json::to_string(progress)?;
        Self::storage()?
            .set_item(&self.key, &raw)
            .map_err(|_| StoreError::unavailable("localStorage write failed"))
    }
}

/// Web Audio oscillator sink
#[derive(Debug)]
pub struct WebAudio {
    context: Option<AudioContext>,
    master_volume: f32,
}

impl WebAudio {
    /// Sink with a gain multiplier; silent if no `AudioContext` can be made
    #[must_use]
    pub fn new(master_volume: f32) -> Self {
        let context = AudioContext::new().ok();
        if context.is_none() {
            tracing::warn!("Web Audio unavailable, cues are muted");
        }
        Self {
            context,
            master_volume,
        }
    }

    fn play_tone(&self, context: &AudioContext, tone: &Tone) -> Result<(), JsValue> {
        let start = context.current_time() + f64::from(tone.offset_ms) / 1000.0;
        let end = start + f64::from(tone.duration);

        let oscillator = context.create_oscillator()?;
        oscillator.set_type(match tone.waveform {
            Waveform::Sine => OscillatorType::Sine,
            Waveform::Square => OscillatorType::Square,
            Waveform::Sawtooth => OscillatorType::Sawtooth,
            Waveform::Triangle => OscillatorType::Triangle,
        });
        oscillator.frequency().set_value(tone.frequency);

        let gain = context.create_gain()?;
        gain.gain()
            .set_value_at_time(tone.volume * self.master_volume, start)?;
        gain.gain().exponential_ramp_to_value_at_time(0.01, end)?;

        oscillator.connect_with_audio_node(&gain)?;
        gain.connect_with_audio_node(&context.destination())?;
        oscillator.start_with_when(start)?;
        oscillator.stop_with_when(end)?;
        Ok(())
    }
}

impl AudioSink for WebAudio {
    fn play(&mut self, cue: Cue) {
        let Some(context) = self.context.as_ref() else {
            return;
        };
        for tone in cue.tones() {
            if let Err(err) = self.play_tone(context, &tone) {
                tracing::debug!(?cue, ?err, "tone dropped");
            }
        }
    }
}

type EventSink = Rc<dyn Fn(QuizEvent)>;

struct BrowserTimer {
    handle: i32,
    repeating: bool,
    _callback: Closure<dyn FnMut()>,
}

#[derive(Default)]
struct TimerTable {
    next_id: u64,
    timers: HashMap<TimerId, BrowserTimer>,
    retired: Vec<BrowserTimer>,
}

/// `setInterval`/`setTimeout` scheduler.
///
/// Fired events go to the sink installed with [`BrowserScheduler::connect`].
/// Cancelled callbacks are freed on a later turn of the event loop since a
/// timer may cancel itself while running.
#[derive(Clone, Default)]
pub struct BrowserScheduler {
    sink: Rc<RefCell<Option<EventSink>>>,
    table: Rc<RefCell<TimerTable>>,
}

impl std::fmt::Debug for BrowserScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrowserScheduler")
            .field("armed", &self.table.borrow().timers.len())
            .finish_non_exhaustive()
    }
}

impl BrowserScheduler {
    /// Routes fired events to `sink`
    pub fn connect(&self, sink: EventSink) {
        *self.sink.borrow_mut() = Some(sink);
    }

    fn arm(&self, ms: u64, repeating: bool, event: QuizEvent) -> TimerId {
        let sink = Rc::clone(&self.sink);
        let callback = Closure::<dyn FnMut()>::new(move || {
            let target = sink.borrow().clone();
            if let Some(target) = target {
                target(event);
            }
        });

        let timeout = i32::try_from(ms).unwrap_or(i32::MAX);
        let function = callback.as_ref().unchecked_ref();
        let handle = window().and_then(|w| {
            if repeating {
                w.set_interval_with_callback_and_timeout_and_arguments_0(function, timeout)
            } else {
                w.set_timeout_with_callback_and_timeout_and_arguments_0(function, timeout)
            }
        });
        let handle = handle.unwrap_or_else(|err| {
            tracing::warn!(?err, "failed to arm timer");
            -1
        });

        let mut table = self.table.borrow_mut();
        table.next_id += 1;
        let id = TimerId(table.next_id);
        table.timers.insert(
            id,
            BrowserTimer {
                handle,
                repeating,
                _callback: callback,
            },
        );
        id
    }

    fn sweep_later(&self) {
        let table = Rc::downgrade(&self.table);
        let sweep = Closure::once_into_js(move || {
            if let Some(table) = table.upgrade() {
                table.borrow_mut().retired.clear();
            }
        });
        if let Ok(w) = window() {
            let _ = w.set_timeout_with_callback_and_timeout_and_arguments_0(
                sweep.unchecked_ref(),
                0,
            );
        }
    }
}

impl Scheduler for BrowserScheduler {
    fn set_interval(&self, period_ms: u64, event: QuizEvent) -> TimerId {
        self.arm(period_ms, true, event)
    }

    fn set_timeout(&self, delay_ms: u64, event: QuizEvent) -> TimerId {
        self.arm(delay_ms, false, event)
    }

    fn cancel(&self, id: TimerId) {
        let Some(timer) = self.table.borrow_mut().timers.remove(&id) else {
            return;
        };
        if let Ok(w) = window() {
            if timer.repeating {
                w.clear_interval_with_handle(timer.handle);
            } else {
                w.clear_timeout_with_handle(timer.handle);
            }
        }
        self.table.borrow_mut().retired.push(timer);
        self.sweep_later();
    }
}

type BrowserSession = QuizSession<BrowserScheduler, BrowserStore, Mutable<WebAudio>>;

/// Quiz overlay for the page
#[derive(Debug)]
#[wasm_bindgen]
pub struct BrowserQuiz {
    session: Rc<RefCell<BrowserSession>>,
    pad: Keypad<AnswerKey>,
    on_change: Rc<RefCell<Option<js_sys::Function>>>,
}

#[wasm_bindgen]
impl BrowserQuiz {
    /// Quiz with settings from an optional YAML document
    ///
    /// # Errors
    ///
    /// Returns the configuration error as a string.
    #[wasm_bindgen(constructor)]
    pub fn new(config_yaml: Option<String>) -> Result<BrowserQuiz, JsValue> {
        console_error_panic_hook::set_once();
        let config = match config_yaml {
            Some(yaml) => {
                AppConfig::from_yaml_str(&yaml).map_err(|e| JsValue::from_str(&e.to_string()))?
            }
            None => AppConfig::default(),
        };

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let seed = js_sys::Date::now() as u64;
        let scheduler = BrowserScheduler::default();
        let session = Rc::new(RefCell::new(QuizSession::with_generator(
            config.quiz,
            QuestionGenerator::seeded(seed),
            scheduler.clone(),
            BrowserStore::new(config.storage_key),
            Mutable::new(WebAudio::new(config.master_volume), config.sound_enabled),
        )));
        let on_change: Rc<RefCell<Option<js_sys::Function>>> = Rc::new(RefCell::new(None));

        let weak: Weak<RefCell<BrowserSession>> = Rc::downgrade(&session);
        let notify = Rc::clone(&on_change);
        scheduler.connect(Rc::new(move |event| {
            let Some(session) = weak.upgrade() else {
                return;
            };
            let Ok(mut session) = session.try_borrow_mut() else {
                tracing::warn!(?event, "timer fired during dispatch, dropped");
                return;
            };
            session.dispatch(event);
            drop(session);
            let callback = notify.borrow().clone();
            if let Some(callback) = callback {
                let _ = callback.call0(&JsValue::NULL);
            }
        }));

        Ok(Self {
            session,
            pad: Keypad::answer_pad(),
            on_change,
        })
    }

    /// Registers a callback run after every timer-driven change
    pub fn set_on_change(&self, callback: js_sys::Function) {
        *self.on_change.borrow_mut() = Some(callback);
    }

    /// Menu → level map
    pub fn open_level_map(&self) -> bool {
        self.dispatch(QuizEvent::OpenLevelMap)
    }

    /// Starts `level` if unlocked
    pub fn select_level(&self, level: u32) -> bool {
        self.dispatch(QuizEvent::SelectLevel(level))
    }

    /// Handles a number pad click by element id
    pub fn handle_pad(&self, button_id: &str) -> bool {
        match self.pad.handle_click(button_id) {
            Some(key) => self.dispatch(key.to_event()),
            None => false,
        }
    }

    /// Handles a `KeyboardEvent.key`
    pub fn handle_key(&self, key: &str) -> bool {
        match AnswerKey::from_keyboard(key) {
            Some(key) => self.dispatch(key.to_event()),
            None => false,
        }
    }

    /// Plays the level after the one just passed
    pub fn next_level(&self) -> bool {
        self.dispatch(QuizEvent::NextLevel)
    }

    /// Replays the failed level
    pub fn retry(&self) -> bool {
        self.dispatch(QuizEvent::Retry)
    }

    /// Back to the menu
    pub fn back_to_menu(&self) -> bool {
        self.dispatch(QuizEvent::BackToMenu)
    }

    /// Closes the overlay and stops every timer
    pub fn close(&self) -> bool {
        self.dispatch(QuizEvent::Close)
    }

    /// Turns sound on or off
    pub fn set_sound(&self, enabled: bool) {
        self.session.borrow_mut().audio_mut().set_enabled(enabled);
    }

    /// Badge announced by the last finished level, if any
    pub fn take_announced_badge(&self) -> Option<u32> {
        self.session.borrow_mut().take_announced_badge()
    }

    /// Quiz screen snapshot as JSON
    pub fn view_json(&self) -> String {
        to_json(&QuizView::build(self.session.borrow().engine()))
    }

    /// Level map snapshot as JSON
    pub fn level_map_json(&self) -> String {
        let session = self.session.borrow();
        let engine = session.engine();
        to_json(&LevelMapView::build(engine.progress(), engine.config()))
    }

    /// Badge gallery snapshot as JSON
    pub fn badges_json(&self) -> String {
        let session = self.session.borrow();
        let engine = session.engine();
        to_json(&BadgeGalleryView::build(engine.progress(), engine.config()))
    }
}

impl BrowserQuiz {
    fn dispatch(&self, event: QuizEvent) -> bool {
        !self.session.borrow_mut().dispatch(event).is_noop()
    }
}

/// Module start hook
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    console::log_1(&"Dragon calculator initialized".into());
}
