//! Web front end
//!
//! The mock DOM, keypads and drivers are always compiled so the widget can
//! be exercised natively. The real browser bindings need the `wasm` feature.

#[cfg(feature = "wasm")]
mod browser;
mod dom;
mod driver;
mod keypad;

#[cfg(feature = "wasm")]
pub use browser::{BrowserCalculator, BrowserQuiz, BrowserScheduler, BrowserStore, WebAudio};
pub use dom::{
    DomElement, DomEvent, MockDom, BADGE_GALLERY_ID, CALC_INPUT_ID, CALC_RESULT_ID, LEVEL_MAP_ID,
    OPEN_GAME_ID, QUIZ_OVERLAY_ID,
};
pub use driver::{MockQuizSession, QuizDriver, WasmDriver};
pub use keypad::{AnswerKey, ButtonDef, ButtonKind, Keypad, PadKey};
