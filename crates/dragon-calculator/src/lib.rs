//! Dragon Calculator
//!
//! A themed calculator widget with a levelled arithmetic quiz behind its
//! game button.
//!
//! - [`core`]: expression buffer, parser and evaluator behind the keypad
//! - [`quiz`]: question dealing, the level state machine and saved progress
//! - [`runtime`]: timers and the session that carries out quiz effects
//! - [`view`]: serializable snapshots for a renderer
//! - [`wasm`]: mock DOM, keypads, drivers and (with `wasm`) browser bindings
//!
//! # Example
//!
//! ```rust
//! use dragon_calculator::prelude::*;
//!
//! let mut calc = Calculator::new();
//! calc.press_sequence("3+4×2=");
//! assert_eq!(calc.result(), "11");
//!
//! let mut session = QuizSession::new(
//!     QuizConfig::default(),
//!     MockScheduler::new(),
//!     MemoryStore::new(),
//!     RecordingAudio::new(),
//! );
//! session.dispatch(QuizEvent::OpenLevelMap);
//! session.dispatch(QuizEvent::SelectLevel(1));
//! assert_eq!(session.screen(), Screen::Playing);
//!
//! session.run_for(60_000);
//! assert!(matches!(session.screen(), Screen::GameOver { .. }));
//! ```

#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::float_cmp
    )
)]
#![warn(missing_docs)]
#![deny(missing_debug_implementations)]

pub mod audio;
pub mod config;
pub mod core;
pub mod driver;
pub mod quiz;
pub mod runtime;
pub mod view;

/// Web front end; the mock DOM is always available for native tests
pub mod wasm;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::audio::{AudioSink, Cue, Mutable, RecordingAudio, SilentAudio};
    pub use crate::config::{AppConfig, ConfigError, QuizConfig};
    pub use crate::core::parser::{AstNode, Parser};
    pub use crate::core::{CalcError, CalcKey, CalcResult, Calculator, Evaluator, Operation};
    pub use crate::driver::{CalculatorDriver, DirectDriver};
    pub use crate::quiz::{
        Effect, FileStore, GameOverReason, GameProgress, MemoryStore, ProgressStore, Question,
        QuestionGenerator, QuizEngine, QuizEvent, Screen,
    };
    pub use crate::runtime::{MockScheduler, QuizSession, Scheduler};
    pub use crate::view::{BadgeGalleryView, CalculatorView, LevelMapView, QuizView};
    pub use crate::wasm::{MockDom, QuizDriver, WasmDriver};
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_calculator() {
        let ast = Parser::parse_str("1+2*3").unwrap();
        assert_eq!(Evaluator::new().evaluate(&ast).unwrap(), 7.0);

        let mut calc = Calculator::new();
        calc.press(CalcKey::Digit(6));
        calc.press(CalcKey::Operator(Operation::Multiply));
        calc.press(CalcKey::Digit(7));
        calc.press(CalcKey::Submit);
        assert_eq!(calc.result(), "42");
    }

    #[test]
    fn test_prelude_engine() {
        let mut engine = QuizEngine::new(QuizConfig::default(), GameProgress::default());
        let transition = engine.dispatch(QuizEvent::OpenLevelMap);
        assert_eq!(transition.screen, Screen::LevelMap);
        assert!(transition.has(&Effect::Play(Cue::Click)));
    }

    #[test]
    fn test_prelude_drivers_agree() {
        let mut direct = DirectDriver::new();
        let mut dom = WasmDriver::new();
        for keys in ["12+7", "9÷4", "50%", "2-5"] {
            assert_eq!(direct.evaluate(keys), dom.evaluate(keys), "keys {keys}");
        }
    }
}
