//! Arithmetic quiz: question dealing, level state machine and progress
//!
//! The engine never touches timers, storage or audio directly. It hands
//! back [`Effect`]s that [`crate::runtime::QuizSession`] carries out.

mod engine;
mod progress;
mod question;
mod store;

pub use engine::{
    Effect, GameOverReason, LevelResult, QuizEngine, QuizEvent, RoundState, Screen, TimerTicket,
    Transition,
};
pub use progress::{badge_for_level, AttemptOutcome, GameProgress, MAX_STARS};
pub use question::{Question, QuestionGenerator, QuizOperator, DEFAULT_QUESTION_SEED};
pub use store::{FileStore, MemoryStore, ProgressStore, StoreError, StoreResult, STORAGE_KEY};
