//! Host-facing runtime for the quiz: timers and the session that owns them

mod scheduler;
mod session;

pub use scheduler::{MockScheduler, Scheduler, TimerGuard, TimerId};
pub use session::QuizSession;
