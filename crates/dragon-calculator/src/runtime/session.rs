use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::audio::AudioSink;
use crate::config::QuizConfig;
use crate::quiz::{
    Effect, GameProgress, ProgressStore, QuestionGenerator, QuizEngine, QuizEvent, Screen,
    Transition,
};
use crate::runtime::{MockScheduler, Scheduler, TimerGuard};

/// One quiz session: the engine plus the host collaborators that carry out
/// its effects.
///
/// Holds at most one ticker and one advance timer. Dropping the session
/// cancels both.
#[derive(Debug)]
pub struct QuizSession<S, P, A, R = ChaCha8Rng>
where
    S: Scheduler + Clone,
    P: ProgressStore,
    A: AudioSink,
{
    engine: QuizEngine<R>,
    scheduler: S,
    store: P,
    audio: A,
    ticker: Option<TimerGuard<S>>,
    advance: Option<TimerGuard<S>>,
    announced_badge: Option<u32>,
}

impl<S, P, A> QuizSession<S, P, A, ChaCha8Rng>
where
    S: Scheduler + Clone,
    P: ProgressStore,
    A: AudioSink,
{
    /// Loads progress from `store` and starts at the menu
    pub fn new(config: QuizConfig, scheduler: S, store: P, audio: A) -> Self {
        Self::with_generator(config, QuestionGenerator::default(), scheduler, store, audio)
    }
}

impl<S, P, A, R> QuizSession<S, P, A, R>
where
    S: Scheduler + Clone,
    P: ProgressStore,
    A: AudioSink,
    R: Rng,
{
    /// Session with an injected question generator
    pub fn with_generator(
        config: QuizConfig,
        generator: QuestionGenerator<R>,
        scheduler: S,
        store: P,
        audio: A,
    ) -> Self {
        let progress = store.load();
        tracing::debug!(
            current_level = progress.current_level,
            completed = progress.completed_levels.len(),
            "progress loaded"
        );
        Self {
            engine: QuizEngine::with_generator(config, progress, generator),
            scheduler,
            store,
            audio,
            ticker: None,
            advance: None,
            announced_badge: None,
        }
    }

    /// Feeds one event to the engine and carries out its effects
    pub fn dispatch(&mut self, event: QuizEvent) -> Transition {
        if let QuizEvent::Advance(ticket) = event {
            if self.engine.live_ticket() == Some(ticket) {
                self.advance = None;
            }
        }
        let transition = self.engine.dispatch(event);
        for effect in &transition.effects {
            self.apply(*effect);
        }
        transition
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::SaveProgress => self.store.save(self.engine.progress()),
            Effect::Play(cue) => self.audio.play(cue),
            Effect::StartTicker {
                ticket,
                interval_ms,
            } => {
                let id = self
                    .scheduler
                    .set_interval(interval_ms, QuizEvent::Tick(ticket));
                self.ticker = Some(TimerGuard::new(self.scheduler.clone(), id));
            }
            Effect::ScheduleAdvance { ticket, delay_ms } => {
                let id = self
                    .scheduler
                    .set_timeout(delay_ms, QuizEvent::Advance(ticket));
                self.advance = Some(TimerGuard::new(self.scheduler.clone(), id));
            }
            Effect::CancelTimer => {
                self.ticker = None;
                self.advance = None;
            }
            Effect::BadgeEarned(badge) => self.announced_badge = Some(badge),
        }
    }

    /// Current screen
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.engine.screen()
    }

    /// The underlying engine
    #[must_use]
    pub const fn engine(&self) -> &QuizEngine<R> {
        &self.engine
    }

    /// Long-term progress
    #[must_use]
    pub fn progress(&self) -> &GameProgress {
        self.engine.progress()
    }

    /// Progress store
    #[must_use]
    pub const fn store(&self) -> &P {
        &self.store
    }

    /// Audio sink
    #[must_use]
    pub const fn audio(&self) -> &A {
        &self.audio
    }

    /// Mutable audio sink (mute toggles)
    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    /// Scheduler handle
    #[must_use]
    pub const fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Returns true while the countdown ticker is armed
    #[must_use]
    pub const fn has_ticker(&self) -> bool {
        self.ticker.is_some()
    }

    /// Returns true while the post-answer pause is armed
    #[must_use]
    pub const fn has_pending_advance(&self) -> bool {
        self.advance.is_some()
    }

    /// Takes the badge announced by the last finalization, if any
    pub fn take_announced_badge(&mut self) -> Option<u32> {
        self.announced_badge.take()
    }
}

impl<P, A, R> QuizSession<MockScheduler, P, A, R>
where
    P: ProgressStore,
    A: AudioSink,
    R: Rng,
{
    /// Advances the mock clock by `ms`, dispatching every timer that fires
    pub fn run_for(&mut self, ms: u64) {
        let deadline = self.scheduler.now_ms() + ms;
        while let Some(event) = self.scheduler.pop_due(deadline) {
            self.dispatch(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Cue, RecordingAudio};
    use crate::quiz::{GameOverReason, MemoryStore};

    type Session = QuizSession<MockScheduler, MemoryStore, RecordingAudio>;

    fn session() -> Session {
        QuizSession::new(
            QuizConfig::default(),
            MockScheduler::new(),
            MemoryStore::new(),
            RecordingAudio::new(),
        )
    }

    fn current_answer(s: &Session) -> u32 {
        s.engine().round().unwrap().question.answer
    }

    #[test]
    fn test_round_arms_ticker() {
        let mut s = session();
        s.dispatch(QuizEvent::OpenLevelMap);
        s.dispatch(QuizEvent::SelectLevel(1));
        assert!(s.has_ticker());
        assert_eq!(s.scheduler().interval_count(), 1);
    }

    #[test]
    fn test_timer_expiry_cancels_ticker() {
        let mut s = session();
        s.dispatch(QuizEvent::OpenLevelMap);
        s.dispatch(QuizEvent::SelectLevel(1));
        s.run_for(60_000);
        assert_eq!(
            s.screen(),
            Screen::GameOver {
                reason: GameOverReason::TimeUp
            }
        );
        assert!(!s.has_ticker());
        assert_eq!(s.scheduler().active_count(), 0);
        assert_eq!(s.audio().count(Cue::GameOver), 1);
        assert_eq!(s.audio().count(Cue::UrgentTick), 9);
    }

    #[test]
    fn test_correct_answer_advances_after_delay() {
        let mut s = session();
        s.dispatch(QuizEvent::OpenLevelMap);
        s.dispatch(QuizEvent::SelectLevel(1));
        let value = current_answer(&s);
        s.dispatch(QuizEvent::SubmitAnswer(value));
        assert!(!s.has_ticker());
        assert!(s.has_pending_advance());
        s.run_for(799);
        assert_eq!(s.screen(), Screen::Correct);
        s.run_for(1);
        assert_eq!(s.screen(), Screen::Playing);
        assert!(s.has_ticker());
    }

    #[test]
    fn test_level_completion_persists_before_badge() {
        let mut s = session();
        s.dispatch(QuizEvent::OpenLevelMap);
        s.dispatch(QuizEvent::SelectLevel(1));
        for _ in 0..5 {
            let value = current_answer(&s);
            s.dispatch(QuizEvent::SubmitAnswer(value));
            s.run_for(800);
        }
        assert_eq!(s.screen(), Screen::LevelComplete);
        assert_eq!(s.store().load().stars(1), 3);
        assert_eq!(s.take_announced_badge(), Some(0));
        assert_eq!(s.take_announced_badge(), None);
        assert_eq!(s.scheduler().active_count(), 0);
    }

    #[test]
    fn test_session_loads_saved_progress() {
        let mut store = MemoryStore::new();
        let mut progress = GameProgress::default();
        progress.record_attempt(1, 5, 3);
        store.save(&progress);
        let s = QuizSession::new(
            QuizConfig::default(),
            MockScheduler::new(),
            store,
            RecordingAudio::new(),
        );
        assert!(s.progress().is_unlocked(2));
    }

    #[test]
    fn test_drop_cancels_timers() {
        let scheduler = MockScheduler::new();
        {
            let mut s = QuizSession::new(
                QuizConfig::default(),
                scheduler.clone(),
                MemoryStore::new(),
                RecordingAudio::new(),
            );
            s.dispatch(QuizEvent::OpenLevelMap);
            s.dispatch(QuizEvent::SelectLevel(1));
            assert_eq!(scheduler.active_count(), 1);
        }
        assert_eq!(scheduler.active_count(), 0);
    }

    #[test]
    fn test_close_mid_round() {
        let mut s = session();
        s.dispatch(QuizEvent::OpenLevelMap);
        s.dispatch(QuizEvent::SelectLevel(1));
        s.dispatch(QuizEvent::Close);
        assert_eq!(s.screen(), Screen::Menu);
        assert_eq!(s.scheduler().active_count(), 0);
        s.run_for(120_000);
        assert_eq!(s.screen(), Screen::Menu);
    }
}
