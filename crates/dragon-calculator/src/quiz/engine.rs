//! Quiz state machine
//!
//! [`QuizEngine::dispatch`] is the only mutator. It returns the new screen
//! plus a list of [`Effect`]s for the host to carry out (timers, storage,
//! audio). Timer events carry the [`TimerTicket`] they were scheduled with;
//! once the engine moves on, older tickets are ignored.

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::audio::Cue;
use crate::config::QuizConfig;
use crate::quiz::{GameProgress, Question, QuestionGenerator};

/// Generation token for the live timer of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimerTicket(u64);

impl TimerTicket {
    /// Raw generation number
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.0
    }
}

/// Why a level attempt ended without passing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GameOverReason {
    /// The countdown ran out
    TimeUp,
    /// An answer was wrong
    WrongAnswer {
        /// The answer that was expected
        expected: u32,
    },
    /// Every question was answered but too few were right
    BelowPassMark,
}

impl GameOverReason {
    /// Line shown on the game-over screen
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::TimeUp => "Time's Up!".to_string(),
            Self::WrongAnswer { expected } => format!("Oops! The answer was {expected}"),
            Self::BelowPassMark => "So close! Try again for more stars".to_string(),
        }
    }
}

/// Screens of the quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", rename_all = "camelCase")]
pub enum Screen {
    /// Start screen
    Menu,
    /// Level selection
    LevelMap,
    /// A question is on screen and the countdown runs
    Playing,
    /// Brief pause after a correct answer
    Correct,
    /// Level passed
    LevelComplete,
    /// Attempt ended
    GameOver {
        /// What ended it
        reason: GameOverReason,
    },
}

impl Screen {
    /// Returns true while a round owns timers
    #[must_use]
    pub const fn in_round(&self) -> bool {
        matches!(self, Self::Playing | Self::Correct)
    }

    /// Serialized tag of the screen
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Menu => "menu",
            Self::LevelMap => "levelMap",
            Self::Playing => "playing",
            Self::Correct => "correct",
            Self::LevelComplete => "levelComplete",
            Self::GameOver { .. } => "gameOver",
        }
    }
}

/// Inputs to the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizEvent {
    /// Menu → level map
    OpenLevelMap,
    /// Start a level from the map
    SelectLevel(u32),
    /// Number pad digit
    EnterDigit(u8),
    /// Number pad delete
    DeleteDigit,
    /// Submit the number pad field
    SubmitField,
    /// Submit a value directly
    SubmitAnswer(u32),
    /// Countdown tick
    Tick(TimerTicket),
    /// The post-answer pause elapsed
    Advance(TimerTicket),
    /// Play the level after the one just passed
    NextLevel,
    /// Replay the level just played
    Retry,
    /// Return to the menu from a result or map screen
    BackToMenu,
    /// Dispose the quiz from any screen
    Close,
}

/// Side effects requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    /// Persist [`QuizEngine::progress`]
    SaveProgress,
    /// Play an audio cue
    Play(Cue),
    /// Start the repeating countdown ticker, replacing any running one
    StartTicker {
        /// Ticket to send back with every tick
        ticket: TimerTicket,
        /// Tick period
        interval_ms: u64,
    },
    /// Schedule a single [`QuizEvent::Advance`]
    ScheduleAdvance {
        /// Ticket to send back when it fires
        ticket: TimerTicket,
        /// Delay before it fires
        delay_ms: u64,
    },
    /// Cancel every timer of the round
    CancelTimer,
    /// A badge was earned for the first time
    BadgeEarned(u32),
}

/// Result of one dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    /// Screen after the event
    pub screen: Screen,
    /// Effects to carry out, in order
    pub effects: Vec<Effect>,
}

impl Transition {
    fn stay(screen: Screen) -> Self {
        Self {
            screen,
            effects: Vec::new(),
        }
    }

    /// Returns true if the event changed nothing
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.effects.is_empty()
    }

    /// Returns true if `effect` was requested
    #[must_use]
    pub fn has(&self, effect: &Effect) -> bool {
        self.effects.contains(effect)
    }

    /// Cues requested, in order
    pub fn cues(&self) -> impl Iterator<Item = Cue> + '_ {
        self.effects.iter().filter_map(|e| match e {
            Effect::Play(cue) => Some(*cue),
            _ => None,
        })
    }
}

/// Ephemeral state of one level attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundState {
    /// Level being played
    pub level: u32,
    /// Questions answered so far
    pub answered: u32,
    /// Correct answers so far
    pub correct: u32,
    /// Countdown seconds left for the current question
    pub time_remaining: u32,
    /// Countdown length for this level
    pub time_limit: u32,
    /// Question on screen
    pub question: Question,
    /// Number pad field
    pub answer: String,
}

/// Summary of a finished level attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelResult {
    /// Level played
    pub level: u32,
    /// Correct answers
    pub correct: u32,
    /// Stars earned by this attempt
    pub stars: u8,
    /// Badge earned for the first time
    pub new_badge: Option<u32>,
    /// True if the attempt cleared the pass mark
    pub passed: bool,
}

/// The quiz state machine
#[derive(Debug, Clone)]
pub struct QuizEngine<R = ChaCha8Rng> {
    config: QuizConfig,
    progress: GameProgress,
    generator: QuestionGenerator<R>,
    screen: Screen,
    round: Option<RoundState>,
    last_result: Option<LevelResult>,
    generation: u64,
}

impl QuizEngine<ChaCha8Rng> {
    /// Engine with default question seed
    #[must_use]
    pub fn new(config: QuizConfig, progress: GameProgress) -> Self {
        Self::with_generator(config, progress, QuestionGenerator::default())
    }
}

impl<R: Rng> QuizEngine<R> {
    /// Engine with an injected question generator
    pub fn with_generator(
        config: QuizConfig,
        progress: GameProgress,
        generator: QuestionGenerator<R>,
    ) -> Self {
        Self {
            config,
            progress,
            generator,
            screen: Screen::Menu,
            round: None,
            last_result: None,
            generation: 0,
        }
    }

    /// Current screen
    #[must_use]
    pub const fn screen(&self) -> Screen {
        self.screen
    }

    /// Long-term progress
    #[must_use]
    pub const fn progress(&self) -> &GameProgress {
        &self.progress
    }

    /// Quiz rules
    #[must_use]
    pub const fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// The attempt in progress, or the one just ended
    #[must_use]
    pub const fn round(&self) -> Option<&RoundState> {
        self.round.as_ref()
    }

    /// Outcome of the last finalized attempt
    #[must_use]
    pub const fn last_result(&self) -> Option<&LevelResult> {
        self.last_result.as_ref()
    }

    /// Ticket of the live timer, if a round owns one
    #[must_use]
    pub const fn live_ticket(&self) -> Option<TimerTicket> {
        if self.screen.in_round() {
            Some(TimerTicket(self.generation))
        } else {
            None
        }
    }

    /// Applies one event
    pub fn dispatch(&mut self, event: QuizEvent) -> Transition {
        let before = self.screen;
        let transition = match event {
            QuizEvent::OpenLevelMap => self.open_level_map(),
            QuizEvent::SelectLevel(level) => self.select_level(level),
            QuizEvent::EnterDigit(digit) => self.enter_digit(digit),
            QuizEvent::DeleteDigit => self.delete_digit(),
            QuizEvent::SubmitField => self.submit_field(),
            QuizEvent::SubmitAnswer(value) => self.submit_answer(value),
            QuizEvent::Tick(ticket) => self.tick(ticket),
            QuizEvent::Advance(ticket) => self.advance(ticket),
            QuizEvent::NextLevel => self.next_level(),
            QuizEvent::Retry => self.retry(),
            QuizEvent::BackToMenu => self.back_to_menu(),
            QuizEvent::Close => self.close(),
        };
        if transition.screen != before {
            tracing::debug!(?event, from = ?before, to = ?transition.screen, "quiz transition");
        }
        transition
    }

    fn open_level_map(&mut self) -> Transition {
        match self.screen {
            Screen::Menu | Screen::LevelComplete | Screen::GameOver { .. } => {
                self.screen = Screen::LevelMap;
                Transition {
                    screen: self.screen,
                    effects: vec![Effect::Play(Cue::Click)],
                }
            }
            _ => Transition::stay(self.screen),
        }
    }

    fn select_level(&mut self, level: u32) -> Transition {
        if self.screen != Screen::LevelMap
            || level > self.config.level_count
            || !self.progress.is_unlocked(level)
        {
            return Transition::stay(self.screen);
        }
        self.start_round(level)
    }

    fn start_round(&mut self, level: u32) -> Transition {
        let question = self.generator.generate(level, &self.config);
        let time_limit = self.config.time_limit_for(level);
        self.round = Some(RoundState {
            level,
            answered: 0,
            correct: 0,
            time_remaining: time_limit,
            time_limit,
            question,
            answer: String::new(),
        });
        self.last_result = None;
        self.screen = Screen::Playing;
        let ticket = self.next_ticket();
        tracing::debug!(level, time_limit, "round started");
        Transition {
            screen: self.screen,
            effects: vec![
                Effect::Play(Cue::Click),
                Effect::StartTicker {
                    ticket,
                    interval_ms: self.config.tick_interval_ms,
                },
            ],
        }
    }

    fn playing_round(&mut self) -> Option<&mut RoundState> {
        if self.screen == Screen::Playing {
            self.round.as_mut()
        } else {
            None
        }
    }

    fn enter_digit(&mut self, digit: u8) -> Transition {
        let max = self.config.max_answer_digits;
        let Some(round) = self.playing_round() else {
            return Transition::stay(self.screen);
        };
        if let Some(ch) = char::from_digit(u32::from(digit), 10) {
            if round.answer.len() < max {
                round.answer.push(ch);
            }
        }
        Transition {
            screen: self.screen,
            effects: vec![Effect::Play(Cue::Click)],
        }
    }

    fn delete_digit(&mut self) -> Transition {
        let Some(round) = self.playing_round() else {
            return Transition::stay(self.screen);
        };
        round.answer.pop();
        Transition {
            screen: self.screen,
            effects: vec![Effect::Play(Cue::Click)],
        }
    }

    fn submit_field(&mut self) -> Transition {
        let value = self
            .playing_round()
            .filter(|round| !round.answer.is_empty())
            .and_then(|round| round.answer.parse::<u32>().ok());
        match value {
            Some(value) => self.submit_answer(value),
            None => Transition::stay(self.screen),
        }
    }

    fn submit_answer(&mut self, value: u32) -> Transition {
        let ends_on_wrong = self.config.wrong_answer_ends_level;
        let quota = self.config.questions_per_level;
        let Some(round) = self.playing_round() else {
            return Transition::stay(self.screen);
        };
        round.answered += 1;
        round.answer.clear();
        let expected = round.question.answer;
        let exhausted = round.answered >= quota;
        let correct = round.question.is_correct(value);
        if correct {
            round.correct += 1;
        }

        if correct {
            self.screen = Screen::Correct;
            let ticket = self.next_ticket();
            return Transition {
                screen: self.screen,
                effects: vec![
                    Effect::CancelTimer,
                    Effect::Play(Cue::Correct),
                    Effect::ScheduleAdvance {
                        ticket,
                        delay_ms: self.config.correct_delay_ms,
                    },
                ],
            };
        }

        if ends_on_wrong {
            return self.game_over(
                GameOverReason::WrongAnswer { expected },
                vec![Effect::Play(Cue::Wrong)],
            );
        }

        if exhausted {
            return self.finalize(vec![Effect::Play(Cue::Wrong)]);
        }
        let mut transition = self.deal_next();
        transition.effects.insert(0, Effect::Play(Cue::Wrong));
        transition
    }

    fn tick(&mut self, ticket: TimerTicket) -> Transition {
        if !self.is_live(ticket, Screen::Playing) {
            return Transition::stay(self.screen);
        }
        let urgent = self.config.urgent_seconds;
        let every = self.config.tick_cue_every.max(1);
        let Some(round) = self.round.as_mut() else {
            return Transition::stay(self.screen);
        };

        let previous = round.time_remaining;
        if previous <= 1 {
            round.time_remaining = 0;
            return self.game_over(GameOverReason::TimeUp, Vec::new());
        }
        round.time_remaining = previous - 1;

        let effects = if previous <= urgent {
            vec![Effect::Play(Cue::UrgentTick)]
        } else if previous % every == 0 {
            vec![Effect::Play(Cue::Tick)]
        } else {
            Vec::new()
        };
        Transition {
            screen: self.screen,
            effects,
        }
    }

    fn advance(&mut self, ticket: TimerTicket) -> Transition {
        if !self.is_live(ticket, Screen::Correct) {
            return Transition::stay(self.screen);
        }
        let exhausted = self
            .round
            .as_ref()
            .is_some_and(|round| round.answered >= self.config.questions_per_level);
        if exhausted {
            self.finalize(Vec::new())
        } else {
            self.deal_next()
        }
    }

    fn deal_next(&mut self) -> Transition {
        let Some(level) = self.round.as_ref().map(|round| round.level) else {
            return Transition::stay(self.screen);
        };
        let question = self.generator.generate(level, &self.config);
        if let Some(round) = self.round.as_mut() {
            round.question = question;
            round.time_remaining = round.time_limit;
            round.answer.clear();
        }
        self.screen = Screen::Playing;
        let ticket = self.next_ticket();
        Transition {
            screen: self.screen,
            effects: vec![Effect::StartTicker {
                ticket,
                interval_ms: self.config.tick_interval_ms,
            }],
        }
    }

    /// Scores the round; `cues` play after the save and before the verdict
    fn finalize(&mut self, cues: Vec<Effect>) -> Transition {
        let Some((level, correct)) = self.round.as_ref().map(|r| (r.level, r.correct)) else {
            return Transition::stay(self.screen);
        };
        let stars = self.config.stars_for(correct);
        let outcome = self.progress.record_attempt(level, correct, stars);
        let passed = correct >= self.config.pass_mark;
        self.last_result = Some(LevelResult {
            level,
            correct,
            stars,
            new_badge: outcome.new_badge,
            passed,
        });
        self.next_ticket();

        let mut effects = vec![Effect::CancelTimer, Effect::SaveProgress];
        effects.extend(cues);
        if passed {
            tracing::info!(level, correct, stars, "level complete");
            self.screen = Screen::LevelComplete;
            effects.push(Effect::Play(Cue::Celebration));
        } else {
            tracing::info!(level, correct, "level finished below pass mark");
            self.screen = Screen::GameOver {
                reason: GameOverReason::BelowPassMark,
            };
            effects.push(Effect::Play(Cue::GameOver));
        }
        if let Some(badge) = outcome.new_badge {
            tracing::info!(badge, "badge earned");
            effects.push(Effect::BadgeEarned(badge));
            effects.push(Effect::Play(Cue::BadgeEarned));
        }
        Transition {
            screen: self.screen,
            effects,
        }
    }

    fn game_over(&mut self, reason: GameOverReason, mut cues: Vec<Effect>) -> Transition {
        self.screen = Screen::GameOver { reason };
        self.next_ticket();
        cues.insert(0, Effect::CancelTimer);
        cues.push(Effect::Play(Cue::GameOver));
        Transition {
            screen: self.screen,
            effects: cues,
        }
    }

    fn next_level(&mut self) -> Transition {
        if self.screen != Screen::LevelComplete {
            return Transition::stay(self.screen);
        }
        let Some(level) = self.last_result.map(|r| r.level + 1) else {
            return Transition::stay(self.screen);
        };
        if level <= self.config.level_count && self.progress.is_unlocked(level) {
            self.start_round(level)
        } else {
            self.screen = Screen::LevelMap;
            Transition {
                screen: self.screen,
                effects: vec![Effect::Play(Cue::Click)],
            }
        }
    }

    fn retry(&mut self) -> Transition {
        if !matches!(self.screen, Screen::GameOver { .. }) {
            return Transition::stay(self.screen);
        }
        match self.round.as_ref().map(|round| round.level) {
            Some(level) => self.start_round(level),
            None => Transition::stay(self.screen),
        }
    }

    fn back_to_menu(&mut self) -> Transition {
        match self.screen {
            Screen::LevelMap | Screen::LevelComplete | Screen::GameOver { .. } => self.close(),
            _ => Transition::stay(self.screen),
        }
    }

    fn close(&mut self) -> Transition {
        let had_round = self.screen.in_round();
        self.screen = Screen::Menu;
        self.round = None;
        self.next_ticket();
        Transition {
            screen: self.screen,
            effects: if had_round {
                vec![Effect::CancelTimer]
            } else {
                vec![Effect::Play(Cue::Click)]
            },
        }
    }

    fn next_ticket(&mut self) -> TimerTicket {
        self.generation += 1;
        TimerTicket(self.generation)
    }

    fn is_live(&self, ticket: TimerTicket, screen: Screen) -> bool {
        self.screen == screen && ticket.0 == self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine() -> QuizEngine {
        QuizEngine::new(QuizConfig::default(), GameProgress::default())
    }

    fn started(level: u32) -> (QuizEngine, TimerTicket) {
        let mut progress = GameProgress::default();
        for l in 1..level {
            progress.record_attempt(l, 5, 3);
        }
        let mut engine = QuizEngine::new(QuizConfig::default(), progress);
        engine.dispatch(QuizEvent::OpenLevelMap);
        let t = engine.dispatch(QuizEvent::SelectLevel(level));
        let ticket = ticket_of(&t).unwrap();
        (engine, ticket)
    }

    fn ticket_of(t: &Transition) -> Option<TimerTicket> {
        t.effects.iter().find_map(|e| match e {
            Effect::StartTicker { ticket, .. } | Effect::ScheduleAdvance { ticket, .. } => {
                Some(*ticket)
            }
            _ => None,
        })
    }

    fn answer(engine: &QuizEngine) -> u32 {
        engine.round().unwrap().question.answer
    }

    // ===== Navigation tests =====

    #[test]
    fn test_starts_at_menu() {
        let engine = engine();
        assert_eq!(engine.screen(), Screen::Menu);
        assert!(engine.round().is_none());
        assert!(engine.live_ticket().is_none());
    }

    #[test]
    fn test_locked_level_ignored() {
        let mut engine = engine();
        engine.dispatch(QuizEvent::OpenLevelMap);
        let t = engine.dispatch(QuizEvent::SelectLevel(2));
        assert!(t.is_noop());
        assert_eq!(engine.screen(), Screen::LevelMap);
        assert!(engine.dispatch(QuizEvent::SelectLevel(0)).is_noop());
        assert!(engine.dispatch(QuizEvent::SelectLevel(21)).is_noop());
    }

    #[test]
    fn test_select_requires_level_map() {
        let mut engine = engine();
        assert!(engine.dispatch(QuizEvent::SelectLevel(1)).is_noop());
        assert_eq!(engine.screen(), Screen::Menu);
    }

    #[test]
    fn test_select_level_starts_round() {
        let (engine, ticket) = started(1);
        assert_eq!(engine.screen(), Screen::Playing);
        let round = engine.round().unwrap();
        assert_eq!(round.level, 1);
        assert_eq!(round.time_remaining, 60);
        assert_eq!(engine.live_ticket(), Some(ticket));
    }

    #[test]
    fn test_time_limit_per_band() {
        let (engine, _) = started(5);
        assert_eq!(engine.round().unwrap().time_remaining, 45);
        let (engine, _) = started(9);
        assert_eq!(engine.round().unwrap().time_remaining, 30);
    }

    // ===== Answer tests =====

    #[test]
    fn test_correct_answer_schedules_advance() {
        let (mut engine, _) = started(1);
        let value = answer(&engine);
        let t = engine.dispatch(QuizEvent::SubmitAnswer(value));
        assert_eq!(t.screen, Screen::Correct);
        assert_eq!(t.effects[0], Effect::CancelTimer);
        assert!(t.cues().any(|c| c == Cue::Correct));
        assert!(t
            .effects
            .iter()
            .any(|e| matches!(e, Effect::ScheduleAdvance { delay_ms: 800, .. })));
        assert_eq!(engine.round().unwrap().correct, 1);
    }

    #[test]
    fn test_wrong_answer_ends_attempt_without_saving() {
        let (mut engine, _) = started(1);
        let expected = answer(&engine);
        let t = engine.dispatch(QuizEvent::SubmitAnswer(expected + 1));
        assert_eq!(
            t.screen,
            Screen::GameOver {
                reason: GameOverReason::WrongAnswer { expected }
            }
        );
        assert!(t.has(&Effect::CancelTimer));
        assert!(!t.has(&Effect::SaveProgress));
        assert_eq!(t.cues().collect::<Vec<_>>(), vec![Cue::Wrong, Cue::GameOver]);
        assert_eq!(engine.progress(), &GameProgress::default());
    }

    #[test]
    fn test_answer_field() {
        let (mut engine, _) = started(1);
        for d in [1, 2, 3, 4, 5] {
            engine.dispatch(QuizEvent::EnterDigit(d));
        }
        assert_eq!(engine.round().unwrap().answer, "1234");
        engine.dispatch(QuizEvent::DeleteDigit);
        assert_eq!(engine.round().unwrap().answer, "123");
    }

    #[test]
    fn test_empty_field_submit_ignored() {
        let (mut engine, _) = started(1);
        let t = engine.dispatch(QuizEvent::SubmitField);
        assert!(t.is_noop());
        assert_eq!(engine.screen(), Screen::Playing);
    }

    #[test]
    fn test_submit_field_uses_typed_value() {
        let (mut engine, _) = started(1);
        let value = answer(&engine);
        for ch in value.to_string().chars() {
            let digit = u8::try_from(ch.to_digit(10).unwrap()).unwrap();
            engine.dispatch(QuizEvent::EnterDigit(digit));
        }
        let t = engine.dispatch(QuizEvent::SubmitField);
        assert_eq!(t.screen, Screen::Correct);
        assert!(engine.round().unwrap().answer.is_empty());
    }

    #[test]
    fn test_input_ignored_outside_playing() {
        let mut engine = engine();
        assert!(engine.dispatch(QuizEvent::EnterDigit(4)).is_noop());
        assert!(engine.dispatch(QuizEvent::SubmitAnswer(4)).is_noop());
    }

    // ===== Timer tests =====

    #[test]
    fn test_tick_counts_down() {
        let (mut engine, ticket) = started(1);
        let t = engine.dispatch(QuizEvent::Tick(ticket));
        assert!(t.cues().next().is_none());
        assert_eq!(engine.round().unwrap().time_remaining, 59);
    }

    #[test]
    fn test_tick_cues() {
        let (mut engine, ticket) = started(1);
        let mut cues = Vec::new();
        for _ in 0..59 {
            let t = engine.dispatch(QuizEvent::Tick(ticket));
            cues.push((engine.round().unwrap().time_remaining + 1, t.cues().next()));
        }
        for (previous, cue) in cues {
            let expected = if previous <= 10 {
                Some(Cue::UrgentTick)
            } else if previous % 5 == 0 {
                Some(Cue::Tick)
            } else {
                None
            };
            assert_eq!(cue, expected, "previous = {previous}");
        }
    }

    #[test]
    fn test_timeout_is_game_over() {
        let (mut engine, ticket) = started(1);
        for _ in 0..59 {
            engine.dispatch(QuizEvent::Tick(ticket));
        }
        assert_eq!(engine.screen(), Screen::Playing);
        let t = engine.dispatch(QuizEvent::Tick(ticket));
        assert_eq!(
            t.screen,
            Screen::GameOver {
                reason: GameOverReason::TimeUp
            }
        );
        assert_eq!(t.effects, vec![Effect::CancelTimer, Effect::Play(Cue::GameOver)]);
        assert_eq!(engine.round().unwrap().time_remaining, 0);
        assert!(engine.dispatch(QuizEvent::Tick(ticket)).is_noop());
    }

    #[test]
    fn test_stale_tick_ignored() {
        let (mut engine, ticket) = started(1);
        let value = answer(&engine);
        engine.dispatch(QuizEvent::SubmitAnswer(value));
        let t = engine.dispatch(QuizEvent::Tick(ticket));
        assert!(t.is_noop());
        assert_eq!(engine.screen(), Screen::Correct);
    }

    #[test]
    fn test_advance_resets_countdown() {
        let (mut engine, ticket) = started(1);
        engine.dispatch(QuizEvent::Tick(ticket));
        let value = answer(&engine);
        let t = engine.dispatch(QuizEvent::SubmitAnswer(value));
        let advance = ticket_of(&t).unwrap();
        let t = engine.dispatch(QuizEvent::Advance(advance));
        assert_eq!(t.screen, Screen::Playing);
        assert_eq!(engine.round().unwrap().time_remaining, 60);
        assert_ne!(ticket_of(&t), Some(ticket));
    }

    #[test]
    fn test_close_invalidates_tickets() {
        let (mut engine, ticket) = started(1);
        let t = engine.dispatch(QuizEvent::Close);
        assert_eq!(t.screen, Screen::Menu);
        assert_eq!(t.effects, vec![Effect::CancelTimer]);
        assert!(engine.dispatch(QuizEvent::Tick(ticket)).is_noop());
        assert!(engine.round().is_none());
    }

    // ===== Finalization tests =====

    fn play_perfect_level(engine: &mut QuizEngine) -> Transition {
        loop {
            let value = answer(engine);
            let t = engine.dispatch(QuizEvent::SubmitAnswer(value));
            let ticket = ticket_of(&t).unwrap();
            let t = engine.dispatch(QuizEvent::Advance(ticket));
            if t.screen != Screen::Playing {
                return t;
            }
        }
    }

    #[test]
    fn test_perfect_level_completes() {
        let (mut engine, _) = started(1);
        let t = play_perfect_level(&mut engine);
        assert_eq!(t.screen, Screen::LevelComplete);
        assert_eq!(
            t.effects,
            vec![
                Effect::CancelTimer,
                Effect::SaveProgress,
                Effect::Play(Cue::Celebration),
                Effect::BadgeEarned(0),
                Effect::Play(Cue::BadgeEarned),
            ]
        );
        let progress = engine.progress();
        assert!(progress.is_completed(1));
        assert_eq!(progress.stars(1), 3);
        assert_eq!(progress.current_level, 2);
        assert_eq!(progress.total_score, 5);
        assert_eq!(engine.last_result().unwrap().stars, 3);
    }

    #[test]
    fn test_replayed_level_no_second_badge() {
        let (mut engine, _) = started(1);
        play_perfect_level(&mut engine);
        engine.dispatch(QuizEvent::OpenLevelMap);
        engine.dispatch(QuizEvent::SelectLevel(1));
        let t = play_perfect_level(&mut engine);
        assert!(!t.effects.iter().any(|e| matches!(e, Effect::BadgeEarned(_))));
        assert_eq!(engine.progress().total_score, 10);
    }

    #[test]
    fn test_next_level_starts_following_level() {
        let (mut engine, _) = started(1);
        play_perfect_level(&mut engine);
        let t = engine.dispatch(QuizEvent::NextLevel);
        assert_eq!(t.screen, Screen::Playing);
        assert_eq!(engine.round().unwrap().level, 2);
    }

    #[test]
    fn test_next_level_after_last_returns_to_map() {
        let (mut engine, _) = started(20);
        play_perfect_level(&mut engine);
        let t = engine.dispatch(QuizEvent::NextLevel);
        assert_eq!(t.screen, Screen::LevelMap);
    }

    #[test]
    fn test_retry_same_level() {
        let (mut engine, _) = started(2);
        let expected = answer(&engine);
        engine.dispatch(QuizEvent::SubmitAnswer(expected + 1));
        let t = engine.dispatch(QuizEvent::Retry);
        assert_eq!(t.screen, Screen::Playing);
        let round = engine.round().unwrap();
        assert_eq!(round.level, 2);
        assert_eq!(round.correct, 0);
    }

    #[test]
    fn test_lenient_mode_below_pass_mark() {
        let config = QuizConfig::default().with_wrong_answer_ends_level(false);
        let mut engine = QuizEngine::new(config, GameProgress::default());
        engine.dispatch(QuizEvent::OpenLevelMap);
        engine.dispatch(QuizEvent::SelectLevel(1));

        let mut last = None;
        for i in 0..5 {
            let value = answer(&engine);
            if i < 2 {
                let t = engine.dispatch(QuizEvent::SubmitAnswer(value));
                let ticket = ticket_of(&t).unwrap();
                last = Some(engine.dispatch(QuizEvent::Advance(ticket)));
            } else {
                last = Some(engine.dispatch(QuizEvent::SubmitAnswer(value + 1)));
            }
        }
        let t = last.unwrap();
        assert_eq!(
            t.screen,
            Screen::GameOver {
                reason: GameOverReason::BelowPassMark
            }
        );
        let save = t.effects.iter().position(|e| *e == Effect::SaveProgress).unwrap();
        let wrong = t
            .effects
            .iter()
            .position(|e| *e == Effect::Play(Cue::Wrong))
            .unwrap();
        assert!(save < wrong);
        let badge = t
            .effects
            .iter()
            .position(|e| *e == Effect::BadgeEarned(0))
            .unwrap();
        assert!(save < badge);
        assert_eq!(engine.progress().stars(1), 1);
        assert!(!engine.last_result().unwrap().passed);
    }

    #[test]
    fn test_back_to_menu_from_result() {
        let (mut engine, _) = started(1);
        let expected = answer(&engine);
        engine.dispatch(QuizEvent::SubmitAnswer(expected + 1));
        let t = engine.dispatch(QuizEvent::BackToMenu);
        assert_eq!(t.screen, Screen::Menu);
    }

    #[test]
    fn test_game_over_messages() {
        assert_eq!(GameOverReason::TimeUp.message(), "Time's Up!");
        assert_eq!(
            GameOverReason::WrongAnswer { expected: 12 }.message(),
            "Oops! The answer was 12"
        );
        assert!(GameOverReason::BelowPassMark.message().starts_with("So close"));
    }

    #[test]
    fn test_lenient_last_wrong_answer_saves_before_cues() {
        let config = QuizConfig::default().with_wrong_answer_ends_level(false);
        let mut engine = QuizEngine::new(config, GameProgress::default());
        engine.dispatch(QuizEvent::OpenLevelMap);
        engine.dispatch(QuizEvent::SelectLevel(1));

        let mut last = None;
        for _ in 0..5 {
            let value = answer(&engine);
            last = Some(engine.dispatch(QuizEvent::SubmitAnswer(value + 1)));
        }
        let t = last.unwrap();
        assert_eq!(
            t.effects,
            vec![
                Effect::CancelTimer,
                Effect::SaveProgress,
                Effect::Play(Cue::Wrong),
                Effect::Play(Cue::GameOver),
                Effect::BadgeEarned(0),
                Effect::Play(Cue::BadgeEarned),
            ]
        );
        assert_eq!(engine.progress().stars(1), 0);
    }
}
