//! Property-based tests for the evaluator, question dealing and the quiz engine

use dragon_calculator::config::QuizConfig;
use dragon_calculator::core::{format_result, CalcError, Evaluator};
use dragon_calculator::quiz::{
    FileStore, GameProgress, MemoryStore, ProgressStore, QuestionGenerator, QuizEngine,
    QuizEvent, QuizOperator, Screen, STORAGE_KEY,
};
use proptest::prelude::*;

// ===== Evaluator properties =====

proptest! {
    /// Two-operand expressions agree with native arithmetic
    #[test]
    fn prop_binary_expressions(a in 0u32..10_000, b in 0u32..10_000, op in 0usize..4) {
        let eval = Evaluator::new();
        let (x, y) = (f64::from(a), f64::from(b));
        let (glyph, expected) = match op {
            0 => ('+', Some(x + y)),
            1 => ('-', Some(x - y)),
            2 => ('×', Some(x * y)),
            _ => ('÷', (b != 0).then(|| x / y)),
        };
        let result = eval.evaluate_expression(&format!("{a}{glyph}{b}"));
        match expected {
            Some(value) => prop_assert_eq!(result, Ok(format_result(value))),
            None => prop_assert_eq!(result, Err(CalcError::DivisionByZero)),
        }
    }

    /// Sanitizing keeps only the expression alphabet
    #[test]
    fn prop_sanitize_alphabet(input in "\\PC{0,40}") {
        let clean = Evaluator::sanitize(&input);
        prop_assert!(clean.chars().all(|c| c.is_ascii_digit() || "+-*/().".contains(c)));
    }

    /// Evaluation never panics on arbitrary keypad text
    #[test]
    fn prop_evaluate_total(input in "[0-9+\\-×÷.%]{0,24}") {
        let _ = Evaluator::new().evaluate_expression(&input);
    }

    /// Formatting never prints negative zero or a trailing point
    #[test]
    fn prop_format_shape(value in -1.0e9f64..1.0e9) {
        let text = format_result(value);
        prop_assert_ne!(text.as_str(), "-0");
        prop_assert!(!text.ends_with('.'));
        prop_assert!(!(text.contains('.') && text.ends_with('0')));
    }
}

// ===== Question generator properties =====

proptest! {
    /// Dealt questions respect the level's operand ranges
    #[test]
    fn prop_question_ranges(seed in any::<u64>(), level in 1u32..=20) {
        let config = QuizConfig::default();
        let mut generator = QuestionGenerator::seeded(seed);
        let max = (10 + 2 * level).min(20);
        let mult_max = (level + 3).min(10);
        for _ in 0..10 {
            let q = generator.generate(level, &config);
            prop_assert!(q.operand1 >= 1 && q.operand2 >= 1);
            prop_assert!(QuizOperator::available(level, &config).contains(&q.operator));
            match q.operator {
                QuizOperator::Add => {
                    prop_assert!(q.operand1 <= max);
                    prop_assert_eq!(q.answer, q.operand1 + q.operand2);
                    prop_assert!(q.answer <= max + 1);
                }
                QuizOperator::Subtract => {
                    prop_assert!(q.operand2 <= q.operand1 && q.operand1 <= max);
                    prop_assert_eq!(q.answer, q.operand1 - q.operand2);
                }
                QuizOperator::Multiply => {
                    prop_assert!(level >= 3);
                    prop_assert!(q.operand1 <= mult_max && q.operand2 <= mult_max);
                    prop_assert_eq!(q.answer, q.operand1 * q.operand2);
                }
            }
        }
    }

    /// Equal seeds deal equal questions
    #[test]
    fn prop_seed_determinism(seed in any::<u64>(), level in 1u32..=20) {
        let config = QuizConfig::default();
        let mut a = QuestionGenerator::seeded(seed);
        let mut b = QuestionGenerator::seeded(seed);
        for _ in 0..5 {
            prop_assert_eq!(a.generate(level, &config), b.generate(level, &config));
        }
    }

    /// Stars never decrease as correct answers increase
    #[test]
    fn prop_stars_monotonic(correct in 0u32..10) {
        let config = QuizConfig::default();
        prop_assert!(config.stars_for(correct) <= config.stars_for(correct + 1));
        prop_assert!(config.stars_for(correct) <= 3);
    }
}

// ===== Progress properties =====

fn attempts_strategy() -> impl Strategy<Value = Vec<(u32, u32)>> {
    prop::collection::vec((1u32..=20, 0u32..=5), 0..40)
}

fn progress_from(attempts: &[(u32, u32)]) -> GameProgress {
    let config = QuizConfig::default();
    let mut progress = GameProgress::default();
    for &(level, correct) in attempts {
        progress.record_attempt(level, correct, config.stars_for(correct));
    }
    progress
}

proptest! {
    /// Repeated attempts never take anything away
    #[test]
    fn prop_progress_only_grows(attempts in attempts_strategy()) {
        let config = QuizConfig::default();
        let mut progress = GameProgress::default();
        for (level, correct) in attempts {
            let before = progress.clone();
            progress.record_attempt(level, correct, config.stars_for(correct));

            for l in 1..=20 {
                prop_assert!(progress.stars(l) >= before.stars(l));
            }
            prop_assert!(progress.completed_levels.is_superset(&before.completed_levels));
            prop_assert!(progress.earned_badges.is_superset(&before.earned_badges));
            prop_assert!(progress.current_level >= before.current_level);
            prop_assert!(progress.total_score >= before.total_score);
        }
    }

    /// Saved progress loads back unchanged from memory
    #[test]
    fn prop_memory_store_round_trip(attempts in attempts_strategy()) {
        let progress = progress_from(&attempts);
        let mut store = MemoryStore::new();
        store.save(&progress);
        prop_assert_eq!(store.load(), progress);
    }

    /// Saved progress loads back unchanged from disk
    #[test]
    fn prop_file_store_round_trip(attempts in attempts_strategy()) {
        let progress = progress_from(&attempts);
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::in_dir(dir.path(), STORAGE_KEY);
        store.try_save(&progress).unwrap();
        prop_assert_eq!(store.load(), progress);
    }
}

// ===== Engine properties =====

fn event_strategy() -> impl Strategy<Value = QuizEvent> {
    prop_oneof![
        Just(QuizEvent::OpenLevelMap),
        (0u32..=22).prop_map(QuizEvent::SelectLevel),
        (0u8..=9).prop_map(QuizEvent::EnterDigit),
        Just(QuizEvent::DeleteDigit),
        Just(QuizEvent::SubmitField),
        (0u32..200).prop_map(QuizEvent::SubmitAnswer),
        Just(QuizEvent::NextLevel),
        Just(QuizEvent::Retry),
        Just(QuizEvent::BackToMenu),
        Just(QuizEvent::Close),
    ]
}

proptest! {
    /// Arbitrary input keeps round counters and progress consistent
    #[test]
    fn prop_engine_invariants(
        events in prop::collection::vec(event_strategy(), 0..80),
        lenient in any::<bool>(),
    ) {
        let config = QuizConfig::default().with_wrong_answer_ends_level(!lenient);
        let mut engine = QuizEngine::new(config, GameProgress::default());
        for event in events {
            // Feed the live ticket so timers advance too
            let transition = engine.dispatch(event);
            prop_assert_eq!(transition.screen, engine.screen());
            if let Some(ticket) = engine.live_ticket() {
                let timed = if engine.screen() == Screen::Correct {
                    QuizEvent::Advance(ticket)
                } else {
                    QuizEvent::Tick(ticket)
                };
                engine.dispatch(timed);
            }

            if let Some(round) = engine.round() {
                prop_assert!(round.correct <= round.answered);
                prop_assert!(round.answered <= 5);
                prop_assert!(round.time_remaining <= round.time_limit);
                prop_assert!(round.answer.len() <= 4);
            }
            let progress = engine.progress();
            prop_assert!(progress.current_level >= 1);
            prop_assert!(progress.completed_levels.iter().all(|l| progress.is_unlocked(*l)));
            prop_assert!(progress.level_stars.values().all(|s| *s <= 3));
        }
    }
}
