//! Question generation
//!
//! The random source is injected so a seeded generator replays the same
//! questions, which the engine tests rely on.

use std::fmt;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::config::QuizConfig;

/// Seed used when no other seed is supplied
pub const DEFAULT_QUESTION_SEED: u64 = 0x0D5A_60CA_1C00;

/// Operators dealt by the quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QuizOperator {
    /// Addition
    Add,
    /// Subtraction (never negative)
    Subtract,
    /// Multiplication
    Multiply,
}

impl QuizOperator {
    /// Display symbol
    #[must_use]
    pub const fn symbol(&self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '×',
        }
    }

    /// Operators dealt at `level`
    #[must_use]
    pub const fn available(level: u32, config: &QuizConfig) -> &'static [Self] {
        if config.has_multiplication(level) {
            &[Self::Add, Self::Subtract, Self::Multiply]
        } else {
            &[Self::Add, Self::Subtract]
        }
    }
}

/// One quiz question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    /// Left operand
    pub operand1: u32,
    /// Right operand
    pub operand2: u32,
    /// Operator
    pub operator: QuizOperator,
    /// Expected answer
    pub answer: u32,
}

impl Question {
    /// Builds a question and computes its answer.
    ///
    /// Returns `None` when subtraction would go negative.
    #[must_use]
    pub fn new(operand1: u32, operand2: u32, operator: QuizOperator) -> Option<Self> {
        let answer = match operator {
            QuizOperator::Add => operand1.checked_add(operand2)?,
            QuizOperator::Subtract => operand1.checked_sub(operand2)?,
            QuizOperator::Multiply => operand1.checked_mul(operand2)?,
        };
        Some(Self {
            operand1,
            operand2,
            operator,
            answer,
        })
    }

    /// Returns true if `value` is the expected answer
    #[must_use]
    pub const fn is_correct(&self, value: u32) -> bool {
        self.answer == value
    }

    /// Prompt text, e.g. `7 + 5 = ?`
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("{self} = ?")
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.operand1,
            self.operator.symbol(),
            self.operand2
        )
    }
}

/// Deals level-scaled questions from an injected random source
#[derive(Debug, Clone)]
pub struct QuestionGenerator<R = ChaCha8Rng> {
    rng: R,
}

impl Default for QuestionGenerator<ChaCha8Rng> {
    fn default() -> Self {
        Self::seeded(DEFAULT_QUESTION_SEED)
    }
}

impl QuestionGenerator<ChaCha8Rng> {
    /// Generator backed by a ChaCha8 stream with the given seed
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl<R: Rng> QuestionGenerator<R> {
    /// Generator over any random source
    pub const fn with_rng(rng: R) -> Self {
        Self { rng }
    }

    /// Deals one question for `level`
    pub fn generate(&mut self, level: u32, config: &QuizConfig) -> Question {
        let operators = QuizOperator::available(level, config);
        let operator = operators[self.rng.gen_range(0..operators.len())];
        let max = config.max_operand(level).max(1);

        let (a, b) = match operator {
            QuizOperator::Add => {
                let a = self.rng.gen_range(1..=max);
                let b = self.rng.gen_range(1..=(max - a).max(1));
                (a, b)
            }
            QuizOperator::Subtract => {
                let a = self.rng.gen_range(1..=max);
                let b = self.rng.gen_range(1..=a);
                (a, b)
            }
            QuizOperator::Multiply => {
                let cap = config.multiplication_max(level).max(1);
                (self.rng.gen_range(1..=cap), self.rng.gen_range(1..=cap))
            }
        };

        let answer = match operator {
            QuizOperator::Add => a + b,
            QuizOperator::Subtract => a - b,
            QuizOperator::Multiply => a * b,
        };
        Question {
            operand1: a,
            operand2: b,
            operator,
            answer,
        }
    }
}
