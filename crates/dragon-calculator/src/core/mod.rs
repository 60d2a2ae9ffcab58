//! Calculator core: expression buffer, parser and evaluator
//!
//! The buffer accepts keypad tokens and keeps the expression well formed
//! (operator replacement, sign toggle, percent marker). Evaluation runs the
//! sanitize → tokenize → parse → evaluate pipeline and never lets an error
//! escape past [`Calculator::press`].

pub mod buffer;
mod calculator;
pub mod evaluator;
mod operations;
pub mod parser;

pub use buffer::{CalcKey, ExpressionBuffer};
pub use calculator::Calculator;
pub use evaluator::{format_result, Evaluator, ERROR_MARKER};
pub use operations::Operation;

use thiserror::Error;

/// Result type for calculator operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Calculator error types - exhaustive enum ensures all cases handled
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalcError {
    /// Division by zero attempted
    #[error("Division by zero")]
    DivisionByZero,
    /// Result overflowed (infinity)
    #[error("Overflow: result exceeds maximum value")]
    Overflow,
    /// Invalid expression syntax
    #[error("Invalid expression: {0}")]
    ParseError(String),
    /// Nothing left to evaluate after sanitizing
    #[error("Empty expression")]
    EmptyExpression,
    /// Invalid result (NaN or other)
    #[error("Invalid result: {0}")]
    InvalidResult(String),
}
