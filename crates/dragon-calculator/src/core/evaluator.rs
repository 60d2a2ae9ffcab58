//! Expression evaluation pipeline
//!
//! glyph mapping → percent rewrite → sanitize → parse → evaluate → format

use std::sync::OnceLock;

use regex::Regex;

use crate::core::operations::check_finite;
use crate::core::parser::{AstNode, Parser};
use crate::core::CalcResult;

/// Marker shown in the result display when evaluation fails
pub const ERROR_MARKER: &str = "Error";

/// Decimal places kept before trailing zeros are trimmed
const RESULT_PRECISION: usize = 10;

fn percent_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+\.?\d*)%").expect("percent pattern is valid"))
}

/// Evaluator for calculator expressions
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Evaluator {
    /// Creates a new evaluator
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Evaluates an AST node and returns the result
    pub fn evaluate(&self, node: &AstNode) -> CalcResult<f64> {
        match node {
            AstNode::Number(n) => Ok(*n),
            AstNode::Negate(inner) => Ok(-self.evaluate(inner)?),
            AstNode::BinaryOp { left, op, right } => {
                let left_val = self.evaluate(left)?;
                let right_val = self.evaluate(right)?;
                op.apply(left_val, right_val)
            }
        }
    }

    /// Parses and evaluates an already sanitized expression
    pub fn evaluate_str(&self, input: &str) -> CalcResult<f64> {
        let ast = Parser::parse_str(input)?;
        self.evaluate(&ast).and_then(check_finite)
    }

    /// Runs the full pipeline on a raw buffer and returns the display string
    pub fn evaluate_expression(&self, buffer: &str) -> CalcResult<String> {
        let sanitized = Self::sanitize(&Self::rewrite_percent(&Self::map_glyphs(buffer)));
        tracing::trace!(buffer, %sanitized, "evaluating expression");
        self.evaluate_str(&sanitized).map(format_result)
    }

    /// Replaces the keypad glyphs `×` and `÷` with their ASCII operators
    #[must_use]
    pub fn map_glyphs(expression: &str) -> String {
        expression.replace('×', "*").replace('÷', "/")
    }

    /// Rewrites every `<number>%` as `(<number>/100)`
    #[must_use]
    pub fn rewrite_percent(expression: &str) -> String {
        percent_pattern()
            .replace_all(expression, "(${1}/100)")
            .into_owned()
    }

    /// Drops every character outside digits, `+-*/`, parentheses and `.`
    #[must_use]
    pub fn sanitize(expression: &str) -> String {
        expression
            .chars()
            .filter(|c| c.is_ascii_digit() || "+-*/().".contains(*c))
            .collect()
    }
}

/// Rounds to ten decimal places and drops trailing zeros
#[must_use]
pub fn format_result(value: f64) -> String {
    let fixed = format!("{value:.RESULT_PRECISION$}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CalcError, Operation};

    // ===== AST evaluation tests =====

    #[test]
    fn test_evaluate_number() {
        let eval = Evaluator::new();
        assert_eq!(eval.evaluate(&AstNode::number(42.0)), Ok(42.0));
    }

    #[test]
    fn test_evaluate_double_negative() {
        let eval = Evaluator::new();
        let ast = AstNode::negate(AstNode::negate(AstNode::number(5.0)));
        assert_eq!(eval.evaluate(&ast), Ok(5.0));
    }

    #[test]
    fn test_evaluate_error_propagates_from_left() {
        let eval = Evaluator::new();
        let ast = AstNode::binary(
            AstNode::binary(
                AstNode::number(10.0),
                Operation::Divide,
                AstNode::number(0.0),
            ),
            Operation::Add,
            AstNode::number(5.0),
        );
        assert_eq!(eval.evaluate(&ast), Err(CalcError::DivisionByZero));
    }

    // ===== Pipeline tests =====

    #[test]
    fn test_precedence_with_keypad_multiply() {
        let eval = Evaluator::new();
        assert_eq!(eval.evaluate_expression("3+4×2").unwrap(), "11");
    }

    #[test]
    fn test_division_glyph() {
        let eval = Evaluator::new();
        assert_eq!(eval.evaluate_expression("9÷4").unwrap(), "2.25");
    }

    #[test]
    fn test_division_by_zero() {
        let eval = Evaluator::new();
        assert_eq!(
            eval.evaluate_expression("5/0"),
            Err(CalcError::DivisionByZero)
        );
        assert_eq!(
            eval.evaluate_expression("5÷0"),
            Err(CalcError::DivisionByZero)
        );
    }

    #[test]
    fn test_percent_rewrite() {
        assert_eq!(Evaluator::rewrite_percent("50%"), "(50/100)");
        assert_eq!(Evaluator::rewrite_percent("200×12.5%"), "200×(12.5/100)");
        assert_eq!(Evaluator::rewrite_percent("7+"), "7+");
    }

    #[test]
    fn test_percent_evaluation() {
        let eval = Evaluator::new();
        assert_eq!(eval.evaluate_expression("50%").unwrap(), "0.5");
        assert_eq!(eval.evaluate_expression("200×15%").unwrap(), "30");
    }

    #[test]
    fn test_sanitize_strips_foreign_characters() {
        assert_eq!(Evaluator::sanitize("1 + a2 $"), "1+2");
        assert_eq!(Evaluator::sanitize("%"), "");
    }

    #[test]
    fn test_empty_after_sanitize_is_error() {
        let eval = Evaluator::new();
        assert_eq!(eval.evaluate_expression(""), Err(CalcError::EmptyExpression));
        assert_eq!(
            eval.evaluate_expression("%"),
            Err(CalcError::EmptyExpression)
        );
    }

    #[test]
    fn test_malformed_is_error() {
        let eval = Evaluator::new();
        assert!(eval.evaluate_expression("7+").is_err());
        assert!(eval.evaluate_expression("5%3").is_err());
    }

    #[test]
    fn test_floating_point_noise_is_rounded() {
        let eval = Evaluator::new();
        assert_eq!(eval.evaluate_expression("0.1+0.2").unwrap(), "0.3");
        assert_eq!(eval.evaluate_expression("1÷3").unwrap(), "0.3333333333");
    }

    // ===== Formatting tests =====

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(42.0), "42");
        assert_eq!(format_result(1.5), "1.5");
        assert_eq!(format_result(-2.75), "-2.75");
        assert_eq!(format_result(0.0), "0");
        assert_eq!(format_result(-0.0), "0");
        assert_eq!(format_result(-0.000_000_000_01), "0");
    }
}
