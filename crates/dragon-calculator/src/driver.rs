//! Unified calculator driver
//!
//! Behaviour checks are written once against [`CalculatorDriver`] and run
//! against every front end: the bare [`Calculator`] through [`DirectDriver`]
//! and the mock-DOM widget through [`crate::wasm::WasmDriver`].

use crate::core::{CalcError, CalcKey, CalcResult, Calculator};

/// Key-level access to a calculator front end
///
/// # Example
///
/// ```rust
/// use dragon_calculator::driver::{verify_precedence, CalculatorDriver, DirectDriver};
///
/// let mut driver = DirectDriver::new();
/// assert_eq!(driver.evaluate("3+4×2"), Ok("11".to_string()));
/// verify_precedence(&mut driver);
/// ```
pub trait CalculatorDriver {
    /// Presses one key
    fn press_key(&mut self, key: CalcKey);

    /// Result line
    fn get_result(&self) -> String;

    /// Input line
    fn get_input(&self) -> String;

    /// Error behind an `Error` result, if any
    fn last_error(&self) -> Option<CalcError>;

    /// Presses the key for every keypad label character in `keys`.
    ///
    /// Characters with no key are skipped; use [`Self::press_key`] for
    /// multi-character labels such as `AC` or `+/-`.
    fn enter_keys(&mut self, keys: &str) {
        for ch in keys.chars() {
            let mut buf = [0u8; 4];
            if let Some(key) = CalcKey::from_label(ch.encode_utf8(&mut buf)) {
                self.press_key(key);
            }
        }
    }

    /// Presses AC
    fn clear(&mut self) {
        self.press_key(CalcKey::Clear);
    }

    /// Clears, types `keys`, presses `=` and reports the outcome
    ///
    /// # Errors
    ///
    /// Returns the evaluation error when the result line shows `Error`.
    fn evaluate(&mut self, keys: &str) -> CalcResult<String> {
        self.clear();
        self.enter_keys(keys);
        self.press_key(CalcKey::Submit);
        self.last_error().map_or_else(|| Ok(self.get_result()), Err)
    }
}

/// Drives a [`Calculator`] directly
#[derive(Debug, Clone, Default)]
pub struct DirectDriver {
    calculator: Calculator,
}

impl DirectDriver {
    /// Driver over a fresh calculator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped calculator
    #[must_use]
    pub const fn calculator(&self) -> &Calculator {
        &self.calculator
    }
}

impl CalculatorDriver for DirectDriver {
    fn press_key(&mut self, key: CalcKey) {
        self.calculator.press(key);
    }

    fn get_result(&self) -> String {
        self.calculator.result().to_string()
    }

    fn get_input(&self) -> String {
        self.calculator.input_display().to_string()
    }

    fn last_error(&self) -> Option<CalcError> {
        self.calculator.last_error().cloned()
    }
}

// ===== Unified checks =====
// Each check panics on the first mismatch.

/// The four operations
pub fn verify_basic_arithmetic<D: CalculatorDriver>(driver: &mut D) {
    assert_eq!(driver.evaluate("2+3"), Ok("5".to_string()));
    assert_eq!(driver.evaluate("10-4"), Ok("6".to_string()));
    assert_eq!(driver.evaluate("6×7"), Ok("42".to_string()));
    assert_eq!(driver.evaluate("20÷4"), Ok("5".to_string()));
}

/// × and ÷ bind tighter than + and -
pub fn verify_precedence<D: CalculatorDriver>(driver: &mut D) {
    assert_eq!(driver.evaluate("3+4×2"), Ok("11".to_string()));
    assert_eq!(driver.evaluate("2+3×4"), Ok("14".to_string()));
    assert_eq!(driver.evaluate("10-6÷2"), Ok("7".to_string()));
}

/// Ten-place rounding with trailing zeros trimmed
pub fn verify_decimal_formatting<D: CalculatorDriver>(driver: &mut D) {
    assert_eq!(driver.evaluate("0.1+0.2"), Ok("0.3".to_string()));
    assert_eq!(driver.evaluate("1÷3"), Ok("0.3333333333".to_string()));
    assert_eq!(driver.evaluate("7.5×2"), Ok("15".to_string()));
}

/// Percent divides the preceding number by 100
pub fn verify_percent<D: CalculatorDriver>(driver: &mut D) {
    assert_eq!(driver.evaluate("50%"), Ok("0.5".to_string()));
    assert_eq!(driver.evaluate("200×10%"), Ok("20".to_string()));
}

/// Operator replacement, delete and sign toggle
pub fn verify_editing<D: CalculatorDriver>(driver: &mut D) {
    driver.clear();
    driver.enter_keys("7+×");
    assert_eq!(driver.get_input(), "7×");

    driver.clear();
    driver.enter_keys("12+5");
    driver.press_key(CalcKey::ToggleSign);
    assert_eq!(driver.get_input(), "12+-5");
    driver.press_key(CalcKey::Submit);
    assert_eq!(driver.get_result(), "7");

    driver.clear();
    driver.enter_keys("123");
    driver.press_key(CalcKey::Delete);
    assert_eq!(driver.get_input(), "12");
    driver.press_key(CalcKey::Delete);
    driver.press_key(CalcKey::Delete);
    assert_eq!(driver.get_input(), "0");
}

/// Submitting again continues from the previous result
pub fn verify_chaining<D: CalculatorDriver>(driver: &mut D) {
    assert_eq!(driver.evaluate("2+3"), Ok("5".to_string()));
    assert_eq!(driver.get_input(), "5");
    driver.enter_keys("×4=");
    assert_eq!(driver.get_result(), "20");
}

/// Failures show `Error` and keep the input for correction
pub fn verify_error_handling<D: CalculatorDriver>(driver: &mut D) {
    assert_eq!(driver.evaluate("1÷0"), Err(CalcError::DivisionByZero));
    assert_eq!(driver.get_result(), "Error");
    assert_eq!(driver.get_input(), "1÷0");

    driver.press_key(CalcKey::Delete);
    driver.enter_keys("2=");
    assert_eq!(driver.get_result(), "0.5");

    assert_eq!(driver.evaluate(""), Err(CalcError::EmptyExpression));
    driver.clear();
    assert_eq!(driver.get_result(), "0");
    assert!(driver.last_error().is_none());
}

/// Runs every check above
pub fn run_all_checks<D: CalculatorDriver>(driver: &mut D) {
    verify_basic_arithmetic(driver);
    verify_precedence(driver);
    verify_decimal_formatting(driver);
    verify_percent(driver);
    verify_editing(driver);
    verify_chaining(driver);
    verify_error_handling(driver);
}
