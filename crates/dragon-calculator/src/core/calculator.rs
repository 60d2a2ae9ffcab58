use crate::core::{CalcError, CalcKey, Evaluator, ExpressionBuffer, ERROR_MARKER};

/// Calculator widget state: input buffer plus result line
#[derive(Debug, Clone)]
pub struct Calculator {
    buffer: ExpressionBuffer,
    result: String,
    last_error: Option<CalcError>,
    evaluator: Evaluator,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    /// Creates a calculator with an empty buffer and a `0` result
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: ExpressionBuffer::new(),
            result: "0".to_string(),
            last_error: None,
            evaluator: Evaluator::new(),
        }
    }

    /// Applies one key press. Never fails; evaluation errors show as `Error`.
    pub fn press(&mut self, key: CalcKey) {
        match key {
            CalcKey::Digit(d) => self.buffer.push_digit(d),
            CalcKey::Decimal => self.buffer.push_decimal(),
            CalcKey::Operator(op) => self.buffer.push_operator(op),
            CalcKey::Percent => self.buffer.push_percent(),
            CalcKey::ToggleSign => self.buffer.toggle_sign(),
            CalcKey::Delete => self.buffer.delete_last(),
            CalcKey::Clear => {
                self.buffer.clear();
                self.result = "0".to_string();
                self.last_error = None;
            }
            CalcKey::Submit => self.submit(),
        }
    }

    /// Presses a key by its keypad label; returns false for unknown labels
    pub fn press_label(&mut self, label: &str) -> bool {
        CalcKey::from_label(label).map(|key| self.press(key)).is_some()
    }

    /// Presses every key of a label sequence such as `"3+4×2="`
    pub fn press_sequence(&mut self, keys: &str) {
        for ch in keys.chars() {
            let mut buf = [0u8; 4];
            self.press_label(ch.encode_utf8(&mut buf));
        }
    }

    fn submit(&mut self) {
        match self.evaluator.evaluate_expression(self.buffer.as_str()) {
            Ok(formatted) => {
                tracing::debug!(expression = self.buffer.as_str(), result = %formatted, "evaluated");
                self.buffer.set(formatted.clone());
                self.result = formatted;
                self.last_error = None;
            }
            Err(err) => {
                tracing::debug!(expression = self.buffer.as_str(), error = %err, "evaluation failed");
                self.result = ERROR_MARKER.to_string();
                self.last_error = Some(err);
            }
        }
    }

    /// Raw expression buffer
    #[must_use]
    pub fn expression(&self) -> &str {
        self.buffer.as_str()
    }

    /// Input line text (`0` when the buffer is empty)
    #[must_use]
    pub fn input_display(&self) -> &str {
        self.buffer.display()
    }

    /// Result line text
    #[must_use]
    pub fn result(&self) -> &str {
        &self.result
    }

    /// Error behind the last `Error` marker, if any
    #[must_use]
    pub fn last_error(&self) -> Option<&CalcError> {
        self.last_error.as_ref()
    }

    /// Returns true if the result line shows the error marker
    #[must_use]
    pub fn has_error(&self) -> bool {
        self.last_error.is_some()
    }
}
