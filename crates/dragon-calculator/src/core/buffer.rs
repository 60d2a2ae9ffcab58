//! Keypad tokens and the expression buffer they edit

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::Operation;

fn trailing_number() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\d+\.?\d*$").expect("trailing number pattern is valid"))
}

/// A single calculator key press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalcKey {
    /// Digit 0-9
    Digit(u8),
    /// Decimal point
    Decimal,
    /// Binary operator
    Operator(Operation),
    /// Percent marker
    Percent,
    /// Flip the sign of the trailing number (`+/-`)
    ToggleSign,
    /// Remove the last character (`DEL`)
    Delete,
    /// Clear input and result (`AC`)
    Clear,
    /// Evaluate (`=`)
    Submit,
}

impl CalcKey {
    /// Label printed on the keypad button
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Digit(d) => d.to_string(),
            Self::Decimal => ".".to_string(),
            Self::Operator(op) => op.symbol().to_string(),
            Self::Percent => "%".to_string(),
            Self::ToggleSign => "+/-".to_string(),
            Self::Delete => "DEL".to_string(),
            Self::Clear => "AC".to_string(),
            Self::Submit => "=".to_string(),
        }
    }

    /// Parses a keypad label back into a key
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "." => Some(Self::Decimal),
            "%" => Some(Self::Percent),
            "+/-" => Some(Self::ToggleSign),
            "DEL" => Some(Self::Delete),
            "AC" => Some(Self::Clear),
            "=" => Some(Self::Submit),
            _ => {
                let mut chars = label.chars();
                let ch = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                if let Some(d) = ch.to_digit(10) {
                    return u8::try_from(d).ok().map(Self::Digit);
                }
                Operation::from_char(ch).map(Self::Operator)
            }
        }
    }

    /// Maps a keyboard `key` value (as in `KeyboardEvent.key`) to a key
    #[must_use]
    pub fn from_keyboard(key: &str) -> Option<Self> {
        match key {
            "Enter" | "=" => Some(Self::Submit),
            "Backspace" => Some(Self::Delete),
            "Escape" | "c" | "C" => Some(Self::Clear),
            "n" | "N" => Some(Self::ToggleSign),
            "x" | "X" | "*" => Some(Self::Operator(Operation::Multiply)),
            "/" => Some(Self::Operator(Operation::Divide)),
            _ => Self::from_label(key).filter(|k| !matches!(k, Self::Clear | Self::Delete)),
        }
    }
}

impl fmt::Display for CalcKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// The in-progress expression string
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionBuffer {
    text: String,
}

impl ExpressionBuffer {
    /// Creates an empty buffer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw buffer contents
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Returns true if nothing has been entered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text for the input line: the buffer, or `0` when empty
    #[must_use]
    pub fn display(&self) -> &str {
        if self.text.is_empty() {
            "0"
        } else {
            &self.text
        }
    }

    /// Replaces the whole buffer (used when chaining a result)
    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Appends a digit; values above 9 are ignored
    pub fn push_digit(&mut self, digit: u8) {
        if let Some(ch) = char::from_digit(u32::from(digit), 10) {
            self.text.push(ch);
        }
    }

    /// Appends a decimal point
    pub fn push_decimal(&mut self) {
        self.text.push('.');
    }

    /// Appends the percent marker
    pub fn push_percent(&mut self) {
        self.text.push('%');
    }

    /// Appends an operator, replacing a trailing operator if present
    pub fn push_operator(&mut self, op: Operation) {
        if self.ends_with_operator() {
            self.text.pop();
        }
        self.text.push(op.symbol());
    }

    /// Returns true if the last character is a binary operator
    #[must_use]
    pub fn ends_with_operator(&self) -> bool {
        self.text
            .chars()
            .next_back()
            .and_then(Operation::from_char)
            .is_some()
    }

    /// Removes the last character
    pub fn delete_last(&mut self) {
        self.text.pop();
    }

    /// Empties the buffer
    pub fn clear(&mut self) {
        self.text.clear();
    }

    /// Flips the sign of the trailing number.
    ///
    /// A `-` directly before the number is its sign only when it starts the
    /// buffer or follows an operator or `(`; otherwise it is a binary minus
    /// and a new sign is inserted after it.
    pub fn toggle_sign(&mut self) {
        let Some(found) = trailing_number().find(&self.text) else {
            return;
        };
        let start = found.start();
        let head = &self.text[..start];
        let mut before = head.chars().rev();

        let is_sign = match (before.next(), before.next()) {
            (Some('-'), None) => true,
            (Some('-'), Some(prev)) => prev == '(' || Operation::from_char(prev).is_some(),
            _ => false,
        };

        if is_sign {
            self.text.remove(start - 1);
        } else {
            self.text.insert(start, '-');
        }
    }
}
