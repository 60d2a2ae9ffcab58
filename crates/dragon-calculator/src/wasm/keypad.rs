//! On-screen keypads: the calculator grid and the quiz answer pad
//!
//! Both are grids of [`ButtonDef`]s that render into the mock DOM and map
//! click targets and keyboard keys back to actions.

use std::fmt;

use super::dom::{DomElement, MockDom};
use crate::core::{CalcKey, Operation};
use crate::quiz::QuizEvent;

/// Visual class of a button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonKind {
    /// Digits and the decimal point
    Number,
    /// Operators and submit
    Operator,
    /// AC, DEL, percent, sign toggle
    Function,
}

impl ButtonKind {
    /// CSS class for the button
    #[must_use]
    pub const fn class(&self) -> &'static str {
        match self {
            Self::Number => "btn-number",
            Self::Operator => "btn-operator",
            Self::Function => "btn-function",
        }
    }
}

/// An action a keypad button can carry
pub trait PadKey: Copy + Eq + fmt::Debug {
    /// DOM element id of the button
    fn element_id(&self) -> String;
    /// Text printed on the button
    fn label(&self) -> String;
    /// Visual class
    fn kind(&self) -> ButtonKind;
}

impl PadKey for CalcKey {
    fn element_id(&self) -> String {
        match self {
            Self::Digit(d) => format!("btn-{d}"),
            Self::Decimal => "btn-decimal".to_string(),
            Self::Operator(op) => format!("btn-{}", op_name(*op)),
            Self::Percent => "btn-percent".to_string(),
            Self::ToggleSign => "btn-sign".to_string(),
            Self::Delete => "btn-delete".to_string(),
            Self::Clear => "btn-clear".to_string(),
            Self::Submit => "btn-equals".to_string(),
        }
    }

    fn label(&self) -> String {
        CalcKey::label(self)
    }

    fn kind(&self) -> ButtonKind {
        match self {
            Self::Digit(_) | Self::Decimal => ButtonKind::Number,
            Self::Operator(_) | Self::Submit => ButtonKind::Operator,
            Self::Percent | Self::ToggleSign | Self::Delete | Self::Clear => ButtonKind::Function,
        }
    }
}

const fn op_name(op: Operation) -> &'static str {
    match op {
        Operation::Add => "plus",
        Operation::Subtract => "minus",
        Operation::Multiply => "times",
        Operation::Divide => "divide",
    }
}

/// Quiz number pad buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerKey {
    /// Digit 0-9
    Digit(u8),
    /// Remove the last digit
    Delete,
    /// Submit the answer
    Submit,
}

impl AnswerKey {
    /// Engine event for this key
    #[must_use]
    pub const fn to_event(self) -> QuizEvent {
        match self {
            Self::Digit(d) => QuizEvent::EnterDigit(d),
            Self::Delete => QuizEvent::DeleteDigit,
            Self::Submit => QuizEvent::SubmitField,
        }
    }

    /// Maps a keyboard key to a pad key
    #[must_use]
    pub fn from_keyboard(key: &str) -> Option<Self> {
        match key {
            "Enter" => Some(Self::Submit),
            "Backspace" => Some(Self::Delete),
            _ => {
                let mut chars = key.chars();
                let digit = chars.next()?.to_digit(10)?;
                if chars.next().is_some() {
                    return None;
                }
                u8::try_from(digit).ok().map(Self::Digit)
            }
        }
    }
}

impl PadKey for AnswerKey {
    fn element_id(&self) -> String {
        match self {
            Self::Digit(d) => format!("pad-{d}"),
            Self::Delete => "pad-delete".to_string(),
            Self::Submit => "pad-submit".to_string(),
        }
    }

    fn label(&self) -> String {
        match self {
            Self::Digit(d) => d.to_string(),
            Self::Delete => "DEL".to_string(),
            Self::Submit => "✓".to_string(),
        }
    }

    fn kind(&self) -> ButtonKind {
        match self {
            Self::Digit(_) => ButtonKind::Number,
            Self::Delete => ButtonKind::Function,
            Self::Submit => ButtonKind::Operator,
        }
    }
}

/// A single keypad button
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonDef<K> {
    /// Action of the button
    pub key: K,
    /// DOM element id
    pub id: String,
    /// Grid row (0-indexed)
    pub row: usize,
    /// Grid column (0-indexed)
    pub col: usize,
}

impl<K: PadKey> ButtonDef<K> {
    /// Creates a button at a grid cell
    #[must_use]
    pub fn new(key: K, row: usize, col: usize) -> Self {
        Self {
            id: key.element_id(),
            key,
            row,
            col,
        }
    }

    /// DOM element for the button
    #[must_use]
    pub fn to_element(&self) -> DomElement {
        DomElement::new("button")
            .with_id(&self.id)
            .with_text(&self.key.label())
            .with_class("keypad-btn")
            .with_class(self.key.kind().class())
            .with_attr("data-row", &self.row.to_string())
            .with_attr("data-col", &self.col.to_string())
    }
}

/// Grid of buttons
#[derive(Debug, Clone)]
pub struct Keypad<K> {
    container_id: &'static str,
    buttons: Vec<ButtonDef<K>>,
    rows: usize,
    cols: usize,
}

impl Keypad<CalcKey> {
    /// Calculator layout:
    /// ```text
    /// [ AC ] [DEL] [ % ] [ ÷ ]
    /// [ 7  ] [ 8 ] [ 9 ] [ × ]
    /// [ 4  ] [ 5 ] [ 6 ] [ - ]
    /// [ 1  ] [ 2 ] [ 3 ] [ + ]
    /// [+/- ] [ 0 ] [ . ] [ = ]
    /// ```
    #[must_use]
    pub fn calculator() -> Self {
        use CalcKey::{Clear, Decimal, Delete, Digit, Percent, Submit, ToggleSign};
        let op = CalcKey::Operator;
        let layout = [
            [Clear, Delete, Percent, op(Operation::Divide)],
            [Digit(7), Digit(8), Digit(9), op(Operation::Multiply)],
            [Digit(4), Digit(5), Digit(6), op(Operation::Subtract)],
            [Digit(1), Digit(2), Digit(3), op(Operation::Add)],
            [ToggleSign, Digit(0), Decimal, Submit],
        ];
        Self::from_layout("calc-keypad", &layout)
    }
}

impl Keypad<AnswerKey> {
    /// Answer pad layout:
    /// ```text
    /// [ 1 ] [ 2 ] [ 3 ]
    /// [ 4 ] [ 5 ] [ 6 ]
    /// [ 7 ] [ 8 ] [ 9 ]
    /// [DEL] [ 0 ] [ ✓ ]
    /// ```
    #[must_use]
    pub fn answer_pad() -> Self {
        use AnswerKey::{Delete, Digit, Submit};
        let layout = [
            [Digit(1), Digit(2), Digit(3)],
            [Digit(4), Digit(5), Digit(6)],
            [Digit(7), Digit(8), Digit(9)],
            [Delete, Digit(0), Submit],
        ];
        Self::from_layout("answer-pad", &layout)
    }
}

impl<K: PadKey> Keypad<K> {
    fn from_layout<const C: usize>(container_id: &'static str, layout: &[[K; C]]) -> Self {
        let buttons = layout
            .iter()
            .enumerate()
            .flat_map(|(row, keys)| {
                keys.iter()
                    .enumerate()
                    .map(move |(col, key)| ButtonDef::new(*key, row, col))
            })
            .collect();
        Self {
            container_id,
            buttons,
            rows: layout.len(),
            cols: C,
        }
    }

    /// Number of buttons
    #[must_use]
    pub fn button_count(&self) -> usize {
        self.buttons.len()
    }

    /// Grid dimensions (rows, cols)
    #[must_use]
    pub const fn dimensions(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// All buttons in row-major order
    #[must_use]
    pub fn buttons(&self) -> &[ButtonDef<K>] {
        &self.buttons
    }

    /// Button at a grid cell
    #[must_use]
    pub fn get_button_at(&self, row: usize, col: usize) -> Option<&ButtonDef<K>> {
        if row < self.rows && col < self.cols {
            self.buttons.get(row * self.cols + col)
        } else {
            None
        }
    }

    /// Button with a DOM id
    #[must_use]
    pub fn find_button_by_id(&self, id: &str) -> Option<&ButtonDef<K>> {
        self.buttons.iter().find(|b| b.id == id)
    }

    /// Action of a clicked element, if it belongs to this keypad
    #[must_use]
    pub fn handle_click(&self, element_id: &str) -> Option<K> {
        self.find_button_by_id(element_id).map(|b| b.key)
    }

    /// Container element holding every button
    #[must_use]
    pub fn to_element(&self) -> DomElement {
        self.buttons.iter().fold(
            DomElement::new("div")
                .with_id(self.container_id)
                .with_class("keypad"),
            |pad, btn| pad.with_child(btn.to_element()),
        )
    }

    /// Registers the container and its buttons in `dom`
    pub fn mount(&self, dom: &mut MockDom) {
        dom.register_element(self.to_element());
        for btn in &self.buttons {
            dom.register_element(btn.to_element());
        }
    }
}
