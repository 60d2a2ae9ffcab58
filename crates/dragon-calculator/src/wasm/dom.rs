//! Mock DOM for the calculator widget and quiz overlay
//!
//! Renders the view models of [`crate::view`] into a flat element registry
//! so drivers and tests can inspect what a browser would show.

use std::collections::HashMap;

use super::keypad::Keypad;
use crate::view::{BadgeGalleryView, CalculatorView, LevelMapView, QuizView};

/// Element id of the calculator input line
pub const CALC_INPUT_ID: &str = "calc-input";
/// Element id of the calculator result line
pub const CALC_RESULT_ID: &str = "calc-result";
/// Element id of the button that opens the quiz
pub const OPEN_GAME_ID: &str = "btn-open-game";
/// Element id of the quiz overlay
pub const QUIZ_OVERLAY_ID: &str = "quiz-overlay";
/// Element id of the level map container
pub const LEVEL_MAP_ID: &str = "level-map";
/// Element id of the badge gallery container
pub const BADGE_GALLERY_ID: &str = "badge-gallery";

/// A DOM element
#[derive(Debug, Clone, PartialEq)]
pub struct DomElement {
    /// Element ID
    pub id: String,
    /// Tag name
    pub tag: String,
    /// Text content
    pub text_content: String,
    /// Attributes
    pub attributes: HashMap<String, String>,
    /// CSS classes
    pub classes: Vec<String>,
    /// Shown or hidden
    pub visible: bool,
    /// Child elements
    pub children: Vec<DomElement>,
}

impl Default for DomElement {
    fn default() -> Self {
        Self::new("div")
    }
}

impl DomElement {
    /// Element with the given tag
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            id: String::new(),
            tag: tag.to_string(),
            text_content: String::new(),
            attributes: HashMap::new(),
            classes: Vec::new(),
            visible: true,
            children: Vec::new(),
        }
    }

    /// Sets the id
    #[must_use]
    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    /// Sets the text content
    #[must_use]
    pub fn with_text(mut self, text: &str) -> Self {
        self.text_content = text.to_string();
        self
    }

    /// Adds a class
    #[must_use]
    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    /// Sets an attribute
    #[must_use]
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.attributes.insert(key.to_string(), value.to_string());
        self
    }

    /// Appends a child
    #[must_use]
    pub fn with_child(mut self, child: DomElement) -> Self {
        self.children.push(child);
        self
    }

    /// Starts hidden
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Adds a class once
    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    /// Removes a class
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Adds or removes a class
    pub fn toggle_class(&mut self, class: &str, on: bool) {
        if on {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    /// Returns true if the class is set
    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Attribute value
    #[must_use]
    pub fn get_attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// User input captured by the DOM
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomEvent {
    /// Click on an element
    Click {
        /// Clicked element
        element_id: String,
    },
    /// Key pressed while the widget has focus
    KeyPress {
        /// `KeyboardEvent.key`
        key: String,
    },
}

impl DomEvent {
    /// Click event
    #[must_use]
    pub fn click(element_id: &str) -> Self {
        Self::Click {
            element_id: element_id.to_string(),
        }
    }

    /// Key press event
    #[must_use]
    pub fn key_press(key: &str) -> Self {
        Self::KeyPress {
            key: key.to_string(),
        }
    }
}

/// Element registry with an event log
#[derive(Debug)]
pub struct MockDom {
    /// Root element
    pub root: DomElement,
    elements: HashMap<String, DomElement>,
    event_history: Vec<DomEvent>,
}

impl Default for MockDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDom {
    /// Empty document
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: DomElement::new("div").with_id("root"),
            elements: HashMap::new(),
            event_history: Vec::new(),
        }
    }

    /// Calculator widget: two display lines, the keypad and the game button
    #[must_use]
    pub fn calculator() -> Self {
        let mut dom = Self::new();
        let keypad = Keypad::calculator();

        let input = DomElement::new("div")
            .with_id(CALC_INPUT_ID)
            .with_class("input-display")
            .with_text("0");
        let result = DomElement::new("div")
            .with_id(CALC_RESULT_ID)
            .with_class("result-display")
            .with_text("0");
        let open_game = DomElement::new("button")
            .with_id(OPEN_GAME_ID)
            .with_class("btn-game")
            .with_text("Math Quest");

        dom.root = DomElement::new("div")
            .with_id("calculator")
            .with_class("calculator-app")
            .with_child(input.clone())
            .with_child(result.clone())
            .with_child(keypad.to_element())
            .with_child(open_game.clone());

        dom.register_element(input);
        dom.register_element(result);
        dom.register_element(open_game);
        keypad.mount(&mut dom);
        dom
    }

    /// Calculator widget plus the hidden quiz overlay
    #[must_use]
    pub fn with_quiz() -> Self {
        let mut dom = Self::calculator();
        let pad = Keypad::answer_pad();

        let fields = [
            DomElement::new("div").with_id("quiz-level"),
            DomElement::new("div")
                .with_id("quiz-question")
                .with_class("question"),
            DomElement::new("div")
                .with_id("quiz-answer")
                .with_class("answer-field"),
            DomElement::new("div")
                .with_id("quiz-timer")
                .with_class("timer-bar")
                .with_attr("data-percent", "100"),
            DomElement::new("div").with_id("quiz-progress"),
            DomElement::new("div").with_id("quiz-result"),
            DomElement::new("p").with_id("quiz-message"),
            DomElement::new("div").with_id("quiz-score"),
            DomElement::new("div").with_id(LEVEL_MAP_ID).with_class("level-map"),
            DomElement::new("div")
                .with_id(BADGE_GALLERY_ID)
                .with_class("badge-gallery"),
            DomElement::new("p").with_id("badge-message"),
            DomElement::new("button")
                .with_id("btn-start")
                .with_text("Start Adventure"),
            DomElement::new("button").with_id("btn-next").with_text("Next Level"),
            DomElement::new("button").with_id("btn-retry").with_text("Try Again"),
            DomElement::new("button").with_id("btn-menu").with_text("Menu"),
            DomElement::new("button").with_id("btn-close").with_text("×"),
        ];

        let overlay = fields.iter().fold(
            DomElement::new("div")
                .with_id(QUIZ_OVERLAY_ID)
                .with_class("quiz-overlay")
                .with_attr("data-screen", "menu")
                .hidden(),
            |overlay, field| overlay.with_child(field.clone()),
        );
        dom.root = dom
            .root
            .clone()
            .with_child(overlay.clone().with_child(pad.to_element()));

        dom.register_element(overlay);
        for field in fields {
            dom.register_element(field);
        }
        pad.mount(&mut dom);
        dom
    }

    /// Registers an element for id lookup
    pub fn register_element(&mut self, element: DomElement) {
        if !element.id.is_empty() {
            self.elements.insert(element.id.clone(), element);
        }
    }

    /// Element by id
    #[must_use]
    pub fn get_element(&self, id: &str) -> Option<&DomElement> {
        self.elements.get(id)
    }

    /// Mutable element by id
    pub fn get_element_mut(&mut self, id: &str) -> Option<&mut DomElement> {
        self.elements.get_mut(id)
    }

    /// Records an event
    pub fn dispatch_event(&mut self, event: DomEvent) {
        tracing::trace!(?event, "dom event");
        self.event_history.push(event);
    }

    /// Events recorded so far
    #[must_use]
    pub fn event_history(&self) -> &[DomEvent] {
        &self.event_history
    }

    /// Forgets recorded events
    pub fn clear_event_history(&mut self) {
        self.event_history.clear();
    }

    /// Sets the text of an element
    pub fn set_element_text(&mut self, id: &str, text: &str) {
        if let Some(elem) = self.elements.get_mut(id) {
            elem.text_content = text.to_string();
        }
    }

    /// Text of an element
    #[must_use]
    pub fn get_element_text(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|e| e.text_content.as_str())
    }

    /// Returns true if the element exists and is shown
    #[must_use]
    pub fn is_visible(&self, id: &str) -> bool {
        self.elements.get(id).is_some_and(|e| e.visible)
    }

    /// Shows or hides an element
    pub fn set_visible(&mut self, id: &str, visible: bool) {
        if let Some(elem) = self.elements.get_mut(id) {
            elem.visible = visible;
        }
    }

    /// Appends a child to a registered parent
    pub fn append_child(&mut self, parent_id: &str, child: DomElement) {
        if let Some(parent) = self.elements.get_mut(parent_id) {
            parent.children.push(child.clone());
        }
        self.register_element(child);
    }

    /// Removes the children of an element from the tree and the registry
    pub fn clear_children(&mut self, id: &str) {
        let Some(elem) = self.elements.get_mut(id) else {
            return;
        };
        let removed = std::mem::take(&mut elem.children);
        for child in removed.iter().filter(|c| !c.id.is_empty()) {
            self.elements.remove(&child.id);
        }
    }

    /// Writes a calculator snapshot into the display lines
    pub fn render_calculator(&mut self, view: &CalculatorView) {
        self.set_element_text(CALC_INPUT_ID, &view.input);
        self.set_element_text(CALC_RESULT_ID, &view.result);
        if let Some(result) = self.elements.get_mut(CALC_RESULT_ID) {
            result.toggle_class("error", view.is_error);
        }
    }

    /// Writes a quiz snapshot into the overlay
    pub fn render_quiz(&mut self, view: &QuizView) {
        if let Some(overlay) = self.elements.get_mut(QUIZ_OVERLAY_ID) {
            overlay
                .attributes
                .insert("data-screen".to_string(), view.screen.name().to_string());
        }

        let level = view.level.map(|l| format!("Level {l}")).unwrap_or_default();
        self.set_element_text("quiz-level", &level);
        self.set_element_text("quiz-question", view.prompt.as_deref().unwrap_or(""));
        let answer = if view.answer.is_empty() { "?" } else { &view.answer };
        self.set_element_text("quiz-answer", answer);
        self.set_element_text("quiz-progress", &format!("{}/{}", view.answered, view.quota));
        self.set_element_text("quiz-score", &view.total_score.to_string());

        let timer_text = format!("{}s", view.time_remaining);
        if let Some(timer) = self.elements.get_mut("quiz-timer") {
            timer.text_content = timer_text;
            timer
                .attributes
                .insert("data-percent".to_string(), view.timer_percent.to_string());
            timer.toggle_class("urgent", view.urgent);
        }

        let result = view.result.map_or_else(String::new, |r| {
            format!(
                "{} / {} correct, {}",
                r.correct,
                view.quota,
                "★".repeat(usize::from(r.stars))
            )
        });
        self.set_element_text("quiz-result", &result);
        self.set_element_text("quiz-message", view.message.as_deref().unwrap_or(""));
    }

    /// Rebuilds the level map nodes
    pub fn render_level_map(&mut self, view: &LevelMapView) {
        self.clear_children(LEVEL_MAP_ID);
        for node in &view.nodes {
            let label = if node.unlocked {
                node.level.to_string()
            } else {
                "🔒".to_string()
            };
            let mut button = DomElement::new("button")
                .with_id(&format!("level-{}", node.level))
                .with_class("level-node")
                .with_text(&label)
                .with_attr("data-stars", &node.stars.to_string())
                .with_attr(
                    "style",
                    &format!("left: {}%; top: {}px", node.left_percent(), node.top_px()),
                );
            button.toggle_class("locked", !node.unlocked);
            button.toggle_class("completed", node.completed);
            button.toggle_class("current", node.current);
            self.append_child(LEVEL_MAP_ID, button);
        }
        if let Some(map) = self.elements.get_mut(LEVEL_MAP_ID) {
            map.attributes
                .insert("data-total-stars".to_string(), view.total_stars.to_string());
        }
    }

    /// Rebuilds the badge gallery
    pub fn render_badges(&mut self, view: &BadgeGalleryView) {
        self.clear_children(BADGE_GALLERY_ID);
        for slot in &view.badges {
            let tier = format!("{:?}", slot.tier).to_lowercase();
            let mut badge = DomElement::new("div")
                .with_id(&format!("badge-{}", slot.id))
                .with_class("badge")
                .with_class(&format!("tier-{tier}"));
            badge.toggle_class("earned", slot.earned);
            badge.toggle_class("locked", !slot.earned);
            self.append_child(BADGE_GALLERY_ID, badge);
        }
        self.set_element_text(
            "badge-message",
            &format!("{} ({}/{})", view.message, view.earned_count, view.total),
        );
    }
}
