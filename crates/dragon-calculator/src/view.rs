//! Serializable view models handed to a renderer
//!
//! Views are snapshots; the renderer reports only discrete actions back.

use rand::Rng;
use serde::Serialize;

use crate::config::QuizConfig;
use crate::core::Calculator;
use crate::quiz::{GameProgress, LevelResult, QuizEngine, Screen};

/// Columns of the serpentine level map
pub const MAP_COLUMNS: u32 = 4;

/// Vertical distance between map rows, in pixels
const MAP_ROW_HEIGHT_PX: u32 = 80;

/// Calculator displays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorView {
    /// Input line
    pub input: String,
    /// Result line
    pub result: String,
    /// True if the result line shows the error marker
    pub is_error: bool,
}

impl CalculatorView {
    /// Snapshot of a calculator
    #[must_use]
    pub fn build(calculator: &Calculator) -> Self {
        Self {
            input: calculator.input_display().to_string(),
            result: calculator.result().to_string(),
            is_error: calculator.has_error(),
        }
    }
}

/// Quiz overlay
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizView {
    /// Active screen
    pub screen: Screen,
    /// Level of the current or last round
    pub level: Option<u32>,
    /// Question prompt, e.g. `7 + 5 = ?`
    pub prompt: Option<String>,
    /// Number pad field
    pub answer: String,
    /// Countdown seconds left
    pub time_remaining: u32,
    /// Countdown length
    pub time_limit: u32,
    /// Countdown bar fill, 0-100
    pub timer_percent: u32,
    /// True in the final seconds
    pub urgent: bool,
    /// Questions answered this round
    pub answered: u32,
    /// Correct answers this round
    pub correct: u32,
    /// Questions per level
    pub quota: u32,
    /// Outcome of the last finished level
    pub result: Option<LevelResult>,
    /// Game-over explanation
    pub message: Option<String>,
    /// Running total of correct answers
    pub total_score: u32,
}

impl QuizView {
    /// Snapshot of an engine
    #[must_use]
    pub fn build<R: Rng>(engine: &QuizEngine<R>) -> Self {
        let config = engine.config();
        let round = engine.round();
        let (time_remaining, time_limit) =
            round.map_or((0, 0), |r| (r.time_remaining, r.time_limit));
        let timer_percent = if time_limit == 0 {
            0
        } else {
            time_remaining * 100 / time_limit
        };

        Self {
            screen: engine.screen(),
            level: round.map(|r| r.level),
            prompt: round.map(|r| r.question.prompt()),
            answer: round.map(|r| r.answer.clone()).unwrap_or_default(),
            time_remaining,
            time_limit,
            timer_percent,
            urgent: round.is_some() && time_remaining <= config.urgent_seconds,
            answered: round.map_or(0, |r| r.answered),
            correct: round.map_or(0, |r| r.correct),
            quota: config.questions_per_level,
            result: engine.last_result().copied(),
            message: match engine.screen() {
                Screen::GameOver { reason } => Some(reason.message()),
                _ => None,
            },
            total_score: engine.progress().total_score,
        }
    }
}

/// One node of the level map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelNode {
    /// Level number
    pub level: u32,
    /// Selectable
    pub unlocked: bool,
    /// Finished at least once
    pub completed: bool,
    /// The next level to play
    pub current: bool,
    /// Best star rating
    pub stars: u8,
    /// Grid row
    pub row: u32,
    /// Grid column after serpentine reversal
    pub col: u32,
}

impl LevelNode {
    /// Horizontal centre as a percentage of the map width
    #[must_use]
    pub fn left_percent(&self) -> f32 {
        #[allow(clippy::cast_precision_loss)]
        let col = self.col as f32;
        (col + 0.5) * (100.0 / MAP_COLUMNS as f32)
    }

    /// Vertical offset in pixels
    #[must_use]
    pub const fn top_px(&self) -> u32 {
        self.row * MAP_ROW_HEIGHT_PX + MAP_ROW_HEIGHT_PX / 2
    }
}

/// Serpentine grid cell of `level`: even rows run left to right, odd rows back
#[must_use]
pub const fn map_position(level: u32) -> (u32, u32) {
    let index = level.saturating_sub(1);
    let row = index / MAP_COLUMNS;
    let col = index % MAP_COLUMNS;
    if row % 2 == 1 {
        (row, MAP_COLUMNS - 1 - col)
    } else {
        (row, col)
    }
}

/// Level selection screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelMapView {
    /// Nodes in level order
    pub nodes: Vec<LevelNode>,
    /// Sum of best star ratings
    pub total_stars: u32,
}

impl LevelMapView {
    /// Builds the map from saved progress
    #[must_use]
    pub fn build(progress: &GameProgress, config: &QuizConfig) -> Self {
        let nodes = (1..=config.level_count)
            .map(|level| {
                let (row, col) = map_position(level);
                LevelNode {
                    level,
                    unlocked: progress.is_unlocked(level),
                    completed: progress.is_completed(level),
                    current: level == progress.current_level,
                    stars: progress.stars(level),
                    row,
                    col,
                }
            })
            .collect();
        Self {
            nodes,
            total_stars: progress.total_stars(),
        }
    }

    /// Node for `level`
    #[must_use]
    pub fn node(&self, level: u32) -> Option<&LevelNode> {
        self.nodes.iter().find(|n| n.level == level)
    }
}

/// Badge rarity shown in the gallery
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    /// First fifth of the badges
    Bronze,
    /// Second fifth
    Silver,
    /// Third fifth
    Gold,
    /// Fourth fifth
    Diamond,
    /// Last fifth
    Rainbow,
}

impl BadgeTier {
    const ALL: [Self; 5] = [
        Self::Bronze,
        Self::Silver,
        Self::Gold,
        Self::Diamond,
        Self::Rainbow,
    ];

    /// Tier of badge `id` out of `total`
    #[must_use]
    pub fn for_badge(id: u32, total: u32) -> Self {
        let total = total.max(1);
        let index = (id.min(total - 1) * 5 / total) as usize;
        Self::ALL[index.min(4)]
    }
}

/// One gallery slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeSlot {
    /// Badge id (`level - 1`)
    pub id: u32,
    /// Earned by the player
    pub earned: bool,
    /// Rarity
    pub tier: BadgeTier,
}

/// Badge collection screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BadgeGalleryView {
    /// Slots in id order
    pub badges: Vec<BadgeSlot>,
    /// Badges earned
    pub earned_count: usize,
    /// Badges available
    pub total: u32,
    /// Footer line
    pub message: &'static str,
}

impl BadgeGalleryView {
    /// Builds the gallery from saved progress
    #[must_use]
    pub fn build(progress: &GameProgress, config: &QuizConfig) -> Self {
        let total = config.level_count;
        let badges: Vec<BadgeSlot> = (0..total)
            .map(|id| BadgeSlot {
                id,
                earned: progress.has_badge(id),
                tier: BadgeTier::for_badge(id, total),
            })
            .collect();
        let earned_count = badges.iter().filter(|b| b.earned).count();
        let message = if earned_count == 0 {
            "Complete levels to earn badges!"
        } else if earned_count == badges.len() {
            "Amazing! You collected them all!"
        } else {
            "Keep playing to collect more badges!"
        };
        Self {
            badges,
            earned_count,
            total,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CalcKey;
    use crate::quiz::{QuizEvent, STORAGE_KEY};

    #[test]
    fn test_calculator_view() {
        let mut calc = Calculator::new();
        assert_eq!(
            CalculatorView::build(&calc),
            CalculatorView {
                input: "0".into(),
                result: "0".into(),
                is_error: false
            }
        );
        calc.press_sequence("1÷0");
        calc.press(CalcKey::Submit);
        let view = CalculatorView::build(&calc);
        assert!(view.is_error);
        assert_eq!(view.result, "Error");
    }

    #[test]
    fn test_quiz_view_menu() {
        let engine = QuizEngine::new(QuizConfig::default(), GameProgress::default());
        let view = QuizView::build(&engine);
        assert_eq!(view.screen, Screen::Menu);
        assert!(view.prompt.is_none());
        assert_eq!(view.quota, 5);
        assert!(!view.urgent);
    }

    #[test]
    fn test_quiz_view_playing() {
        let mut engine = QuizEngine::new(QuizConfig::default(), GameProgress::default());
        engine.dispatch(QuizEvent::OpenLevelMap);
        engine.dispatch(QuizEvent::SelectLevel(1));
        engine.dispatch(QuizEvent::EnterDigit(7));
        let view = QuizView::build(&engine);
        assert_eq!(view.level, Some(1));
        assert!(view.prompt.unwrap().ends_with("= ?"));
        assert_eq!(view.answer, "7");
        assert_eq!(view.timer_percent, 100);
        let json = serde_json::to_value(QuizView::build(&engine)).unwrap();
        assert_eq!(json["screen"]["screen"], "playing");
        assert_eq!(json["timeRemaining"], 60);
    }

    #[test]
    fn test_serpentine_positions() {
        assert_eq!(map_position(1), (0, 0));
        assert_eq!(map_position(4), (0, 3));
        assert_eq!(map_position(5), (1, 3));
        assert_eq!(map_position(8), (1, 0));
        assert_eq!(map_position(9), (2, 0));
        assert_eq!(map_position(20), (4, 0));
    }

    #[test]
    fn test_level_map_view() {
        let mut progress = GameProgress::default();
        progress.record_attempt(1, 4, 2);
        let view = LevelMapView::build(&progress, &QuizConfig::default());
        assert_eq!(view.nodes.len(), 20);
        let first = view.node(1).unwrap();
        assert!(first.completed && first.unlocked);
        assert_eq!(first.stars, 2);
        let second = view.node(2).unwrap();
        assert!(second.unlocked && second.current && !second.completed);
        assert!(!view.node(3).unwrap().unlocked);
        assert_eq!(view.total_stars, 2);
        assert_eq!(first.left_percent(), 12.5);
        assert_eq!(first.top_px(), 40);
    }

    #[test]
    fn test_badge_tiers() {
        assert_eq!(BadgeTier::for_badge(0, 20), BadgeTier::Bronze);
        assert_eq!(BadgeTier::for_badge(3, 20), BadgeTier::Bronze);
        assert_eq!(BadgeTier::for_badge(4, 20), BadgeTier::Silver);
        assert_eq!(BadgeTier::for_badge(19, 20), BadgeTier::Rainbow);
        assert_eq!(BadgeTier::for_badge(0, 1), BadgeTier::Bronze);
    }

    #[test]
    fn test_badge_gallery_messages() {
        let config = QuizConfig::default();
        let mut progress = GameProgress::default();
        assert_eq!(
            BadgeGalleryView::build(&progress, &config).message,
            "Complete levels to earn badges!"
        );
        progress.record_attempt(1, 5, 3);
        let view = BadgeGalleryView::build(&progress, &config);
        assert_eq!(view.earned_count, 1);
        assert!(view.badges[0].earned);
        assert_eq!(view.message, "Keep playing to collect more badges!");
        for level in 2..=20 {
            progress.record_attempt(level, 5, 3);
        }
        let view = BadgeGalleryView::build(&progress, &config);
        assert_eq!(view.message, "Amazing! You collected them all!");
        assert_eq!(STORAGE_KEY, "dragonMathProgress");
    }
}
