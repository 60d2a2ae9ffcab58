//! Long-term quiz progress

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Persisted progress record.
///
/// Sets only grow, stars only rise and `current_level` never decreases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameProgress {
    /// One past the highest completed level
    pub current_level: u32,
    /// Levels finished at least once
    pub completed_levels: BTreeSet<u32>,
    /// Best star rating per level (0-3)
    pub level_stars: BTreeMap<u32, u8>,
    /// Badge ids earned (`level - 1`)
    pub earned_badges: BTreeSet<u32>,
    /// Correct answers summed over every finished attempt
    pub total_score: u32,
}

impl Default for GameProgress {
    fn default() -> Self {
        Self {
            current_level: 1,
            completed_levels: BTreeSet::new(),
            level_stars: BTreeMap::new(),
            earned_badges: BTreeSet::new(),
            total_score: 0,
        }
    }
}

/// What a finished attempt changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptOutcome {
    /// Stars earned by this attempt
    pub stars: u8,
    /// Badge awarded for the first time, if any
    pub new_badge: Option<u32>,
    /// True if the level's best star rating went up
    pub stars_improved: bool,
}

/// Badge id awarded for completing `level`
#[must_use]
pub const fn badge_for_level(level: u32) -> u32 {
    level.saturating_sub(1)
}

/// Highest star rating a level can hold
pub const MAX_STARS: u8 = 3;

impl GameProgress {
    /// Fresh progress with only level 1 open
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repairs a decoded record so the invariants hold again.
    ///
    /// Stars are capped at [`MAX_STARS`] and `current_level` is raised to
    /// one past the highest completed level.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for stars in self.level_stars.values_mut() {
            *stars = (*stars).min(MAX_STARS);
        }
        let floor = self
            .completed_levels
            .last()
            .map_or(1, |level| level.saturating_add(1));
        self.current_level = self.current_level.max(floor).max(1);
        self
    }

    /// Level 1 is always open; any other level opens once its predecessor is completed
    #[must_use]
    pub fn is_unlocked(&self, level: u32) -> bool {
        match level {
            0 => false,
            1 => true,
            n => self.completed_levels.contains(&(n - 1)),
        }
    }

    /// Returns true if `level` was finished at least once
    #[must_use]
    pub fn is_completed(&self, level: u32) -> bool {
        self.completed_levels.contains(&level)
    }

    /// Best star rating for `level`
    #[must_use]
    pub fn stars(&self, level: u32) -> u8 {
        self.level_stars.get(&level).copied().unwrap_or(0)
    }

    /// Returns true if badge `id` has been earned
    #[must_use]
    pub fn has_badge(&self, id: u32) -> bool {
        self.earned_badges.contains(&id)
    }

    /// Sum of best star ratings
    #[must_use]
    pub fn total_stars(&self) -> u32 {
        self.level_stars.values().map(|&s| u32::from(s)).sum()
    }

    /// Folds one finished level attempt into the record
    pub fn record_attempt(&mut self, level: u32, correct: u32, stars: u8) -> AttemptOutcome {
        self.completed_levels.insert(level);

        let badge = badge_for_level(level);
        let new_badge = self.earned_badges.insert(badge).then_some(badge);

        let best = self.level_stars.entry(level).or_insert(0);
        let stars_improved = stars > *best;
        if stars_improved {
            *best = stars;
        }

        self.total_score = self.total_score.saturating_add(correct);
        self.current_level = self.current_level.max(level.saturating_add(1));

        AttemptOutcome {
            stars,
            new_badge,
            stars_improved,
        }
    }
}
