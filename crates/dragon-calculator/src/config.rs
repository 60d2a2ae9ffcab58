//! Quiz and application configuration
//!
//! Every field has a default matching the shipped game, so an empty YAML
//! document is a valid configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML could not be parsed
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml_ng::Error),

    /// A field holds an unusable value
    #[error("Invalid configuration field `{field}`: {message}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// What is wrong with it
        message: String,
    },
}

impl ConfigError {
    /// Create an invalid-field error
    #[must_use]
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }
}

/// Countdown length for a band of levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeBand {
    /// Highest level (inclusive) the band applies to
    pub up_to_level: u32,
    /// Seconds per question
    pub seconds: u32,
}

/// Rules of the arithmetic quiz
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Number of levels on the map
    pub level_count: u32,
    /// Questions that make up one level attempt
    pub questions_per_level: u32,
    /// Correct answers needed to pass a level
    pub pass_mark: u32,
    /// Correct answers needed for one, two and three stars
    pub star_thresholds: [u32; 3],
    /// Pause after a correct answer before the next question
    pub correct_delay_ms: u64,
    /// Countdown tick period
    pub tick_interval_ms: u64,
    /// Time bands, ascending by level
    pub time_bands: Vec<TimeBand>,
    /// Countdown for levels past the last band
    pub fallback_seconds: u32,
    /// Operand ceiling at level 0 for addition and subtraction
    pub operand_base: u32,
    /// Ceiling growth per level
    pub operand_step: u32,
    /// Absolute operand ceiling for addition and subtraction
    pub operand_cap: u32,
    /// First level that deals multiplication
    pub multiplication_from_level: u32,
    /// Multiplication factor ceiling is `level + multiplication_offset`
    pub multiplication_offset: u32,
    /// Absolute multiplication factor ceiling
    pub multiplication_cap: u32,
    /// Seconds left at which ticks turn urgent
    pub urgent_seconds: u32,
    /// Regular tick cue every this many seconds
    pub tick_cue_every: u32,
    /// Longest answer the number pad accepts
    pub max_answer_digits: usize,
    /// A wrong answer ends the attempt; when false the quiz moves on
    pub wrong_answer_ends_level: bool,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            level_count: 20,
            questions_per_level: 5,
            pass_mark: 3,
            star_thresholds: [1, 3, 5],
            correct_delay_ms: 800,
            tick_interval_ms: 1000,
            time_bands: vec![
                TimeBand {
                    up_to_level: 3,
                    seconds: 60,
                },
                TimeBand {
                    up_to_level: 6,
                    seconds: 45,
                },
            ],
            fallback_seconds: 30,
            operand_base: 10,
            operand_step: 2,
            operand_cap: 20,
            multiplication_from_level: 3,
            multiplication_offset: 3,
            multiplication_cap: 10,
            urgent_seconds: 10,
            tick_cue_every: 5,
            max_answer_digits: 4,
            wrong_answer_ends_level: true,
        }
    }
}

impl QuizConfig {
    /// Create the default quiz rules
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of questions per level
    #[must_use]
    pub const fn with_questions_per_level(mut self, count: u32) -> Self {
        self.questions_per_level = count;
        self
    }

    /// Set the pass mark
    #[must_use]
    pub const fn with_pass_mark(mut self, pass_mark: u32) -> Self {
        self.pass_mark = pass_mark;
        self
    }

    /// Set the star thresholds
    #[must_use]
    pub const fn with_star_thresholds(mut self, thresholds: [u32; 3]) -> Self {
        self.star_thresholds = thresholds;
        self
    }

    /// Set the delay after a correct answer
    #[must_use]
    pub const fn with_correct_delay_ms(mut self, delay: u64) -> Self {
        self.correct_delay_ms = delay;
        self
    }

    /// Choose whether a wrong answer ends the attempt
    #[must_use]
    pub const fn with_wrong_answer_ends_level(mut self, ends: bool) -> Self {
        self.wrong_answer_ends_level = ends;
        self
    }

    /// Set the level count
    #[must_use]
    pub const fn with_level_count(mut self, count: u32) -> Self {
        self.level_count = count;
        self
    }

    /// Set the time bands and the fallback countdown
    #[must_use]
    pub fn with_time_bands(mut self, bands: Vec<TimeBand>, fallback_seconds: u32) -> Self {
        self.time_bands = bands;
        self.fallback_seconds = fallback_seconds;
        self
    }

    /// Stars earned for a correct count
    #[must_use]
    pub fn stars_for(&self, correct: u32) -> u8 {
        let [one, two, three] = self.star_thresholds;
        if correct >= three {
            3
        } else if correct >= two {
            2
        } else if correct >= one {
            1
        } else {
            0
        }
    }

    /// Seconds per question at a level
    #[must_use]
    pub fn time_limit_for(&self, level: u32) -> u32 {
        self.time_bands
            .iter()
            .find(|band| level <= band.up_to_level)
            .map_or(self.fallback_seconds, |band| band.seconds)
    }

    /// Operand ceiling for addition and subtraction
    #[must_use]
    pub fn max_operand(&self, level: u32) -> u32 {
        self.operand_base
            .saturating_add(self.operand_step.saturating_mul(level))
            .min(self.operand_cap)
    }

    /// Factor ceiling for multiplication
    #[must_use]
    pub fn multiplication_max(&self, level: u32) -> u32 {
        level
            .saturating_add(self.multiplication_offset)
            .min(self.multiplication_cap)
    }

    /// Returns true if `level` deals multiplication questions
    #[must_use]
    pub const fn has_multiplication(&self, level: u32) -> bool {
        level >= self.multiplication_from_level
    }

    /// Checks the rules are playable
    pub fn validate(&self) -> ConfigResult<()> {
        if self.level_count == 0 {
            return Err(ConfigError::invalid("level_count", "must be at least 1"));
        }
        if self.questions_per_level == 0 {
            return Err(ConfigError::invalid(
                "questions_per_level",
                "must be at least 1",
            ));
        }
        if self.pass_mark > self.questions_per_level {
            return Err(ConfigError::invalid(
                "pass_mark",
                format!(
                    "{} exceeds questions_per_level ({})",
                    self.pass_mark, self.questions_per_level
                ),
            ));
        }
        if self.star_thresholds.windows(2).any(|w| w[0] > w[1]) {
            return Err(ConfigError::invalid(
                "star_thresholds",
                "must be non-decreasing",
            ));
        }
        if self
            .time_bands
            .windows(2)
            .any(|w| w[0].up_to_level >= w[1].up_to_level)
        {
            return Err(ConfigError::invalid(
                "time_bands",
                "levels must be strictly ascending",
            ));
        }
        if self.fallback_seconds == 0 || self.time_bands.iter().any(|b| b.seconds == 0) {
            return Err(ConfigError::invalid("time_bands", "countdown must be positive"));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::invalid("tick_interval_ms", "must be positive"));
        }
        if self.operand_cap == 0 || self.multiplication_cap == 0 {
            return Err(ConfigError::invalid("operand_cap", "caps must be positive"));
        }
        if self.max_answer_digits == 0 {
            return Err(ConfigError::invalid("max_answer_digits", "must be positive"));
        }
        Ok(())
    }
}

/// Application-level settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Quiz rules
    pub quiz: QuizConfig,
    /// Key of the single saved progress record
    pub storage_key: String,
    /// Play audio cues
    pub sound_enabled: bool,
    /// Gain multiplier applied to every cue (0.0 - 1.0)
    pub master_volume: f32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            quiz: QuizConfig::default(),
            storage_key: crate::quiz::STORAGE_KEY.to_string(),
            sound_enabled: true,
            master_volume: 1.0,
        }
    }
}

impl AppConfig {
    /// Create default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to YAML
    pub fn to_yaml_string(&self) -> ConfigResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Set quiz rules
    #[must_use]
    pub fn with_quiz(mut self, quiz: QuizConfig) -> Self {
        self.quiz = quiz;
        self
    }

    /// Set storage key
    #[must_use]
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// Enable or disable sound
    #[must_use]
    pub const fn with_sound(mut self, enabled: bool) -> Self {
        self.sound_enabled = enabled;
        self
    }

    /// Set master volume
    #[must_use]
    pub const fn with_master_volume(mut self, volume: f32) -> Self {
        self.master_volume = volume;
        self
    }

    /// Checks every section
    pub fn validate(&self) -> ConfigResult<()> {
        self.quiz.validate()?;
        if self.storage_key.trim().is_empty() {
            return Err(ConfigError::invalid("storage_key", "must not be empty"));
        }
        if !(0.0..=1.0).contains(&self.master_volume) {
            return Err(ConfigError::invalid(
                "master_volume",
                format!("{} is outside 0.0..=1.0", self.master_volume),
            ));
        }
        Ok(())
    }
}
