use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LevelError {
    #[error("unknown level key: {key}")]
    Unknown { key: String },
}

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum LevelConfigError {
    #[error("display name cannot be empty")]
    EmptyName,

    #[error("target question count must be > 0")]
    InvalidTargetCount,

    #[error("session duration must be > 0")]
    InvalidDuration,

    #[error("expected accuracy must be in [0, 100], got {provided}")]
    InvalidExpectedAccuracy { provided: f64 },

    #[error("expected time per question must be > 0")]
    InvalidExpectedTime,

    #[error("level multiplier must be finite and > 0, got {provided}")]
    InvalidMultiplier { provided: f64 },

    #[error("band ratios must sum to 100, got {sum}")]
    InvalidBandRatios { sum: u32 },
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Difficulty tier of a quiz attempt, ordered from easiest to hardest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Level {
    Basic,
    Intermediate,
    Advanced,
    Expert,
}

impl Level {
    pub const ALL: [Level; 4] = [
        Level::Basic,
        Level::Intermediate,
        Level::Advanced,
        Level::Expert,
    ];

    /// Upper-case key used by callers to address a level.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Level::Basic => "BASIC",
            Level::Intermediate => "INTERMEDIATE",
            Level::Advanced => "ADVANCED",
            Level::Expert => "EXPERT",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Level {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Level::ALL
            .into_iter()
            .find(|level| level.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| LevelError::Unknown {
                key: key.to_owned(),
            })
    }
}

//
// ─── DIFFICULTY BANDS ──────────────────────────────────────────────────────────
//

/// Coarse grouping of the 1-10 difficulty scale used for selection and reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyBand {
    /// Difficulty 1-3.
    Easy,
    /// Difficulty 4-7.
    Medium,
    /// Difficulty 8-10.
    Hard,
}

impl DifficultyBand {
    pub const ALL: [DifficultyBand; 3] = [
        DifficultyBand::Easy,
        DifficultyBand::Medium,
        DifficultyBand::Hard,
    ];

    #[must_use]
    pub fn of(difficulty: u8) -> Self {
        match difficulty {
            0..=3 => DifficultyBand::Easy,
            4..=7 => DifficultyBand::Medium,
            _ => DifficultyBand::Hard,
        }
    }
}

/// Share of a session drawn from each difficulty band, in whole percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandRatios {
    pub easy: u32,
    pub medium: u32,
    pub hard: u32,
}

impl BandRatios {
    #[must_use]
    pub const fn new(easy: u32, medium: u32, hard: u32) -> Self {
        Self { easy, medium, hard }
    }

    #[must_use]
    pub fn percent(&self, band: DifficultyBand) -> u32 {
        match band {
            DifficultyBand::Easy => self.easy,
            DifficultyBand::Medium => self.medium,
            DifficultyBand::Hard => self.hard,
        }
    }

    /// Number of questions to request from `band` out of `target`, rounded up.
    ///
    /// Integer arithmetic keeps `ceil(target * ratio)` exact.
    #[must_use]
    pub fn quota(&self, band: DifficultyBand, target: u32) -> usize {
        let scaled = u64::from(target) * u64::from(self.percent(band));
        usize::try_from(scaled.div_ceil(100)).unwrap_or(usize::MAX)
    }

    fn sum(&self) -> u32 {
        self.easy.saturating_add(self.medium).saturating_add(self.hard)
    }
}

//
// ─── LEVEL CONFIG ──────────────────────────────────────────────────────────────
//

/// Static per-level constants: session shape, pass threshold and scoring weights.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelConfig {
    level: Level,
    name: String,
    price_cents: u32,
    duration_secs: u32,
    target_count: u32,
    expected_accuracy: f64,
    expected_secs_per_question: u32,
    level_multiplier: f64,
    band_ratios: BandRatios,
}

impl LevelConfig {
    /// Built-in constants for `level`.
    #[must_use]
    pub fn builtin(level: Level) -> Self {
        let (name, price_cents, duration_secs, target_count, expected_accuracy, expected, mult, ratios) =
            match level {
                Level::Basic => (
                    "Basic",
                    0,
                    20 * 60,
                    15,
                    60.0,
                    80,
                    0.7,
                    BandRatios::new(60, 40, 0),
                ),
                Level::Intermediate => (
                    "Intermediate",
                    499,
                    30 * 60,
                    20,
                    65.0,
                    60,
                    1.0,
                    BandRatios::new(30, 50, 20),
                ),
                Level::Advanced => (
                    "Advanced",
                    999,
                    40 * 60,
                    25,
                    70.0,
                    70,
                    1.4,
                    BandRatios::new(0, 40, 60),
                ),
                Level::Expert => (
                    "Expert",
                    1499,
                    50 * 60,
                    30,
                    75.0,
                    90,
                    1.8,
                    BandRatios::new(0, 20, 80),
                ),
            };

        Self {
            level,
            name: name.to_owned(),
            price_cents,
            duration_secs,
            target_count,
            expected_accuracy,
            expected_secs_per_question: expected,
            level_multiplier: mult,
            band_ratios: ratios,
        }
    }

    /// Creates a custom level configuration.
    ///
    /// # Errors
    ///
    /// Returns `LevelConfigError` if any count or duration is zero, the accuracy threshold
    /// is outside `[0, 100]`, the multiplier is not positive, or the band ratios do not sum to 100.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        level: Level,
        name: impl Into<String>,
        price_cents: u32,
        duration_secs: u32,
        target_count: u32,
        expected_accuracy: f64,
        expected_secs_per_question: u32,
        level_multiplier: f64,
        band_ratios: BandRatios,
    ) -> Result<Self, LevelConfigError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(LevelConfigError::EmptyName);
        }
        if target_count == 0 {
            return Err(LevelConfigError::InvalidTargetCount);
        }
        if duration_secs == 0 {
            return Err(LevelConfigError::InvalidDuration);
        }
        if !expected_accuracy.is_finite() || !(0.0..=100.0).contains(&expected_accuracy) {
            return Err(LevelConfigError::InvalidExpectedAccuracy {
                provided: expected_accuracy,
            });
        }
        if expected_secs_per_question == 0 {
            return Err(LevelConfigError::InvalidExpectedTime);
        }
        if !level_multiplier.is_finite() || level_multiplier <= 0.0 {
            return Err(LevelConfigError::InvalidMultiplier {
                provided: level_multiplier,
            });
        }
        let sum = band_ratios.sum();
        if sum != 100 {
            return Err(LevelConfigError::InvalidBandRatios { sum });
        }

        Ok(Self {
            level,
            name,
            price_cents,
            duration_secs,
            target_count,
            expected_accuracy,
            expected_secs_per_question,
            level_multiplier,
            band_ratios,
        })
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pass-through price metadata; not used by scoring.
    #[must_use]
    pub fn price_cents(&self) -> u32 {
        self.price_cents
    }

    #[must_use]
    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    #[must_use]
    pub fn duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::from(self.duration_secs))
    }

    #[must_use]
    pub fn target_count(&self) -> u32 {
        self.target_count
    }

    #[must_use]
    pub fn expected_accuracy(&self) -> f64 {
        self.expected_accuracy
    }

    #[must_use]
    pub fn expected_secs_per_question(&self) -> u32 {
        self.expected_secs_per_question
    }

    #[must_use]
    pub fn level_multiplier(&self) -> f64 {
        self.level_multiplier
    }

    #[must_use]
    pub fn band_ratios(&self) -> BandRatios {
        self.band_ratios
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parses_case_insensitively() {
        assert_eq!("intermediate".parse::<Level>().unwrap(), Level::Intermediate);
        assert_eq!(" EXPERT ".parse::<Level>().unwrap(), Level::Expert);
        let err = "master".parse::<Level>().unwrap_err();
        assert_eq!(
            err,
            LevelError::Unknown {
                key: "master".into()
            }
        );
    }

    #[test]
    fn level_display_matches_key() {
        for level in Level::ALL {
            assert_eq!(level.to_string().parse::<Level>().unwrap(), level);
        }
        assert!(Level::Basic < Level::Expert);
    }

    #[test]
    fn bands_split_difficulty_scale() {
        assert_eq!(DifficultyBand::of(1), DifficultyBand::Easy);
        assert_eq!(DifficultyBand::of(3), DifficultyBand::Easy);
        assert_eq!(DifficultyBand::of(4), DifficultyBand::Medium);
        assert_eq!(DifficultyBand::of(7), DifficultyBand::Medium);
        assert_eq!(DifficultyBand::of(8), DifficultyBand::Hard);
        assert_eq!(DifficultyBand::of(10), DifficultyBand::Hard);
    }

    #[test]
    fn quota_rounds_up() {
        let ratios = BandRatios::new(30, 50, 20);
        assert_eq!(ratios.quota(DifficultyBand::Easy, 20), 6);
        assert_eq!(ratios.quota(DifficultyBand::Medium, 20), 10);
        assert_eq!(ratios.quota(DifficultyBand::Hard, 20), 4);

        let basic = BandRatios::new(60, 40, 0);
        assert_eq!(basic.quota(DifficultyBand::Easy, 15), 9);
        assert_eq!(basic.quota(DifficultyBand::Medium, 15), 6);
        assert_eq!(basic.quota(DifficultyBand::Hard, 15), 0);

        let odd = BandRatios::new(33, 33, 34);
        assert_eq!(odd.quota(DifficultyBand::Easy, 10), 4);
        assert_eq!(odd.quota(DifficultyBand::Hard, 10), 4);
    }

    #[test]
    fn builtin_configs_are_valid() {
        for level in Level::ALL {
            let builtin = LevelConfig::builtin(level);
            let rebuilt = LevelConfig::new(
                level,
                builtin.name(),
                builtin.price_cents(),
                builtin.duration_secs(),
                builtin.target_count(),
                builtin.expected_accuracy(),
                builtin.expected_secs_per_question(),
                builtin.level_multiplier(),
                builtin.band_ratios(),
            )
            .unwrap();
            assert_eq!(rebuilt, builtin);
        }
    }

    #[test]
    fn builtin_multipliers_and_ratios() {
        let intermediate = LevelConfig::builtin(Level::Intermediate);
        assert_eq!(intermediate.target_count(), 20);
        assert_eq!(intermediate.expected_accuracy(), 65.0);
        assert_eq!(intermediate.level_multiplier(), 1.0);

        assert_eq!(LevelConfig::builtin(Level::Basic).level_multiplier(), 0.7);
        assert_eq!(LevelConfig::builtin(Level::Advanced).level_multiplier(), 1.4);
        assert_eq!(
            LevelConfig::builtin(Level::Expert).band_ratios(),
            BandRatios::new(0, 20, 80)
        );
    }

    #[test]
    fn config_rejects_bad_ratios() {
        let err = LevelConfig::new(
            Level::Basic,
            "Basic",
            0,
            600,
            10,
            60.0,
            60,
            0.7,
            BandRatios::new(50, 40, 0),
        )
        .unwrap_err();
        assert_eq!(err, LevelConfigError::InvalidBandRatios { sum: 90 });
    }

    #[test]
    fn config_rejects_out_of_range_accuracy() {
        let err = LevelConfig::new(
            Level::Basic,
            "Basic",
            0,
            600,
            10,
            120.0,
            60,
            0.7,
            BandRatios::new(60, 40, 0),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            LevelConfigError::InvalidExpectedAccuracy { .. }
        ));
    }
}
