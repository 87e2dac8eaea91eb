use rand::Rng;
use rand::rng;
use rand::seq::SliceRandom;

use quiz_core::model::{DifficultyBand, LevelConfig, Question};
use storage::QuestionRepository;

/// Selection result for a session build.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionPlan {
    pub questions: Vec<Question>,
    pub easy_selected: usize,
    pub medium_selected: usize,
    pub hard_selected: usize,
}

impl SelectionPlan {
    #[must_use]
    pub fn total(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// Stratified sampler: draws a level's target count from the easy, medium and hard
/// bands in the level's configured proportions.
pub struct QuestionSelector<'a> {
    bank: &'a dyn QuestionRepository,
}

impl<'a> QuestionSelector<'a> {
    #[must_use]
    pub fn new(bank: &'a dyn QuestionRepository) -> Self {
        Self { bank }
    }

    /// Build a plan using the thread-local RNG.
    #[must_use]
    pub fn select(&self, config: &LevelConfig) -> SelectionPlan {
        self.select_with_rng(config, &mut rng())
    }

    /// Build a plan with a caller-supplied RNG.
    ///
    /// - Each band is shuffled independently, then its first `ceil(target * ratio)` are taken.
    /// - Bands are concatenated easy, medium, hard and truncated to the target count.
    /// - A band with too few questions contributes all it has; the plan may be short.
    pub fn select_with_rng<R: Rng + ?Sized>(&self, config: &LevelConfig, rng: &mut R) -> SelectionPlan {
        let level = config.level();
        let target = config.target_count();
        let ratios = config.band_ratios();

        let mut bands: [Vec<&Question>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for q in self.bank.questions_for_level(level) {
            bands[band_slot(q.band())].push(q);
        }

        let mut selected: Vec<Question> = Vec::new();
        for band in DifficultyBand::ALL {
            let pool = &mut bands[band_slot(band)];
            let quota = ratios.quota(band, target);
            if pool.len() < quota {
                log::warn!(
                    "level {level}: {band:?} band has {} of {quota} requested questions",
                    pool.len()
                );
            }
            pool.as_mut_slice().shuffle(rng);
            selected.extend(pool.iter().take(quota).map(|q| (*q).clone()));
        }

        selected.truncate(usize::try_from(target).unwrap_or(usize::MAX));

        let count = |band| selected.iter().filter(|q| q.band() == band).count();
        let plan = SelectionPlan {
            easy_selected: count(DifficultyBand::Easy),
            medium_selected: count(DifficultyBand::Medium),
            hard_selected: count(DifficultyBand::Hard),
            questions: selected,
        };

        log::debug!(
            "selected {} questions for {level} (easy {}, medium {}, hard {})",
            plan.total(),
            plan.easy_selected,
            plan.medium_selected,
            plan.hard_selected
        );
        plan
    }
}

fn band_slot(band: DifficultyBand) -> usize {
    match band {
        DifficultyBand::Easy => 0,
        DifficultyBand::Medium => 1,
        DifficultyBand::Hard => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{BandRatios, Level, QuestionDraft, QuestionId, QuestionType};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;
    use storage::QuestionBank;

    fn draft(id: u64, level: Level, difficulty: u8) -> QuestionDraft {
        QuestionDraft {
            id: QuestionId::new(id),
            level,
            question_type: QuestionType::Abstract,
            prompt: format!("Q{id}"),
            options: vec!["a".into(), "b".into(), "c".into()],
            correct_answer: 0,
            time_limit_secs: 60,
            difficulty,
            explanation: String::new(),
            category: String::new(),
            hints: Vec::new(),
        }
    }

    /// `per_band` questions of every difficulty band for every level.
    fn full_bank(per_band: u64) -> QuestionBank {
        let mut drafts = Vec::new();
        let mut id = 0;
        for level in Level::ALL {
            for difficulty in [2_u8, 5, 9] {
                for _ in 0..per_band {
                    id += 1;
                    drafts.push(draft(id, level, difficulty));
                }
            }
        }
        QuestionBank::from_drafts(drafts).unwrap()
    }

    #[test]
    fn selection_matches_configured_mix() {
        let bank = full_bank(40);
        let selector = QuestionSelector::new(&bank);

        for level in Level::ALL {
            let config = LevelConfig::builtin(level);
            let target = config.target_count() as usize;
            let ratios = config.band_ratios();
            for _ in 0..20 {
                let plan = selector.select(&config);
                assert_eq!(plan.total(), target);

                let ids: HashSet<_> = plan.questions.iter().map(Question::id).collect();
                assert_eq!(ids.len(), plan.total(), "duplicate question selected");
                assert!(plan.questions.iter().all(|q| q.level() == level));

                for (band, got) in [
                    (DifficultyBand::Easy, plan.easy_selected),
                    (DifficultyBand::Medium, plan.medium_selected),
                    (DifficultyBand::Hard, plan.hard_selected),
                ] {
                    let wanted = ratios.quota(band, config.target_count());
                    assert!(got.abs_diff(wanted) <= 2, "{level} {band:?}: {got} vs {wanted}");
                }
            }
        }
    }

    #[test]
    fn intermediate_takes_exact_quotas() {
        let bank = full_bank(40);
        let plan = QuestionSelector::new(&bank).select(&LevelConfig::builtin(Level::Intermediate));
        assert_eq!(
            (plan.easy_selected, plan.medium_selected, plan.hard_selected),
            (6, 10, 4)
        );
        // Bands are concatenated easy, medium, hard.
        let bands: Vec<_> = plan.questions.iter().map(Question::band).collect();
        let mut sorted = bands.clone();
        sorted.sort_by_key(|b| band_slot(*b));
        assert_eq!(bands, sorted);
    }

    #[test]
    fn overshoot_is_truncated_to_target() {
        // ceil(10 * .33) + ceil(10 * .33) + ceil(10 * .34) = 12
        let config = LevelConfig::new(
            Level::Basic,
            "Thirds",
            0,
            600,
            10,
            50.0,
            60,
            1.0,
            BandRatios::new(33, 33, 34),
        )
        .unwrap();
        let bank = full_bank(10);
        let plan = QuestionSelector::new(&bank).select(&config);
        assert_eq!(plan.total(), 10);
        assert_eq!(plan.easy_selected, 4);
        assert_eq!(plan.medium_selected, 4);
        assert_eq!(plan.hard_selected, 2);
    }

    #[test]
    fn short_band_yields_short_plan() {
        let bank = QuestionBank::from_drafts(vec![
            draft(1, Level::Expert, 5),
            draft(2, Level::Expert, 9),
            draft(3, Level::Expert, 10),
            draft(4, Level::Expert, 1),
        ])
        .unwrap();
        let plan = QuestionSelector::new(&bank).select(&LevelConfig::builtin(Level::Expert));
        // Expert draws no easy questions.
        assert_eq!(plan.total(), 3);
        assert_eq!(plan.easy_selected, 0);
        assert_eq!(plan.medium_selected, 1);
        assert_eq!(plan.hard_selected, 2);
    }

    #[test]
    fn empty_level_yields_empty_plan() {
        let bank = QuestionBank::from_drafts(vec![draft(1, Level::Basic, 2)]).unwrap();
        let plan = QuestionSelector::new(&bank).select(&LevelConfig::builtin(Level::Advanced));
        assert!(plan.is_empty());
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let bank = full_bank(30);
        let selector = QuestionSelector::new(&bank);
        let config = LevelConfig::builtin(Level::Advanced);

        let a = selector.select_with_rng(&config, &mut StdRng::seed_from_u64(7));
        let b = selector.select_with_rng(&config, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn shuffle_varies_selection() {
        let bank = full_bank(40);
        let selector = QuestionSelector::new(&bank);
        let config = LevelConfig::builtin(Level::Basic);

        let first: Vec<_> = selector
            .select_with_rng(&config, &mut StdRng::seed_from_u64(1))
            .questions
            .iter()
            .map(Question::id)
            .collect();
        let differs = (2..10).any(|seed| {
            let ids: Vec<_> = selector
                .select_with_rng(&config, &mut StdRng::seed_from_u64(seed))
                .questions
                .iter()
                .map(Question::id)
                .collect();
            ids != first
        });
        assert!(differs);
    }
}
