use chrono::Duration;
use std::collections::BTreeMap;

use crate::model::{
    AttemptRecord, CategoryScore, DetailedAnalysis, DifficultyBand, DifficultyProgression,
    LevelConfig, Question, QuestionReview, QuestionType, QuizResults,
};

pub const IQ_MIN: u32 = 70;
pub const IQ_MAX: u32 = 200;
pub const PERCENTILE_MIN: u32 = 1;
pub const PERCENTILE_MAX: u32 = 99;

const IQ_MEAN: f64 = 100.0;
const IQ_STD_DEV: f64 = 15.0;
const ACCURACY_PIVOT: f64 = 50.0;
const ACCURACY_WEIGHT: f64 = 0.8;
const MAX_SPEED_BONUS: f64 = 10.0;
const DIFFICULTY_WEIGHT: f64 = 2.0;
const STRENGTH_THRESHOLD: u32 = 80;
const WEAKNESS_THRESHOLD: u32 = 60;
const NEUTRAL_MULTIPLIER: f64 = 1.0;

const ENCOURAGEMENT: &str =
    "Excellent performance across all areas. Try a higher level to keep challenging yourself.";

//
// ─── NORMAL DISTRIBUTION ───────────────────────────────────────────────────────
//

/// Normal CDF via the Abramowitz-Stegun 7.1.26 rational approximation of erf.
///
/// The polynomial is evaluated at `z` itself, without the `1/sqrt(2)` rescaling, so
/// this is `0.5 * (1 + erf(z))`. Percentile outputs depend on this exact form.
/// Absolute error is below 1.5e-7.
///
/// ```
/// # use quiz_core::scoring::normal_cdf;
/// assert!((normal_cdf(0.0) - 0.5).abs() < 1e-6);
/// assert!((normal_cdf(1.0) - 0.921_350_4).abs() < 1e-6);
/// ```
#[must_use]
pub fn normal_cdf(z: f64) -> f64 {
    const A1: f64 = 0.254_829_592;
    const A2: f64 = -0.284_496_736;
    const A3: f64 = 1.421_413_741;
    const A4: f64 = -1.453_152_027;
    const A5: f64 = 1.061_405_429;
    const P: f64 = 0.327_591_1;

    let sign = if z < 0.0 { -1.0 } else { 1.0 };
    let x = z.abs();
    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();

    0.5 * (1.0 + sign * y)
}

/// Rank of `iq` under Normal(100, 15), as a whole percent in `[1, 99]`.
#[must_use]
pub fn percentile_for(iq: u32) -> u32 {
    let z = (f64::from(iq) - IQ_MEAN) / IQ_STD_DEV;
    let pct = round_half_up(normal_cdf(z) * 100.0);
    clamp_to_u32(pct, PERCENTILE_MIN, PERCENTILE_MAX)
}

//
// ─── SCORE COMPONENTS ──────────────────────────────────────────────────────────
//

/// Bonus for finishing faster than the level's expected pace, in `[0, 10]`.
#[must_use]
pub fn speed_bonus(expected_secs_per_question: u32, time_spent_secs: u64, question_count: usize) -> f64 {
    if question_count == 0 || expected_secs_per_question == 0 {
        return 0.0;
    }
    let expected = f64::from(expected_secs_per_question);
    #[allow(clippy::cast_precision_loss)]
    let actual = time_spent_secs as f64 / question_count as f64;
    ((expected - actual) / expected * MAX_SPEED_BONUS).max(0.0)
}

/// Average `difficulty * 2` over correctly answered questions; zero if none were correct.
#[must_use]
pub fn difficulty_bonus<'a>(correct: impl IntoIterator<Item = &'a Question>) -> f64 {
    let (sum, count) = correct
        .into_iter()
        .fold((0.0, 0_u32), |(sum, count), q| {
            (sum + f64::from(q.difficulty()) * DIFFICULTY_WEIGHT, count + 1)
        });
    if count == 0 {
        0.0
    } else {
        sum / f64::from(count)
    }
}

/// Blend accuracy, level weight and bonuses into an estimate clamped to `[70, 200]`.
#[must_use]
pub fn iq_estimate(accuracy: f64, level_multiplier: f64, speed_bonus: f64, difficulty_bonus: f64) -> u32 {
    let raw = IQ_MEAN
        + (accuracy - ACCURACY_PIVOT) * level_multiplier * ACCURACY_WEIGHT
        + speed_bonus
        + difficulty_bonus;
    clamp_to_u32(round_half_up(raw), IQ_MIN, IQ_MAX)
}

/// Canned advice for a weak question type.
#[must_use]
pub fn recommendation_for(question_type: QuestionType) -> &'static str {
    match question_type {
        QuestionType::Spatial => {
            "Practice mental rotation and visualization exercises, such as 3D puzzles and tangrams."
        }
        QuestionType::Logical => {
            "Work through logic puzzles and syllogisms to strengthen deductive reasoning."
        }
        QuestionType::Abstract => {
            "Study pattern-recognition problems like matrices and figure series."
        }
        QuestionType::Numerical => {
            "Practice number sequences and mental arithmetic to sharpen quantitative reasoning."
        }
        QuestionType::Verbal => {
            "Read widely and practice analogies and vocabulary exercises."
        }
        QuestionType::Memory => {
            "Train working memory with recall games and chunking techniques."
        }
    }
}

//
// ─── RESULT SYNTHESIS ──────────────────────────────────────────────────────────
//

/// Score an attempt.
///
/// `records` is parallel to `questions`; `elapsed` is the time since the session began.
/// Any prefix of answered questions is valid input: unvisited slots count as incorrect
/// and are excluded from the accuracy denominator, like skips.
#[must_use]
pub fn synthesize(
    config: &LevelConfig,
    questions: &[Question],
    records: &[AttemptRecord],
    elapsed: Duration,
) -> QuizResults {
    score(Some(config), questions, records, elapsed)
}

/// Results for an attempt with no level behind it: nothing selected, nothing passed.
///
/// Scored with a neutral level weight and no expected pace.
#[must_use]
pub fn unleveled_results(elapsed: Duration) -> QuizResults {
    score(None, &[], &[], elapsed)
}

fn score(
    config: Option<&LevelConfig>,
    questions: &[Question],
    records: &[AttemptRecord],
    elapsed: Duration,
) -> QuizResults {
    let pairs = || questions.iter().zip(records.iter());

    let correct: Vec<&Question> = pairs()
        .filter(|(q, r)| r.answer().is_some_and(|a| q.is_correct(a)))
        .map(|(q, _)| q)
        .collect();
    let correct_count = count_u32(correct.len());
    let answered_count = count_u32(records.iter().filter(|r| r.answer().is_some()).count());
    let total_questions = count_u32(questions.len());

    let accuracy = if answered_count > 0 {
        f64::from(correct_count) * 100.0 / f64::from(answered_count)
    } else {
        0.0
    };

    let elapsed_ms = u64::try_from(elapsed.num_milliseconds()).unwrap_or(0);
    let time_spent = elapsed_ms.saturating_add(500) / 1000;

    let expected_secs = config.map_or(0, LevelConfig::expected_secs_per_question);
    let multiplier = config.map_or(NEUTRAL_MULTIPLIER, LevelConfig::level_multiplier);
    let speed = speed_bonus(expected_secs, time_spent, questions.len());
    let difficulty = difficulty_bonus(correct.iter().copied());
    let iq = iq_estimate(accuracy, multiplier, speed, difficulty);

    let category_scores = category_scores(questions, records);
    let strengths: Vec<QuestionType> = category_scores
        .iter()
        .filter(|(_, s)| s.percentage >= STRENGTH_THRESHOLD)
        .map(|(t, _)| *t)
        .collect();
    let weaknesses: Vec<QuestionType> = category_scores
        .iter()
        .filter(|(_, s)| s.percentage < WEAKNESS_THRESHOLD)
        .map(|(t, _)| *t)
        .collect();
    let recommendations = if weaknesses.is_empty() {
        vec![ENCOURAGEMENT.to_owned()]
    } else {
        weaknesses
            .iter()
            .map(|t| recommendation_for(*t).to_owned())
            .collect()
    };

    let mut progression = DifficultyProgression::default();
    for q in &correct {
        match q.band() {
            DifficultyBand::Easy => progression.easy += 1,
            DifficultyBand::Medium => progression.medium += 1,
            DifficultyBand::Hard => progression.hard += 1,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    let avg_time_per_question = if questions.is_empty() {
        0.0
    } else {
        time_spent as f64 / questions.len() as f64
    };

    let question_reviews = pairs()
        .map(|(q, r)| QuestionReview {
            question_id: q.id(),
            chosen: r.answer(),
            correct_answer: q.correct_answer(),
            is_correct: r.answer().is_some_and(|a| q.is_correct(a)),
            elapsed_ms: r.elapsed_ms(),
        })
        .collect();

    QuizResults {
        level: config.map(LevelConfig::level),
        score: clamp_to_u32(round_half_up(accuracy), 0, 100),
        correct_count,
        answered_count,
        total_questions,
        time_spent,
        percentile: percentile_for(iq),
        iq_estimate: iq,
        passed: config.is_some_and(|c| accuracy >= c.expected_accuracy()),
        detailed_analysis: DetailedAnalysis {
            accuracy,
            avg_time_per_question,
            strengths,
            weaknesses,
            recommendations,
            difficulty_progression: progression,
        },
        category_scores,
        question_reviews,
    }
}

/// Per-type correct/total tallies over every selected question.
#[must_use]
pub fn category_scores(
    questions: &[Question],
    records: &[AttemptRecord],
) -> BTreeMap<QuestionType, CategoryScore> {
    let mut tallies: BTreeMap<QuestionType, (u32, u32)> = BTreeMap::new();
    for (q, r) in questions.iter().zip(records.iter()) {
        let entry = tallies.entry(q.question_type()).or_insert((0, 0));
        if r.answer().is_some_and(|a| q.is_correct(a)) {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    tallies
        .into_iter()
        .map(|(t, (correct, total))| {
            let pct = round_half_up(f64::from(correct) * 100.0 / f64::from(total));
            (
                t,
                CategoryScore {
                    correct,
                    total,
                    percentage: clamp_to_u32(pct, 0, 100),
                },
            )
        })
        .collect()
}

fn round_half_up(x: f64) -> f64 {
    (x + 0.5).floor()
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_to_u32(x: f64, min: u32, max: u32) -> u32 {
    if x.is_nan() {
        return min;
    }
    x.clamp(f64::from(min), f64::from(max)) as u32
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
