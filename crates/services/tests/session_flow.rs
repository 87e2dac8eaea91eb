use std::sync::Arc;

use chrono::Duration;
use quiz_core::model::{Level, QuestionDraft, QuestionId, QuestionType};
use quiz_core::scoring::{IQ_MAX, IQ_MIN, PERCENTILE_MAX, PERCENTILE_MIN};
use quiz_core::time::fixed_now;
use services::{Clock, ConfigurationError, QuizService, SessionError, SessionState};
use storage::{LevelCatalog, QuestionBank};

const TYPES: [QuestionType; 4] = [
    QuestionType::Logical,
    QuestionType::Numerical,
    QuestionType::Spatial,
    QuestionType::Verbal,
];

/// Twenty questions per difficulty band for every level.
fn fixture_service() -> QuizService {
    let mut drafts = Vec::new();
    let mut id = 0_u64;
    for level in Level::ALL {
        for difficulty in [2_u8, 6, 9] {
            for n in 0..20 {
                id += 1;
                drafts.push(QuestionDraft {
                    id: QuestionId::new(id),
                    level,
                    question_type: TYPES[n % TYPES.len()],
                    prompt: format!("{level} #{id}"),
                    options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
                    correct_answer: (id % 4) as usize,
                    time_limit_secs: 60,
                    difficulty,
                    explanation: String::new(),
                    category: String::new(),
                    hints: Vec::new(),
                });
            }
        }
    }
    let bank = QuestionBank::from_drafts(drafts).unwrap();
    QuizService::new(Arc::new(bank), LevelCatalog::builtin()).with_clock(Clock::fixed(fixed_now()))
}

#[test]
fn intermediate_attempt_with_thirteen_of_twenty_passes() {
    let service = fixture_service();
    let mut session = service.start_session_by_key("INTERMEDIATE").unwrap();
    assert_eq!(session.total_questions(), 20);

    let mut t = fixed_now();
    let mut answered = 0;
    while let Some(question) = session.current_question() {
        let correct = question.correct_answer();
        let choice = if answered < 13 {
            correct
        } else {
            (correct + 1) % question.options().len()
        };
        t += Duration::seconds(60);
        session.submit_answer_at(choice, t).unwrap();
        answered += 1;
    }
    assert!(session.is_all_visited());

    let results = session.calculate_results_at(fixed_now() + Duration::seconds(1200));
    assert_eq!(results.correct_count, 13);
    assert_eq!(results.answered_count, 20);
    assert_eq!(results.detailed_analysis.accuracy, 65.0);
    assert!(results.passed);
    assert_eq!(results.time_spent, 1200);
    assert!((IQ_MIN..=IQ_MAX).contains(&results.iq_estimate));
    assert!((PERCENTILE_MIN..=PERCENTILE_MAX).contains(&results.percentile));
    assert_eq!(session.state(), SessionState::Completed);
}

#[test]
fn perfect_attempt_scores_at_least_average() {
    let service = fixture_service();
    for level in Level::ALL {
        let mut session = service.start_session(level).unwrap();
        while let Some(question) = session.current_question() {
            let correct = question.correct_answer();
            session.submit_answer(correct).unwrap();
        }
        let results = session.calculate_results();
        assert_eq!(results.detailed_analysis.accuracy, 100.0);
        assert_eq!(results.score, 100);
        assert!(results.iq_estimate >= 100, "{level}: {}", results.iq_estimate);
        assert!(results.passed);
        assert!(results.detailed_analysis.weaknesses.is_empty());
    }
}

#[test]
fn all_skipped_attempt_is_well_defined() {
    let service = fixture_service();
    let mut session = service.start_session(Level::Expert).unwrap();
    while session.current_question().is_some() {
        session.skip_question().unwrap();
    }

    let results = session.calculate_results();
    assert_eq!(results.detailed_analysis.accuracy, 0.0);
    assert_eq!(results.answered_count, 0);
    assert!(!results.detailed_analysis.accuracy.is_nan());
    assert!((IQ_MIN..=IQ_MAX).contains(&results.iq_estimate));
    assert!(!results.passed);
    assert_eq!(results.detailed_analysis.difficulty_progression.hard, 0);
}

#[test]
fn timed_out_attempt_scores_answered_subset() {
    let service = fixture_service();
    let mut session = service.start_session(Level::Basic).unwrap();
    let start = session.started_at();

    for step in 1..=3 {
        let correct = session.current_question().unwrap().correct_answer();
        session
            .submit_answer_at(correct, start + Duration::seconds(30 * step))
            .unwrap();
    }

    let deadline = start + session.config().unwrap().duration();
    assert_eq!(session.time_remaining_at(deadline), Duration::zero());

    let results = session.calculate_results_at(deadline);
    assert_eq!(results.answered_count, 3);
    assert_eq!(results.correct_count, 3);
    assert_eq!(results.total_questions, 15);
    assert_eq!(results.detailed_analysis.accuracy, 100.0);
    assert_eq!(results.question_reviews.len(), 15);
    assert_eq!(results.question_reviews[3].chosen, None);

    assert_eq!(session.submit_answer(0).unwrap_err(), SessionError::Completed);
}

#[test]
fn revisiting_overwrites_a_single_answer() {
    let service = fixture_service();
    let mut session = service.start_session(Level::Advanced).unwrap();
    let wrong = |correct: usize| (correct + 1) % 4;

    for _ in 0..3 {
        let q = session.current_question().unwrap();
        let choice = wrong(q.correct_answer());
        session.submit_answer(choice).unwrap();
    }
    let before: Vec<_> = session.records().iter().map(|r| r.answer()).collect();

    assert!(session.go_to_previous_question().unwrap());
    let fixed = session.current_question().unwrap().correct_answer();
    session.submit_answer(fixed).unwrap();

    let after: Vec<_> = session.records().iter().map(|r| r.answer()).collect();
    assert_eq!(after[0], before[0]);
    assert_eq!(after[1], before[1]);
    assert_eq!(after[2], Some(fixed));
    assert_eq!(&after[3..], &before[3..]);

    assert_eq!(session.calculate_results().correct_count, 1);
}

#[test]
fn empty_bank_session_returns_zero_totals() {
    let service = QuizService::new(
        Arc::new(QuestionBank::default()),
        LevelCatalog::builtin(),
    );
    let mut session = service.start_session_by_key("basic").unwrap();
    assert!(session.current_question().is_none());
    let results = session.calculate_results();
    assert_eq!(results.total_questions, 0);
    assert_eq!(results.correct_count, 0);
}

#[test]
fn unknown_level_key_degrades_to_empty_session() {
    let service = QuizService::builtin().unwrap();
    let mut session = service.start_session_by_key("WIZARD").unwrap();
    assert_eq!(session.state(), SessionState::NoContent);
    assert!(session.current_question().is_none());

    let results = session.calculate_results();
    assert_eq!(results.total_questions, 0);
    assert!(results.level.is_none());

    assert_eq!(
        service.start_session_by_key_strict("WIZARD").unwrap_err(),
        ConfigurationError::UnknownLevel {
            key: "WIZARD".into()
        }
    );
}

#[test]
fn results_serialize_for_external_callers() {
    let service = fixture_service();
    let mut session = service.start_session(Level::Intermediate).unwrap();
    let correct = session.current_question().unwrap().correct_answer();
    session.submit_answer(correct).unwrap();

    let json = serde_json::to_value(session.calculate_results()).unwrap();
    for key in [
        "score",
        "correctCount",
        "totalQuestions",
        "timeSpent",
        "percentile",
        "iqEstimate",
        "passed",
        "detailedAnalysis",
        "categoryScores",
    ] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
    assert_eq!(json["level"], "INTERMEDIATE");
    assert!(json["detailedAnalysis"]["avgTimePerQuestion"].is_number());
}
