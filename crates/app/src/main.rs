use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use quiz_core::model::Level;
use services::{Clock, QuizService, QuizSession};
use storage::{LevelCatalog, QuestionBank};

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidLevel { raw: String },
    InvalidAccuracy { raw: String },
    InvalidPace { raw: String },
    InvalidSeed { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidLevel { raw } => write!(f, "invalid --level value: {raw}"),
            ArgsError::InvalidAccuracy { raw } => {
                write!(f, "invalid --accuracy value (expected 0.0-1.0): {raw}")
            }
            ArgsError::InvalidPace { raw } => write!(f, "invalid --pace value: {raw}"),
            ArgsError::InvalidSeed { raw } => write!(f, "invalid --seed value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- [--level <key>] [--bank <path>] [--levels <path>]");
    eprintln!("                      [--accuracy <0-1>] [--pace <secs>] [--seed <n>]");
    eprintln!();
    eprintln!("Simulates one attempt and prints the results as JSON.");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --level INTERMEDIATE  --accuracy 0.7  --pace 45  (embedded question set)");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_LEVEL, QUIZ_BANK_PATH, QUIZ_LEVELS_PATH, QUIZ_ACCURACY, RUST_LOG");
}

/// Simulated taker: answers correctly with probability `accuracy`, spending `pace_secs` per question.
struct Args {
    level: Level,
    bank_path: Option<String>,
    levels_path: Option<String>,
    accuracy: f64,
    pace_secs: i64,
    seed: Option<u64>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut level = match std::env::var("QUIZ_LEVEL") {
            Ok(raw) => parse_level(raw)?,
            Err(_) => Level::Intermediate,
        };
        let mut bank_path = std::env::var("QUIZ_BANK_PATH").ok();
        let mut levels_path = std::env::var("QUIZ_LEVELS_PATH").ok();
        let mut accuracy = match std::env::var("QUIZ_ACCURACY") {
            Ok(raw) => parse_accuracy(raw)?,
            Err(_) => 0.7,
        };
        let mut pace_secs = 45;
        let mut seed = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--level" => level = parse_level(require_value(args, "--level")?)?,
                "--bank" => bank_path = Some(require_value(args, "--bank")?),
                "--levels" => levels_path = Some(require_value(args, "--levels")?),
                "--accuracy" => accuracy = parse_accuracy(require_value(args, "--accuracy")?)?,
                "--pace" => {
                    let value = require_value(args, "--pace")?;
                    pace_secs = value
                        .parse::<i64>()
                        .ok()
                        .filter(|p| *p >= 0)
                        .ok_or(ArgsError::InvalidPace { raw: value })?;
                }
                "--seed" => {
                    let value = require_value(args, "--seed")?;
                    seed = Some(
                        value
                            .parse::<u64>()
                            .map_err(|_| ArgsError::InvalidSeed { raw: value.clone() })?,
                    );
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            level,
            bank_path,
            levels_path,
            accuracy,
            pace_secs,
            seed,
        })
    }
}

fn parse_level(raw: String) -> Result<Level, ArgsError> {
    raw.parse::<Level>()
        .map_err(|_| ArgsError::InvalidLevel { raw })
}

fn parse_accuracy(raw: String) -> Result<f64, ArgsError> {
    raw.parse::<f64>()
        .ok()
        .filter(|a| (0.0..=1.0).contains(a))
        .ok_or(ArgsError::InvalidAccuracy { raw })
}

fn build_service(args: &Args) -> Result<QuizService, Box<dyn std::error::Error>> {
    let catalog = match &args.levels_path {
        Some(path) => LevelCatalog::from_json_str(&std::fs::read_to_string(path)?)?,
        None => LevelCatalog::builtin(),
    };
    let service = match &args.bank_path {
        Some(path) => {
            let bank = QuestionBank::from_json_file(path)?;
            log::info!("loaded {} questions from {path}", bank.len());
            QuizService::new(Arc::new(bank), catalog)
        }
        None => QuizService::new(Arc::new(storage::seed::builtin_bank()?), catalog),
    };
    Ok(service)
}

fn run_attempt(session: &mut QuizSession, args: &Args, rng: &mut impl Rng) {
    let mut now = session.started_at();
    while let Some(question) = session.current_question() {
        let options = question.options().len();
        let correct = question.correct_answer();
        let choice = if rng.random_bool(args.accuracy) {
            correct
        } else {
            (correct + rng.random_range(1..options)) % options
        };

        now += Duration::seconds(args.pace_secs);
        let remaining = session.time_remaining_at(now);
        if remaining <= Duration::zero() {
            log::info!("time is up after {} questions", session.current_index());
            break;
        }
        if let Err(err) = session.submit_answer_at(choice, now) {
            log::error!("submit failed: {err}");
            break;
        }
    }
    session.calculate_results_at(now);
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let service = build_service(&args)?.with_clock(Clock::system());
    let mut session = service.start_session(args.level)?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    run_attempt(&mut session, &args, &mut rng);

    if let Some(results) = session.results() {
        println!("{}", serde_json::to_string_pretty(results)?);
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
