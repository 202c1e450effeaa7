//! Read-only question bank shared by every room.
//!
//! Questions are loaded once at startup from a JSON file and never mutated
//! afterwards, so the bank can be shared across rooms without
//! synchronization. A small built-in set keeps the server playable when no
//! file is provided.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default location on disk where the server looks for the question set.
const DEFAULT_BANK_PATH: &str = "config/questions.json";
/// Environment variable that overrides [`DEFAULT_BANK_PATH`].
const BANK_PATH_ENV: &str = "QUIZ_ARENA_BACK_QUESTIONS_PATH";

/// Default answering window when a question does not specify one.
const DEFAULT_TIME_LIMIT_SECS: u32 = 15;
/// Default base points awarded for a correct answer.
const DEFAULT_BASE_POINTS: u32 = 1000;

/// A single quiz question as authored in the bank file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier, unique within the bank.
    pub id: u64,
    /// The question text shown to players.
    pub stem: String,
    /// Answer options; the correct one must be among them.
    pub options: Vec<String>,
    /// The correct option, compared verbatim against submissions.
    pub answer: String,
    /// Seconds the round stays open once this question is pushed.
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: u32,
    /// Points for an instant correct answer; speed-weighted downwards.
    #[serde(default = "default_base_points")]
    pub base_points: u32,
    /// Optional topic label.
    #[serde(default)]
    pub category: Option<String>,
    /// Optional explanation revealed when the round closes.
    #[serde(default)]
    pub explanation: Option<String>,
}

fn default_time_limit() -> u32 {
    DEFAULT_TIME_LIMIT_SECS
}

fn default_base_points() -> u32 {
    DEFAULT_BASE_POINTS
}

/// Immutable set of questions rooms draw their sequences from.
#[derive(Debug)]
pub struct QuestionBank {
    questions: Vec<Question>,
}

impl QuestionBank {
    /// Load the bank from disk, falling back to the built-in set when the
    /// file is absent or unreadable.
    pub fn load() -> Self {
        let path = resolve_bank_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<Vec<Question>>(&contents) {
                Ok(questions) if questions.is_empty() => {
                    warn!(path = %path.display(), "question file is empty; using built-in set");
                    Self::builtin()
                }
                Ok(questions) => {
                    info!(
                        path = %path.display(),
                        count = questions.len(),
                        "loaded question bank"
                    );
                    Self { questions }
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse question file; using built-in set"
                    );
                    Self::builtin()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "question file not found; using built-in set"
                );
                Self::builtin()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read question file; using built-in set"
                );
                Self::builtin()
            }
        }
    }

    /// Build a bank from an explicit question list.
    pub fn new(questions: Vec<Question>) -> Self {
        Self { questions }
    }

    /// Bank shipped with the binary so a bare server is still playable.
    pub fn builtin() -> Self {
        Self {
            questions: builtin_questions(),
        }
    }

    /// Number of questions available.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Whether the bank holds no questions at all.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Draw a shuffled sequence of at most `count` questions for one room.
    ///
    /// Each room gets its own independent ordering; the bank itself is
    /// never reordered.
    pub fn draw_sequence(&self, count: usize) -> Vec<Question> {
        let mut drawn = self.questions.clone();
        if drawn.len() > 1 {
            let mut rng = rand::rng();
            drawn.shuffle(&mut rng);
        }
        drawn.truncate(count);
        drawn
    }
}

/// Resolve the question file path taking the environment override into account.
fn resolve_bank_path() -> PathBuf {
    env::var_os(BANK_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BANK_PATH))
}

/// Built-in demo questions shipped with the binary.
fn builtin_questions() -> Vec<Question> {
    vec![
        Question {
            id: 1,
            stem: "What is 2 + 2?".into(),
            options: vec!["3".into(), "4".into(), "5".into(), "22".into()],
            answer: "4".into(),
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            base_points: DEFAULT_BASE_POINTS,
            category: Some("warm-up".into()),
            explanation: None,
        },
        Question {
            id: 2,
            stem: "Which planet is known as the Red Planet?".into(),
            options: vec!["Earth".into(), "Mars".into(), "Jupiter".into(), "Venus".into()],
            answer: "Mars".into(),
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            base_points: DEFAULT_BASE_POINTS,
            category: Some("science".into()),
            explanation: Some("Iron oxide on its surface gives Mars its color.".into()),
        },
        Question {
            id: 3,
            stem: "How many continents are there on Earth?".into(),
            options: vec!["5".into(), "6".into(), "7".into(), "8".into()],
            answer: "7".into(),
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            base_points: DEFAULT_BASE_POINTS,
            category: Some("geography".into()),
            explanation: None,
        },
        Question {
            id: 4,
            stem: "Which language does the borrow checker belong to?".into(),
            options: vec!["Go".into(), "Rust".into(), "Java".into(), "Python".into()],
            answer: "Rust".into(),
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            base_points: DEFAULT_BASE_POINTS,
            category: Some("programming".into()),
            explanation: None,
        },
    ]
}
