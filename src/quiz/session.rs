//! Quiz session — phase, recorded answers, and scores.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::category::Category;
use super::question::{Choice, QuestionBank};
use super::scores::Scores;
use crate::error::QuizError;
use crate::store::SessionRecord;

/// Where a session is in the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Phase {
    NotStarted,
    /// Waiting for the answer to question `index` (zero-based).
    InProgress { index: usize },
    Complete,
}

impl Phase {
    /// Persisted step number: 0 = not started, 1..=N = question N awaiting
    /// an answer, N+1 = complete.
    pub fn to_step(self, total: usize) -> i64 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress { index } => index as i64 + 1,
            Self::Complete => total as i64 + 1,
        }
    }

    /// Inverse of [`Phase::to_step`].
    pub fn from_step(step: i64, total: usize) -> Result<Self, QuizError> {
        let total = total as i64;
        match step {
            0 => Ok(Self::NotStarted),
            s if s >= 1 && s <= total => Ok(Self::InProgress {
                index: (s - 1) as usize,
            }),
            s if s == total + 1 => Ok(Self::Complete),
            s => Err(QuizError::CorruptSession(format!(
                "step {s} outside 0..={}",
                total + 1
            ))),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::InProgress { index } => write!(f, "in_progress({index})"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// One quiz run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub phase: Phase,
    /// Question key → recorded symbol.
    pub answers: BTreeMap<String, Choice>,
    pub scores: Scores,
    /// Informational only.
    pub created_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh, not-yet-started session.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            phase: Phase::NotStarted,
            answers: BTreeMap::new(),
            scores: Scores::zero(),
            created_at: Utc::now(),
        }
    }

    /// Begin (or restart) the quiz at the first question, discarding any
    /// previous answers and scores.
    pub fn begin(&mut self) {
        self.phase = Phase::InProgress { index: 0 };
        self.answers.clear();
        self.scores = Scores::zero();
        self.created_at = Utc::now();
    }

    /// Rebuild a session from its persisted document, rejecting anything that
    /// does not satisfy the session invariants.
    pub fn from_record(record: &SessionRecord, bank: &QuestionBank) -> Result<Self, QuizError> {
        let phase = Phase::from_step(record.step, bank.len())?;

        let mut answers = BTreeMap::new();
        for (key, symbol) in &record.answers {
            if bank.by_key(key).is_none() {
                return Err(QuizError::CorruptSession(format!(
                    "answer for unknown question '{key}'"
                )));
            }
            let choice = Choice::parse(symbol).ok_or_else(|| {
                QuizError::CorruptSession(format!("answer '{symbol}' for '{key}' is not a choice"))
            })?;
            answers.insert(key.clone(), choice);
        }

        let mut counts = Vec::with_capacity(record.scores.len());
        for (name, count) in &record.scores {
            let category: Category = name
                .parse()
                .map_err(|e: QuizError| QuizError::CorruptSession(e.to_string()))?;
            let count = u32::try_from(*count).map_err(|_| {
                QuizError::CorruptSession(format!("score {count} for '{name}' is not a valid count"))
            })?;
            counts.push((category, count));
        }

        let session = Self {
            id: record.id,
            phase,
            answers,
            scores: Scores::from_counts(counts),
            created_at: record.timestamp,
        };
        session.check_invariants(bank)?;
        Ok(session)
    }

    /// Persisted form of this session.
    pub fn to_record(&self, bank: &QuestionBank) -> SessionRecord {
        SessionRecord {
            id: self.id,
            step: self.phase.to_step(bank.len()),
            answers: self
                .answers
                .iter()
                .map(|(k, c)| (k.clone(), c.to_string()))
                .collect(),
            scores: self
                .scores
                .iter()
                .map(|(c, n)| (c.to_string(), i64::from(n)))
                .collect(),
            timestamp: self.created_at,
        }
    }

    /// Verify the answer/score/phase invariants against `bank`.
    ///
    /// - the answer count matches the phase (index while in progress, N when
    ///   complete, none before starting)
    /// - answers cover exactly the questions before the current one
    /// - scores have every category and equal the counts derived from answers
    pub fn check_invariants(&self, bank: &QuestionBank) -> Result<(), QuizError> {
        let expected_answers = match self.phase {
            Phase::NotStarted => 0,
            Phase::InProgress { index } => index,
            Phase::Complete => bank.len(),
        };
        if self.answers.len() != expected_answers {
            return Err(QuizError::CorruptSession(format!(
                "phase {} expects {expected_answers} answers, found {}",
                self.phase,
                self.answers.len()
            )));
        }

        self.scores
            .ensure_complete()
            .map_err(|e| QuizError::CorruptSession(e.to_string()))?;

        let mut derived = Scores::zero();
        for question in bank.iter().take(expected_answers) {
            let choice = self.answers.get(question.key).ok_or_else(|| {
                QuizError::CorruptSession(format!("missing answer for '{}'", question.key))
            })?;
            let category = question
                .category_for(*choice)
                .ok_or_else(|| QuizError::UnknownCategory(format!("{}:{choice}", question.key)))?;
            derived = derived.increment(category)?;
        }
        if derived != self.scores {
            return Err(QuizError::CorruptSession(format!(
                "scores {:?} do not match recorded answers {:?}",
                self.scores.to_map(),
                derived.to_map()
            )));
        }
        Ok(())
    }

    /// String-keyed answers for API payloads.
    pub fn answers_map(&self) -> BTreeMap<String, String> {
        self.answers
            .iter()
            .map(|(k, c)| (k.clone(), c.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bank() -> QuestionBank {
        QuestionBank::standard().unwrap()
    }

    #[test]
    fn step_encoding_round_trips() {
        let n = 5;
        let phases = [
            (Phase::NotStarted, 0),
            (Phase::InProgress { index: 0 }, 1),
            (Phase::InProgress { index: 4 }, 5),
            (Phase::Complete, 6),
        ];
        for (phase, step) in phases {
            assert_eq!(phase.to_step(n), step);
            assert_eq!(Phase::from_step(step, n).unwrap(), phase);
        }
        assert!(Phase::from_step(7, n).is_err());
        assert!(Phase::from_step(-1, n).is_err());
    }

    #[test]
    fn new_session_is_not_started_and_zeroed() {
        let session = Session::new();
        assert_eq!(session.phase, Phase::NotStarted);
        assert!(session.answers.is_empty());
        assert_eq!(session.scores, Scores::zero());
        session.check_invariants(&bank()).unwrap();
    }

    #[test]
    fn record_round_trip() {
        let bank = bank();
        let mut session = Session::new();
        session.begin();
        session.answers.insert("weekend".into(), Choice::B);
        session.scores = session.scores.increment(Category::Healing).unwrap();
        session.phase = Phase::InProgress { index: 1 };

        let record = session.to_record(&bank);
        assert_eq!(record.step, 2);
        assert_eq!(record.answers["weekend"], "B");
        assert_eq!(record.scores["healing"], 1);

        let back = Session::from_record(&record, &bank).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn from_record_rejects_score_mismatch() {
        let bank = bank();
        let mut record = Session::new().to_record(&bank);
        record.scores.insert("dark".into(), 1);
        let err = Session::from_record(&record, &bank).unwrap_err();
        assert!(matches!(err, QuizError::CorruptSession(_)));
    }

    #[test]
    fn from_record_rejects_missing_categories() {
        let bank = bank();
        let mut record = Session::new().to_record(&bank);
        record.scores.clear();
        assert!(Session::from_record(&record, &bank).is_err());
    }

    #[test]
    fn from_record_rejects_unknown_category_and_symbol() {
        let bank = bank();
        let mut record = Session::new().to_record(&bank);
        record.scores.insert("romcom".into(), 0);
        assert!(Session::from_record(&record, &bank).is_err());

        let mut record = Session::new().to_record(&bank);
        record.step = 2;
        record.answers.insert("weekend".into(), "Z".into());
        assert!(Session::from_record(&record, &bank).is_err());
    }

    #[test]
    fn from_record_rejects_answer_count_mismatch() {
        let bank = bank();
        let mut record = Session::new().to_record(&bank);
        record.step = 3; // expects two answers, has none
        let err = Session::from_record(&record, &bank).unwrap_err();
        assert!(err.to_string().contains("expects 2 answers"));
    }

    #[test]
    fn begin_discards_previous_answers() {
        let mut session = Session::new();
        session.begin();
        session.answers.insert("weekend".into(), Choice::A);
        session.scores = session.scores.increment(Category::Fantasy).unwrap();
        session.begin();
        assert_eq!(session.phase, Phase::InProgress { index: 0 });
        assert!(session.answers.is_empty());
        assert_eq!(session.scores.total(), 0);
    }
}
