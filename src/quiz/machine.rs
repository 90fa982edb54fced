//! Quiz state machine.
//!
//! Pure transition logic: given the current session and an inbound message,
//! mutate the session and describe the reply plus what the caller must do with
//! storage. No I/O happens here.

use std::sync::Arc;

use tracing::info;

use super::normalizer::normalize;
use super::prompts;
use super::question::QuestionBank;
use super::session::{Phase, Session};
use crate::error::QuizError;

/// What the caller must persist after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Session unchanged; nothing to write.
    None,
    /// Session changed; write it back.
    Save,
    /// Destroy every stored session, then write the fresh one.
    Reset,
}

/// Result of handling one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub reply: String,
    /// True exactly when the session is complete after this message.
    pub done: bool,
    pub effect: Effect,
}

impl Transition {
    fn unchanged(reply: impl Into<String>, done: bool) -> Self {
        Self {
            reply: reply.into(),
            done,
            effect: Effect::None,
        }
    }

    fn saved(reply: impl Into<String>, done: bool) -> Self {
        Self {
            reply: reply.into(),
            done,
            effect: Effect::Save,
        }
    }
}

/// Drives a [`Session`] through the question bank.
#[derive(Debug, Clone)]
pub struct StateMachine {
    bank: Arc<QuestionBank>,
}

impl StateMachine {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self { bank }
    }

    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Apply `message` to `session`.
    ///
    /// On `Effect::None` the session is left exactly as it was. Errors are
    /// invariant violations (bad index, unknown category), never bad input.
    pub fn handle(&self, session: &mut Session, message: &str) -> Result<Transition, QuizError> {
        let command = message.trim().to_lowercase();

        if command == "reset" || command == "restart" {
            *session = Session::new();
            info!(session_id = %session.id, "Session reset");
            return Ok(Transition {
                reply: prompts::RESET_CONFIRMATION.to_string(),
                done: false,
                effect: Effect::Reset,
            });
        }

        match session.phase {
            Phase::Complete => {
                let winner = session.scores.resolve_winner().ok();
                Ok(Transition::unchanged(
                    prompts::already_complete_reply(winner),
                    true,
                ))
            }
            Phase::NotStarted | Phase::InProgress { .. } if command == "start" => {
                let first = self.bank.question_at(0)?;
                if let Phase::InProgress { index } = session.phase {
                    info!(session_id = %session.id, index, "Quiz restarted mid-way");
                }
                session.begin();
                info!(session_id = %session.id, "Quiz started");
                Ok(Transition::saved(prompts::start_reply(first), false))
            }
            Phase::NotStarted => Ok(Transition::unchanged(prompts::SEND_START_FIRST, false)),
            Phase::InProgress { index } => self.answer(session, index, message),
        }
    }

    fn answer(
        &self,
        session: &mut Session,
        index: usize,
        message: &str,
    ) -> Result<Transition, QuizError> {
        let question = self.bank.question_at(index)?;

        let Some(choice) = normalize(message, question) else {
            return Ok(Transition::unchanged(prompts::reask_reply(question), false));
        };

        let category = question.category_for(choice).ok_or_else(|| {
            QuizError::UnknownCategory(format!("question '{}' has no choice {choice}", question.key))
        })?;
        let scores = session.scores.increment(category)?;

        session.answers.insert(question.key.to_string(), choice);
        session.scores = scores;

        let next = index + 1;
        if next < self.bank.len() {
            session.phase = Phase::InProgress { index: next };
            info!(
                session_id = %session.id,
                question = question.key,
                %choice,
                %category,
                "Answer recorded"
            );
            let next_question = self.bank.question_at(next)?;
            return Ok(Transition::saved(next_question.display_text(), false));
        }

        session.phase = Phase::Complete;
        let winner = session.scores.resolve_winner()?;
        info!(
            session_id = %session.id,
            question = question.key,
            %choice,
            %winner,
            "Quiz complete"
        );
        Ok(Transition::saved(prompts::completion_reply(winner), true))
    }
}
