//! QuizService — coordinates the state machine, session storage, and the
//! movie catalog.
//!
//! There is exactly one quiz session, shared by every caller. Message handling
//! holds a process-wide lock across load → transition → save so two requests
//! in this process cannot interleave their read-modify-write. The store itself
//! is last-write-wins; running several processes against one database is not
//! supported.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{DatabaseError, Error, QuizError, RecommendError};
use crate::quiz::{Effect, Phase, QuestionBank, Session, StateMachine};
use crate::recommend::model::to_items;
use crate::recommend::{MovieCatalog, RecommendationResponse, params_for};
use crate::store::SessionStore;

/// Reply to a submitted chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
    pub done: bool,
}

/// Read-only snapshot of the current session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub phase: Phase,
    pub step: i64,
    pub total_questions: usize,
    pub answers: BTreeMap<String, String>,
    pub scores: BTreeMap<String, u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

/// Quiz and recommendation operations over the single stored session.
pub struct QuizService {
    store: Arc<dyn SessionStore>,
    machine: StateMachine,
    catalog: Arc<dyn MovieCatalog>,
    write_lock: Mutex<()>,
}

impl QuizService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        bank: Arc<QuestionBank>,
        catalog: Arc<dyn MovieCatalog>,
    ) -> Self {
        Self {
            store,
            machine: StateMachine::new(bank),
            catalog,
            write_lock: Mutex::new(()),
        }
    }

    fn bank(&self) -> &QuestionBank {
        self.machine.bank()
    }

    /// Load the stored session; `None` when the store is empty.
    async fn load(&self) -> Result<Option<Session>, Error> {
        let Some(record) = self.store.load_session().await? else {
            return Ok(None);
        };
        match Session::from_record(&record, self.bank()) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                warn!(session_id = %record.id, step = record.step, error = %e, "Stored session failed validation");
                Err(e.into())
            }
        }
    }

    /// Handle one inbound chat message.
    ///
    /// The updated session is persisted before the reply is returned, so the
    /// reply never describes a state the store doesn't have.
    pub async fn submit_message(&self, message: &str) -> Result<ChatReply, Error> {
        let _guard = self.write_lock.lock().await;

        let is_reset = matches!(message.trim().to_lowercase().as_str(), "reset" | "restart");

        // Reset never needs the old session, so a corrupt one can't block it.
        let loaded = if is_reset { None } else { self.load().await? };
        let created = loaded.is_none();
        let mut session = loaded.unwrap_or_default();
        if created && !is_reset {
            self.store.save_session(&session.to_record(self.bank())).await?;
            info!(session_id = %session.id, "Session created");
        }

        let transition = self.machine.handle(&mut session, message)?;
        debug!(
            session_id = %session.id,
            phase = %session.phase,
            effect = ?transition.effect,
            done = transition.done,
            "Message handled"
        );

        match transition.effect {
            Effect::None => {}
            Effect::Save => {
                session.check_invariants(self.bank())?;
                self.store.save_session(&session.to_record(self.bank())).await?;
            }
            Effect::Reset => {
                self.store.replace_session(&session.to_record(self.bank())).await?;
            }
        }

        Ok(ChatReply {
            reply: transition.reply,
            done: transition.done,
        })
    }

    /// Current session snapshot (a fresh, unsaved one if none is stored).
    pub async fn status(&self) -> Result<SessionStatus, Error> {
        let session = self.load().await?.unwrap_or_default();
        let winner = match session.phase {
            Phase::Complete => Some(session.scores.resolve_winner()?.to_string()),
            _ => None,
        };
        Ok(SessionStatus {
            phase: session.phase,
            step: session.phase.to_step(self.bank().len()),
            total_questions: self.bank().len(),
            answers: session.answers_map(),
            scores: session.scores.to_map(),
            winner,
        })
    }

    /// Recommend movies for the stored session's current winner.
    ///
    /// Reads the session without taking the write lock; the upstream call
    /// never blocks chat handling.
    pub async fn recommendations(&self) -> Result<RecommendationResponse, RecommendError> {
        let session = self.load().await.map_err(|e| match e {
            Error::Quiz(q) => RecommendError::Quiz(q),
            Error::Database(d) => RecommendError::Database(d),
            other => RecommendError::Database(DatabaseError::Query(other.to_string())),
        })?;

        let Some(session) = session.filter(|s| !s.answers.is_empty()) else {
            return Err(RecommendError::NoActiveSession);
        };

        let winner = session.scores.resolve_winner().map_err(|e| {
            QuizError::CorruptSession(format!("cannot resolve winner: {e}"))
        })?;
        let query = params_for(winner, session.answers_map());

        info!(
            session_id = %session.id,
            category = %query.category,
            answered = session.answers.len(),
            "Fetching recommendations"
        );

        let movies = self.catalog.discover(&query.params).await?;

        Ok(RecommendationResponse {
            category: query.category.to_string(),
            category_label: query.category.label().to_string(),
            scores: session.scores.to_map(),
            answers: query.answers,
            items: to_items(movies),
        })
    }
}
