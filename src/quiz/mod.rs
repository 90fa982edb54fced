//! Quiz engine — questions, answer normalization, scoring, and the session
//! state machine.
//!
//! A session moves NotStarted → InProgress(0..N) → Complete. Each recognized
//! answer adds exactly one point to the category its choice maps to; once the
//! last question is answered the highest-scoring category (ties broken by
//! [`Category::PRIORITY`]) becomes the user's movie DNA.

pub mod category;
pub mod machine;
pub mod normalizer;
pub mod prompts;
pub mod question;
pub mod scores;
pub mod session;

pub use category::Category;
pub use machine::{Effect, StateMachine, Transition};
pub use normalizer::normalize;
pub use question::{Choice, Question, QuestionBank, QuestionOption};
pub use scores::Scores;
pub use session::{Phase, Session};
