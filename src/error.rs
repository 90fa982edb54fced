//! Error types for MovieDNA.

/// Top-level error type for the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Quiz error: {0}")]
    Quiz(#[from] QuizError),

    #[error("Recommendation error: {0}")]
    Recommend(#[from] RecommendError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

/// Database-related errors.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Quiz engine invariant violations.
///
/// None of these are user-input problems: unrecognized answers are handled as a
/// normal re-prompt and never reach this type.
#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("Question index {index} out of range (bank has {len} questions)")]
    OutOfRange { index: usize, len: usize },

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Invalid question bank: {0}")]
    InvalidQuestionBank(String),

    #[error("Stored session is corrupt: {0}")]
    CorruptSession(String),
}

/// Errors from the recommendation request path.
#[derive(Debug, thiserror::Error)]
pub enum RecommendError {
    #[error("No active session: answer the quiz first (send \"start\")")]
    NoActiveSession,

    #[error("TMDB_API_KEY is not configured")]
    MissingCredential,

    #[error("TMDB API error: {0}")]
    UpstreamFailure(String),

    #[error(transparent)]
    Quiz(#[from] QuizError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Result type alias for the service.
pub type Result<T> = std::result::Result<T, Error>;
