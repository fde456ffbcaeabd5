use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A session-bound query was made with no session context in scope.
    #[error("Permission query made outside a session context")]
    MissingSessionContext,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Whether this error indicates host wiring mistakes rather than runtime data.
    #[must_use]
    pub const fn is_programming_error(&self) -> bool {
        matches!(self, Self::MissingSessionContext)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
