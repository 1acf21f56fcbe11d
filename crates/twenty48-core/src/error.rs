use thiserror::Error;

/// Errors produced by the engine.
///
/// Board conditions such as a full grid or a move that changes nothing are
/// not errors; they surface as `changed == false` move outcomes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Bad board size, win target or grid contents at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed direction or other caller input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Lifecycle transition not allowed from the current status.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),
}

/// Convenience Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
