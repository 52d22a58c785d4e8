//! Error types for the few fallible surfaces of the game.
//!
//! Gameplay itself never fails: unreachable paths are `None`, out-of-bounds
//! lookups are `None`, and acting on a removed entity is a no-op. Errors only
//! come from authored data and configuration.

use thiserror::Error;

/// Errors raised while loading room templates or configuration
#[derive(Error, Debug)]
pub enum GameError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid room template '{id}': {reason}")]
    InvalidTemplate { id: String, reason: String },

    #[error("Required room template '{0}' is missing")]
    MissingTemplate(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for game operations
pub type GameResult<T> = Result<T, GameError>;
