// Roster domain: players, the two-team assignment table, and the
// application state aggregate.

pub mod player;
pub mod registry;
pub mod state;
pub mod table;

use thiserror::Error;

use player::PlayerId;

/// Errors produced by roster operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("validation error for field `{field}`: {message}")]
    Validation { field: String, message: String },

    #[error("no player with id {id}")]
    NotFound { id: PlayerId },

    #[error("registry is full ({max} players)")]
    CapacityExceeded { max: usize },
}

impl RosterError {
    fn validation(field: &str, message: impl Into<String>) -> Self {
        RosterError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
