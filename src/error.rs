//! Error types for the duel engine.
//!
//! Only session start can fail. Every other intent is total: events that
//! arrive in the wrong phase are reported as
//! [`EventOutcome::Ignored`](crate::duel_engine::EventOutcome) instead.

use std::path::PathBuf;

use thiserror::Error;

use crate::duel_engine::models::Tier;

/// Reasons a session could not be started.
#[derive(Error, Debug)]
pub enum DuelError {
    #[error("Unknown opponent: {0}")]
    UnknownOpponent(String),

    #[error("Opponent '{opponent}' is locked: {wins} wins, needs {threshold}")]
    OpponentLocked {
        opponent: String,
        wins: u32,
        threshold: u32,
    },

    #[error("Question pool too small: requested {requested}, only {available} available")]
    InsufficientQuestions { requested: usize, available: usize },

    #[error("Malformed question '{question_id}': {reason}")]
    MalformedQuestion { question_id: String, reason: String },

    #[error("Invalid settings: {0}")]
    InvalidSettings(#[from] ConfigError),

    #[error("Progression store error: {0}")]
    Progression(#[from] StoreError),
}

impl From<SupplyError> for DuelError {
    fn from(err: SupplyError) -> Self {
        match err {
            SupplyError::InsufficientPool { requested, available } => {
                DuelError::InsufficientQuestions { requested, available }
            }
            SupplyError::Malformed { question_id, reason } => {
                DuelError::MalformedQuestion { question_id, reason }
            }
        }
    }
}

/// Failures reported by a [`QuestionSupplier`](crate::duel_engine::pool::QuestionSupplier).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SupplyError {
    #[error("insufficient pool: requested {requested}, available {available}")]
    InsufficientPool { requested: usize, available: usize },

    #[error("question '{question_id}' is malformed: {reason}")]
    Malformed { question_id: String, reason: String },
}

/// Failures reported by a [`ProgressionStore`](crate::duel_engine::progression::ProgressionStore).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("progression for tier {0} is unavailable")]
    Unavailable(Tier),

    #[error("failed to save progression for tier {tier}: {message}")]
    SaveFailed { tier: Tier, message: String },
}

/// Settings or engine configuration outside the documented ranges.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{field} = {value} is outside {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, DuelError>;
