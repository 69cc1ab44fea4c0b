//! Error types for the Bầu Cua engine
//!
//! Rejections of ordinary player actions (over-staking, acting mid-round) are
//! recoverable values, not faults. Only configuration and I/O problems surface
//! as `BauCuaError`.

use thiserror::Error;

/// Root error type for operations outside the round engine itself
#[derive(Debug, Error)]
pub enum BauCuaError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown session: {0}")]
    UnknownSession(String),
}

/// Configuration loading and validation errors
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration: {0}")]
    SaveFailed(String),
}

/// Why a bet placement or reset was ignored.
///
/// These are expected interaction races (a click landing while the dice are
/// rolling, a chip the balance can no longer cover), so callers usually just
/// refresh their view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BetRejection {
    #[error("Bet amount must be greater than zero")]
    ZeroAmount,

    #[error("A round is in progress")]
    RoundInProgress,

    #[error("Insufficient balance: staked {staked}, requested {requested}, balance {balance}")]
    InsufficientBalance {
        staked: u64,
        requested: u64,
        balance: u64,
    },

    #[error("Table limit reached: staked {staked}, requested {requested}, limit {limit}")]
    TableLimit {
        staked: u64,
        requested: u64,
        limit: u64,
    },
}

/// Why a round could not be started or advanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RoundRejection {
    #[error("A round is already in progress")]
    RoundInProgress,

    #[error("No stakes on the table")]
    NoStakes,

    #[error("No round is rolling")]
    NotRolling,

    #[error("No draw has been committed")]
    NotCommitted,
}

/// Unknown symbol id at a parsing boundary
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown symbol: {0}")]
pub struct UnknownSymbol(pub String);

// Convenience type alias for Results
pub type BauCuaResult<T> = Result<T, BauCuaError>;
