//! Bầu Cua - betting, draw and settlement engine
//!
//! A player spreads stakes over six symbols, three symbols are drawn with
//! replacement, and each stake pays once per matching slot. The crate holds
//! the round engine only; rendering is left to whatever front-end drives a
//! [`GameSession`].

pub mod config;
pub mod errors;
pub mod games;

pub use config::{ConfigLoader, GameConfig};
pub use errors::{BauCuaError, BauCuaResult, BetRejection, RoundRejection};
pub use games::{
    DrawGenerator, DrawOutcome, DrawSource, GameEvent, GameSession, RoundDriver, RoundReport,
    SessionRegistry, SettlementResult, StakeMap, Symbol,
};
