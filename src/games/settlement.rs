//! Settlement Engine
//!
//! Pure conversion of a stake snapshot and a draw outcome into payout, profit
//! and the player's next balance. Each staked symbol pays its stake once per
//! matching slot; unmatched stakes are lost.

use crate::games::types::{DrawOutcome, SettlementResult, StakeMap, Symbol};

/// Payout for a single symbol's stake
pub fn symbol_payout(symbol: Symbol, stake: u64, outcome: &DrawOutcome) -> u64 {
    stake.saturating_mul(outcome.match_count(symbol))
}

/// Settle a round.
///
/// `stakes` must be the snapshot the round was started with and `balance` the
/// balance it was placed against. Totals are computed exactly, so within
/// `MAX_TABLE_STAKE` the result always satisfies `profit = payout - stake`
/// and `new_balance = balance - stake + payout`. Inputs outside those bounds
/// (an over-stake, a table past the limit) clamp at the numeric range instead
/// of wrapping.
pub fn settle(stakes: &StakeMap, outcome: &DrawOutcome, balance: u64) -> SettlementResult {
    let total_stake = stakes.total();
    let payout: i128 = stakes
        .iter()
        .map(|(symbol, stake)| i128::from(stake) * i128::from(outcome.match_count(symbol)))
        .sum();

    let profit = payout - i128::from(total_stake);
    let new_balance = i128::from(balance) + profit;

    SettlementResult {
        total_stake,
        total_payout: clamp_u64(payout),
        profit: i64::try_from(profit).unwrap_or(if profit < 0 { i64::MIN } else { i64::MAX }),
        new_balance: clamp_u64(new_balance),
    }
}

fn clamp_u64(value: i128) -> u64 {
    u64::try_from(value.max(0)).unwrap_or(u64::MAX)
}
