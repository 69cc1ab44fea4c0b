use crate::errors::BetRejection;
use crate::games::types::{SettlementResult, StakeMap, Symbol, MAX_TABLE_STAKE};

/// Live stakes and balance for one player.
///
/// Every mutation is checked before it is applied, so the table total can
/// never exceed the balance (or `MAX_TABLE_STAKE`) and the balance can never
/// go negative.
#[derive(Debug, Clone)]
pub struct BetLedger {
    stakes: StakeMap,
    balance: u64,
}

impl BetLedger {
    pub fn new(balance: u64) -> Self {
        Self {
            stakes: StakeMap::new(),
            balance,
        }
    }

    pub fn balance(&self) -> u64 {
        self.balance
    }

    pub fn stakes(&self) -> &StakeMap {
        &self.stakes
    }

    pub fn current_total_stake(&self) -> u64 {
        self.stakes.total()
    }

    /// Whether `amount` more could be put on the table right now
    pub fn can_afford(&self, amount: u64) -> bool {
        amount > 0
            && self
                .current_total_stake()
                .checked_add(amount)
                .is_some_and(|total| total <= self.balance && total <= MAX_TABLE_STAKE)
    }

    /// Add `amount` to the stake on `symbol`. Returns the symbol's new stake.
    pub fn place_bet(
        &mut self,
        symbol: Symbol,
        amount: u64,
        round_in_progress: bool,
    ) -> Result<u64, BetRejection> {
        if amount == 0 {
            return Err(BetRejection::ZeroAmount);
        }
        if round_in_progress {
            return Err(BetRejection::RoundInProgress);
        }
        let staked = self.current_total_stake();
        let total = staked.checked_add(amount);
        if total.map_or(true, |total| total > self.balance) {
            return Err(BetRejection::InsufficientBalance {
                staked,
                requested: amount,
                balance: self.balance,
            });
        }
        if total.map_or(true, |total| total > MAX_TABLE_STAKE) {
            return Err(BetRejection::TableLimit {
                staked,
                requested: amount,
                limit: MAX_TABLE_STAKE,
            });
        }

        // the table total fits, so no single stake can overflow
        self.stakes
            .checked_add(symbol, amount)
            .ok_or(BetRejection::TableLimit {
                staked,
                requested: amount,
                limit: MAX_TABLE_STAKE,
            })
    }

    /// Clear every stake; the balance is untouched
    pub fn reset_bets(&mut self, round_in_progress: bool) -> Result<(), BetRejection> {
        if round_in_progress {
            return Err(BetRejection::RoundInProgress);
        }
        self.stakes.clear();
        Ok(())
    }

    /// Apply a settled round: take the new balance and empty the table.
    pub fn apply_settlement(&mut self, result: &SettlementResult) {
        self.balance = result.new_balance;
        self.stakes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bets_accumulate() {
        let mut ledger = BetLedger::new(1_000);

        assert_eq!(ledger.place_bet(Symbol::Bau, 10, false), Ok(10));
        assert_eq!(ledger.place_bet(Symbol::Bau, 50, false), Ok(60));
        assert_eq!(ledger.place_bet(Symbol::Nai, 100, false), Ok(100));
        assert_eq!(ledger.current_total_stake(), 160);
        assert_eq!(ledger.balance(), 1_000);
    }

    #[test]
    fn test_rejects_over_stake() {
        let mut ledger = BetLedger::new(100);
        ledger.place_bet(Symbol::Cua, 100, false).unwrap();

        let rejected = ledger.place_bet(Symbol::Tom, 10, false);
        assert_eq!(
            rejected,
            Err(BetRejection::InsufficientBalance {
                staked: 100,
                requested: 10,
                balance: 100,
            })
        );
        assert_eq!(ledger.current_total_stake(), 100);
    }

    #[test]
    fn test_rejects_zero_and_in_progress() {
        let mut ledger = BetLedger::new(100);

        assert_eq!(ledger.place_bet(Symbol::Ga, 0, false), Err(BetRejection::ZeroAmount));
        assert_eq!(
            ledger.place_bet(Symbol::Ga, 10, true),
            Err(BetRejection::RoundInProgress)
        );
        assert!(ledger.stakes().is_empty());
    }

    #[test]
    fn test_stake_never_exceeds_balance() {
        let mut ledger = BetLedger::new(235);
        let chips = [10, 50, 100, 10, 100, 50, 10, 10, 100, 50];

        for (i, chip) in chips.iter().enumerate() {
            let symbol = Symbol::ALL[i % Symbol::ALL.len()];
            let _ = ledger.place_bet(symbol, *chip, false);
            assert!(ledger.current_total_stake() <= ledger.balance());
        }
    }

    #[test]
    fn test_reset_keeps_balance() {
        let mut ledger = BetLedger::new(500);
        ledger.place_bet(Symbol::Ca, 50, false).unwrap();

        assert_eq!(ledger.reset_bets(true), Err(BetRejection::RoundInProgress));
        assert_eq!(ledger.current_total_stake(), 50);

        ledger.reset_bets(false).unwrap();
        assert!(ledger.stakes().is_empty());
        assert_eq!(ledger.balance(), 500);
    }

    #[test]
    fn test_overflowing_amount_is_rejected() {
        let mut ledger = BetLedger::new(100);
        ledger.place_bet(Symbol::Bau, 60, false).unwrap();

        assert!(!ledger.can_afford(u64::MAX));
        assert!(matches!(
            ledger.place_bet(Symbol::Cua, u64::MAX, false),
            Err(BetRejection::InsufficientBalance { .. })
        ));
        assert_eq!(ledger.current_total_stake(), 60);
    }

    #[test]
    fn test_table_total_capped_at_limit() {
        let mut ledger = BetLedger::new(u64::MAX);

        assert_eq!(
            ledger.place_bet(Symbol::Bau, MAX_TABLE_STAKE, false),
            Ok(MAX_TABLE_STAKE)
        );
        assert!(!ledger.can_afford(1));
        assert_eq!(
            ledger.place_bet(Symbol::Cua, 1, false),
            Err(BetRejection::TableLimit {
                staked: MAX_TABLE_STAKE,
                requested: 1,
                limit: MAX_TABLE_STAKE,
            })
        );

        let mut fresh = BetLedger::new(1 << 63);
        assert!(matches!(
            fresh.place_bet(Symbol::Bau, 1 << 63, false),
            Err(BetRejection::TableLimit { .. })
        ));
        assert!(fresh.stakes().is_empty());
    }
}
