//! Headless round simulator
//!
//! Plays many rounds with a fixed staking plan on a fresh session and reports
//! return-to-player figures. Useful for sanity-checking the payout rule and
//! the draw generator together.

use crate::errors::BetRejection;
use crate::games::draw::DrawSource;
use crate::games::session::GameSession;
use crate::games::types::{Symbol, MAX_TABLE_STAKE};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Stakes placed at the start of every simulated round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StakingPlan {
    pub stakes: Vec<(Symbol, u64)>,
}

impl StakingPlan {
    /// Same stake on each listed symbol
    pub fn flat(symbols: &[Symbol], stake: u64) -> Self {
        Self {
            stakes: symbols.iter().map(|symbol| (*symbol, stake)).collect(),
        }
    }

    /// Total staked per round; `None` if it overflows
    pub fn total(&self) -> Option<u64> {
        self.stakes
            .iter()
            .try_fold(0u64, |acc, (_, amount)| acc.checked_add(*amount))
    }
}

/// Why a simulation ended before the requested number of rounds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The plan no longer fits the balance
    OutOfFunds,
    /// The plan stakes nothing
    EmptyPlan,
    /// The plan could never be placed on one table
    InvalidPlan,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub rounds_requested: u64,
    pub rounds_played: u64,
    pub winning_rounds: u64,
    pub break_even_rounds: u64,
    pub losing_rounds: u64,
    pub total_wagered: u64,
    pub total_payout: u64,
    pub starting_balance: u64,
    pub final_balance: u64,
    pub return_to_player: f64,
    pub house_edge: f64,
    pub stopped_early: Option<StopReason>,
    pub execution_time: Duration,
}

pub struct Simulator<D: DrawSource> {
    session: GameSession<D>,
    plan: StakingPlan,
}

impl<D: DrawSource> Simulator<D> {
    pub fn new(session: GameSession<D>, plan: StakingPlan) -> Self {
        Self { session, plan }
    }

    pub fn session(&self) -> &GameSession<D> {
        &self.session
    }

    /// Play up to `rounds` rounds
    pub fn run(&mut self, rounds: u64) -> SimulationReport {
        let start_time = Instant::now();
        let starting_balance = self.session.balance();

        let mut report = SimulationReport {
            rounds_requested: rounds,
            rounds_played: 0,
            winning_rounds: 0,
            break_even_rounds: 0,
            losing_rounds: 0,
            total_wagered: 0,
            total_payout: 0,
            starting_balance,
            final_balance: starting_balance,
            return_to_player: 0.0,
            house_edge: 0.0,
            stopped_early: None,
            execution_time: Duration::default(),
        };

        let plan_total = match self.plan.total() {
            Some(0) => {
                report.stopped_early = Some(StopReason::EmptyPlan);
                0
            }
            Some(total) if total <= MAX_TABLE_STAKE => total,
            _ => {
                warn!("Staking plan exceeds the table limit");
                report.stopped_early = Some(StopReason::InvalidPlan);
                0
            }
        };

        while report.stopped_early.is_none() && report.rounds_played < rounds {
            if plan_total > self.session.balance() {
                debug!(balance = self.session.balance(), "Plan no longer affordable");
                report.stopped_early = Some(StopReason::OutOfFunds);
                break;
            }

            if let Err(rejection) = self.place_plan() {
                warn!(%rejection, "Staking plan rejected");
                report.stopped_early = Some(match rejection {
                    BetRejection::InsufficientBalance { .. } => StopReason::OutOfFunds,
                    _ => StopReason::InvalidPlan,
                });
                break;
            }

            let Ok(round) = self.session.start_round() else {
                report.stopped_early = Some(StopReason::OutOfFunds);
                break;
            };

            let settlement = round.settlement;
            report.rounds_played += 1;
            report.total_wagered = report.total_wagered.saturating_add(settlement.total_stake);
            report.total_payout = report.total_payout.saturating_add(settlement.total_payout);
            match settlement.profit {
                p if p > 0 => report.winning_rounds += 1,
                0 => report.break_even_rounds += 1,
                _ => report.losing_rounds += 1,
            }
        }

        report.final_balance = self.session.balance();
        if report.total_wagered > 0 {
            report.return_to_player = report.total_payout as f64 / report.total_wagered as f64;
            report.house_edge = 1.0 - report.return_to_player;
        }
        report.execution_time = start_time.elapsed();

        info!(
            rounds = report.rounds_played,
            wagered = report.total_wagered,
            paid = report.total_payout,
            rtp = report.return_to_player,
            "Simulation finished"
        );

        report
    }

    /// Put the whole plan on the table, or nothing at all
    fn place_plan(&mut self) -> Result<(), BetRejection> {
        for (symbol, amount) in &self.plan.stakes {
            if *amount == 0 {
                continue;
            }
            if let Err(rejection) = self.session.place_bet(*symbol, *amount) {
                // the table is idle between rounds, so clearing cannot be refused
                let _ = self.session.reset_bets();
                return Err(rejection);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::draw::{DrawGenerator, ScriptedDraws};
    use crate::games::types::DrawOutcome;

    #[test]
    fn test_single_symbol_rtp_is_one_half() {
        let session = GameSession::new(1_000_000, 5, DrawGenerator::seeded(11));
        let mut simulator = Simulator::new(session, StakingPlan::flat(&[Symbol::Bau], 10));

        let report = simulator.run(20_000);

        assert_eq!(report.rounds_played, 20_000);
        assert_eq!(report.total_wagered, 200_000);
        // Expected matches per die-set is 3 × 1/6
        assert!((report.return_to_player - 0.5).abs() < 0.05, "rtp {}", report.return_to_player);
        assert_eq!(
            report.final_balance,
            report.starting_balance - report.total_wagered + report.total_payout
        );
    }

    #[test]
    fn test_stops_when_out_of_funds() {
        let losing = DrawOutcome::new([Symbol::Nai, Symbol::Nai, Symbol::Nai]);
        let session = GameSession::new(100, 5, ScriptedDraws::new([losing; 3]));
        let mut simulator = Simulator::new(session, StakingPlan::flat(&[Symbol::Bau], 50));

        let report = simulator.run(10);

        assert_eq!(report.rounds_played, 2);
        assert_eq!(report.losing_rounds, 2);
        assert_eq!(report.final_balance, 0);
        assert_eq!(report.stopped_early, Some(StopReason::OutOfFunds));
    }

    #[test]
    fn test_empty_plan_plays_nothing() {
        let session = GameSession::new(100, 5, DrawGenerator::seeded(1));
        let mut simulator = Simulator::new(session, StakingPlan { stakes: vec![] });

        let report = simulator.run(10);
        assert_eq!(report.rounds_played, 0);
        assert_eq!(report.stopped_early, Some(StopReason::EmptyPlan));
    }

    #[test]
    fn test_history_stays_bounded() {
        let session = GameSession::new(1_000, 5, DrawGenerator::seeded(5));
        let mut simulator = Simulator::new(session, StakingPlan::flat(&[Symbol::Ca, Symbol::Ga], 1));

        simulator.run(30);
        assert!(simulator.session().history().len() <= 5);
    }

    #[test]
    fn test_overflowing_plan_is_refused() {
        let session = GameSession::new(1_000, 5, DrawGenerator::seeded(2));
        let plan = StakingPlan::flat(&[Symbol::Bau, Symbol::Cua], u64::MAX);
        assert_eq!(plan.total(), None);

        let mut simulator = Simulator::new(session, plan);
        let report = simulator.run(3);

        assert_eq!(report.rounds_played, 0);
        assert_eq!(report.stopped_early, Some(StopReason::InvalidPlan));
        assert_eq!(report.final_balance, 1_000);
    }

    #[test]
    fn test_rejected_plan_leaves_table_clear() {
        // each stake fits the balance alone; the plan is judged on its total
        let session = GameSession::new(100, 5, DrawGenerator::seeded(4));
        let plan = StakingPlan {
            stakes: vec![(Symbol::Ga, 60), (Symbol::Nai, 0), (Symbol::Ga, 60)],
        };
        let mut simulator = Simulator::new(session, plan);

        let report = simulator.run(5);

        assert_eq!(report.rounds_played, 0);
        assert_eq!(report.stopped_early, Some(StopReason::OutOfFunds));
        assert!(simulator.session().stakes().is_empty());
    }
}
