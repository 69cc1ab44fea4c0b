//! Game Session
//!
//! One player's table: ledger, history, draw source and round phase, owned in
//! a single value. Rounds run either in one call (`start_round`) or through
//! the two-phase protocol used by animated front-ends:
//!
//! `begin_round` → any number of `preview_draw` → `commit_draw` → `settle_round`
//!
//! Previews are cosmetic. Only the committed draw is ever settled, and nothing
//! observable (balance, history) changes until `settle_round`.

use crate::config::GameConfig;
use crate::errors::{BetRejection, RoundRejection};
use crate::games::draw::{DrawGenerator, DrawSource};
use crate::games::history::RoundHistory;
use crate::games::ledger::BetLedger;
use crate::games::settlement;
use crate::games::types::{
    DrawOutcome, GameEvent, HistoryRecord, RoundPhase, RoundReport, SessionSnapshot, StakeMap,
    Symbol,
};
use tokio::sync::broadcast;
use tracing::{debug, info};
use uuid::Uuid;

const EVENT_CHANNEL_CAPACITY: usize = 256;

pub struct GameSession<D: DrawSource = DrawGenerator> {
    session_id: String,
    ledger: BetLedger,
    history: RoundHistory,
    draws: D,
    phase: RoundPhase,
    rounds_played: u64,
    /// Stakes frozen at `begin_round`; the table is locked until settlement
    round_stakes: Option<StakeMap>,
    events: broadcast::Sender<GameEvent>,
}

impl GameSession<DrawGenerator> {
    /// Fresh session from configuration: full purse, empty table, no history
    pub fn from_config(config: &GameConfig) -> Self {
        Self::new(
            config.table.starting_balance,
            config.table.history_capacity,
            DrawGenerator::from_seed_option(config.draw.seed),
        )
    }
}

impl<D: DrawSource> GameSession<D> {
    pub fn new(starting_balance: u64, history_capacity: usize, draws: D) -> Self {
        let (events, _rx) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let session_id = Uuid::new_v4().to_string();
        debug!(session_id = %session_id, starting_balance, "Session opened");

        Self {
            session_id,
            ledger: BetLedger::new(starting_balance),
            history: RoundHistory::new(history_capacity),
            draws,
            phase: RoundPhase::Idle,
            rounds_played: 0,
            round_stakes: None,
            events,
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<GameEvent> {
        self.events.subscribe()
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn balance(&self) -> u64 {
        self.ledger.balance()
    }

    pub fn stakes(&self) -> &StakeMap {
        self.ledger.stakes()
    }

    pub fn current_total_stake(&self) -> u64 {
        self.ledger.current_total_stake()
    }

    pub fn can_afford(&self, amount: u64) -> bool {
        !self.is_round_in_progress() && self.ledger.can_afford(amount)
    }

    pub fn is_round_in_progress(&self) -> bool {
        self.phase.is_in_progress()
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn rounds_played(&self) -> u64 {
        self.rounds_played
    }

    /// How many settled rounds the history keeps
    pub fn history_capacity(&self) -> usize {
        self.history.capacity()
    }

    /// Recent rounds, newest first
    pub fn history(&self) -> impl ExactSizeIterator<Item = &HistoryRecord> {
        self.history.recent()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            balance: self.balance(),
            stakes: self.stakes().clone(),
            total_stake: self.current_total_stake(),
            phase: self.phase,
            rounds_played: self.rounds_played,
            history: self.history.recent().cloned().collect(),
        }
    }

    pub fn place_bet(&mut self, symbol: Symbol, amount: u64) -> Result<u64, BetRejection> {
        let result = self
            .ledger
            .place_bet(symbol, amount, self.is_round_in_progress());

        match result {
            Ok(symbol_total) => {
                self.publish(GameEvent::BetPlaced {
                    symbol,
                    amount,
                    symbol_total,
                    table_total: self.current_total_stake(),
                });
            }
            Err(rejection) => {
                debug!(session_id = %self.session_id, %symbol, amount, %rejection, "Bet ignored");
            }
        }

        result
    }

    pub fn reset_bets(&mut self) -> Result<(), BetRejection> {
        self.ledger.reset_bets(self.is_round_in_progress())?;
        self.publish(GameEvent::BetsCleared);
        Ok(())
    }

    /// Play a whole round at once: draw, settle, record.
    pub fn start_round(&mut self) -> Result<RoundReport, RoundRejection> {
        self.begin_round()?;
        self.commit_draw()?;
        self.settle_round()
    }

    /// Lock the table and enter the rolling phase. Returns the round number.
    pub fn begin_round(&mut self) -> Result<u64, RoundRejection> {
        if self.is_round_in_progress() {
            return Err(RoundRejection::RoundInProgress);
        }
        let total_stake = self.current_total_stake();
        if total_stake == 0 {
            return Err(RoundRejection::NoStakes);
        }

        let round = self.rounds_played + 1;
        self.round_stakes = Some(self.stakes().clone());
        self.phase = RoundPhase::Rolling { round };

        info!(session_id = %self.session_id, round, total_stake, "Round started");
        self.publish(GameEvent::RoundStarted { round, total_stake });
        Ok(round)
    }

    /// A throwaway draw for the shaking animation. Never settled.
    pub fn preview_draw(&mut self, frame: u32) -> Result<DrawOutcome, RoundRejection> {
        let RoundPhase::Rolling { round } = self.phase else {
            return Err(RoundRejection::NotRolling);
        };

        let outcome = self.draws.draw();
        self.publish(GameEvent::DrawPreview {
            round,
            frame,
            outcome,
        });
        Ok(outcome)
    }

    /// Return a rolling round to idle before its draw is committed.
    ///
    /// Nothing has been settled yet, so the stakes simply stay on the table.
    /// Returns `false` if there is no such round to drop.
    pub fn abandon_round(&mut self) -> bool {
        let RoundPhase::Rolling { round } = self.phase else {
            return false;
        };

        self.round_stakes = None;
        self.phase = RoundPhase::Idle;

        info!(session_id = %self.session_id, round, "Round abandoned before commit");
        self.publish(GameEvent::RoundAbandoned { round });
        true
    }

    /// Fix the authoritative outcome. There is no way back from here.
    pub fn commit_draw(&mut self) -> Result<DrawOutcome, RoundRejection> {
        let RoundPhase::Rolling { round } = self.phase else {
            return Err(RoundRejection::NotRolling);
        };

        let outcome = self.draws.draw();
        self.phase = RoundPhase::Revealing { round, outcome };

        debug!(session_id = %self.session_id, round, %outcome, "Draw committed");
        self.publish(GameEvent::DrawCommitted { round, outcome });
        Ok(outcome)
    }

    /// Settle the committed draw against the frozen stakes and unlock the table.
    pub fn settle_round(&mut self) -> Result<RoundReport, RoundRejection> {
        let RoundPhase::Revealing { round, outcome } = self.phase else {
            return Err(RoundRejection::NotCommitted);
        };
        let stakes = self
            .round_stakes
            .take()
            .ok_or(RoundRejection::NotCommitted)?;

        let settlement = settlement::settle(&stakes, &outcome, self.ledger.balance());
        self.ledger.apply_settlement(&settlement);
        self.history.record(round, outcome, stakes, settlement.profit);
        self.rounds_played = round;
        self.phase = RoundPhase::Idle;

        info!(
            session_id = %self.session_id,
            round,
            %outcome,
            stake = settlement.total_stake,
            payout = settlement.total_payout,
            profit = settlement.profit,
            balance = settlement.new_balance,
            "Round settled"
        );
        self.publish(GameEvent::RoundSettled {
            round,
            outcome,
            total_stake: settlement.total_stake,
            total_payout: settlement.total_payout,
            profit: settlement.profit,
            new_balance: settlement.new_balance,
        });

        Ok(RoundReport {
            round,
            outcome,
            settlement,
        })
    }

    fn publish(&self, event: GameEvent) {
        // No subscribers is normal for headless sessions
        let _ = self.events.send(event);
    }
}
