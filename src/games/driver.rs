//! Round Driver
//!
//! Runs the two-phase round protocol on a timer: a burst of cosmetic preview
//! frames, one authoritative draw, a short reveal pause, then settlement.
//! The session lock is only held for each individual step so renderers can
//! keep reading snapshots while the dice shake.
//!
//! If the round future is dropped part way (a timeout, a losing `select!`
//! branch, an aborted task) the table is never left locked: a round that has
//! not committed goes back to idle with its stakes intact, and a committed
//! round is settled on the spot.

use crate::config::AnimationConfig;
use crate::errors::RoundRejection;
use crate::games::draw::DrawSource;
use crate::games::session::GameSession;
use crate::games::types::{RoundPhase, RoundReport};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Timer-driven executor for animated rounds
#[derive(Debug, Clone)]
pub struct RoundDriver {
    animation: AnimationConfig,
}

impl RoundDriver {
    pub fn new(animation: AnimationConfig) -> Self {
        Self { animation }
    }

    pub fn animation(&self) -> &AnimationConfig {
        &self.animation
    }

    /// Play one animated round to settlement.
    ///
    /// Flipping `cancel` to `true` cuts the preview burst short; the round
    /// still commits and settles exactly once.
    pub async fn run<D: DrawSource>(
        &self,
        session: &Mutex<GameSession<D>>,
        mut cancel: Option<watch::Receiver<bool>>,
    ) -> Result<RoundReport, RoundRejection> {
        let round = session.lock().await.begin_round()?;
        let mut pending = PendingRound { session, round, finished: false };

        if self.animation.preview_frames > 0 {
            let period = self.animation.preview_interval().max(Duration::from_millis(1));
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            for frame in 0..self.animation.preview_frames {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = cancelled(&mut cancel) => {
                        debug!(round, frame, "Preview cancelled");
                        break;
                    }
                }
                session.lock().await.preview_draw(frame)?;
            }
        }

        session.lock().await.commit_draw()?;

        let reveal = self.animation.reveal_delay();
        if !reveal.is_zero() {
            time::sleep(reveal).await;
        }

        let report = session.lock().await.settle_round();
        pending.finished = true;
        report
    }
}

/// Leaves the table unlocked if `run` stops before settling
struct PendingRound<'a, D: DrawSource> {
    session: &'a Mutex<GameSession<D>>,
    round: u64,
    finished: bool,
}

impl<D: DrawSource> Drop for PendingRound<'_, D> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }

        // No lock is held across the driver's await points, so this only
        // fails if another task is mid-step on the same session.
        let Ok(mut session) = self.session.try_lock() else {
            warn!(round = self.round, "Round dropped while the session was busy");
            return;
        };

        match session.phase() {
            RoundPhase::Rolling { round } if round == self.round => {
                session.abandon_round();
            }
            RoundPhase::Revealing { round, .. } if round == self.round => {
                if let Err(rejection) = session.settle_round() {
                    warn!(round, %rejection, "Could not settle dropped round");
                }
            }
            _ => {}
        }
    }
}

/// Resolves once the cancel flag reads `true`; never resolves without a flag
/// or after the sender is gone.
async fn cancelled(cancel: &mut Option<watch::Receiver<bool>>) {
    if let Some(rx) = cancel {
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
    }
    std::future::pending::<()>().await
}
