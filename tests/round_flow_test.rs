//! End-to-end round flow through the public API
//! Covers the settlement scenarios, history eviction and concurrent players

use baucua::config::GameConfig;
use baucua::games::{
    DrawGenerator, DrawOutcome, GameEvent, GameSession, RoundDriver, ScriptedDraws,
    SessionRegistry, Symbol,
};
use baucua::{BetRejection, RoundRejection};
use std::sync::Arc;
use tokio::sync::Mutex;

fn scripted(outcomes: Vec<[Symbol; 3]>) -> GameSession<ScriptedDraws> {
    GameSession::new(
        1_000_000,
        5,
        ScriptedDraws::new(outcomes.into_iter().map(DrawOutcome::new)),
    )
}

#[test]
fn test_classic_scenarios() {
    use Symbol::*;

    let mut session = scripted(vec![[Bau, Bau, Cua], [Bau, Bau, Bau], [Bau, Cua, Tom]]);

    // {bau:100} vs [bau,bau,cua]
    session.place_bet(Bau, 100).unwrap();
    let report = session.start_round().unwrap();
    assert_eq!(report.settlement.total_payout, 200);
    assert_eq!(report.settlement.profit, 100);
    assert_eq!(session.balance(), 1_000_100);

    // {cua:50} vs [bau,bau,bau]
    session.place_bet(Cua, 50).unwrap();
    let report = session.start_round().unwrap();
    assert_eq!(report.settlement.total_payout, 0);
    assert_eq!(report.settlement.profit, -50);
    assert_eq!(session.balance(), 1_000_050);

    // {bau:100, cua:50} vs [bau,cua,tom]
    session.place_bet(Bau, 100).unwrap();
    session.place_bet(Cua, 50).unwrap();
    let report = session.start_round().unwrap();
    assert_eq!(report.settlement.total_stake, 150);
    assert_eq!(report.settlement.total_payout, 150);
    assert_eq!(report.settlement.profit, 0);
    assert_eq!(session.balance(), 1_000_050);
}

#[test]
fn test_history_keeps_five_newest_rounds() {
    let mut session = GameSession::new(10_000, 5, DrawGenerator::seeded(99));

    for _ in 0..6 {
        session.place_bet(Symbol::Tom, 10).unwrap();
        session.start_round().unwrap();
    }

    let rounds: Vec<u64> = session.history().map(|record| record.round).collect();
    assert_eq!(rounds, vec![6, 5, 4, 3, 2]);
    assert!(session.history().all(|record| record.stakes.get(Symbol::Tom) == 10));
}

#[test]
fn test_stake_invariant_survives_many_rounds() {
    let mut session = GameSession::new(500, 5, DrawGenerator::seeded(2024));
    let chips = [10, 50, 100];

    for round in 0..200usize {
        for (i, symbol) in Symbol::ALL.iter().enumerate() {
            let _ = session.place_bet(*symbol, chips[(round + i) % chips.len()]);
            assert!(session.current_total_stake() <= session.balance());
        }

        let before = session.balance();
        match session.start_round() {
            Ok(report) => {
                let s = report.settlement;
                assert_eq!(s.new_balance, before - s.total_stake + s.total_payout);
                assert_eq!(session.balance(), s.new_balance);
            }
            Err(RoundRejection::NoStakes) => break,
            Err(other) => panic!("unexpected rejection {:?}", other),
        }
    }
}

#[test]
fn test_reset_bets_only_clears_stakes() {
    let mut session = scripted(vec![]);
    session.place_bet(Symbol::Ga, 100).unwrap();
    session.place_bet(Symbol::Nai, 10).unwrap();

    session.reset_bets().unwrap();

    assert!(session.stakes().is_empty());
    assert_eq!(session.balance(), 1_000_000);
    assert_eq!(session.start_round(), Err(RoundRejection::NoStakes));
}

#[test]
fn test_over_balance_bet_is_ignored() {
    let mut session = GameSession::new(60, 5, DrawGenerator::seeded(1));
    session.place_bet(Symbol::Ca, 50).unwrap();

    assert!(matches!(
        session.place_bet(Symbol::Ca, 50),
        Err(BetRejection::InsufficientBalance { .. })
    ));
    assert_eq!(session.place_bet(Symbol::Ca, 10), Ok(60));
    assert!(!session.can_afford(10));
}

#[tokio::test]
async fn test_animated_round_emits_single_settlement() {
    let session = Mutex::new(GameSession::new(1_000, 5, DrawGenerator::seeded(8)));
    let mut events = {
        let mut table = session.lock().await;
        table.place_bet(Symbol::Cua, 100).unwrap();
        table.subscribe()
    };

    let mut animation = GameConfig::default().animation;
    animation.preview_interval_ms = 1;
    animation.reveal_delay_ms = 1;
    let report = RoundDriver::new(animation).run(&session, None).await.unwrap();

    let mut settled = Vec::new();
    let mut previews = 0;
    while let Ok(event) = events.try_recv() {
        match event {
            GameEvent::DrawPreview { .. } => previews += 1,
            GameEvent::RoundSettled { round, profit, .. } => settled.push((round, profit)),
            _ => {}
        }
    }

    assert_eq!(previews, 21);
    assert_eq!(settled, vec![(1, report.settlement.profit)]);
}

#[tokio::test]
async fn test_players_play_concurrently_without_interference() {
    let registry = Arc::new(SessionRegistry::new(GameConfig::instant()));
    let driver = RoundDriver::new(GameConfig::instant().animation);

    let mut handles = Vec::new();
    for player in 0..8 {
        let registry = registry.clone();
        let driver = driver.clone();
        handles.push(tokio::spawn(async move {
            let session = registry.open(&format!("player-{}", player));
            for _ in 0..10 {
                session.lock().await.place_bet(Symbol::Bau, 100).unwrap();
                driver.run(&session, None).await.unwrap();
            }
            let table = session.lock().await;
            let counts = (table.rounds_played(), table.history().len());
            counts
        }));
    }

    for handle in handles {
        let (rounds, history) = handle.await.unwrap();
        assert_eq!(rounds, 10);
        assert_eq!(history, 5);
    }
    assert_eq!(registry.len(), 8);
}
