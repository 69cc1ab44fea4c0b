//! Bầu Cua terminal table
//!
//! Line-oriented front-end for the round engine: interactive play, batch
//! simulation and sample config generation.

use baucua::config::{generate_sample_config, ConfigLoader, GameConfig};
use baucua::games::simulator::{Simulator, StakingPlan};
use baucua::games::{GameEvent, GameSession, RoundDriver, Symbol};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "baucua")]
#[command(about = "Bầu Cua dice table", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play interactively
    Play {
        /// Fixed RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Skip the shake animation
        #[arg(long)]
        instant: bool,
    },
    /// Run many rounds with a fixed staking plan
    Simulate {
        /// Number of rounds
        #[arg(long, default_value = "10000")]
        rounds: u64,

        /// Stake per symbol per round
        #[arg(long, default_value = "10")]
        stake: u64,

        /// Comma-separated symbols to stake on
        #[arg(long, default_value = "bau")]
        symbols: String,

        /// Fixed RNG seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the default configuration to a file
    InitConfig {
        #[arg(long, default_value = "baucua.toml")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let loader = match args.config {
        Some(ref path) => ConfigLoader::new().with_path(path),
        None => ConfigLoader::new(),
    };
    let mut config = loader.load()?;
    init_tracing(&config);

    match args.command {
        Command::Play { seed, instant } => {
            if seed.is_some() {
                config.draw.seed = seed;
            }
            if instant {
                config.animation = baucua::config::AnimationConfig::instant();
            }
            play(config).await?;
        }
        Command::Simulate {
            rounds,
            stake,
            symbols,
            seed,
            json,
        } => {
            if seed.is_some() {
                config.draw.seed = seed;
            }
            simulate(&config, rounds, stake, &symbols, json)?;
        }
        Command::InitConfig { output } => {
            generate_sample_config(&output)?;
            println!("✅ Wrote default configuration to {}", output);
        }
    }

    Ok(())
}

fn init_tracing(config: &GameConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.as_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn simulate(
    config: &GameConfig,
    rounds: u64,
    stake: u64,
    symbols: &str,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let symbols = symbols
        .split(',')
        .map(|s| s.parse::<Symbol>())
        .collect::<Result<Vec<_>, _>>()?;

    let session = GameSession::from_config(config);
    let mut simulator = Simulator::new(session, StakingPlan::flat(&symbols, stake));
    let report = simulator.run(rounds);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("🎲 Simulation");
    println!("=============");
    println!("Rounds played:    {} / {}", report.rounds_played, report.rounds_requested);
    println!(
        "Won / even / lost: {} / {} / {}",
        report.winning_rounds, report.break_even_rounds, report.losing_rounds
    );
    println!("Total wagered:    {}", report.total_wagered);
    println!("Total paid out:   {}", report.total_payout);
    println!("Return to player: {:.2}%", report.return_to_player * 100.0);
    println!("Balance:          {} → {}", report.starting_balance, report.final_balance);
    if let Some(reason) = report.stopped_early {
        println!("Stopped early:    {:?}", reason);
    }
    println!("Elapsed:          {:?}", report.execution_time);

    Ok(())
}

async fn play(config: GameConfig) -> Result<(), Box<dyn std::error::Error>> {
    let session = Arc::new(Mutex::new(GameSession::from_config(&config)));
    let driver = RoundDriver::new(config.animation.clone());

    let mut events = session.lock().await.subscribe();

    print_banner(&config);
    print_status(&*session.lock().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        let words: Vec<&str> = line.split_whitespace().collect();
        match words.as_slice() {
            [] => continue,
            ["bet", symbol, amount] => {
                let symbol = match symbol.parse::<Symbol>() {
                    Ok(symbol) => symbol,
                    Err(e) => {
                        println!("❌ {}", e);
                        continue;
                    }
                };
                let Ok(amount) = amount.parse::<u64>() else {
                    println!("❌ Amount must be a whole number");
                    continue;
                };
                if let Err(rejection) = session.lock().await.place_bet(symbol, amount) {
                    println!("❌ {}", rejection);
                }
            }
            ["reset"] => {
                if let Err(rejection) = session.lock().await.reset_bets() {
                    println!("❌ {}", rejection);
                }
            }
            ["roll"] => {
                let (cancel_tx, cancel_rx) = watch::channel(false);
                let skip = tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        let _ = cancel_tx.send(true);
                    }
                });
                if driver.animation().preview_frames > 0 {
                    println!("   (Ctrl-C skips the shake)");
                }

                // Frames are drawn as they arrive so the shake is visible
                let round = driver.run(&session, Some(cancel_rx));
                tokio::pin!(round);
                let result = loop {
                    tokio::select! {
                        result = &mut round => break result,
                        Ok(event) = events.recv() => render_event(&event),
                    }
                };
                skip.abort();

                if let Err(rejection) = result {
                    println!("❌ {}", rejection);
                }
            }
            ["status"] => print_status(&*session.lock().await),
            ["history"] => print_history(&*session.lock().await),
            ["help"] => print_help(&config),
            ["quit"] | ["exit"] => break,
            _ => println!("❓ Unknown command, try 'help'"),
        }

        // Everything the command produced is shown before the next prompt
        drain_events(&mut events);
    }

    let session = session.lock().await;
    info!(
        rounds = session.rounds_played(),
        balance = session.balance(),
        "Leaving table"
    );
    println!("👋 Final balance: {} xu", session.balance());
    Ok(())
}

fn drain_events(events: &mut broadcast::Receiver<GameEvent>) {
    for_each_pending(events, render_event);
}

/// Hand every already-published event to `handle`, without waiting
fn for_each_pending<F: FnMut(&GameEvent)>(events: &mut broadcast::Receiver<GameEvent>, mut handle: F) {
    loop {
        match events.try_recv() {
            Ok(event) => handle(&event),
            Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                warn!(skipped, "Renderer fell behind");
            }
            Err(_) => break,
        }
    }
}

fn render_event(event: &GameEvent) {
    match event {
        GameEvent::BetPlaced {
            symbol,
            amount,
            symbol_total,
            table_total,
        } => {
            let info = symbol.info();
            println!(
                "💰 +{} on {} {} (now {}, table {})",
                amount, info.emoji, info.name, symbol_total, table_total
            );
        }
        GameEvent::BetsCleared => println!("🧹 Bets cleared"),
        GameEvent::RoundStarted { round, total_stake } => {
            println!("🎲 Round {} - shaking with {} xu on the table...", round, total_stake);
        }
        GameEvent::DrawPreview { outcome, .. } => {
            print!("\r   {}   ", faces(outcome.slots()));
            let _ = std::io::stdout().flush();
        }
        GameEvent::RoundAbandoned { round } => {
            println!("\n↩️  Round {} called off, bets kept", round);
        }
        GameEvent::DrawCommitted { outcome, .. } => {
            println!("\r👉 {}   ", faces(outcome.slots()));
        }
        GameEvent::RoundSettled {
            total_stake,
            total_payout,
            profit,
            new_balance,
            ..
        } => {
            println!("   Staked {} · paid {} · balance {}", total_stake, total_payout, new_balance);
            if *profit > 0 {
                println!("🎉 You won {} xu!", profit);
            } else if *profit == 0 {
                println!("😐 Broke even");
            } else {
                println!("😢 You lost {} xu", -profit);
            }
        }
    }
}

fn faces(slots: &[Symbol; 3]) -> String {
    slots
        .iter()
        .map(|s| format!("{} {}", s.info().emoji, s.info().name))
        .collect::<Vec<_>>()
        .join("  ")
}

fn print_banner(config: &GameConfig) {
    println!("🎲 BẦU CUA 🎲");
    println!("=============");
    print_help(config);
}

fn print_help(config: &GameConfig) {
    let symbols: Vec<&str> = Symbol::ALL.iter().map(|s| s.id()).collect();
    let chips: Vec<String> = config
        .table
        .chip_denominations
        .iter()
        .map(|c| c.to_string())
        .collect();
    println!("Commands:");
    println!("  bet <symbol> <amount>   symbols: {}", symbols.join(", "));
    println!("                          chips: {}", chips.join(", "));
    println!("  reset                   clear your bets");
    println!("  roll                    shake the dice (Ctrl-C skips the shake)");
    println!("  status | history | help | quit");
}

fn print_status<D: baucua::DrawSource>(session: &GameSession<D>) {
    println!("💰 Balance: {} xu", session.balance());
    if session.stakes().is_empty() {
        println!("   No bets on the table");
        return;
    }
    for (symbol, amount) in session.stakes().iter() {
        let info = symbol.info();
        println!("   {} {:<4} {}", info.emoji, info.name, amount);
    }
    println!("   Total: {}", session.current_total_stake());
}

fn print_history<D: baucua::DrawSource>(session: &GameSession<D>) {
    if session.history().len() == 0 {
        println!("📜 No rounds yet");
        return;
    }
    println!("📜 Recent rounds (keeps {})", session.history_capacity());
    for record in session.history() {
        println!(
            "   #{:<4} {}  profit {:+}",
            record.round,
            faces(record.outcome.slots()),
            record.profit
        );
    }
}
