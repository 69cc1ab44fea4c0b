pub mod types;
pub mod ledger;
pub mod draw;
pub mod settlement;
pub mod history;
pub mod session;
pub mod driver;
pub mod registry;
pub mod simulator;

pub use types::*;
pub use ledger::BetLedger;
pub use draw::{DrawGenerator, DrawSource, ScriptedDraws};
pub use history::RoundHistory;
pub use session::GameSession;
pub use driver::RoundDriver;
pub use registry::SessionRegistry;
pub use simulator::{SimulationReport, Simulator, StakingPlan};
