use crate::errors::UnknownSymbol;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of symbols drawn per round
pub const DRAW_SLOTS: usize = 3;

/// Largest total a table may hold. A triple on the whole table pays three
/// times this, which still fits the signed profit.
pub const MAX_TABLE_STAKE: u64 = i64::MAX as u64 / 3;

/// The six betting symbols, in table order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    Bau,
    Cua,
    Tom,
    Ca,
    Ga,
    Nai,
}

/// Presentation metadata for a symbol. Only `id` carries meaning in the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub emoji: &'static str,
    pub accent: &'static str,
}

impl Symbol {
    /// All symbols in registry order
    pub const ALL: [Symbol; 6] = [
        Symbol::Bau,
        Symbol::Cua,
        Symbol::Tom,
        Symbol::Ca,
        Symbol::Ga,
        Symbol::Nai,
    ];

    pub fn id(self) -> &'static str {
        self.info().id
    }

    pub fn info(self) -> SymbolInfo {
        match self {
            Symbol::Bau => SymbolInfo { id: "bau", name: "Bầu", emoji: "🎃", accent: "orange" },
            Symbol::Cua => SymbolInfo { id: "cua", name: "Cua", emoji: "🦀", accent: "red" },
            Symbol::Tom => SymbolInfo { id: "tom", name: "Tôm", emoji: "🦐", accent: "pink" },
            Symbol::Ca => SymbolInfo { id: "ca", name: "Cá", emoji: "🐟", accent: "blue" },
            Symbol::Ga => SymbolInfo { id: "ga", name: "Gà", emoji: "🐓", accent: "yellow" },
            Symbol::Nai => SymbolInfo { id: "nai", name: "Nai", emoji: "🦌", accent: "amber" },
        }
    }

    /// Symbol at a registry index (0..6)
    pub fn from_index(index: usize) -> Option<Symbol> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Symbol {
    type Err = UnknownSymbol;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Symbol::ALL
            .iter()
            .copied()
            .find(|symbol| symbol.id() == wanted)
            .ok_or_else(|| UnknownSymbol(s.to_string()))
    }
}

/// Per-symbol stakes. Ordered by registry order so snapshots render stably.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StakeMap(BTreeMap<Symbol, u64>);

impl StakeMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, symbol: Symbol) -> u64 {
        self.0.get(&symbol).copied().unwrap_or(0)
    }

    /// Sum of all stakes, saturating at `u64::MAX`
    pub fn total(&self) -> u64 {
        self.0
            .values()
            .fold(0u64, |acc, amount| acc.saturating_add(*amount))
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Entries with a positive stake
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u64)> + '_ {
        self.0
            .iter()
            .filter(|(_, amount)| **amount > 0)
            .map(|(symbol, amount)| (*symbol, *amount))
    }

    /// Add to a symbol's stake. `None` (and no change) if the stake would overflow.
    pub(crate) fn checked_add(&mut self, symbol: Symbol, amount: u64) -> Option<u64> {
        let stake = self.0.entry(symbol).or_insert(0);
        *stake = stake.checked_add(amount)?;
        Some(*stake)
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<(Symbol, u64)> for StakeMap {
    fn from_iter<I: IntoIterator<Item = (Symbol, u64)>>(iter: I) -> Self {
        let mut stakes = StakeMap::new();
        for (symbol, amount) in iter {
            let stake = stakes.0.entry(symbol).or_insert(0);
            *stake = stake.saturating_add(amount);
        }
        stakes
    }
}

/// Three symbols drawn for a round, in display order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DrawOutcome(pub [Symbol; DRAW_SLOTS]);

impl DrawOutcome {
    pub fn new(slots: [Symbol; DRAW_SLOTS]) -> Self {
        Self(slots)
    }

    pub fn slots(&self) -> &[Symbol; DRAW_SLOTS] {
        &self.0
    }

    /// How many slots show this symbol (0..=3)
    pub fn match_count(&self, symbol: Symbol) -> u64 {
        self.0.iter().filter(|&&slot| slot == symbol).count() as u64
    }
}

impl fmt::Display for DrawOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c] = self.0;
        write!(f, "[{}, {}, {}]", a, b, c)
    }
}

/// Outcome of settling one round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SettlementResult {
    pub total_stake: u64,
    pub total_payout: u64,
    pub profit: i64,
    pub new_balance: u64,
}

/// A settled round, kept in the recent-rounds ledger
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    pub round: u64,
    pub outcome: DrawOutcome,
    pub stakes: StakeMap,
    pub profit: i64,
    pub settled_at: chrono::DateTime<chrono::Utc>,
}

/// Where a session is in the round lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum RoundPhase {
    /// Accepting bets
    Idle,
    /// Dice are shaking; only cosmetic previews exist
    Rolling { round: u64 },
    /// Authoritative draw fixed, awaiting settlement
    Revealing { round: u64, outcome: DrawOutcome },
}

impl RoundPhase {
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, RoundPhase::Idle)
    }
}

/// Everything a renderer needs after a settled round
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundReport {
    pub round: u64,
    pub outcome: DrawOutcome,
    pub settlement: SettlementResult,
}

/// Events published by a session for its presentation collaborator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    BetPlaced {
        symbol: Symbol,
        amount: u64,
        symbol_total: u64,
        table_total: u64,
    },
    BetsCleared,
    RoundStarted {
        round: u64,
        total_stake: u64,
    },
    /// Cosmetic shaking frame; never settled
    DrawPreview {
        round: u64,
        frame: u32,
        outcome: DrawOutcome,
    },
    /// Round dropped before its draw was committed; the stakes stay on the table
    RoundAbandoned {
        round: u64,
    },
    DrawCommitted {
        round: u64,
        outcome: DrawOutcome,
    },
    RoundSettled {
        round: u64,
        outcome: DrawOutcome,
        total_stake: u64,
        total_payout: u64,
        profit: i64,
        new_balance: u64,
    },
}

/// Read-only view of a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub balance: u64,
    pub stakes: StakeMap,
    pub total_stake: u64,
    pub phase: RoundPhase,
    pub rounds_played: u64,
    pub history: Vec<HistoryRecord>,
}
