use crate::config::GameConfig;
use crate::errors::{BauCuaError, BauCuaResult};
use crate::games::session::GameSession;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

pub type SharedSession = Arc<Mutex<GameSession>>;

/// Independent sessions keyed by player id.
///
/// Each player's session sits behind its own lock; nothing is shared between
/// players.
pub struct SessionRegistry {
    config: GameConfig,
    sessions: Arc<DashMap<String, SharedSession>>,
}

impl SessionRegistry {
    pub fn new(config: GameConfig) -> Self {
        Self {
            config,
            sessions: Arc::new(DashMap::new()),
        }
    }

    /// Existing session for `player_id`, or a fresh one
    pub fn open(&self, player_id: &str) -> SharedSession {
        self.sessions
            .entry(player_id.to_string())
            .or_insert_with(|| {
                info!(player_id, "Opening session");
                Arc::new(Mutex::new(GameSession::from_config(&self.config)))
            })
            .clone()
    }

    pub fn get(&self, player_id: &str) -> BauCuaResult<SharedSession> {
        self.sessions
            .get(player_id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BauCuaError::UnknownSession(player_id.to_string()))
    }

    /// Drop a player's session. Returns whether one existed.
    pub fn close(&self, player_id: &str) -> bool {
        self.sessions.remove(player_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::types::Symbol;

    #[tokio::test]
    async fn test_open_returns_same_session() {
        let registry = SessionRegistry::new(GameConfig::instant());
        let first = registry.open("alice");
        let again = registry.open("alice");

        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let registry = SessionRegistry::new(GameConfig::instant());
        let alice = registry.open("alice");
        let bob = registry.open("bob");

        alice.lock().await.place_bet(Symbol::Cua, 100).unwrap();
        alice.lock().await.start_round().unwrap();

        let bob_table = bob.lock().await;
        assert_eq!(bob_table.balance(), 1_000_000);
        assert_eq!(bob_table.rounds_played(), 0);
        assert_eq!(alice.lock().await.rounds_played(), 1);
    }

    #[test]
    fn test_close_and_unknown_session() {
        let registry = SessionRegistry::new(GameConfig::instant());
        registry.open("carol");

        assert!(registry.close("carol"));
        assert!(!registry.close("carol"));
        assert!(matches!(
            registry.get("carol"),
            Err(BauCuaError::UnknownSession(_))
        ));
    }
}
