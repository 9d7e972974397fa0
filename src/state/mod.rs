mod game;
mod registry;
mod team;
mod vote;

pub use vote::VoteError;

use crate::config::Config;
use crate::types::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared application state
///
/// Lock order is `game` before `connections`; every method that takes both
/// follows it.
#[derive(Clone)]
pub struct AppState {
    pub game: Arc<RwLock<Game>>,
    pub connections: Arc<RwLock<HashMap<ConnectionId, Connection>>>,
    /// Fixed pool, created once at startup
    pub bots: Arc<Vec<Bot>>,
    /// Single seedable generator so tests can pin random outcomes
    pub rng: Arc<Mutex<StdRng>>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            game: Arc::new(RwLock::new(Game::new(config.voting_secs))),
            connections: Arc::new(RwLock::new(HashMap::new())),
            bots: Arc::new(crate::bots::create_pool(config.bot_count)),
            rng: Arc::new(Mutex::new(rng)),
            config,
        }
    }

    /// Current game state, cloned out from under the lock
    pub async fn get_game(&self) -> Game {
        self.game.read().await.clone()
    }

    pub fn team_bot_count(&self, team: TeamId) -> usize {
        self.bots.iter().filter(|b| b.team == team).count()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
