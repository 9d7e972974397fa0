//! Startup configuration, read once from the environment.

use std::str::FromStr;

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Voting phase length in seconds
    pub voting_secs: u32,
    /// Results phase length in seconds
    pub results_secs: u32,
    /// Full snapshots go out every Nth countdown tick
    pub broadcast_every_ticks: u32,
    pub bot_count: usize,
    /// Bots cast their vote within the first N seconds of the voting window
    pub bot_vote_window_secs: u32,
    pub idle_timeout_secs: u64,
    pub idle_sweep_secs: u64,
    /// Fixed seed for reproducible runs; unset means seeded from the OS
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            voting_secs: 30,
            results_secs: 5,
            broadcast_every_ticks: 5,
            bot_count: 10,
            bot_vote_window_secs: 15,
            idle_timeout_secs: 1200,
            idle_sweep_secs: 60,
            rng_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Self {
            port: env_or("PORT", defaults.port),
            voting_secs: env_or("VOTING_SECS", defaults.voting_secs).max(1),
            results_secs: env_or("RESULTS_SECS", defaults.results_secs).max(1),
            broadcast_every_ticks: env_or("BROADCAST_EVERY_TICKS", defaults.broadcast_every_ticks)
                .max(1),
            bot_count: env_or("BOT_COUNT", defaults.bot_count),
            bot_vote_window_secs: env_or("BOT_VOTE_WINDOW_SECS", defaults.bot_vote_window_secs)
                .max(1),
            idle_timeout_secs: env_or("IDLE_TIMEOUT_SECS", defaults.idle_timeout_secs),
            idle_sweep_secs: env_or("IDLE_SWEEP_SECS", defaults.idle_sweep_secs).max(1),
            rng_seed: std::env::var("RNG_SEED")
                .ok()
                .and_then(|v| v.trim().parse().ok()),
        }
    }
}
