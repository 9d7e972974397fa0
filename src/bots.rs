//! Synthetic participants that keep the game populated.

use crate::state::AppState;
use crate::types::{Bot, Choice, TeamId};
use rand::Rng;
use std::time::Duration;

/// Create the fixed bot pool, alternating teams so both sides stay populated
pub fn create_pool(count: usize) -> Vec<Bot> {
    (0..count)
        .map(|i| Bot {
            id: format!("bot_{}", i + 1),
            team: if i % 2 == 0 { TeamId::One } else { TeamId::Two },
        })
        .collect()
}

/// Schedule one vote per bot at a random offset inside the bot vote window.
///
/// Each bot picks its choice when the delay fires, votes straight into its
/// team's tally (bots are not connections, so no one-vote check applies) and
/// notifies the team. A vote that fires after the game has moved on is
/// dropped silently, which is why the scheduled tasks never need cancelling.
pub fn schedule_bot_votes(state: AppState, game_number: u32) {
    for bot in state.bots.iter().cloned() {
        let state = state.clone();
        tokio::spawn(async move {
            let delay = {
                let mut rng = state.rng.lock().await;
                rng.random_range(0..state.config.bot_vote_window_secs)
            };
            tokio::time::sleep(Duration::from_secs(delay as u64)).await;

            let choice = {
                let mut rng = state.rng.lock().await;
                Choice::random(&mut *rng)
            };

            if state.record_bot_vote(bot.team, choice, game_number).await {
                tracing::debug!("{} (team {:?}) voted {:?}", bot.id, bot.team, choice);
                state.broadcast_team_votes(bot.team).await;
            }
        });
    }
}
