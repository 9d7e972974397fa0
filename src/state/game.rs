use super::AppState;
use crate::protocol::ServerMessage;
use crate::types::*;

/// What a countdown tick decided while the lock was held
enum TickOutcome {
    Idle,
    Broadcast,
    ToResults,
    ToVoting,
}

impl AppState {
    /// Full state snapshot as a wire message. Player counts include bots.
    pub async fn snapshot(&self) -> ServerMessage {
        let game = self.game.read().await;
        ServerMessage::GameState {
            phase: game.phase,
            game_number: game.game_number,
            time_left: game.time_left,
            team1_score: game.team1.score,
            team2_score: game.team2.score,
            team1_player_count: game.team1.roster.len() + self.team_bot_count(TeamId::One),
            team2_player_count: game.team2.roster.len() + self.team_bot_count(TeamId::Two),
            winner: game.winner,
            team1_choice: game.team1.choice,
            team2_choice: game.team2.choice,
        }
    }

    /// Enter the voting phase: zero both tallies, clear results, reset every
    /// connection's vote status, schedule bot votes, broadcast immediately.
    pub async fn enter_voting(&self) {
        let game_number = {
            let mut game = self.game.write().await;
            game.phase = Phase::Voting;
            game.time_left = self.config.voting_secs;
            game.team1.votes.reset();
            game.team2.votes.reset();
            game.team1.choice = None;
            game.team2.choice = None;
            game.winner = None;

            let mut connections = self.connections.write().await;
            for conn in connections.values_mut() {
                conn.has_voted = false;
                conn.vote = None;
            }

            game.game_number
        };

        tracing::info!("Starting game {}", game_number);

        crate::bots::schedule_bot_votes(self.clone(), game_number);

        let snapshot = self.snapshot().await;
        self.broadcast_to_all(snapshot).await;
    }

    /// Enter the results phase: pick each team's top choice, settle the round,
    /// bump the winner's score, broadcast immediately.
    pub async fn enter_results(&self) {
        {
            let mut game = self.game.write().await;
            let mut rng = self.rng.lock().await;

            let choice1 = game.team1.votes.top_choice(&mut *rng);
            let choice2 = game.team2.votes.top_choice(&mut *rng);
            let winner = winner_of(choice1, choice2);

            game.team1.choice = Some(choice1);
            game.team2.choice = Some(choice2);
            match winner {
                Winner::Team1 => game.team1.score += 1,
                Winner::Team2 => game.team2.score += 1,
                Winner::Tie => {}
            }
            game.winner = Some(winner);
            game.phase = Phase::Results;
            game.time_left = self.config.results_secs;

            tracing::info!(
                "Game {} results: team 1 ({:?}) vs team 2 ({:?}) - winner: {:?}",
                game.game_number,
                choice1,
                choice2,
                winner
            );
        }

        let snapshot = self.snapshot().await;
        self.broadcast_to_all(snapshot).await;
    }

    /// Advance the countdown by one second. At zero the phase flips; otherwise a
    /// snapshot goes out on the configured cadence to bound network chatter.
    pub async fn tick(&self) {
        let outcome = {
            let mut game = self.game.write().await;
            game.time_left = game.time_left.saturating_sub(1);
            if game.time_left == 0 {
                match game.phase {
                    Phase::Voting => TickOutcome::ToResults,
                    Phase::Results => {
                        game.game_number += 1;
                        TickOutcome::ToVoting
                    }
                }
            } else if game.time_left % self.config.broadcast_every_ticks == 0 {
                TickOutcome::Broadcast
            } else {
                TickOutcome::Idle
            }
        };

        match outcome {
            TickOutcome::ToResults => self.enter_results().await,
            TickOutcome::ToVoting => self.enter_voting().await,
            TickOutcome::Broadcast => {
                let snapshot = self.snapshot().await;
                self.broadcast_to_all(snapshot).await;
            }
            TickOutcome::Idle => {}
        }
    }
}
