use super::AppState;
use crate::types::*;
use thiserror::Error;

/// Why a vote was not counted. The caller drops these silently per the
/// protocol (no error reply), but the reason is logged and testable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VoteError {
    #[error("votes are only accepted during the voting phase")]
    WrongPhase,
    #[error("unknown connection")]
    UnknownConnection,
    #[error("connection already voted this phase")]
    AlreadyVoted,
}

impl AppState {
    /// Count a connection's vote. One vote per connection per voting phase;
    /// returns the voter's team so the caller can notify its teammates.
    pub async fn record_vote(
        &self,
        connection_id: &ConnectionId,
        choice: Choice,
    ) -> Result<TeamId, VoteError> {
        let mut game = self.game.write().await;
        if game.phase != Phase::Voting {
            return Err(VoteError::WrongPhase);
        }

        let mut connections = self.connections.write().await;
        let conn = connections
            .get_mut(connection_id)
            .ok_or(VoteError::UnknownConnection)?;
        if conn.has_voted {
            return Err(VoteError::AlreadyVoted);
        }

        conn.has_voted = true;
        conn.vote = Some(choice);
        let team = conn.team;
        game.team_mut(team).votes.add(choice);

        tracing::debug!("{} (team {:?}) voted {:?}", connection_id, team, choice);
        Ok(team)
    }

    /// Count a bot vote. Bots are not connections, so there is no
    /// one-vote-per-phase check; a vote scheduled for an earlier game is
    /// dropped (returns false).
    pub async fn record_bot_vote(&self, team: TeamId, choice: Choice, game_number: u32) -> bool {
        let mut game = self.game.write().await;
        if game.phase != Phase::Voting || game.game_number != game_number {
            return false;
        }
        game.team_mut(team).votes.add(choice);
        true
    }

    /// Current tally for one team
    pub async fn team_votes(&self, team: TeamId) -> Tally {
        self.game.read().await.team(team).votes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_state() -> AppState {
        AppState::new(Config {
            bot_count: 0,
            rng_seed: Some(3),
            ..Config::default()
        })
    }

    async fn connect(state: &AppState) -> (ConnectionId, TeamId) {
        let (tx, _rx) = tokio::sync::mpsc::channel(8);
        state.connect(tx).await
    }

    #[tokio::test]
    async fn test_vote_is_counted_once() {
        let state = test_state();
        let (id, team) = connect(&state).await;

        let voted_team = state.record_vote(&id, Choice::Rock).await.unwrap();
        assert_eq!(voted_team, team);
        assert_eq!(state.team_votes(team).await.rock, 1);

        // Second vote in the same phase is rejected and not counted
        assert_eq!(
            state.record_vote(&id, Choice::Paper).await,
            Err(VoteError::AlreadyVoted)
        );
        let tally = state.team_votes(team).await;
        assert_eq!(tally.rock, 1);
        assert_eq!(tally.paper, 0);
    }

    #[tokio::test]
    async fn test_vote_rejected_outside_voting_phase() {
        let state = test_state();
        let (id, _team) = connect(&state).await;

        state.enter_results().await;
        assert_eq!(
            state.record_vote(&id, Choice::Rock).await,
            Err(VoteError::WrongPhase)
        );
    }

    #[tokio::test]
    async fn test_vote_rejected_for_unknown_connection() {
        let state = test_state();
        assert_eq!(
            state.record_vote(&"nobody".to_string(), Choice::Rock).await,
            Err(VoteError::UnknownConnection)
        );
    }

    #[tokio::test]
    async fn test_bot_vote_bypasses_duplicate_check() {
        let state = test_state();
        let game_number = state.get_game().await.game_number;

        assert!(state.record_bot_vote(TeamId::One, Choice::Rock, game_number).await);
        assert!(state.record_bot_vote(TeamId::One, Choice::Rock, game_number).await);
        assert_eq!(state.team_votes(TeamId::One).await.rock, 2);
    }

    #[tokio::test]
    async fn test_stale_bot_vote_is_dropped() {
        let state = test_state();
        let stale_game = state.get_game().await.game_number;

        // Cycle into the next game
        state.enter_results().await;
        state.game.write().await.game_number += 1;
        state.enter_voting().await;

        assert!(!state.record_bot_vote(TeamId::One, Choice::Rock, stale_game).await);
        assert!(state.team_votes(TeamId::One).await.is_empty());
    }

    #[tokio::test]
    async fn test_bot_vote_dropped_during_results() {
        let state = test_state();
        let game_number = state.get_game().await.game_number;

        state.enter_results().await;
        assert!(!state.record_bot_vote(TeamId::Two, Choice::Paper, game_number).await);
    }
}
