use super::AppState;
use crate::types::*;
use rand::Rng;

impl AppState {
    /// Pick a team for a new connection and add it to that roster in one
    /// critical section, so back-to-back joins see each other's assignment.
    /// Smaller roster wins; equal rosters are decided by coin flip.
    pub async fn assign_team(&self, connection_id: &ConnectionId) -> TeamId {
        let mut game = self.game.write().await;

        let len1 = game.team1.roster.len();
        let len2 = game.team2.roster.len();
        let team = if len1 < len2 {
            TeamId::One
        } else if len2 < len1 {
            TeamId::Two
        } else if self.rng.lock().await.random_bool(0.5) {
            TeamId::One
        } else {
            TeamId::Two
        };

        game.team_mut(team).roster.insert(connection_id.clone());
        team
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn test_state() -> AppState {
        AppState::new(Config {
            bot_count: 0,
            rng_seed: Some(1),
            ..Config::default()
        })
    }

    #[tokio::test]
    async fn test_assignment_never_unbalances_by_more_than_one() {
        let state = test_state();

        for i in 0..25 {
            let id = format!("conn_{}", i);
            state.assign_team(&id).await;

            let game = state.get_game().await;
            let len1 = game.team1.roster.len() as i64;
            let len2 = game.team2.roster.len() as i64;
            assert!(
                (len1 - len2).abs() <= 1,
                "rosters diverged after {} joins: {} vs {}",
                i + 1,
                len1,
                len2
            );
        }

        let game = state.get_game().await;
        assert_eq!(game.team1.roster.len() + game.team2.roster.len(), 25);
    }

    #[tokio::test]
    async fn test_smaller_team_gets_the_next_join() {
        let state = test_state();

        // Seed an imbalance by hand
        state
            .game
            .write()
            .await
            .team1
            .roster
            .extend(["a".to_string(), "b".to_string()]);

        let team = state.assign_team(&"c".to_string()).await;
        assert_eq!(team, TeamId::Two);
        assert!(state.get_game().await.team2.roster.contains("c"));
    }
}
