use crate::types::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    Vote { choice: Choice },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Sent once on connect with the assigned team and id
    Joined {
        team: TeamId,
        player_id: ConnectionId,
    },
    /// Full state snapshot, fanned out to every connection
    GameState {
        phase: Phase,
        game_number: u32,
        time_left: u32,
        team1_score: u32,
        team2_score: u32,
        /// Real connections plus bots on that team
        team1_player_count: usize,
        team2_player_count: usize,
        winner: Option<Winner>,
        team1_choice: Option<Choice>,
        team2_choice: Option<Choice>,
    },
    /// Sent only to the affected team whenever its tally changes
    TeamVotes { team: TeamId, votes: Tally },
    /// Echoed back to the voter only
    VoteConfirmed { choice: Choice },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_vote_wire_format() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"vote","data":{"choice":"rock"}}"#).unwrap();
        let ClientMessage::Vote { choice } = msg;
        assert_eq!(choice, Choice::Rock);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"type":"cheat","data":{}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_joined_wire_format() {
        let msg = ServerMessage::Joined {
            team: TeamId::Two,
            player_id: "abc".to_string(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"joined","data":{"team":2,"playerId":"abc"}}"#);
    }

    #[test]
    fn test_game_state_wire_format() {
        let msg = ServerMessage::GameState {
            phase: Phase::Results,
            game_number: 3,
            time_left: 5,
            team1_score: 1,
            team2_score: 0,
            team1_player_count: 6,
            team2_player_count: 7,
            winner: Some(Winner::Team1),
            team1_choice: Some(Choice::Rock),
            team2_choice: Some(Choice::Scissors),
        };
        let value: serde_json::Value =
            serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "gameState");
        assert_eq!(value["data"]["phase"], "results");
        assert_eq!(value["data"]["gameNumber"], 3);
        assert_eq!(value["data"]["timeLeft"], 5);
        assert_eq!(value["data"]["team1PlayerCount"], 6);
        assert_eq!(value["data"]["winner"], "team1");
        assert_eq!(value["data"]["team2Choice"], "scissors");
    }

    #[test]
    fn test_team_votes_wire_format() {
        let msg = ServerMessage::TeamVotes {
            team: TeamId::One,
            votes: Tally {
                rock: 2,
                paper: 0,
                scissors: 1,
            },
        };
        let value: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "teamVotes");
        assert_eq!(value["data"]["team"], 1);
        assert_eq!(value["data"]["votes"]["rock"], 2);
        assert_eq!(value["data"]["votes"]["scissors"], 1);
    }

    #[test]
    fn test_vote_confirmed_wire_format() {
        let msg = ServerMessage::VoteConfirmed {
            choice: Choice::Paper,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert_eq!(json, r#"{"type":"voteConfirmed","data":{"choice":"paper"}}"#);
    }
}
