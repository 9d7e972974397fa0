use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::protocol::ServerMessage;

/// Opaque per-connection token, generated at connect time
pub type ConnectionId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    Rock,
    Paper,
    Scissors,
}

impl Choice {
    /// Fixed enumeration order, also the tie-break order for `Tally::top_choice`
    pub const ALL: [Choice; 3] = [Choice::Rock, Choice::Paper, Choice::Scissors];

    pub fn random(rng: &mut impl Rng) -> Choice {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    pub fn beats(self, other: Choice) -> bool {
        matches!(
            (self, other),
            (Choice::Rock, Choice::Scissors)
                | (Choice::Paper, Choice::Rock)
                | (Choice::Scissors, Choice::Paper)
        )
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Voting,
    Results,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Team1,
    Team2,
    Tie,
}

/// Team identifier, serialized as 1 or 2 on the wire
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum TeamId {
    One,
    Two,
}

impl From<TeamId> for u8 {
    fn from(team: TeamId) -> u8 {
        match team {
            TeamId::One => 1,
            TeamId::Two => 2,
        }
    }
}

impl TryFrom<u8> for TeamId {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(TeamId::One),
            2 => Ok(TeamId::Two),
            other => Err(format!("Invalid team number: {}", other)),
        }
    }
}

/// Who won a round, given each team's choice
pub fn winner_of(team1: Choice, team2: Choice) -> Winner {
    if team1 == team2 {
        Winner::Tie
    } else if team1.beats(team2) {
        Winner::Team1
    } else {
        Winner::Team2
    }
}

/// Per-choice vote counts for one team, reset at every voting phase entry
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tally {
    pub rock: u32,
    pub paper: u32,
    pub scissors: u32,
}

impl Tally {
    pub fn add(&mut self, choice: Choice) {
        match choice {
            Choice::Rock => self.rock += 1,
            Choice::Paper => self.paper += 1,
            Choice::Scissors => self.scissors += 1,
        }
    }

    pub fn count(&self, choice: Choice) -> u32 {
        match choice {
            Choice::Rock => self.rock,
            Choice::Paper => self.paper,
            Choice::Scissors => self.scissors,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rock == 0 && self.paper == 0 && self.scissors == 0
    }

    pub fn reset(&mut self) {
        *self = Tally::default();
    }

    /// Winning choice for this tally. An all-zero tally falls back to a random
    /// choice so the round still produces a result; a tie for the maximum keeps
    /// the first choice in rock, paper, scissors order.
    pub fn top_choice(&self, rng: &mut impl Rng) -> Choice {
        if self.is_empty() {
            return Choice::random(rng);
        }
        let mut best = Choice::Rock;
        for choice in Choice::ALL {
            if self.count(choice) > self.count(best) {
                best = choice;
            }
        }
        best
    }
}

/// One side of the game: roster, current tally, result choice, running score
#[derive(Debug, Clone, Default)]
pub struct TeamSide {
    pub roster: HashSet<ConnectionId>,
    pub votes: Tally,
    /// Set only during the results phase
    pub choice: Option<Choice>,
    /// Cumulative across games, never reset
    pub score: u32,
}

/// The single process-wide game, mutated only through the state machine
#[derive(Debug, Clone)]
pub struct Game {
    pub phase: Phase,
    pub game_number: u32,
    pub time_left: u32,
    pub team1: TeamSide,
    pub team2: TeamSide,
    pub winner: Option<Winner>,
}

impl Game {
    pub fn new(voting_secs: u32) -> Self {
        Self {
            phase: Phase::Voting,
            game_number: 1,
            time_left: voting_secs,
            team1: TeamSide::default(),
            team2: TeamSide::default(),
            winner: None,
        }
    }

    pub fn team(&self, id: TeamId) -> &TeamSide {
        match id {
            TeamId::One => &self.team1,
            TeamId::Two => &self.team2,
        }
    }

    pub fn team_mut(&mut self, id: TeamId) -> &mut TeamSide {
        match id {
            TeamId::One => &mut self.team1,
            TeamId::Two => &mut self.team2,
        }
    }
}

/// A live network session
#[derive(Debug, Clone)]
pub struct Connection {
    pub id: ConnectionId,
    /// Fixed until disconnect, no mid-game team switching
    pub team: TeamId,
    pub has_voted: bool,
    pub vote: Option<Choice>,
    /// Refreshed on every inbound frame, checked by the idle sweeper
    pub last_activity: Instant,
    /// Bounded outbound channel; dropping it closes the socket task
    pub tx: mpsc::Sender<ServerMessage>,
}

/// Synthetic participant, created once at startup and never destroyed
#[derive(Debug, Clone)]
pub struct Bot {
    pub id: String,
    pub team: TeamId,
}
