//! Fan-out to connected clients and the background tasks that drive the game.
//!
//! Delivery uses each connection's bounded channel with `try_send`: a slow,
//! full, or closed peer is skipped and logged, never allowed to stall the
//! mutation path or abort the rest of the fan-out.

use crate::protocol::ServerMessage;
use crate::state::AppState;
use crate::types::{ConnectionId, TeamId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

impl AppState {
    /// Send to every live connection
    pub async fn broadcast_to_all(&self, msg: ServerMessage) {
        let senders: Vec<(ConnectionId, mpsc::Sender<ServerMessage>)> = {
            let connections = self.connections.read().await;
            connections
                .values()
                .map(|c| (c.id.clone(), c.tx.clone()))
                .collect()
        };

        for (id, tx) in senders {
            if let Err(e) = tx.try_send(msg.clone()) {
                tracing::debug!("Skipping broadcast to {}: {}", id, e);
            }
        }
    }

    /// Send to one team's connections only
    pub async fn broadcast_to_team(&self, team: TeamId, msg: ServerMessage) {
        let senders: Vec<(ConnectionId, mpsc::Sender<ServerMessage>)> = {
            let connections = self.connections.read().await;
            connections
                .values()
                .filter(|c| c.team == team)
                .map(|c| (c.id.clone(), c.tx.clone()))
                .collect()
        };

        for (id, tx) in senders {
            if let Err(e) = tx.try_send(msg.clone()) {
                tracing::debug!("Skipping broadcast to {}: {}", id, e);
            }
        }
    }

    /// Send to a single connection
    pub async fn send_to(&self, connection_id: &ConnectionId, msg: ServerMessage) {
        let tx = self
            .connections
            .read()
            .await
            .get(connection_id)
            .map(|c| c.tx.clone());

        if let Some(tx) = tx {
            if let Err(e) = tx.try_send(msg) {
                tracing::debug!("Skipping send to {}: {}", connection_id, e);
            }
        }
    }

    /// Current tally to the affected team only; the opposing team never sees it
    pub async fn broadcast_team_votes(&self, team: TeamId) {
        let votes = self.team_votes(team).await;
        self.broadcast_to_team(team, ServerMessage::TeamVotes { team, votes })
            .await;
    }
}

/// Spawn the task that drives the 1-second countdown for both phases.
///
/// A single task owns the only interval, so there is never more than one tick
/// stream no matter how many phase transitions happen.
pub fn spawn_game_loop(state: Arc<AppState>) {
    tokio::spawn(async move {
        state.enter_voting().await;

        let mut interval = tokio::time::interval(Duration::from_secs(1));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // First tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            state.tick().await;
        }
    });
}

/// Spawn the sweep that force-closes connections idle past the timeout
pub fn spawn_idle_sweeper(state: Arc<AppState>) {
    tokio::spawn(async move {
        let sweep_every = Duration::from_secs(state.config.idle_sweep_secs);
        let idle_after = Duration::from_secs(state.config.idle_timeout_secs);

        loop {
            tokio::time::sleep(sweep_every).await;

            let evicted = state.evict_idle(idle_after).await;
            if !evicted.is_empty() {
                tracing::info!("Evicted {} idle connection(s)", evicted.len());
                let snapshot = state.snapshot().await;
                state.broadcast_to_all(snapshot).await;
            }
        }
    });
}
