use super::AppState;
use crate::protocol::ServerMessage;
use crate::types::*;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

impl AppState {
    /// Register a new connection: mint an id, assign a team, store the
    /// outbound sender for fan-out. The registry keeps the only sender, so
    /// removing the record is enough to close the socket's outbound channel.
    pub async fn connect(&self, tx: mpsc::Sender<ServerMessage>) -> (ConnectionId, TeamId) {
        let id: ConnectionId = ulid::Ulid::new().to_string();
        let team = self.assign_team(&id).await;

        let conn = Connection {
            id: id.clone(),
            team,
            has_voted: false,
            vote: None,
            last_activity: Instant::now(),
            tx,
        };
        self.connections.write().await.insert(id.clone(), conn);
        (id, team)
    }

    /// Normal lifecycle event, not an error: drop the connection and free its
    /// roster slot. Returns false if it was already gone (e.g. evicted).
    pub async fn disconnect(&self, connection_id: &ConnectionId) -> bool {
        let mut game = self.game.write().await;
        let mut connections = self.connections.write().await;

        match connections.remove(connection_id) {
            Some(conn) => {
                game.team_mut(conn.team).roster.remove(connection_id);
                true
            }
            None => false,
        }
    }

    /// Refresh the idle clock; called on every inbound frame
    pub async fn touch(&self, connection_id: &ConnectionId) {
        if let Some(conn) = self.connections.write().await.get_mut(connection_id) {
            conn.last_activity = Instant::now();
        }
    }

    /// Remove every connection idle for at least `idle_for`. Dropping the
    /// stored sender closes the socket task's outbound channel, which ends the
    /// connection. Returns the evicted ids.
    pub async fn evict_idle(&self, idle_for: Duration) -> Vec<ConnectionId> {
        let now = Instant::now();
        let mut game = self.game.write().await;
        let mut connections = self.connections.write().await;

        let stale: Vec<ConnectionId> = connections
            .values()
            .filter(|c| now.duration_since(c.last_activity) >= idle_for)
            .map(|c| c.id.clone())
            .collect();

        for id in &stale {
            if let Some(conn) = connections.remove(id) {
                game.team_mut(conn.team).roster.remove(id);
                tracing::info!("Evicting idle connection {}", id);
            }
        }

        stale
    }
}
