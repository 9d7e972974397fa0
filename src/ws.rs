use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::AppState;
use crate::types::{ConnectionId, Phase};

/// Outbound buffer per connection; a peer that falls this far behind starts
/// missing snapshots instead of stalling the server
const OUTBOUND_BUFFER: usize = 64;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let (tx, mut rx) = mpsc::channel::<ServerMessage>(OUTBOUND_BUFFER);
    let (id, team) = state.connect(tx).await;
    tracing::info!("{} joined team {:?}", id, team);

    // Join ack goes straight out the socket, ahead of any fan-out
    let joined = ServerMessage::Joined {
        team,
        player_id: id.clone(),
    };
    if let Ok(json) = serde_json::to_string(&joined) {
        if sender.send(Message::Text(json.into())).await.is_err() {
            state.disconnect(&id).await;
            return;
        }
    }

    // Everyone sees the new player count; the joiner also gets its team's
    // current tally if a vote is in progress
    let snapshot = state.snapshot().await;
    state.broadcast_to_all(snapshot).await;
    if state.get_game().await.phase == Phase::Voting {
        state.broadcast_team_votes(team).await;
    }

    loop {
        tokio::select! {
            outbound = rx.recv() => {
                match outbound {
                    Some(msg) => {
                        if let Ok(json) = serde_json::to_string(&msg) {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                break;
                            }
                        }
                    }
                    // The registry dropped our sender: idle eviction
                    None => break,
                }
            }

            inbound = receiver.next() => {
                match inbound {
                    Some(Ok(Message::Text(text))) => {
                        state.touch(&id).await;
                        match serde_json::from_str::<ClientMessage>(&text) {
                            Ok(msg) => handle_client_message(msg, &id, &state).await,
                            Err(e) => {
                                // Malformed input is ignored, the connection stays open
                                tracing::warn!("Ignoring malformed message from {}: {}", id, e);
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        state.touch(&id).await;
                        if sender.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket error for {}: {}", id, e);
                        break;
                    }
                }
            }
        }
    }

    if state.disconnect(&id).await {
        tracing::info!("{} disconnected", id);
        let snapshot = state.snapshot().await;
        state.broadcast_to_all(snapshot).await;
    }
}

async fn handle_client_message(msg: ClientMessage, connection_id: &ConnectionId, state: &AppState) {
    match msg {
        ClientMessage::Vote { choice } => match state.record_vote(connection_id, choice).await {
            Ok(team) => {
                state
                    .send_to(connection_id, ServerMessage::VoteConfirmed { choice })
                    .await;
                state.broadcast_team_votes(team).await;
            }
            // Invalid votes get no reply at all
            Err(e) => tracing::debug!("Rejected vote from {}: {}", connection_id, e),
        },
    }
}
