//! WebSocket connection handlers.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{
    domain::{ConnectionId, MessagePushError, RoomName, RoomUpdate, TempoChange},
    infrastructure::dto::websocket::{BeatSyncRelay, ClientMessage, ServerMessage},
    ui::state::AppState,
    usecase::RoomActionError,
};

/// Failure while handling one inbound frame; reported to the sender as `ERROR`
#[derive(Debug, Error)]
enum DispatchError {
    #[error(transparent)]
    Action(#[from] RoomActionError),

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),

    #[error(transparent)]
    Push(#[from] MessagePushError),
}

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that receives messages from the rx channel and pushes them to the WebSocket sender.
///
/// This is the only writer of the socket: every reply and relay for this
/// connection goes through the channel registered in the MessagePusher.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();

    // Create a channel for this connection to receive messages
    let (tx, rx) = mpsc::unbounded_channel();
    let connection = state.connect_client_usecase.execute(tx).await;
    tracing::info!("Connection '{}' opened", connection);

    let state_clone = state.clone();

    // Spawn a task to receive messages from this connection
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    tracing::warn!("WebSocket error on '{}': {}", connection, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => {
                    // t2 of a clock sync: stamped before any parsing
                    let received_at = state_clone.clock.now_millis();
                    handle_text(&state_clone, connection, text.as_str(), received_at).await;
                }
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection);
                    break;
                }
                _ => {}
            }
        }
    });

    // Spawn a task to push queued messages to this connection
    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    // Leave every room and tell the remaining members
    let _ordered = state.room_events.lock().await;
    let departures = state.disconnect_client_usecase.execute(&connection).await;
    for departure in departures {
        if let Some(update) = departure.update
            && let Err(e) = broadcast_room_update(&state, update).await
        {
            tracing::warn!(
                "Failed to broadcast room state of '{}': {}",
                departure.room_name,
                e
            );
        }
    }
    tracing::info!("Connection '{}' closed", connection);
}

/// Parse one text frame, dispatch it and answer failures with `ERROR`
async fn handle_text(state: &AppState, connection: ConnectionId, text: &str, received_at: f64) {
    let result = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message @ ClientMessage::Sync { .. }) => {
            dispatch(state, connection, message, received_at).await
        }
        Ok(message) => {
            // Room state changes and the pushes they cause go out one message at a time
            let _ordered = state.room_events.lock().await;
            dispatch(state, connection, message, received_at).await
        }
        Err(e) => {
            tracing::warn!("Malformed message from '{}': {}", connection, e);
            report_error(state, &connection, format!("Malformed message: {}", e)).await;
            return;
        }
    };

    if let Err(e) = result {
        tracing::warn!("Message from '{}' rejected: {}", connection, e);
        report_error(state, &connection, e.to_string()).await;
    }
}

async fn dispatch(
    state: &AppState,
    connection: ConnectionId,
    message: ClientMessage,
    received_at: f64,
) -> Result<(), DispatchError> {
    match message {
        ClientMessage::Sync { t1 } => {
            let reply = state.sync_clock_usecase.execute(t1, received_at);
            let json = ServerMessage::SyncReply {
                t1: reply.t1,
                t2: reply.t2,
                t3: reply.t3,
            }
            .to_json()?;
            state.push_message_usecase.reply(&connection, &json).await?;
        }
        ClientMessage::JoinRoomRequest {
            room_name,
            client_type,
            bpm,
        } => {
            let outcome = state
                .join_room_usecase
                .execute(connection, RoomName::new(room_name), client_type.into(), bpm)
                .await?;
            let json = ServerMessage::JoinRoomReply {
                user_id: outcome.user_id.value(),
                room_state: (&outcome.update.snapshot).into(),
            }
            .to_json()?;
            state.push_message_usecase.reply(&connection, &json).await?;
            broadcast_room_update(state, outcome.update).await?;
        }
        ClientMessage::SubscribeToRoomRequest { room_name } => {
            let update = state
                .subscribe_room_usecase
                .execute(connection, RoomName::new(room_name.clone()))
                .await;
            let json = ServerMessage::SubscribeToRoomReply { room_name }.to_json()?;
            state.push_message_usecase.reply(&connection, &json).await?;
            broadcast_room_update(state, update).await?;
        }
        ClientMessage::LeaveRoom { room_name } => {
            let departure = state
                .leave_room_usecase
                .execute(&connection, &RoomName::new(room_name))
                .await?;
            if let Some(update) = departure.update {
                broadcast_room_update(state, update).await?;
            }
        }
        ClientMessage::SetTempo(payload) => {
            let change = TempoChange::try_from(&payload).map_err(RoomActionError::from)?;
            let room_name = RoomName::new(payload.room_name.clone());
            let json = ServerMessage::SetTempo(payload).to_json()?;
            state
                .set_tempo_usecase
                .execute(&connection, &room_name, change, &json)
                .await?;
        }
        ClientMessage::SyncBeat(payload) => {
            let room_name = RoomName::new(payload.room_name.clone());
            let outcome = state
                .sync_beat_usecase
                .execute(
                    &connection,
                    &room_name,
                    payload.beat_number,
                    payload.beat_timestamp,
                )
                .await?;
            let json = ServerMessage::SyncBeat(BeatSyncRelay {
                room_name: payload.room_name,
                beat_number: payload.beat_number,
                beat_timestamp: payload.beat_timestamp,
                bpm: outcome.bpm.value(),
            })
            .to_json()?;
            state.sync_beat_usecase.relay(outcome, &json).await?;
        }
        ClientMessage::ScheduleBeat(payload) => {
            let room_name = RoomName::new(payload.room_name.clone());
            let json = ServerMessage::ScheduleBeat(payload).to_json()?;
            state
                .schedule_beat_usecase
                .execute(&connection, &room_name, &json)
                .await?;
        }
        ClientMessage::MotionInput(payload) => {
            let room_name = RoomName::new(payload.room_name.clone());
            let json = ServerMessage::MotionInput(payload).to_json()?;
            state
                .relay_motion_usecase
                .execute(&connection, &room_name, &json)
                .await?;
        }
    }
    Ok(())
}

/// Push `ROOM_STATE_UPDATE` to every member named in the update
async fn broadcast_room_update(state: &AppState, update: RoomUpdate) -> Result<(), DispatchError> {
    let json = ServerMessage::from(&update.snapshot).to_json()?;
    state
        .push_message_usecase
        .broadcast(update.recipients, &json)
        .await?;
    Ok(())
}

async fn report_error(state: &AppState, connection: &ConnectionId, message: String) {
    let json = match ServerMessage::error(message).to_json() {
        Ok(json) => json,
        Err(e) => {
            tracing::error!("Failed to encode error message: {}", e);
            return;
        }
    };
    if let Err(e) = state.push_message_usecase.reply(connection, &json).await {
        tracing::warn!("Failed to report error to '{}': {}", connection, e);
    }
}
