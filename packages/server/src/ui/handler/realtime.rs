//! Realtime WebSocket handlers.
//!
//! Two independent endpoints per room: the message change feed (server →
//! client only) and the typing broadcast channel (both directions).

use std::sync::Arc;

use axum::{
    extract::{
        Path, Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::{
    domain::{ChatMessage, RoomId, TypingAnnouncement, UserId},
    infrastructure::{
        dto::realtime::{BroadcastFrameDto, FeedEventDto, RealtimeQuery},
        realtime::{ConnectionId, TypingEnvelope},
    },
    ui::state::AppState,
};

use super::error::ApiError;

/// `GET /realtime/v1/messages/{room_id}?access_token=`
pub async fn message_feed_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<RealtimeQuery>,
) -> Result<Response, ApiError> {
    let (user_id, room_id) = authorize(&state, room_id, query).await?;

    // Register before the upgrade so inserts right after the handshake are delivered
    let feed = state.hub.subscribe_messages(&room_id).await;
    tracing::info!("'{}' subscribed to message feed of '{}'", user_id, room_id);

    Ok(ws.on_upgrade(move |socket| stream_message_feed(socket, feed, room_id, user_id)))
}

/// `GET /realtime/v1/typing/{room_id}?access_token=`
pub async fn typing_channel_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
    Query(query): Query<RealtimeQuery>,
) -> Result<Response, ApiError> {
    let (user_id, room_id) = authorize(&state, room_id, query).await?;

    let channel = state.hub.subscribe_typing(&room_id).await;
    tracing::info!("'{}' joined typing channel of '{}'", user_id, room_id);

    Ok(ws.on_upgrade(move |socket| relay_typing(socket, state, channel, room_id, user_id)))
}

async fn authorize(
    state: &AppState,
    room_id: String,
    query: RealtimeQuery,
) -> Result<(UserId, RoomId), ApiError> {
    let token = query.access_token.unwrap_or_default();
    let user_id = state.authenticate_usecase().verify_token(&token).await?;

    let room_id = RoomId::new(room_id).map_err(|_| ApiError::BadRequest("Invalid room_id"))?;
    let room = state.rooms.find_room(&room_id).await.map_err(|e| {
        tracing::error!("Error looking up room '{}': {}", room_id, e);
        ApiError::Internal
    })?;
    if room.is_none() {
        return Err(ApiError::NotFound("Room not found"));
    }

    Ok((user_id, room_id))
}

async fn stream_message_feed(
    socket: WebSocket,
    mut feed: broadcast::Receiver<ChatMessage>,
    room_id: RoomId,
    user_id: UserId,
) {
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            inserted = feed.recv() => match inserted {
                Ok(message) => {
                    let frame = FeedEventDto::from(&message);
                    let json = match serde_json::to_string(&frame) {
                        Ok(json) => json,
                        Err(e) => {
                            tracing::error!("Failed to encode feed event: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        "Message feed for '{}' in '{}' lagged, {} events skipped",
                        user_id,
                        room_id,
                        skipped
                    );
                }
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    tracing::debug!("Message feed socket error: {}", e);
                    break;
                }
                // the feed is push-only; anything the client sends is ignored
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::info!("'{}' left message feed of '{}'", user_id, room_id);
}

async fn relay_typing(
    socket: WebSocket,
    state: Arc<AppState>,
    mut channel: broadcast::Receiver<TypingEnvelope>,
    room_id: RoomId,
    user_id: UserId,
) {
    let origin: ConnectionId = uuid::Uuid::new_v4();
    let (mut sender, mut receiver) = socket.split();

    loop {
        tokio::select! {
            relayed = channel.recv() => match relayed {
                Ok(envelope) if envelope.origin == origin => {}
                Ok(envelope) => {
                    let frame = BroadcastFrameDto::from(&envelope.announcement);
                    let Ok(json) = serde_json::to_string(&frame) else {
                        continue;
                    };
                    if sender.send(Message::Text(json.into())).await.is_err() {
                        break;
                    }
                }
                // typing is best-effort; dropped announcements are fine
                Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Some(announcement) = parse_typing_frame(&text, &room_id, &user_id) {
                        state
                            .hub
                            .publish_typing(TypingEnvelope { origin, announcement })
                            .await;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Err(e)) => {
                    tracing::debug!("Typing socket error: {}", e);
                    break;
                }
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::info!("'{}' left typing channel of '{}'", user_id, room_id);
}

/// Accept a typing frame only if it speaks for the authenticated user.
/// The room always comes from the connection, never from the payload.
fn parse_typing_frame(text: &str, room_id: &RoomId, user_id: &UserId) -> Option<TypingAnnouncement> {
    let frame: BroadcastFrameDto = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::debug!("Ignoring malformed typing frame: {}", e);
            return None;
        }
    };
    let mut announcement = TypingAnnouncement::try_from(frame.payload).ok()?;
    if &announcement.user_id != user_id {
        tracing::warn!(
            "Dropping typing frame for '{}' sent by '{}'",
            announcement.user_id,
            user_id
        );
        return None;
    }
    announcement.room_id = room_id.clone();
    Some(announcement)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typing_frame_overrides_room() {
        // テスト項目: 通知のルームは接続先のルームで上書きされる
        // given (前提条件):
        let raw = r#"{"event":"user_typing","payload":{"user_id":"alice","name":"Alice","room_id":"elsewhere"}}"#;
        let room = RoomId::new("general").unwrap();
        let alice = UserId::new("alice").unwrap();

        // when (操作):
        let announcement = parse_typing_frame(raw, &room, &alice).unwrap();

        // then (期待する結果):
        assert_eq!(announcement.room_id, room);
        assert_eq!(announcement.name.as_str(), "Alice");
    }

    #[test]
    fn test_parse_typing_frame_rejects_impersonation() {
        // テスト項目: 他人になりすました通知は破棄される
        let raw = r#"{"event":"user_typing","payload":{"user_id":"bob","name":"Bob","room_id":"general"}}"#;
        let room = RoomId::new("general").unwrap();
        let alice = UserId::new("alice").unwrap();
        assert!(parse_typing_frame(raw, &room, &alice).is_none());
    }

    #[test]
    fn test_parse_typing_frame_rejects_garbage() {
        // テスト項目: JSON でないフレームは破棄される
        let room = RoomId::new("general").unwrap();
        let alice = UserId::new("alice").unwrap();
        assert!(parse_typing_frame("typing!", &room, &alice).is_none());
    }
}
