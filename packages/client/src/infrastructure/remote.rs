//! Remote adapter: the companion HTTP API over `reqwest` and the realtime
//! endpoints over `tokio-tungstenite`.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use reqwest::{StatusCode, Url};
use tokio::{
    net::TcpStream,
    sync::{mpsc, oneshot},
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Error as WsError, Message},
};

use studyhall_server::{
    domain::{
        ChatMessage, DisplayName, MessageText, MessageWithSender, Profile, Room, RoomId,
        TypingAnnouncement, UserId,
    },
    infrastructure::dto::{
        http::{
            ErrorResponseDto, MessageResponseDto, ProfileDto, RoomSummaryDto,
            SendMessageRequestDto,
        },
        realtime::{BroadcastFrameDto, FeedEventDto},
    },
};

use crate::{
    error::ChatError,
    port::{
        ChangeFeed, FeedSubscription, MessageStore, ReleaseHandle, RoomDirectory,
        SUBSCRIPTION_BUFFER, TypingAnnouncer, TypingBroadcast, TypingChannel,
    },
};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Client for a running Studyhall server
#[derive(Debug, Clone)]
pub struct RemoteBackend {
    http: reqwest::Client,
    base_url: Url,
    token: String,
}

impl RemoteBackend {
    /// `base_url` must be an `http` or `https` URL
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self, ChatError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ChatError::Validation(format!("invalid server URL '{base_url}': {e}")))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ChatError::Validation(format!(
                "server URL must be http or https: '{base_url}'"
            )));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            token: token.into(),
        })
    }

    /// Base URL with `segments` appended, each percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ChatError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ChatError::Validation(format!("cannot extend '{}'", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn realtime_url(&self, segments: &[&str]) -> Result<Url, ChatError> {
        let mut url = self.endpoint(segments)?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
        url.set_scheme(scheme)
            .map_err(|_| ChatError::Validation(format!("cannot use {scheme} for '{url}'")))?;
        url.query_pairs_mut()
            .append_pair("access_token", &self.token);
        Ok(url)
    }

    /// Profile of the token's owner
    pub async fn whoami(&self) -> Result<Profile, ChatError> {
        let response = self
            .http
            .get(self.endpoint(&["api", "me"])?)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ChatError::Retrieval(e.to_string()))?;
        if !response.status().is_success() {
            return Err(error_from_response(response, ChatError::Retrieval).await);
        }
        let dto: ProfileDto = response
            .json()
            .await
            .map_err(|e| ChatError::Retrieval(e.to_string()))?;
        Ok(Profile::new(UserId::new(dto.id)?, DisplayName::new(dto.name)?))
    }

    async fn connect(&self, segments: &[&str]) -> Result<Socket, ChatError> {
        let url = self.realtime_url(segments)?;
        let path = url.path().to_string();
        match connect_async(url.as_str()).await {
            Ok((socket, _)) => Ok(socket),
            Err(WsError::Http(response)) => Err(match response.status().as_u16() {
                401 => ChatError::Authorization("realtime connection rejected".to_string()),
                404 => ChatError::NotFound(path),
                code => ChatError::Subscription(format!("HTTP {code} from {path}")),
            }),
            Err(e) => Err(ChatError::Subscription(e.to_string())),
        }
    }
}

/// Map a non-success response onto the error taxonomy
async fn error_from_response(
    response: reqwest::Response,
    fallback: fn(String) -> ChatError,
) -> ChatError {
    let status = response.status();
    let detail = response
        .json::<ErrorResponseDto>()
        .await
        .map(|body| body.error)
        .unwrap_or_else(|_| status.to_string());
    match status {
        StatusCode::UNAUTHORIZED => ChatError::Authorization(detail),
        StatusCode::BAD_REQUEST => ChatError::Validation(detail),
        StatusCode::NOT_FOUND => ChatError::NotFound(detail),
        _ => fallback(detail),
    }
}

fn decode_feed_frame(text: &str) -> Result<ChatMessage, ChatError> {
    let event: FeedEventDto =
        serde_json::from_str(text).map_err(|e| ChatError::Subscription(e.to_string()))?;
    Ok(ChatMessage::try_from(event.record)?)
}

fn decode_typing_frame(text: &str) -> Result<TypingAnnouncement, ChatError> {
    let frame: BroadcastFrameDto =
        serde_json::from_str(text).map_err(|e| ChatError::Subscription(e.to_string()))?;
    Ok(TypingAnnouncement::try_from(frame.payload)?)
}

fn stop_handle(label: String, stop: oneshot::Sender<()>) -> ReleaseHandle {
    let closed = format!("{label} already closed");
    ReleaseHandle::new(label, move || {
        stop.send(()).map_err(|_| ChatError::Subscription(closed))
    })
}

#[async_trait]
impl MessageStore for RemoteBackend {
    async fn recent_messages(
        &self,
        room_id: &RoomId,
        limit: usize,
    ) -> Result<Vec<MessageWithSender>, ChatError> {
        let limit = limit.to_string();
        let response = self
            .http
            .get(self.endpoint(&["functions", "v1", "chat-messages"])?)
            .bearer_auth(&self.token)
            .query(&[("room_id", room_id.as_str()), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| ChatError::Retrieval(e.to_string()))?;
        if !response.status().is_success() {
            return Err(error_from_response(response, ChatError::Retrieval).await);
        }
        let rows: Vec<MessageResponseDto> = response
            .json()
            .await
            .map_err(|e| ChatError::Retrieval(e.to_string()))?;
        rows.into_iter()
            .map(|row| MessageWithSender::try_from(row).map_err(ChatError::from))
            .collect()
    }

    /// The server attributes the message to the token's owner, so `sender`
    /// only matters for the in-process adapter.
    async fn insert_message(
        &self,
        room_id: &RoomId,
        _sender: &UserId,
        text: &MessageText,
    ) -> Result<MessageWithSender, ChatError> {
        let body = SendMessageRequestDto {
            room_id: Some(room_id.as_str().to_string()),
            message: Some(text.as_str().to_string()),
        };
        let response = self
            .http
            .post(self.endpoint(&["functions", "v1", "chat-messages"])?)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Write(e.to_string()))?;
        if response.status() != StatusCode::CREATED {
            return Err(error_from_response(response, ChatError::Write).await);
        }
        let created: MessageResponseDto = response
            .json()
            .await
            .map_err(|e| ChatError::Write(e.to_string()))?;
        Ok(MessageWithSender::try_from(created)?)
    }

    async fn sender_name(&self, user_id: &UserId) -> Result<Option<DisplayName>, ChatError> {
        let response = self
            .http
            .get(self.endpoint(&["api", "profiles", user_id.as_str()])?)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| ChatError::Retrieval(e.to_string()))?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let profile: ProfileDto = response
                    .json()
                    .await
                    .map_err(|e| ChatError::Retrieval(e.to_string()))?;
                Ok(DisplayName::new(profile.name).ok())
            }
            _ => Err(error_from_response(response, ChatError::Retrieval).await),
        }
    }
}

#[async_trait]
impl RoomDirectory for RemoteBackend {
    async fn list_rooms(&self) -> Result<Vec<Room>, ChatError> {
        let response = self
            .http
            .get(self.endpoint(&["api", "rooms"])?)
            .send()
            .await
            .map_err(|e| ChatError::Retrieval(e.to_string()))?;
        if !response.status().is_success() {
            return Err(error_from_response(response, ChatError::Retrieval).await);
        }
        let rooms: Vec<RoomSummaryDto> = response
            .json()
            .await
            .map_err(|e| ChatError::Retrieval(e.to_string()))?;
        rooms
            .into_iter()
            .map(|room| Room::try_from(room).map_err(ChatError::from))
            .collect()
    }
}

#[async_trait]
impl ChangeFeed for RemoteBackend {
    async fn subscribe(&self, room_id: &RoomId) -> Result<FeedSubscription, ChatError> {
        let socket = self
            .connect(&["realtime", "v1", "messages", room_id.as_str()])
            .await?;
        let (mut sink, mut stream) = socket.split();
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                    frame = stream.next() => match frame {
                        Some(Ok(Message::Text(text))) => match decode_feed_frame(text.as_str()) {
                            Ok(message) => {
                                if tx.send(message).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::warn!("Ignoring malformed feed frame: {}", e),
                        },
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!("Message feed connection failed: {}", e);
                            break;
                        }
                    },
                }
            }
        });

        tracing::debug!("Subscribed to message feed of '{}'", room_id);
        Ok(FeedSubscription {
            room_id: room_id.clone(),
            events: rx,
            handle: stop_handle(format!("message feed '{room_id}'"), stop_tx),
        })
    }
}

#[async_trait]
impl TypingBroadcast for RemoteBackend {
    async fn join(&self, room_id: &RoomId) -> Result<TypingChannel, ChatError> {
        let socket = self
            .connect(&["realtime", "v1", "typing", room_id.as_str()])
            .await?;
        let (mut sink, mut stream) = socket.split();
        let (in_tx, in_rx) = mpsc::channel(SUBSCRIPTION_BUFFER);
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<TypingAnnouncement>();
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut stop_rx => {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                    outbound = out_rx.recv() => {
                        let Some(announcement) = outbound else { break };
                        match serde_json::to_string(&BroadcastFrameDto::from(&announcement)) {
                            Ok(json) => {
                                if sink.send(Message::Text(json.into())).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::warn!("Failed to encode typing frame: {}", e),
                        }
                    }
                    frame = stream.next() => match frame {
                        Some(Ok(Message::Text(text))) => match decode_typing_frame(text.as_str()) {
                            Ok(announcement) => {
                                if in_tx.send(announcement).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::warn!("Ignoring malformed typing frame: {}", e),
                        },
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!("Typing channel connection failed: {}", e);
                            break;
                        }
                    },
                }
            }
        });

        tracing::debug!("Joined typing channel of '{}'", room_id);
        Ok(TypingChannel {
            room_id: room_id.clone(),
            events: in_rx,
            announcer: TypingAnnouncer::new(out_tx),
            handle: stop_handle(format!("typing channel '{room_id}'"), stop_tx),
        })
    }
}
