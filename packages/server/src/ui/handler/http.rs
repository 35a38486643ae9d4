//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};

use crate::{
    domain::{DEFAULT_HISTORY_LIMIT, MessageText, RoomId, UserId},
    infrastructure::dto::http::{
        ListMessagesQuery, MessageResponseDto, ProfileDto, RoomSummaryDto, SendMessageRequestDto,
    },
    ui::state::AppState,
};

use super::{auth::AuthUser, error::ApiError};

/// Upper bound for the `limit` query parameter
pub const MAX_HISTORY_LIMIT: usize = 1000;

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get the room directory
pub async fn get_rooms(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<RoomSummaryDto>>, ApiError> {
    let rooms = state.rooms.list_rooms().await.map_err(|e| {
        tracing::error!("Error listing rooms: {}", e);
        ApiError::Internal
    })?;
    Ok(Json(rooms.iter().map(RoomSummaryDto::from).collect()))
}

/// Get the caller's own profile
pub async fn get_me(
    AuthUser(user_id): AuthUser,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ProfileDto>, ApiError> {
    find_profile(&state, &user_id).await
}

/// Get a profile by user ID
pub async fn get_profile(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileDto>, ApiError> {
    let user_id = UserId::new(user_id).map_err(|_| ApiError::BadRequest("Invalid user id"))?;
    find_profile(&state, &user_id).await
}

async fn find_profile(state: &AppState, user_id: &UserId) -> Result<Json<ProfileDto>, ApiError> {
    let profile = state.profiles.find_profile(user_id).await.map_err(|e| {
        tracing::error!("Error fetching profile '{}': {}", user_id, e);
        ApiError::Internal
    })?;
    profile
        .map(|p| Json(ProfileDto::from(&p)))
        .ok_or(ApiError::NotFound("Profile not found"))
}

/// `GET /functions/v1/chat-messages?room_id=&limit=`
pub async fn list_chat_messages(
    _auth: AuthUser,
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListMessagesQuery>,
) -> Result<Json<Vec<MessageResponseDto>>, ApiError> {
    let room_id = query
        .room_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(ApiError::BadRequest("Missing room_id"))?;
    let room_id = RoomId::new(room_id).map_err(|_| ApiError::BadRequest("Invalid room_id"))?;
    let limit = parse_limit(query.limit.as_deref())?;

    let messages = state
        .fetch_messages_usecase()
        .execute(&room_id, limit)
        .await?;

    Ok(Json(messages.iter().map(MessageResponseDto::from).collect()))
}

/// `POST /functions/v1/chat-messages` with `{"room_id", "message"}`
pub async fn send_chat_message(
    AuthUser(user_id): AuthUser,
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendMessageRequestDto>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponseDto>), ApiError> {
    let Json(request) = payload.map_err(|e| {
        tracing::debug!("Rejected chat-messages body: {}", e);
        ApiError::BadRequest("Invalid JSON body")
    })?;

    const MISSING: ApiError = ApiError::BadRequest("Missing room_id or message");
    let room_id = request
        .room_id
        .and_then(|id| RoomId::new(id.trim()).ok())
        .ok_or(MISSING)?;
    let text = request
        .message
        .and_then(|text| MessageText::new(text).ok())
        .ok_or(MISSING)?;

    let sent = state
        .send_message_usecase()
        .execute(user_id, room_id, text)
        .await?;

    Ok((StatusCode::CREATED, Json(MessageResponseDto::from(&sent))))
}

/// Any other method on `/functions/v1/chat-messages`.
///
/// Authentication is still checked first, so an anonymous request gets 401.
pub async fn chat_messages_method_not_allowed(_auth: AuthUser) -> ApiError {
    ApiError::MethodNotAllowed
}

fn parse_limit(raw: Option<&str>) -> Result<usize, ApiError> {
    match raw {
        None => Ok(DEFAULT_HISTORY_LIMIT),
        Some(value) => match value.trim().parse::<usize>() {
            Ok(0) | Err(_) => Err(ApiError::BadRequest("Invalid limit")),
            Ok(limit) => Ok(limit.min(MAX_HISTORY_LIMIT)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit() {
        // テスト項目: limit の省略・上限・不正値を正しく扱う
        assert_eq!(parse_limit(None), Ok(100));
        assert_eq!(parse_limit(Some("20")), Ok(20));
        assert_eq!(parse_limit(Some("50000")), Ok(MAX_HISTORY_LIMIT));
        assert_eq!(
            parse_limit(Some("0")),
            Err(ApiError::BadRequest("Invalid limit"))
        );
        assert_eq!(
            parse_limit(Some("ten")),
            Err(ApiError::BadRequest("Invalid limit"))
        );
    }
}
