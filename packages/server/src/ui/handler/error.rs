//! API error type and its HTTP mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    infrastructure::dto::http::ErrorResponseDto,
    usecase::{AuthError, FetchMessagesError, SendMessageError},
};

/// Error returned by every HTTP handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// 401: missing or invalid bearer credential
    Unauthorized,
    /// 400: missing or malformed request field
    BadRequest(&'static str),
    /// 404: unknown room or profile
    NotFound(&'static str),
    /// 405: method not supported by the endpoint
    MethodNotAllowed,
    /// 500: anything unexpected
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "Unauthorized",
            ApiError::BadRequest(message) | ApiError::NotFound(message) => *message,
            ApiError::MethodNotAllowed => "Method not allowed",
            ApiError::Internal => "Internal server error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponseDto {
            error: self.message().to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::MissingCredential | AuthError::InvalidCredential => ApiError::Unauthorized,
            AuthError::Repository(e) => {
                tracing::error!("Credential lookup failed: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<FetchMessagesError> for ApiError {
    fn from(error: FetchMessagesError) -> Self {
        match error {
            FetchMessagesError::RoomNotFound(_) => ApiError::NotFound("Room not found"),
            FetchMessagesError::Repository(e) => {
                tracing::error!("Error fetching messages: {}", e);
                ApiError::Internal
            }
        }
    }
}

impl From<SendMessageError> for ApiError {
    fn from(error: SendMessageError) -> Self {
        match error {
            SendMessageError::RoomNotFound(_) => ApiError::NotFound("Room not found"),
            SendMessageError::Repository(e) => {
                tracing::error!("Error sending message: {}", e);
                ApiError::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RepositoryError;

    #[test]
    fn test_status_mapping() {
        // テスト項目: ユースケースのエラーが適切なステータスコードに変換される
        assert_eq!(
            ApiError::from(AuthError::MissingCredential).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::from(FetchMessagesError::RoomNotFound("x".to_string())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::from(SendMessageError::Repository(RepositoryError::Storage(
                "boom".to_string()
            )))
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
    }
}
