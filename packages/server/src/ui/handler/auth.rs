//! Bearer-token extractor.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{domain::UserId, ui::state::AppState};

use super::error::ApiError;

/// Extractor that validates `Authorization: Bearer <token>`.
/// Use this in any handler that requires authentication.
pub struct AuthUser(pub UserId);

impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());

        let user_id = state
            .authenticate_usecase()
            .execute(header)
            .await
            .inspect_err(|e| tracing::debug!("Rejected request: {}", e))?;

        Ok(AuthUser(user_id))
    }
}
