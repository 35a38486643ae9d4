//! Router construction and server entry point.

use std::{future::Future, sync::Arc};

use axum::{
    Router,
    http::{HeaderName, Method, header},
    routing::get,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::ServerConfig,
    error::ServerError,
    infrastructure::{InMemoryBackend, seed::SeedData},
};

use super::{handler, signal::shutdown_signal, state::AppState};

/// Build the full router
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ]);

    let functions = Router::new()
        .route(
            "/functions/v1/chat-messages",
            get(handler::list_chat_messages)
                .post(handler::send_chat_message)
                .fallback(handler::chat_messages_method_not_allowed),
        )
        .layer(cors);

    Router::new()
        .route("/api/health", get(handler::health_check))
        .route("/api/rooms", get(handler::get_rooms))
        .route("/api/me", get(handler::get_me))
        .route("/api/profiles/{user_id}", get(handler::get_profile))
        .route(
            "/realtime/v1/messages/{room_id}",
            get(handler::message_feed_handler),
        )
        .route(
            "/realtime/v1/typing/{room_id}",
            get(handler::typing_channel_handler),
        )
        .merge(functions)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<(), ServerError> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(ServerError::Serve)
}

/// Run the server with the given configuration until a shutdown signal
pub async fn run(config: ServerConfig) -> Result<(), ServerError> {
    let seed = if config.no_demo_accounts {
        SeedData::rooms_only()?
    } else {
        SeedData::demo()?
    };
    let backend = InMemoryBackend::seeded(seed).await;

    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .map_err(|source| ServerError::Bind {
            addr: addr.clone(),
            source,
        })?;
    tracing::info!("Listening on {}", addr);

    serve(listener, backend.app_state(), shutdown_signal()).await
}
