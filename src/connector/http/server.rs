use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::connector::api::Container;
use crate::domain::DomainError;

use super::types::{ChatRequest, ChatResponse, ErrorResponse, WelcomeResponse};

pub const WELCOME_MESSAGE: &str = "Welcome to the Chatbot API";

#[derive(Clone)]
struct AppState {
    container: Arc<Container>,
    shutdown: CancellationToken,
}

/// Domain failures mapped onto HTTP statuses.
pub struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DomainError::Model(_) => StatusCode::BAD_GATEWAY,
            DomainError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            DomainError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
            DomainError::IoError(_) | DomainError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("POST /chat failed with {}: {}", status, self.0);
        }
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Builds the API router. CORS is wide open: any origin, method and header.
pub fn router(container: Arc<Container>, shutdown: CancellationToken) -> axum::Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    axum::Router::new()
        .route("/", get(root))
        .route("/chat", post(chat))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(AppState {
            container,
            shutdown,
        })
}

pub async fn serve(
    container: Arc<Container>,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> Result<()> {
    let listener = TcpListener::bind(addr).await?;
    serve_listener(listener, container, shutdown).await
}

/// Serves on an already bound listener until `shutdown` is cancelled.
pub async fn serve_listener(
    listener: TcpListener,
    container: Arc<Container>,
    shutdown: CancellationToken,
) -> Result<()> {
    info!("Chatbot API listening on http://{}", listener.local_addr()?);

    let app = router(container, shutdown.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("Chatbot API stopped");
    Ok(())
}

async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let key = state.container.session_key(request.session_id.as_deref());
    let cancel = state.shutdown.child_token();

    let answer = state
        .container
        .answer_use_case()
        .answer(&key, &request.message, &cancel)
        .await?;

    Ok(Json(ChatResponse {
        response: answer.text().to_string(),
        status: answer.status(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (DomainError::invalid_input("empty"), StatusCode::BAD_REQUEST),
            (DomainError::model("boom"), StatusCode::BAD_GATEWAY),
            (
                DomainError::Timeout(std::time::Duration::from_secs(1)),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (DomainError::Cancelled, StatusCode::SERVICE_UNAVAILABLE),
            (
                DomainError::internal("bug"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status(), expected);
        }
    }
}
