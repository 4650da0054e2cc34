//! The relay's single route
//!
//! `POST /generate` forwards the prompt to the upstream [`Generator`] and
//! answers with `{"output"}` or, on any failure, a fixed `{"error"}` body and
//! a 500. Requests share nothing but an immutable handle to the generator.

use std::sync::Arc;

use askai_core::protocol::{ErrorResponse, GenerateRequest, GenerateResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

use crate::gemini::Generator;

#[derive(Clone)]
pub struct RelayState {
    generator: Arc<dyn Generator>,
}

impl RelayState {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

pub fn router(state: RelayState) -> Router {
    Router::new()
        .route("/generate", post(generate_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn serve(listener: TcpListener, app: Router) -> anyhow::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Relay listening on http://{}", addr);
    }
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

async fn generate_handler(
    State(state): State<RelayState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    debug!(prompt_chars = request.prompt.chars().count(), "Forwarding prompt upstream");

    match state.generator.generate(&request.prompt).await {
        Ok(output) => (StatusCode::OK, Json(GenerateResponse { output })).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to generate content");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::generation_failed()),
            )
                .into_response()
        }
    }
}
