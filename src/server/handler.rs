//! HTTP front-end: `POST /debug` runs a question through the pipeline without
//! a confirmation step.

use crate::error::PipelineError;
use crate::pipeline::{Frontend, Pipeline};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

#[derive(Debug, Serialize, Deserialize)]
pub struct DebugRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DebugResponse {
    pub command: String,
    pub output: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

#[derive(Debug)]
enum ApiError {
    Pipeline(PipelineError),
    BadRequest(String),
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        ApiError::Pipeline(err)
    }
}

/// HTTP status for a failed question: client-side problems with the
/// generated command are 4xx, upstream and execution failures 5xx
pub fn status_for(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::Source(_) => StatusCode::BAD_GATEWAY,
        PipelineError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PipelineError::Validation(_) => StatusCode::BAD_REQUEST,
        PipelineError::Execution { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        PipelineError::ConfirmationDenied => StatusCode::FORBIDDEN,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Pipeline(err) => (
                status_for(&err),
                ErrorResponse {
                    error: err.to_string(),
                    command: err.command().map(str::to_string),
                    output: err.partial_output(),
                },
            ),
            ApiError::BadRequest(error) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse { error, command: None, output: None },
            ),
        };

        (status, Json(body)).into_response()
    }
}

async fn handle_debug(
    State(pipeline): State<Arc<Pipeline>>,
    Json(request): Json<DebugRequest>,
) -> Result<Json<DebugResponse>, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".to_string()));
    }

    let command = pipeline.plan(question, Frontend::Http).await?;

    let execution = pipeline.execute(&command, Frontend::Http).await?;

    Ok(Json(DebugResponse {
        command: execution.command.into_inner(),
        output: execution.output,
    }))
}

async fn healthz() -> &'static str {
    "ok"
}

pub fn router(pipeline: Arc<Pipeline>) -> Router {
    Router::new()
        .route("/debug", post(handle_debug))
        .route("/healthz", get(healthz))
        .with_state(pipeline)
}

/// Serve until Ctrl-C
pub async fn serve(pipeline: Arc<Pipeline>, addr: SocketAddr) -> io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP server listening");

    axum::serve(listener, router(pipeline))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
