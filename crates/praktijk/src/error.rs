use crate::auth::AuthError;
use crate::config::ConfigError;
use crate::contact::TransportFailure;
use crate::records::StoreError;
use crate::telemetry::TelemetryError;
use crate::web::pages;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tokio::task::JoinError;
use tracing::error;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("server error: {0}")]
    Server(#[from] axum::Error),
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error("storage task did not complete: {0}")]
    Join(#[from] JoinError),
    #[error("session error: {0}")]
    Session(#[from] AuthError),
    #[error("mail transport error: {0}")]
    Mail(#[from] TransportFailure),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Details stay in the log; visitors get the generic error page.
        error!(error = %self, "request failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html(pages::server_error()),
        )
            .into_response()
    }
}
