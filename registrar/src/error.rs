use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use api::response::{SyncReport, Trigger};

#[derive(Debug)]
pub enum AppError {
    /// A synchronization pass is already running.
    Busy,
    InternalServerError(anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Busy => (
                StatusCode::CONFLICT,
                "a synchronization pass is already running".to_string(),
            ),
            AppError::InternalServerError(err) => {
                (StatusCode::INTERNAL_SERVER_ERROR, format!("{err:#}"))
            }
        };
        (status, Json(Trigger::<SyncReport>::error(message))).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        AppError::InternalServerError(err.into())
    }
}
