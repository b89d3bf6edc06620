use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use api::response::{BatchReport, Trigger};

use crate::error::AppError;
use crate::result::Result;
use crate::route::AppState;

pub fn route() -> Router<AppState> {
    Router::new().route(api::path::PROCESS, get(process))
}

async fn process(State(state): State<AppState>) -> Result<Json<Trigger<BatchReport>>> {
    let guard = state.flight.try_begin().ok_or(AppError::Busy)?;
    info!("manual processing pass requested");
    // The pass outlives the request.
    let processor = state.processor.clone();
    let report = tokio::spawn(async move {
        let _guard = guard;
        processor.run_batch().await
    })
    .await??;
    Ok(Json(Trigger::success(
        format!(
            "processed {} of {} recording(s)",
            report.processed, report.found
        ),
        report,
    )))
}
