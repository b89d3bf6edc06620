use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use api::response::{SyncReport, Trigger};

use crate::error::AppError;
use crate::result::Result;
use crate::route::AppState;

pub fn route() -> Router<AppState> {
    Router::new().route(api::path::SYNC, get(sync))
}

async fn sync(State(state): State<AppState>) -> Result<Json<Trigger<SyncReport>>> {
    let guard = state.flight.try_begin().ok_or(AppError::Busy)?;
    info!("manual synchronization requested");
    let registrar = state.registrar.clone();
    let report = tokio::spawn(async move {
        let _guard = guard;
        registrar.sync().await
    })
    .await??;
    Ok(Json(Trigger::success(
        format!(
            "synchronization finished, {} stream(s) started",
            report.started
        ),
        report,
    )))
}
