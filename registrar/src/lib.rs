use std::future::Future;

use axum::extract::Request;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn, Level};

use utils::SingleFlight;

use crate::config::Config;
use crate::route::{health, sync as sync_route, AppState};
use crate::startup::{enable_global_recording, wait_until_ready};
use crate::sync::Registrar;

pub mod camera;
pub mod config;
pub mod mediakit;
pub mod reconcile;
pub mod startup;
pub mod sync;

mod error;
mod result;
mod route;

/// Value of `service` in the health answer.
pub const SERVICE_NAME: &str = "zlm-registrar";

/// Waits for the media server, turns on recording and serves until `signal`.
///
/// Fails with [`startup::WaitError`] when the media server never comes up.
pub async fn serve<F>(cfg: Config, listener: TcpListener, signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let registrar = Registrar::new(&cfg)?;
    if let Some(dir) = &cfg.recordings_dir {
        tokio::fs::create_dir_all(dir).await?;
    }

    wait_until_ready(&registrar.mediakit, &cfg.startup).await?;
    enable_global_recording(&registrar.mediakit, &cfg.recording).await;

    let flight = SingleFlight::new();
    let app_state = AppState {
        registrar: registrar.clone(),
        flight: flight.clone(),
    };

    let scheduler = tokio::spawn(schedule(registrar, flight, cfg.schedule.interval()));

    let app = Router::new()
        .merge(health::route())
        .merge(sync_route::route())
        .with_state(app_state)
        .layer(if cfg.http.cors {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
        })
        .layer(middleware::from_fn(http_log::print_request_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    info_span!(
                        "http_request",
                        uri = ?request.uri(),
                        method = ?request.method(),
                    )
                })
                .on_response(tower_http::trace::DefaultOnResponse::new().level(Level::DEBUG))
                .on_failure(tower_http::trace::DefaultOnFailure::new().level(Level::WARN)),
        );

    info!("registrar listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
        .unwrap_or_else(|e| error!("Application error: {e}"));
    scheduler.abort();
    Ok(())
}

async fn schedule(registrar: Registrar, flight: SingleFlight, period: std::time::Duration) {
    match flight.try_begin() {
        Some(_guard) => registrar.run_scheduled().await,
        None => warn!("startup synchronization skipped, a manual pass is already running"),
    }

    utils::every("sync", period, flight, move || {
        let registrar = registrar.clone();
        async move { registrar.run_scheduled().await }
    })
    .await;
}
