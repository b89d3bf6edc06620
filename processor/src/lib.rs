use std::future::Future;

use axum::extract::Request;
use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn, Level};

use utils::SingleFlight;

use crate::config::Config;
use crate::pipeline::Processor;
use crate::route::{health, process, AppState};

pub mod config;
pub mod discovery;
pub mod media;
pub mod pipeline;
pub mod recording;
pub mod report;

mod error;
mod result;
mod route;

/// Value of `service` in the health answer.
pub const SERVICE_NAME: &str = "processor";

pub async fn serve<F>(cfg: Config, listener: TcpListener, signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let processor = Processor::new(cfg.clone()).await?;
    processor.ensure_directories().await?;

    let flight = SingleFlight::new();
    let app_state = AppState {
        processor: processor.clone(),
        flight: flight.clone(),
    };

    let scheduler = tokio::spawn(schedule(processor, flight, cfg.schedule.interval()));

    let app = Router::new()
        .merge(health::route())
        .merge(process::route())
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

    info!("processor listening on {}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
        .unwrap_or_else(|e| error!("Application error: {e}"));
    scheduler.abort();
    Ok(())
}

async fn schedule(processor: Processor, flight: SingleFlight, period: std::time::Duration) {
    match flight.try_begin() {
        Some(_guard) => processor.run_scheduled().await,
        None => warn!("startup batch skipped, a manual pass is already running"),
    }

    utils::every("process", period, flight, move || {
        let processor = processor.clone();
        async move { processor.run_scheduled().await }
    })
    .await;
}
