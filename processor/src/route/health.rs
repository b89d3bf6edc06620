use axum::routing::get;
use axum::{Json, Router};

use api::response::Health;

use crate::route::AppState;
use crate::SERVICE_NAME;

pub fn route() -> Router<AppState> {
    Router::new().route(api::path::HEALTH, get(health))
}

async fn health() -> Json<Health> {
    Json(Health::healthy(SERVICE_NAME))
}
