use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::{Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::Response;
use tracing::{error, info, warn};

/// Requests slower than this are logged at `warn`.
pub const SLOW_REQUEST: Duration = Duration::from_millis(500);

/// Logs one line per request: method, URI, status and latency.
///
/// Manual triggers run a whole pass inline, so a slow `/process` or `/sync`
/// is expected; it still shows up as a warning so operators can see how long
/// passes take.
pub async fn print_request_response(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let res = next.run(req).await;
    log_line(&method, &uri, res.status(), start.elapsed());
    res
}

#[derive(Debug, PartialEq, Eq)]
enum Severity {
    Info,
    Warn,
    Error,
}

fn severity(status: StatusCode, elapsed: Duration) -> Severity {
    if !status.is_success() {
        Severity::Error
    } else if elapsed > SLOW_REQUEST {
        Severity::Warn
    } else {
        Severity::Info
    }
}

fn log_line(method: &Method, uri: &Uri, status: StatusCode, elapsed: Duration) {
    let millis = elapsed.as_millis();
    match severity(status, elapsed) {
        Severity::Info => info!("[{method} {uri}] [{}] {millis}ms", status.as_u16()),
        Severity::Warn => warn!("[{method} {uri}] [{}] {millis}ms", status.as_u16()),
        Severity::Error => error!("[{method} {uri}] [{}] {millis}ms", status.as_u16()),
    }
}
