use std::future::Future;
use std::time::Duration;

use tracing::{debug, info};

use crate::SingleFlight;

/// Runs `pass` every `period`, forever.
///
/// The first pass happens one full period after the call; callers run their
/// startup pass themselves. A tick that finds another pass in flight is
/// skipped rather than queued.
pub async fn every<F, Fut>(name: &'static str, period: Duration, flight: SingleFlight, mut pass: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    loop {
        tokio::time::sleep(period).await;

        match flight.try_begin() {
            Some(_guard) => {
                debug!(task = name, "scheduled pass started");
                pass().await;
            }
            None => info!(task = name, "previous pass still running, skipping this tick"),
        }
    }
}
