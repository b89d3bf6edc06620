use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{Recording, Startup};
use crate::mediakit::MediaKitClient;

#[derive(Debug, Error)]
pub enum WaitError {
    #[error("media server not ready after {attempts} attempt(s) in {elapsed:?}")]
    Timeout { attempts: u32, elapsed: Duration },
}

/// Doubling delays, capped at `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    next: Duration,
    max: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { next: initial, max }
    }
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        let current = self.next.min(self.max);
        self.next = current.saturating_mul(2).min(self.max);
        Some(current)
    }
}

/// Polls the media server until it answers, or gives up once `cfg.timeout`
/// has elapsed. Returns the number of attempts it took.
pub async fn wait_until_ready(mediakit: &MediaKitClient, cfg: &Startup) -> Result<u32, WaitError> {
    info!("waiting for the media server");
    let start = Instant::now();
    let timeout = cfg.timeout();
    let mut backoff = Backoff::new(cfg.initial_backoff(), cfg.max_backoff());
    let mut attempts = 0;

    loop {
        attempts += 1;
        match mediakit.ready().await {
            Ok(()) => {
                info!(attempts, "media server is ready");
                return Ok(attempts);
            }
            Err(e) => debug!(attempts, "media server not ready yet: {e}"),
        }

        let elapsed = start.elapsed();
        if elapsed >= timeout {
            return Err(WaitError::Timeout { attempts, elapsed });
        }
        let delay = backoff.next().unwrap_or(cfg.max_backoff());
        tokio::time::sleep(delay.min(timeout - elapsed)).await;
    }
}

/// Turns on MP4 and HLS recording server-wide. Failures are only logged.
pub async fn enable_global_recording(mediakit: &MediaKitClient, cfg: &Recording) -> bool {
    info!("enabling global recording");
    match mediakit.set_server_config(&cfg.to_record_config()).await {
        Ok(()) => {
            info!(
                file_second = cfg.file_second,
                file_path = cfg.file_path,
                "global recording enabled"
            );
            true
        }
        Err(e) => {
            error!("failed to enable global recording: {e}");
            false
        }
    }
}
