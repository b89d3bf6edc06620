use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};

use api::mediakit::StreamProxy;
use api::response::SyncReport;

use crate::camera::CameraClient;
use crate::config::Config;
use crate::mediakit::MediaKitClient;
use crate::reconcile::{active_ids, plan};

/// Starts a stream proxy for every eligible camera the media server is not
/// already publishing. It never stops or replaces a running stream.
#[derive(Clone, Debug)]
pub struct Registrar {
    pub mediakit: MediaKitClient,
    cameras: CameraClient,
    app: String,
    pause: Duration,
    recordings_dir: Option<PathBuf>,
}

impl Registrar {
    pub fn new(cfg: &Config) -> Result<Self> {
        Ok(Self {
            mediakit: MediaKitClient::new(&cfg.mediakit)?,
            cameras: CameraClient::new(&cfg.api)?,
            app: cfg.mediakit.app.clone(),
            pause: cfg.streams.pause(),
            recordings_dir: cfg.recordings_dir.clone(),
        })
    }

    pub async fn sync(&self) -> Result<SyncReport> {
        info!("synchronizing cameras");
        let cameras = self.cameras.cameras().await?;
        let eligible = cameras.iter().filter(|c| c.is_eligible()).count();
        info!("{eligible} eligible camera(s) of {}", cameras.len());

        let media = self
            .mediakit
            .media_list()
            .await
            .context("fetch active streams")?;
        let active = active_ids(&media);
        info!("{} active stream(s)", active.len());

        let planned = plan(&cameras, &active);
        let mut report = SyncReport {
            eligible,
            active: active.len(),
            ..Default::default()
        };

        for (i, camera) in planned.iter().enumerate() {
            if i > 0 && !self.pause.is_zero() {
                tokio::time::sleep(self.pause).await;
            }
            let name = camera.display_name();
            let url = camera.rtsp_url.as_deref().unwrap_or_default();
            info!(camera = camera.id, name, "starting stream");
            match self
                .mediakit
                .add_stream_proxy(&StreamProxy::all_protocols(&self.app, &camera.id, url))
                .await
            {
                Ok(data) => {
                    report.started += 1;
                    info!(camera = camera.id, %data, "stream started");
                }
                Err(e) => {
                    report.failed += 1;
                    error!(camera = camera.id, name, "failed to start stream: {e}");
                }
            }
        }

        if let Some(dir) = &self.recordings_dir {
            check_recordings_dir(dir).await;
        }
        info!(
            started = report.started,
            failed = report.failed,
            "synchronization finished"
        );
        Ok(report)
    }

    /// Scheduled entry point: errors are logged, never propagated.
    pub async fn run_scheduled(&self) {
        if let Err(e) = self.sync().await {
            error!("synchronization failed: {e:#}");
        }
    }
}

/// Logs how many entries the recordings directory holds, creating it when
/// it does not exist yet.
pub async fn check_recordings_dir(dir: &Path) -> Option<usize> {
    match tokio::fs::read_dir(dir).await {
        Ok(mut entries) => {
            let mut count = 0;
            while let Ok(Some(_)) = entries.next_entry().await {
                count += 1;
            }
            info!(dir = %dir.display(), "{count} entr(ies) in recordings directory");
            Some(count)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!(dir = %dir.display(), "recordings directory missing, creating it");
            if let Err(e) = tokio::fs::create_dir_all(dir).await {
                warn!(dir = %dir.display(), "cannot create recordings directory: {e}");
            }
            None
        }
        Err(e) => {
            warn!(dir = %dir.display(), "cannot read recordings directory: {e}");
            None
        }
    }
}
