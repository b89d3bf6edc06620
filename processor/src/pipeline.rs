use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::{debug, error, info, warn};

use api::response::BatchReport;
use api::segment::SegmentRecord;
use storage::Uploader;

use crate::config::Config;
use crate::discovery::discover;
use crate::media;
use crate::recording::RecordingPath;
use crate::report::Reporter;

/// Renames `from` to `to`, copying then removing when they sit on different
/// filesystems.
pub async fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match tokio::fs::rename(from, to).await {
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            debug!(from = %from.display(), to = %to.display(), "rename crosses devices, copying");
            copy_and_remove(from, to).await
        }
        other => other,
    }
}

async fn copy_and_remove(from: &Path, to: &Path) -> std::io::Result<()> {
    if let Err(e) = tokio::fs::copy(from, to).await {
        let _ = tokio::fs::remove_file(to).await;
        return Err(e);
    }
    tokio::fs::remove_file(from).await
}

/// Turns finished recordings into reported, archived segments.
#[derive(Clone, Debug)]
pub struct Processor {
    config: Arc<Config>,
    reporter: Reporter,
    uploader: Option<Uploader>,
}

impl Processor {
    pub async fn new(config: Config) -> Result<Self> {
        let reporter = Reporter::new(&config.report)?;
        let uploader = match &config.storage {
            Some(storage) => Some(Uploader::new(storage.clone()).await?),
            None => {
                info!("no storage configured, uploads disabled");
                None
            }
        };
        Ok(Self {
            config: Arc::new(config),
            reporter,
            uploader,
        })
    }

    pub async fn ensure_directories(&self) -> Result<()> {
        for dir in [
            self.config.recordings.root.clone(),
            self.config.recordings.processed_dir(),
            self.config.thumbnails.dir.clone(),
        ] {
            tokio::fs::create_dir_all(&dir)
                .await
                .with_context(|| format!("create {}", dir.display()))?;
            info!(dir = %dir.display(), "directory ready");
        }
        Ok(())
    }

    /// Finished recordings waiting to be processed.
    pub async fn pending(&self) -> Result<Vec<PathBuf>> {
        let recordings = self.config.recordings.clone();
        let found = tokio::task::spawn_blocking(move || {
            discover(
                &recordings.root,
                &recordings.pattern,
                &recordings.processed_dir(),
                recordings.quiescence(),
                SystemTime::now(),
            )
        })
        .await??;
        Ok(found)
    }

    /// Handles one recording end to end and returns where it was moved.
    ///
    /// Thumbnail, probe and upload failures only blank their field in the
    /// record. A bad path, a rejected report or a failed move fail the file,
    /// which then stays in place for the next batch.
    pub async fn process_file(&self, path: &Path) -> Result<PathBuf> {
        let recording = RecordingPath::parse(&self.config.recordings.root, path)?;
        info!(path = %path.display(), camera = recording.camera_id, "processing recording");

        let thumbnail_path = match media::thumbnail(
            &self.config.tools,
            &self.config.thumbnails,
            path,
            &recording.thumbnail_name(),
        )
        .await
        {
            Ok(thumbnail) => {
                info!(thumbnail = %thumbnail.display(), "thumbnail generated");
                Some(thumbnail.to_string_lossy().into_owned())
            }
            Err(e) => {
                error!(path = %path.display(), "thumbnail failed: {e:#}");
                None
            }
        };

        let video_info = match media::probe(&self.config.tools, path).await {
            Ok(info) => Some(info),
            Err(e) => {
                error!(path = %path.display(), "probe failed: {e:#}");
                None
            }
        };

        let s3_url = match &self.uploader {
            Some(uploader) => match uploader.upload(path, &recording.storage_key()).await {
                Ok(url) => Some(url),
                Err(e) => {
                    warn!(path = %path.display(), "upload failed: {e:#}");
                    None
                }
            },
            None => None,
        };

        let record = SegmentRecord {
            camera_id: recording.camera_id.clone(),
            filename: recording.filename.clone(),
            file_path: path.to_string_lossy().into_owned(),
            date_folder: recording.date.clone(),
            thumbnail_path,
            s3_url,
            video_info,
            processed_at: Utc::now(),
        };
        self.reporter
            .send(&record)
            .await
            .context("report segment")?;

        let target = recording.processed_location(&self.config.recordings.processed_dir());
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("create {}", parent.display()))?;
        }
        move_file(path, &target)
            .await
            .with_context(|| format!("move to {}", target.display()))?;
        info!(from = %path.display(), to = %target.display(), "recording processed");
        Ok(target)
    }

    /// One pass over every pending recording, sequentially.
    pub async fn run_batch(&self) -> Result<BatchReport> {
        info!("starting recording batch");
        let files = self.pending().await?;
        info!("found {} recording(s) to process", files.len());

        let pause = self.config.recordings.pause();
        let mut report = BatchReport {
            found: files.len(),
            ..Default::default()
        };
        for (i, file) in files.iter().enumerate() {
            match self.process_file(file).await {
                Ok(_) => report.processed += 1,
                Err(e) => {
                    report.failed += 1;
                    error!(path = %file.display(), "failed to process recording: {e:#}");
                }
            }
            if i + 1 < files.len() && !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        info!(
            "batch finished, {}/{} recording(s) processed",
            report.processed, report.found
        );
        Ok(report)
    }

    /// Scheduled entry point: errors are logged, never propagated.
    pub async fn run_scheduled(&self) {
        if let Err(e) = self.run_batch().await {
            error!("recording batch failed: {e:#}");
        }
    }
}
