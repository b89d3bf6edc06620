use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use super::tool::run;
use crate::config::{Thumbnails, Tools};

pub fn thumbnail_args(input: &Path, offset: &str, output: &Path) -> Vec<OsString> {
    vec![
        "-i".into(),
        input.into(),
        "-ss".into(),
        offset.into(),
        "-vframes".into(),
        "1".into(),
        "-y".into(),
        output.into(),
    ]
}

/// Extracts one still frame of `input` into `{dir}/{name}`.
pub async fn thumbnail(
    tools: &Tools,
    thumbnails: &Thumbnails,
    input: &Path,
    name: &str,
) -> Result<PathBuf> {
    tokio::fs::create_dir_all(&thumbnails.dir)
        .await
        .with_context(|| format!("create {}", thumbnails.dir.display()))?;

    let output = thumbnails.dir.join(name);
    run(
        &tools.ffmpeg,
        thumbnail_args(input, &thumbnails.offset, &output),
        tools.timeout(),
    )
    .await?;

    if !tokio::fs::try_exists(&output).await.unwrap_or(false) {
        bail!("{} exited cleanly but wrote no {}", tools.ffmpeg, output.display());
    }
    Ok(output)
}
