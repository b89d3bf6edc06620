use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use opendal::Operator;
use tokio::io::AsyncReadExt;

use crate::config::StorageConfig;
use crate::key::{public_url, validate_key};
use crate::operator::init_operator;

const CHUNK_SIZE: usize = 8 * 1024 * 1024;

/// Streams `local` to `key` and checks the stored object has the same length.
///
/// Returns the number of bytes written.
pub async fn upload_file(operator: &Operator, local: &Path, key: &str) -> Result<u64> {
    if !validate_key(key) {
        bail!("invalid object key: {key}");
    }

    let mut file = tokio::fs::File::open(local)
        .await
        .with_context(|| format!("open {}", local.display()))?;
    let expected = file.metadata().await?.len();

    let mut writer = operator.writer_with(key).chunk(CHUNK_SIZE).await?;
    let mut written = 0u64;
    loop {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let n = match file.read(&mut buf).await {
            Ok(n) => n,
            Err(e) => {
                let _ = writer.abort().await;
                return Err(e).with_context(|| format!("read {}", local.display()));
            }
        };
        if n == 0 {
            break;
        }
        buf.truncate(n);
        if let Err(e) = writer.write(buf).await {
            let _ = writer.abort().await;
            return Err(e.into());
        }
        written += n as u64;
    }
    writer.close().await?;

    let stored = operator.stat(key).await?.content_length();
    if stored != expected || written != expected {
        return Err(anyhow!(
            "size mismatch for {key}: local {expected}, sent {written}, stored {stored}"
        ));
    }
    Ok(written)
}

/// Uploads recordings to the configured backend.
#[derive(Clone, Debug)]
pub struct Uploader {
    config: StorageConfig,
    operator: Operator,
}

impl Uploader {
    pub async fn new(config: StorageConfig) -> Result<Self> {
        let operator = init_operator(&config).await?;
        Ok(Self { config, operator })
    }

    /// Uploads one file and returns its public URL.
    pub async fn upload(&self, local: &Path, key: &str) -> Result<String> {
        let size = upload_file(&self.operator, local, key).await?;
        let url = public_url(&self.config, key);
        tracing::info!(key, size, url, "uploaded recording");
        Ok(url)
    }
}
