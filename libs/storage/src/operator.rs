use anyhow::Result;
use opendal::services;
use opendal::Operator;

use crate::config::StorageConfig;

/// Builds an operator for the configured backend. Nothing is contacted yet.
pub fn create_operator(config: &StorageConfig) -> Result<Operator> {
    match config {
        StorageConfig::Fs { root } => {
            tracing::info!(root, "using filesystem storage");
            let builder = services::Fs::default().root(root);
            Ok(Operator::new(builder)?.finish())
        }
        StorageConfig::S3 {
            bucket,
            root,
            region,
            endpoint,
            access_key_id,
            secret_access_key,
            ..
        } => {
            tracing::info!(bucket, ?region, ?endpoint, "using s3 storage");

            // Credentials only come from our config, never from ~/.aws.
            let mut builder = services::S3::default()
                .bucket(bucket)
                .root(root.trim_start_matches('/'))
                .disable_config_load();

            if let Some(region) = region {
                builder = builder.region(region);
            }
            if let Some(endpoint) = endpoint {
                builder = builder.endpoint(endpoint);
            }
            if let Some(access_key_id) = access_key_id {
                builder = builder.access_key_id(access_key_id);
            }
            if let Some(secret_access_key) = secret_access_key {
                builder = builder.secret_access_key(secret_access_key);
            }

            Ok(Operator::new(builder)?.finish())
        }
    }
}

/// Builds the operator and checks the backend answers. A failed check is
/// only logged: uploads are best effort and the bucket may come back later.
pub async fn init_operator(config: &StorageConfig) -> Result<Operator> {
    let operator = create_operator(config)?;
    match operator.check().await {
        Ok(()) => tracing::info!("storage backend reachable"),
        Err(e) => tracing::warn!("storage backend check failed, continuing anyway: {e}"),
    }
    Ok(operator)
}
