use crate::config::StorageConfig;

/// Object key of an uploaded recording: `recordings/{camera}/{date}/{filename}`.
pub fn object_key(camera_id: &str, date: &str, filename: &str) -> String {
    format!("recordings/{camera_id}/{date}/{filename}")
}

/// Keys are relative and never climb out of the storage root.
pub fn validate_key(key: &str) -> bool {
    !key.is_empty() && !key.starts_with('/') && !key.split('/').any(|seg| seg == "..")
}

/// The URL reported to the metadata API for an uploaded object.
pub fn public_url(config: &StorageConfig, key: &str) -> String {
    match config {
        StorageConfig::Fs { root } => join(&[root, key]),
        StorageConfig::S3 {
            bucket,
            root,
            endpoint,
            region,
            public_url,
            ..
        } => {
            let base = match (public_url, endpoint) {
                (Some(url), _) => url.clone(),
                (None, Some(endpoint)) => join(&[endpoint, bucket]),
                (None, None) => format!(
                    "https://s3.{}.amazonaws.com/{}",
                    region.as_deref().unwrap_or("us-east-1"),
                    bucket
                ),
            };
            join(&[&base, root, key])
        }
    }
}

fn join(parts: &[&str]) -> String {
    let mut out = String::new();
    for part in parts {
        let part = if out.is_empty() {
            part.trim_end_matches('/')
        } else {
            part.trim_matches('/')
        };
        if part.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(part);
    }
    out
}
