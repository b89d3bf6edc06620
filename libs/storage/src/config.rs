use std::fmt;

use serde::{Deserialize, Serialize};

/// Stands in for credentials in `Debug` output.
pub const REDACTED: &str = "***";

/// Where processed recordings are copied to.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Local directory, mostly useful for tests and single-box setups
    Fs {
        #[serde(default = "default_fs_root")]
        root: String,
    },
    /// S3 compatible bucket (AWS, Wasabi, MinIO)
    S3 {
        bucket: String,
        #[serde(default = "default_s3_root")]
        root: String,
        #[serde(default)]
        region: Option<String>,
        #[serde(default)]
        endpoint: Option<String>,
        #[serde(default)]
        access_key_id: Option<String>,
        #[serde(default)]
        secret_access_key: Option<String>,
        /// Base of the URL reported for uploaded objects. Defaults to
        /// `{endpoint}/{bucket}` (path style).
        #[serde(default)]
        public_url: Option<String>,
    },
}

impl fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fs { root } => f.debug_struct("Fs").field("root", root).finish(),
            Self::S3 {
                bucket,
                root,
                region,
                endpoint,
                access_key_id,
                secret_access_key,
                public_url,
            } => f
                .debug_struct("S3")
                .field("bucket", bucket)
                .field("root", root)
                .field("region", region)
                .field("endpoint", endpoint)
                .field("access_key_id", &access_key_id.as_ref().map(|_| REDACTED))
                .field(
                    "secret_access_key",
                    &secret_access_key.as_ref().map(|_| REDACTED),
                )
                .field("public_url", public_url)
                .finish(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Fs {
            root: default_fs_root(),
        }
    }
}

fn default_fs_root() -> String {
    "./storage".to_string()
}

fn default_s3_root() -> String {
    "/".to_string()
}
