use crate::{create_operator, object_key, upload_file, StorageConfig, Uploader};

#[test]
fn s3_config_parsing() {
    let config: StorageConfig = toml::from_str(
        r#"
type = "s3"
bucket = "safe-cameras-03"
region = "us-east-2"
endpoint = "https://s3.us-east-2.wasabisys.com"
access_key_id = "key"
secret_access_key = "secret"
"#,
    )
    .unwrap();

    match config {
        StorageConfig::S3 {
            bucket,
            root,
            region,
            public_url,
            ..
        } => {
            assert_eq!(bucket, "safe-cameras-03");
            assert_eq!(root, "/");
            assert_eq!(region.as_deref(), Some("us-east-2"));
            assert!(public_url.is_none());
        }
        _ => panic!("expected s3 config"),
    }
}

#[test]
fn debug_hides_credentials() {
    let config = StorageConfig::S3 {
        bucket: "safe-cameras-03".to_string(),
        root: "/".to_string(),
        region: None,
        endpoint: None,
        access_key_id: Some("key-id".to_string()),
        secret_access_key: Some("very-secret".to_string()),
        public_url: None,
    };
    let out = format!("{config:?}");
    assert!(out.contains("safe-cameras-03"));
    assert!(!out.contains("key-id"));
    assert!(!out.contains("very-secret"));
}

#[test]
fn default_is_local_directory() {
    assert_eq!(
        StorageConfig::default(),
        StorageConfig::Fs {
            root: "./storage".to_string()
        }
    );
}

#[test]
fn s3_operator_builds_without_network() {
    let config = StorageConfig::S3 {
        bucket: "bucket".to_string(),
        root: "/".to_string(),
        region: Some("us-east-1".to_string()),
        endpoint: Some("http://127.0.0.1:9".to_string()),
        access_key_id: Some("minioadmin".to_string()),
        secret_access_key: Some("minioadmin".to_string()),
        public_url: None,
    };
    assert!(create_operator(&config).is_ok());
}

#[tokio::test]
async fn upload_copies_file_and_verifies_size() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let local = source.path().join("seg1.mp4");
    std::fs::write(&local, vec![7u8; 4096]).unwrap();

    let config = StorageConfig::Fs {
        root: target.path().to_string_lossy().to_string(),
    };
    let operator = create_operator(&config).unwrap();
    let key = object_key("cam1", "2024-01-01", "seg1.mp4");

    let size = upload_file(&operator, &local, &key).await.unwrap();
    assert_eq!(size, 4096);

    let stored = target.path().join("recordings/cam1/2024-01-01/seg1.mp4");
    assert_eq!(std::fs::read(stored).unwrap(), vec![7u8; 4096]);
}

#[tokio::test]
async fn uploader_reports_public_url() {
    let source = tempfile::tempdir().unwrap();
    let target = tempfile::tempdir().unwrap();
    let local = source.path().join("seg1.mp4");
    std::fs::write(&local, b"data").unwrap();

    let root = target.path().to_string_lossy().to_string();
    let uploader = Uploader::new(StorageConfig::Fs { root: root.clone() })
        .await
        .unwrap();
    let url = uploader
        .upload(&local, "recordings/cam1/2024-01-01/seg1.mp4")
        .await
        .unwrap();
    assert!(url.ends_with("/recordings/cam1/2024-01-01/seg1.mp4"));
    assert!(url.starts_with(root.trim_end_matches('/')));
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let target = tempfile::tempdir().unwrap();
    let operator = create_operator(&StorageConfig::Fs {
        root: target.path().to_string_lossy().to_string(),
    })
    .unwrap();
    let result = upload_file(
        &operator,
        &target.path().join("nope.mp4"),
        "recordings/a/b/nope.mp4",
    )
    .await;
    assert!(result.is_err());
}
