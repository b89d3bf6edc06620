//! ZLMediaKit HTTP API payloads.
//!
//! Every call answers `{ "code": 0, "msg": "...", "data": ... }` where a
//! non-zero `code` is a failure even when the HTTP status is 200.

use serde::{Deserialize, Serialize, Serializer};

pub const DEFAULT_VHOST: &str = "__defaultVhost__";

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Reply<T = serde_json::Value> {
    pub code: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default = "Option::default", skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Reply<T> {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    pub fn message(&self) -> &str {
        self.msg.as_deref().unwrap_or("")
    }
}

/// One entry of `getMediaList`. The server lists every schema of a stream
/// separately, so the same `stream` may appear several times.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct MediaInfo {
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub stream: String,
    #[serde(default)]
    pub vhost: String,
    #[serde(default)]
    pub schema: String,
}

/// Query parameters of `addStreamProxy`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StreamProxy {
    pub vhost: String,
    pub app: String,
    pub stream: String,
    pub url: String,
    #[serde(serialize_with = "flag", deserialize_with = "parse_flag")]
    pub enable_rtsp: bool,
    #[serde(serialize_with = "flag", deserialize_with = "parse_flag")]
    pub enable_rtmp: bool,
    #[serde(serialize_with = "flag", deserialize_with = "parse_flag")]
    pub enable_hls: bool,
    #[serde(serialize_with = "flag", deserialize_with = "parse_flag")]
    pub enable_mp4: bool,
}

impl StreamProxy {
    /// A proxy with every output protocol enabled.
    pub fn all_protocols(app: &str, stream: &str, url: &str) -> Self {
        Self {
            vhost: DEFAULT_VHOST.to_string(),
            app: app.to_string(),
            stream: stream.to_string(),
            url: url.to_string(),
            enable_rtsp: true,
            enable_rtmp: true,
            enable_hls: true,
            enable_mp4: true,
        }
    }
}

/// Query parameters of `setServerConfig` that turn on global recording.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct RecordConfig {
    #[serde(
        rename = "record.enableMP4",
        serialize_with = "flag",
        deserialize_with = "parse_flag"
    )]
    pub enable_mp4: bool,
    #[serde(rename = "record.fileSecond")]
    pub file_second: u32,
    #[serde(rename = "record.filePath")]
    pub file_path: String,
    #[serde(
        rename = "record.enableHLS",
        serialize_with = "flag",
        deserialize_with = "parse_flag"
    )]
    pub enable_hls: bool,
}

fn flag<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "1" } else { "0" })
}

fn parse_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(matches!(raw.as_str(), "1" | "true"))
}
