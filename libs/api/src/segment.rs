use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the prober found out about a recording. Absent fields are zero.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct VideoInfo {
    pub duration: f64,
    pub size: u64,
    pub bitrate: u64,
    pub width: u32,
    pub height: u32,
    pub codec: String,
    pub fps: f64,
}

/// Body of the segment report sent to the metadata API.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SegmentRecord {
    pub camera_id: String,
    pub filename: String,
    pub file_path: String,
    pub date_folder: String,
    pub thumbnail_path: Option<String>,
    pub s3_url: Option<String>,
    pub video_info: Option<VideoInfo>,
    pub processed_at: DateTime<Utc>,
}
