use std::{env, fmt, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use storage::{StorageConfig, REDACTED};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: Http,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub recordings: Recordings,
    #[serde(default)]
    pub thumbnails: Thumbnails,
    #[serde(default)]
    pub tools: Tools,
    #[serde(default)]
    pub report: Report,
    /// Uploads are skipped when this is unset.
    #[serde(default = "default_storage")]
    pub storage: Option<StorageConfig>,
    #[serde(default)]
    pub schedule: Schedule,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Http {
    #[serde(default = "default_http_listen")]
    pub listen: SocketAddr,
    #[serde(default)]
    pub cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recordings {
    /// Directory the media server writes `{..}/{camera}/{date}/{file}` into.
    #[serde(default = "default_recordings_root")]
    pub root: PathBuf,
    /// Where handled files are moved. Defaults to `{root}/processed`.
    #[serde(default)]
    pub processed_dir: Option<PathBuf>,
    /// Glob relative to `root`.
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Minimum file age, in seconds, before a recording is considered finished.
    #[serde(default)]
    pub quiescence: Quiescence,
    /// Pause between two files of a batch, in milliseconds.
    #[serde(default)]
    pub pause: FilePause,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiescence(pub u64);

impl Default for Quiescence {
    fn default() -> Self {
        Quiescence(5 * 60)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilePause(pub u64);

impl Default for FilePause {
    fn default() -> Self {
        FilePause(1000)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thumbnails {
    #[serde(default = "default_thumbnails_dir")]
    pub dir: PathBuf,
    /// Position of the extracted frame, as understood by `ffmpeg -ss`.
    #[serde(default = "default_thumbnail_offset")]
    pub offset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tools {
    #[serde(default = "default_ffmpeg")]
    pub ffmpeg: String,
    #[serde(default = "default_ffprobe")]
    pub ffprobe: String,
    /// Seconds before a tool invocation is killed.
    #[serde(default = "default_tool_timeout")]
    pub timeout: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Report {
    /// Full URL segment records are POSTed to.
    #[serde(default = "default_report_endpoint")]
    pub endpoint: String,
    /// Sent as `X-Service-Token` when set.
    #[serde(default = "default_service_token")]
    pub token: Option<String>,
    #[serde(default = "default_report_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// Seconds between two scheduled batches.
    #[serde(default = "default_process_interval")]
    pub interval: u64,
}

fn default_http_listen() -> SocketAddr {
    SocketAddr::from_str(&format!(
        "0.0.0.0:{}",
        env::var("PORT").unwrap_or(String::from("8080"))
    ))
    .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 8080)))
}

fn default_log_level() -> String {
    env::var("LOG_LEVEL").unwrap_or_else(|_| {
        if cfg!(debug_assertions) {
            "debug".to_string()
        } else {
            "info".to_string()
        }
    })
}

fn default_recordings_root() -> PathBuf {
    PathBuf::from(
        env::var("RECORDINGS_DIR").unwrap_or(String::from("/opt/media/bin/www/record/proxy/")),
    )
}

fn www_dir() -> PathBuf {
    PathBuf::from(env::var("WWW_DIR").unwrap_or(String::from("/opt/media/bin/www")))
}

fn default_pattern() -> String {
    String::from("**/*.mp4")
}

fn default_thumbnails_dir() -> PathBuf {
    www_dir().join("thumbnails")
}

fn default_thumbnail_offset() -> String {
    String::from("00:00:01")
}

fn default_ffmpeg() -> String {
    env::var("FFMPEG_BIN").unwrap_or(String::from("ffmpeg"))
}

fn default_ffprobe() -> String {
    env::var("FFPROBE_BIN").unwrap_or(String::from("ffprobe"))
}

fn default_tool_timeout() -> u64 {
    30
}

fn default_report_endpoint() -> String {
    env::var("API_ENDPOINT").unwrap_or(String::from("http://ns1.infotecms.com.br:8087/segmentos"))
}

fn default_service_token() -> Option<String> {
    env::var("INTERNAL_SERVICE_TOKEN")
        .ok()
        .filter(|token| !token.is_empty())
}

fn default_report_timeout() -> u64 {
    30
}

fn default_process_interval() -> u64 {
    env::var("PROCESS_INTERVAL")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300)
}

/// Wasabi is only used when both keys are present in the environment.
fn default_storage() -> Option<StorageConfig> {
    let access_key = env::var("WASABI_ACCESS_KEY").ok().filter(|v| !v.is_empty())?;
    let secret_key = env::var("WASABI_SECRET_KEY").ok().filter(|v| !v.is_empty())?;
    Some(StorageConfig::S3 {
        bucket: env::var("WASABI_BUCKET").unwrap_or(String::from("safe-cameras-03")),
        root: String::from("/"),
        region: Some(env::var("WASABI_REGION").unwrap_or(String::from("us-east-2"))),
        endpoint: Some(
            env::var("WASABI_ENDPOINT")
                .unwrap_or(String::from("https://s3.us-east-2.wasabisys.com")),
        ),
        access_key_id: Some(access_key),
        secret_access_key: Some(secret_key),
        public_url: None,
    })
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: Default::default(),
            log: Default::default(),
            recordings: Default::default(),
            thumbnails: Default::default(),
            tools: Default::default(),
            report: Default::default(),
            storage: default_storage(),
            schedule: Default::default(),
        }
    }
}

impl Default for Http {
    fn default() -> Self {
        Self {
            listen: default_http_listen(),
            cors: Default::default(),
        }
    }
}

impl Default for Log {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Recordings {
    fn default() -> Self {
        Self {
            root: default_recordings_root(),
            processed_dir: None,
            pattern: default_pattern(),
            quiescence: Default::default(),
            pause: Default::default(),
        }
    }
}

impl Default for Thumbnails {
    fn default() -> Self {
        Self {
            dir: default_thumbnails_dir(),
            offset: default_thumbnail_offset(),
        }
    }
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            ffmpeg: default_ffmpeg(),
            ffprobe: default_ffprobe(),
            timeout: default_tool_timeout(),
        }
    }
}

impl Default for Report {
    fn default() -> Self {
        Self {
            endpoint: default_report_endpoint(),
            token: default_service_token(),
            timeout: default_report_timeout(),
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            interval: default_process_interval(),
        }
    }
}

impl Recordings {
    pub fn processed_dir(&self) -> PathBuf {
        self.processed_dir
            .clone()
            .unwrap_or_else(|| self.root.join("processed"))
    }

    pub fn quiescence(&self) -> Duration {
        Duration::from_secs(self.quiescence.0)
    }

    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause.0)
    }
}

impl Tools {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Report {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Schedule {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

impl fmt::Debug for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Report")
            .field("endpoint", &self.endpoint)
            .field("token", &self.token.as_ref().map(|_| REDACTED))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.recordings.root.as_os_str().is_empty() {
            return Err(anyhow::anyhow!("recordings.root must not be empty"));
        }
        if self.recordings.pattern.is_empty() {
            return Err(anyhow::anyhow!("recordings.pattern must not be empty"));
        }
        glob::Pattern::new(&self.recordings.pattern)
            .map_err(|e| anyhow::anyhow!("recordings.pattern is not a glob: {e}"))?;
        if self.schedule.interval == 0 {
            return Err(anyhow::anyhow!("schedule.interval must be at least 1 second"));
        }
        if self.tools.timeout == 0 || self.report.timeout == 0 {
            return Err(anyhow::anyhow!("timeouts must be at least 1 second"));
        }
        if self.report.endpoint.is_empty() {
            return Err(anyhow::anyhow!("report.endpoint must not be empty"));
        }
        Ok(())
    }
}
