use std::{env, fmt, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};

use api::mediakit::RecordConfig;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: Http,
    #[serde(default)]
    pub log: Log,
    #[serde(default)]
    pub mediakit: MediaKit,
    #[serde(default)]
    pub api: Api,
    #[serde(default)]
    pub recording: Recording,
    #[serde(default)]
    pub startup: Startup,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default)]
    pub streams: Streams,
    /// Inspected after every pass; created when missing.
    #[serde(default = "default_recordings_dir")]
    pub recordings_dir: Option<PathBuf>,
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

#[derive(Clone, Serialize, Deserialize)]
pub struct MediaKit {
    #[serde(default = "default_mediakit_url")]
    pub base_url: String,
    #[serde(default = "default_mediakit_secret")]
    pub secret: String,
    /// Application new stream proxies are published under.
    #[serde(default = "default_app")]
    pub app: String,
    #[serde(default)]
    pub timeouts: MediaKitTimeouts,
}

/// Per-call timeouts, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaKitTimeouts {
    #[serde(default = "default_probe_timeout")]
    pub probe: u64,
    #[serde(default = "default_request_timeout")]
    pub request: u64,
    #[serde(default = "default_proxy_timeout")]
    pub proxy: u64,
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Api {
    /// Base of the camera registry, `/cameras` is appended.
    #[serde(default = "default_api_base")]
    pub base: String,
    #[serde(default = "default_service_token")]
    pub token: Option<String>,
    #[serde(default = "default_request_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    #[serde(default = "default_true")]
    pub enable_mp4: bool,
    #[serde(default = "default_file_second")]
    pub file_second: u32,
    #[serde(default = "default_file_path")]
    pub file_path: String,
    #[serde(default = "default_true")]
    pub enable_hls: bool,
}

/// Readiness wait, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Startup {
    #[serde(default = "default_initial_backoff")]
    pub initial_backoff: u64,
    #[serde(default = "default_max_backoff")]
    pub max_backoff: u64,
    #[serde(default = "default_startup_timeout")]
    pub timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// Seconds between two scheduled passes.
    #[serde(default = "default_sync_interval")]
    pub interval: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Streams {
    /// Pause between two stream starts, in milliseconds.
    #[serde(default = "default_stream_pause")]
    pub pause: u64,
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

fn default_mediakit_url() -> String {
    env::var("ZLM_BASE_URL").unwrap_or(String::from("http://zlmediakit:8000"))
}

fn default_mediakit_secret() -> String {
    env::var("ZLM_SECRET").unwrap_or(String::from("9QqL3M2K7vHQexkbfp6RvbCUB3GkV4MK"))
}

fn default_app() -> String {
    String::from("live")
}

fn default_probe_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    10
}

fn default_proxy_timeout() -> u64 {
    15
}

fn default_api_base() -> String {
    env::var("API_ENDPOINT").unwrap_or(String::from("http://host.docker.internal:3002/api"))
}

fn default_service_token() -> Option<String> {
    Some(
        env::var("INTERNAL_SERVICE_TOKEN")
            .unwrap_or(String::from("newcam-internal-service-2025")),
    )
    .filter(|token| !token.is_empty())
}

fn default_true() -> bool {
    true
}

fn default_file_second() -> u32 {
    3600
}

fn default_file_path() -> String {
    String::from("./record/proxy/")
}

fn default_initial_backoff() -> u64 {
    5_000
}

fn default_max_backoff() -> u64 {
    30_000
}

fn default_startup_timeout() -> u64 {
    300_000
}

fn default_sync_interval() -> u64 {
    env::var("SYNC_INTERVAL")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(300)
}

fn default_stream_pause() -> u64 {
    2_000
}

fn default_recordings_dir() -> Option<PathBuf> {
    Some(PathBuf::from(
        env::var("RECORDINGS_DIR").unwrap_or(String::from("/opt/media/bin/www/record/proxy/")),
    ))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http: Default::default(),
            log: Default::default(),
            mediakit: Default::default(),
            api: Default::default(),
            recording: Default::default(),
            startup: Default::default(),
            schedule: Default::default(),
            streams: Default::default(),
            recordings_dir: default_recordings_dir(),
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

impl Default for MediaKit {
    fn default() -> Self {
        Self {
            base_url: default_mediakit_url(),
            secret: default_mediakit_secret(),
            app: default_app(),
            timeouts: Default::default(),
        }
    }
}

impl Default for MediaKitTimeouts {
    fn default() -> Self {
        Self {
            probe: default_probe_timeout(),
            request: default_request_timeout(),
            proxy: default_proxy_timeout(),
        }
    }
}

impl Default for Api {
    fn default() -> Self {
        Self {
            base: default_api_base(),
            token: default_service_token(),
            timeout: default_request_timeout(),
        }
    }
}

impl Default for Recording {
    fn default() -> Self {
        Self {
            enable_mp4: true,
            file_second: default_file_second(),
            file_path: default_file_path(),
            enable_hls: true,
        }
    }
}

impl Default for Startup {
    fn default() -> Self {
        Self {
            initial_backoff: default_initial_backoff(),
            max_backoff: default_max_backoff(),
            timeout: default_startup_timeout(),
        }
    }
}

impl Default for Schedule {
    fn default() -> Self {
        Self {
            interval: default_sync_interval(),
        }
    }
}

impl Default for Streams {
    fn default() -> Self {
        Self {
            pause: default_stream_pause(),
        }
    }
}

impl MediaKitTimeouts {
    pub fn probe(&self) -> Duration {
        Duration::from_secs(self.probe)
    }

    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request)
    }

    pub fn proxy(&self) -> Duration {
        Duration::from_secs(self.proxy)
    }
}

impl Api {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Recording {
    pub fn to_record_config(&self) -> RecordConfig {
        RecordConfig {
            enable_mp4: self.enable_mp4,
            file_second: self.file_second,
            file_path: self.file_path.clone(),
            enable_hls: self.enable_hls,
        }
    }
}

impl Startup {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff)
    }

    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}

impl Schedule {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }
}

impl Streams {
    pub fn pause(&self) -> Duration {
        Duration::from_millis(self.pause)
    }
}

const REDACTED: &str = "***";

impl fmt::Debug for MediaKit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaKit")
            .field("base_url", &self.base_url)
            .field("secret", &REDACTED)
            .field("app", &self.app)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl fmt::Debug for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("base", &self.base)
            .field("token", &self.token.as_ref().map(|_| REDACTED))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.mediakit.base_url.trim().is_empty() {
            return Err(anyhow::anyhow!("mediakit.base_url must not be empty"));
        }
        if self.api.base.trim().is_empty() {
            return Err(anyhow::anyhow!("api.base must not be empty"));
        }
        if self.schedule.interval == 0 {
            return Err(anyhow::anyhow!("schedule.interval must be greater than zero"));
        }
        if self.mediakit.timeouts.probe == 0
            || self.mediakit.timeouts.request == 0
            || self.mediakit.timeouts.proxy == 0
            || self.api.timeout == 0
        {
            return Err(anyhow::anyhow!("timeouts must be greater than zero"));
        }
        if self.startup.initial_backoff == 0 || self.startup.timeout == 0 {
            return Err(anyhow::anyhow!("startup backoff and timeout must be greater than zero"));
        }
        if self.startup.max_backoff < self.startup.initial_backoff {
            return Err(anyhow::anyhow!(
                "startup.max_backoff must not be smaller than startup.initial_backoff"
            ));
        }
        Ok(())
    }
}
