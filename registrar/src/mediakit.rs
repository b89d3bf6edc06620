use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use api::mediakit::{MediaInfo, RecordConfig, Reply, StreamProxy};
use api::path::mediakit as method;

use crate::config::MediaKit as MediaKitConfig;

#[derive(Debug, Error)]
pub enum MediaKitError {
    #[error("{method}: {source}")]
    Transport {
        method: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method}: unexpected HTTP status {status}")]
    Status {
        method: &'static str,
        status: StatusCode,
    },
    #[error("{method}: rejected with code {code}: {msg}")]
    Rejected {
        method: &'static str,
        code: i64,
        msg: String,
    },
}

/// Client for the subset of the ZLMediaKit HTTP API the registrar drives.
#[derive(Clone, Debug)]
pub struct MediaKitClient {
    client: Client,
    base_url: String,
    secret: String,
    probe_timeout: Duration,
    request_timeout: Duration,
    proxy_timeout: Duration,
}

impl MediaKitClient {
    pub fn new(cfg: &MediaKitConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            secret: cfg.secret.clone(),
            probe_timeout: cfg.timeouts.probe(),
            request_timeout: cfg.timeouts.request(),
            proxy_timeout: cfg.timeouts.proxy(),
        })
    }

    async fn call<Q, T>(
        &self,
        name: &'static str,
        params: &Q,
        timeout: Duration,
    ) -> Result<Reply<T>, MediaKitError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let transport = |source: reqwest::Error| MediaKitError::Transport {
            method: name,
            source,
        };
        let response = self
            .client
            .get(method::method(&self.base_url, name))
            .query(&[("secret", self.secret.as_str())])
            .query(params)
            .timeout(timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(MediaKitError::Status {
                method: name,
                status,
            });
        }
        let reply: Reply<T> = response.json().await.map_err(transport)?;
        if !reply.is_success() {
            return Err(MediaKitError::Rejected {
                method: name,
                code: reply.code,
                msg: reply.message().to_string(),
            });
        }
        debug!(method = name, "media server call succeeded");
        Ok(reply)
    }

    /// Readiness probe: the server answers `getServerConfig` with `code == 0`.
    pub async fn ready(&self) -> Result<(), MediaKitError> {
        self.call::<_, serde_json::Value>(
            method::GET_SERVER_CONFIG,
            &[] as &[(&str, &str)],
            self.probe_timeout,
        )
        .await
        .map(|_| ())
    }

    pub async fn set_server_config(&self, record: &RecordConfig) -> Result<(), MediaKitError> {
        self.call::<_, serde_json::Value>(method::SET_SERVER_CONFIG, record, self.request_timeout)
            .await
            .map(|_| ())
    }

    /// Every stream the server currently knows about. A reply without `data`
    /// means nothing is published.
    pub async fn media_list(&self) -> Result<Vec<MediaInfo>, MediaKitError> {
        let reply = self
            .call::<_, Vec<MediaInfo>>(
                method::GET_MEDIA_LIST,
                &[] as &[(&str, &str)],
                self.request_timeout,
            )
            .await?;
        Ok(reply.data.unwrap_or_default())
    }

    pub async fn add_stream_proxy(
        &self,
        proxy: &StreamProxy,
    ) -> Result<serde_json::Value, MediaKitError> {
        let reply = self
            .call::<_, serde_json::Value>(method::ADD_STREAM_PROXY, proxy, self.proxy_timeout)
            .await?;
        Ok(reply.data.unwrap_or_default())
    }
}
