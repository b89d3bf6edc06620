use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::{Client, StatusCode};
use tracing::{error, info};

use api::camera::{Camera, CameraList};

use crate::config::Api;

pub const SERVICE_TOKEN_HEADER: &str = "X-Service-Token";

/// Reads the camera registry of the remote API.
#[derive(Clone, Debug)]
pub struct CameraClient {
    client: Client,
    url: String,
    token: Option<String>,
    timeout: Duration,
}

impl CameraClient {
    pub fn new(cfg: &Api) -> Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            url: api::path::cameras(&cfg.base),
            token: cfg.token.clone(),
            timeout: cfg.timeout(),
        })
    }

    /// All registered cameras, eligible or not.
    pub async fn cameras(&self) -> Result<Vec<Camera>> {
        info!(url = self.url, "fetching cameras");
        let mut request = self.client.get(&self.url).timeout(self.timeout);
        if let Some(token) = &self.token {
            request = request.header(SERVICE_TOKEN_HEADER, token);
        }
        let response = request.send().await.context("camera API unreachable")?;

        let status = response.status();
        if status != StatusCode::OK {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            error!(%status, body, "camera API failed");
            return Err(anyhow!("camera API answered {status}"));
        }
        let list: CameraList = response.json().await.context("invalid camera list")?;
        Ok(list.into_vec())
    }
}
