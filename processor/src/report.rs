use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::{Client, StatusCode};
use tracing::{debug, error};

use api::segment::SegmentRecord;

use crate::config::Report;

pub const SERVICE_TOKEN_HEADER: &str = "X-Service-Token";

/// Posts segment records to the metadata API.
#[derive(Clone, Debug)]
pub struct Reporter {
    client: Client,
    endpoint: String,
    token: Option<String>,
}

impl Reporter {
    pub fn new(cfg: &Report) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5).min(cfg.timeout()))
            .timeout(cfg.timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
            token: cfg.token.clone(),
        })
    }

    /// Anything but `200 OK` is a failure; there is no retry here, the file
    /// stays where it is and the next batch picks it up again.
    pub async fn send(&self, record: &SegmentRecord) -> Result<()> {
        debug!(endpoint = self.endpoint, camera = record.camera_id, "sending segment record");

        let mut request = self.client.post(&self.endpoint).json(record);
        if let Some(token) = &self.token {
            request = request.header(SERVICE_TOKEN_HEADER, token);
        }
        let response = request.send().await?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        error!(
            endpoint = self.endpoint,
            ?status,
            body = truncate(&body, 200),
            "metadata API rejected segment record"
        );
        Err(anyhow!("metadata API answered {status}"))
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
