use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;
use url::Url;

/// Read-only reachability check behind the offline banner.
#[derive(Clone)]
pub struct ConnectivityProbe {
    http: Client,
    url: Url,
}

impl ConnectivityProbe {
    pub fn new(url: Url, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build connectivity probe client")?;
        Ok(Self { http, url })
    }

    /// Any HTTP answer counts as online, whatever its status.
    pub async fn is_online(&self) -> bool {
        match self.http.head(self.url.clone()).send().await {
            Ok(response) => {
                debug!(status = %response.status(), url = %self.url, "connectivity probe answered");
                true
            }
            Err(err) => {
                debug!(url = %self.url, "connectivity probe failed: {err}");
                false
            }
        }
    }
}
