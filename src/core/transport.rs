//! HTTP transport used by the sheet source and the mutation client

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::config::EndpointConfig;
use super::models::{AppError, AppResult};
use crate::utils::encoding::decode_text;

/// Network seam between the domain clients and the outside world
#[async_trait]
pub trait SheetTransport: Send + Sync {
    /// GET `url` and return the decoded body.
    async fn get_text(&self, url: &Url) -> AppResult<String>;

    /// GET `url` without looking at the reply.
    ///
    /// `Ok` means the request was handed to the network, nothing more.
    async fn send_unconfirmed(&self, url: &Url) -> AppResult<()>;
}

/// `reqwest`-backed transport
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &EndpointConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(&config.user_agent)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SheetTransport for ReqwestTransport {
    async fn get_text(&self, url: &Url) -> AppResult<String> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::Endpoint(format!(
                "GET {} returned {}",
                url.host_str().unwrap_or("?"),
                status
            )));
        }

        let bytes = response.bytes().await?;
        let (text, encoding) = decode_text(&bytes);
        debug!("Fetched {} bytes ({})", bytes.len(), encoding.name());
        Ok(text)
    }

    async fn send_unconfirmed(&self, url: &Url) -> AppResult<()> {
        // The reply is dropped unread: delivery is at-most-once and unconfirmed.
        let _ = self.client.get(url.clone()).send().await?;
        Ok(())
    }
}
