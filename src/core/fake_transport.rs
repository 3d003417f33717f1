use super::models::{AppError, AppResult};
use super::transport::SheetTransport;
use async_trait::async_trait;
use tokio::sync::Mutex;
use url::Url;

/// In-memory transport that records every URL it is asked to hit
pub struct FakeTransport {
    pub body: Mutex<Option<String>>,
    pub fail_sends: bool,
    pub gets: Mutex<Vec<Url>>,
    pub sends: Mutex<Vec<Url>>,
}

impl FakeTransport {
    pub fn with_body(body: &str) -> Self {
        Self {
            body: Mutex::new(Some(body.to_string())),
            fail_sends: false,
            gets: Mutex::new(Vec::new()),
            sends: Mutex::new(Vec::new()),
        }
    }

    pub fn offline() -> Self {
        Self {
            body: Mutex::new(None),
            fail_sends: true,
            gets: Mutex::new(Vec::new()),
            sends: Mutex::new(Vec::new()),
        }
    }

    pub async fn sent_payloads(&self) -> Vec<serde_json::Value> {
        self.sends
            .lock()
            .await
            .iter()
            .filter_map(|url| {
                url.query_pairs()
                    .find(|(k, _)| k == "payload")
                    .and_then(|(_, v)| serde_json::from_str(&v).ok())
            })
            .collect()
    }
}

#[async_trait]
impl SheetTransport for FakeTransport {
    async fn get_text(&self, url: &Url) -> AppResult<String> {
        self.gets.lock().await.push(url.clone());
        self.body
            .lock()
            .await
            .clone()
            .ok_or_else(|| AppError::Endpoint("connection refused".to_string()))
    }

    async fn send_unconfirmed(&self, url: &Url) -> AppResult<()> {
        if self.fail_sends {
            return Err(AppError::Endpoint("connection refused".to_string()));
        }
        self.sends.lock().await.push(url.clone());
        Ok(())
    }
}
