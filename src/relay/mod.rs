use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("webhook destination is not configured")]
    NotConfigured,
    #[error("webhook responded with {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("webhook request failed: {0}")]
    Transport(reqwest::Error),
}

// webhook 地址本身就是凭据，错误信息里去掉 URL
impl From<reqwest::Error> for RelayError {
    fn from(err: reqwest::Error) -> Self {
        RelayError::Transport(err.without_url())
    }
}

/// 把文本转发到固定目的地
#[async_trait]
pub trait Relay: Send + Sync {
    async fn forward(&self, text: &str) -> Result<(), RelayError>;
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    text: &'a str,
}

/// 通过 HTTP POST `{ "text": ... }` 转发到 webhook
#[derive(Debug, Clone)]
pub struct WebhookRelay {
    client: Client,
    url: Option<Url>,
}

impl WebhookRelay {
    pub fn new(url: Option<Url>) -> Self {
        Self::with_client(Client::new(), url)
    }

    pub fn with_client(client: Client, url: Option<Url>) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Relay for WebhookRelay {
    async fn forward(&self, text: &str) -> Result<(), RelayError> {
        let url = self.url.as_ref().ok_or(RelayError::NotConfigured)?;

        let response = self
            .client
            .post(url.clone())
            .json(&WebhookPayload { text })
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Webhook request failed: {}", e);
                RelayError::from(e)
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // 目的地返回的正文作为错误详情
        let body = response.text().await.unwrap_or_default();
        tracing::warn!("Webhook rejected message - Status: {}, Body: {}", status, body);
        Err(RelayError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
