use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::protocol::{ErrorResponse, GenerateRequest, GenerateResponse};

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("relay request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("relay returned {status}: {message}")]
    Server { status: u16, message: String },
}

/// Anything that can turn a prompt into generated text
#[async_trait]
pub trait RelayClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, RelayError>;
}

/// Talks to the relay service's `POST /generate` route
#[derive(Clone)]
pub struct HttpRelayClient {
    client: Client,
    base_url: String,
}

impl HttpRelayClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RelayClient for HttpRelayClient {
    async fn generate(&self, prompt: &str) -> Result<String, RelayError> {
        let url = format!("{}/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&GenerateRequest::new(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            return Err(RelayError::Server { status, message });
        }

        let body: GenerateResponse = response.json().await?;
        Ok(body.output)
    }
}
